//! Table rendering for catalog listings

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use kaos_catalog::{ClusterRecord, HubStatusRecord, PackageListing};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

pub fn clusters_table(clusters: &[ClusterRecord]) -> Table {
    let mut table = table(&["Cluster ID", "Cluster Name"]);
    for cluster in clusters {
        table.add_row(vec![cluster.cluster_id.as_str(), cluster.cluster_name.as_str()]);
    }
    table
}

pub fn hubs_table(hubs: &[HubStatusRecord]) -> Table {
    let mut table = table(&["Hub ID", "Hub Name"]);
    for hub in hubs {
        table.add_row(vec![hub.id.as_str(), hub.hub_name.as_str()]);
    }
    table
}

pub fn packages_table(packages: &[PackageListing]) -> Table {
    let mut table = table(&["Chart", "Experiments"]);
    for package in packages {
        table.add_row(vec![package.chart_name.clone(), package.experiments.join(", ")]);
    }
    table
}
