//! `kaosctl` subcommands
//!
//! Each command receives the assembled configuration and a shared catalog
//! client; `main` owns construction of both.

pub mod clusters;
pub mod compile;
pub mod hubs;
pub mod packages;
