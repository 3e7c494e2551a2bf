//! Component configurations

pub mod catalog;
pub mod compiler;

pub use catalog::CatalogConfig;
pub use compiler::{CompilerConfig, FetchPolicy};
