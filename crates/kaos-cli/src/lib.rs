//! kaosctl library
//!
//! Argument parsing, configuration assembly, and the command implementations
//! behind the `kaosctl` binary. Compilation itself lives in `kaos-workflow`.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
pub mod selection;
