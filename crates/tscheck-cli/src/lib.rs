//! Thin glue around `tscheck-core`: argument parsing, tracing setup, and
//! console reporting for the `tscheck` binary.

pub mod args;
pub mod tracing_config;
