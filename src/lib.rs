//! unlfs library crate.
//!
//! The primary interface is the `unlfs` binary. The library exposes the
//! export pipeline so integration tests can drive it against real
//! repositories without going through the CLI.

pub mod attributes;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod rewrite;
pub mod selection;
pub mod telemetry;
