//! Command-line interface for music-ledger.
//!
//! This module provides CLI commands for browsing the shared catalog,
//! adding albums and tracks, editing an album's ratings and moving the raw
//! worksheet in and out as JSON.

mod commands;

pub use commands::{Cli, Commands, run_command};
