//! Output module for reporting on the harvested store
//!
//! This module handles:
//! - Loading store statistics for the `--stats` mode
//! - Formatting statistics for terminal display

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};
