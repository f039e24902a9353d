//! Configuration module for Tender-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Configuration is an explicit value passed into each component at
//! construction; there is no process-wide mutable state.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, PortalConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
