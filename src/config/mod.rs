//! Configuration module for the registry crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not required: [`Config::default`] carries the standard
//! crawl limits and source location.
//!
//! # Example
//!
//! ```no_run
//! use capability_registry::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("registry.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.max_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
