//! Configuration module for Sitemap-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus reading store credentials from the environment.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitemap-sync.toml")).unwrap();
//! println!("Active table: {}", config.store.table);
//! ```

mod credentials;
mod parser;
mod types;
mod validation;

pub use credentials::{StoreCredentials, HOST_VAR, PASSWORD_VAR, USER_VAR};
pub use types::{
    Config, ExportConfig, ReplaceStrategy, SitemapConfig, StoreBackend, StoreConfig,
    UserAgentConfig, DEFAULT_ROOT_URL,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_root_url};
