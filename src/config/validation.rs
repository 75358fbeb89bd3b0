use crate::config::types::{
    Config, ExportConfig, SitemapConfig, StoreBackend, StoreConfig, UserAgentConfig,
};
use crate::storage::validate_table_name;
use crate::ConfigError;
use url::Url;

/// Largest batch that stays under SQLite's default bound-parameter limit
const MAX_BATCH_SIZE: usize = 999;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sitemap_config(&config.sitemap)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_export_config(&config.export)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates sitemap traversal configuration
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    validate_root_url(&config.root_url)?;

    if config.scratch_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "scratch_dir cannot be empty".to_string(),
        ));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates the root sitemap URL: absolute, http or https
pub fn validate_root_url(root_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url '{}': {}", root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url '{}' must use http or https",
            root_url
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates snapshot export configuration
fn validate_export_config(config: &ExportConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "export directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "file_prefix must be a bare file name, got '{}'",
            config.file_prefix
        )));
    }

    Ok(())
}

/// Validates store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    validate_table_name(&config.table).map_err(|e| ConfigError::Validation(e.to_string()))?;

    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    if config.commit_every < config.batch_size {
        return Err(ConfigError::Validation(format!(
            "commit_every ({}) must be >= batch_size ({})",
            config.commit_every, config.batch_size
        )));
    }

    match config.backend {
        StoreBackend::Sqlite => {
            if config.sqlite_path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(
                    "sqlite_path cannot be empty for the sqlite backend".to_string(),
                ));
            }
        }
        StoreBackend::Postgres => {
            if !cfg!(feature = "postgres") {
                return Err(ConfigError::BackendUnavailable(config.backend.to_string()));
            }
            if config.database.is_empty() {
                return Err(ConfigError::Validation(
                    "database cannot be empty for the postgres backend".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
