use crate::config::types::{Config, CrawlConfig, ExtractConfig, FetchConfig, OutputConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound for the page worker pool
const MAX_WORKERS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_fetch_config(&config.fetch)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates URL source and discovery limits
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    match (&config.seed_url, &config.urls_file) {
        (None, None) => {
            return Err(ConfigError::Validation(
                "either seed-url or urls-file must be set".to_string(),
            ))
        }
        (Some(_), Some(_)) => {
            return Err(ConfigError::Validation(
                "seed-url and urls-file are mutually exclusive".to_string(),
            ))
        }
        (Some(seed), None) => validate_seed_url(seed)?,
        (None, Some(path)) => {
            if path.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "urls-file cannot be empty".to_string(),
                ));
            }
        }
    }

    if config.max_urls < 1 {
        return Err(ConfigError::Validation(format!(
            "max-urls must be >= 1, got {}",
            config.max_urls
        )));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.run_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run-timeout-secs must be > 0 when set".to_string(),
        ));
    }

    for ext in &config.excluded_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must look like '.ext'",
                ext
            )));
        }
    }

    Ok(())
}

/// The seed may omit its scheme; anything else must be an http(s) URL with a host
fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let candidate = if seed.contains("://") {
        seed.to_string()
    } else {
        format!("https://{}", seed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed-url '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "seed-url '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "seed-url '{}' has no host",
            seed
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "fetch timeout-ms must be > 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Every selector in both tables must parse
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for selector in config
        .content_selectors
        .iter()
        .chain(config.boilerplate_selectors.iter())
    {
        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            selector: selector.clone(),
            message: e.to_string(),
        })?;
    }

    if config.title_separators.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "title-separators cannot contain an empty string".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if let Some(name) = &config.file_name {
        if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "file-name '{}' must be a plain file name",
                name
            )));
        }
    }

    if config.render_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "render-timeout-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}
