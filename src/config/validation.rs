use crate::config::types::{Config, LoadMore};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Only core keys and cross-strategy hazards are checked here. Whether a
/// strategy's required keys are present is checked by that strategy's
/// constructor, since the core does not know which keys it reads.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_class(&config.crawler_class)?;
    validate_output_path(&config.output_path)?;
    validate_debug_page(config.debug_page.as_deref())?;
    validate_rate_limit(config.rate_limit)?;
    validate_list_url(config.list_url.as_deref())?;
    validate_load_more(config.load_more.as_ref())?;
    Ok(())
}

/// Validates the strategy identifier
fn validate_crawler_class(crawler_class: &str) -> Result<(), ConfigError> {
    if crawler_class.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-class cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the output destination
fn validate_output_path(output_path: &str) -> Result<(), ConfigError> {
    if output_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the debug page destination, when configured
fn validate_debug_page(debug_page: Option<&str>) -> Result<(), ConfigError> {
    if let Some(path) = debug_page {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "debug-page cannot be empty when set; omit the key to disable the dump".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates the request pause
fn validate_rate_limit(rate_limit: f64) -> Result<(), ConfigError> {
    if !rate_limit.is_finite() || rate_limit < 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate-limit must be a non-negative number of seconds, got {}",
            rate_limit
        )));
    }
    Ok(())
}

/// Validates the list URL, when configured
///
/// The URL may contain a `{page}` placeholder, which is not valid URL
/// syntax, so only the scheme is checked here. The fully substituted URL is
/// parsed at request time.
fn validate_list_url(list_url: Option<&str>) -> Result<(), ConfigError> {
    if let Some(url) = list_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(format!(
                "list-url must start with http:// or https://, got '{}'",
                url
            )));
        }
    }
    Ok(())
}

/// Validates load-more pagination, when configured
fn validate_load_more(load_more: Option<&LoadMore>) -> Result<(), ConfigError> {
    if let Some(load_more) = load_more {
        // A zero step would never advance the offset.
        if load_more.step < 1 {
            return Err(ConfigError::Validation(format!(
                "load-more step must be >= 1, got {}",
                load_more.step
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_crawler_class() {
        assert!(validate_crawler_class("paged-html").is_ok());
        assert!(validate_crawler_class("").is_err());
        assert!(validate_crawler_class("   ").is_err());
    }

    #[test]
    fn test_validate_output_path() {
        assert!(validate_output_path("data/results.csv").is_ok());
        assert!(validate_output_path("").is_err());
        assert!(validate_output_path("  ").is_err());
    }

    #[test]
    fn test_validate_debug_page() {
        assert!(validate_debug_page(None).is_ok());
        assert!(validate_debug_page(Some("data/debug.html")).is_ok());
        assert!(validate_debug_page(Some("")).is_err());
    }

    #[test]
    fn test_validate_rate_limit() {
        assert!(validate_rate_limit(0.0).is_ok());
        assert!(validate_rate_limit(1.5).is_ok());

        assert!(validate_rate_limit(-1.0).is_err());
        assert!(validate_rate_limit(f64::NAN).is_err());
        assert!(validate_rate_limit(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_list_url() {
        assert!(validate_list_url(None).is_ok());
        assert!(validate_list_url(Some("https://example.com/articles?page={page}")).is_ok());
        assert!(validate_list_url(Some("http://example.com/list")).is_ok());

        assert!(validate_list_url(Some("ftp://example.com")).is_err());
        assert!(validate_list_url(Some("example.com/list")).is_err());
        assert!(validate_list_url(Some("")).is_err());
    }

    #[test]
    fn test_validate_load_more() {
        let valid = LoadMore {
            start_offset: 0,
            step: 10,
            max_items: 100,
        };
        assert!(validate_load_more(Some(&valid)).is_ok());
        assert!(validate_load_more(None).is_ok());

        let zero_step = LoadMore {
            start_offset: 0,
            step: 0,
            max_items: 100,
        };
        assert!(validate_load_more(Some(&zero_step)).is_err());
    }
}
