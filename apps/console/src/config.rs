use std::env;
use std::time::Duration;

use keel_application::ScreenOptions;
use keel_core::{AppError, AppResult};
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";

/// Console settings read from the environment.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: Url,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    pub screen: ScreenOptions,
    pub status_reconnect: Option<Duration>,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let raw_base_url = lookup("KEEL_API_BASE_URL")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = Url::parse(&raw_base_url).map_err(|error| {
            AppError::Validation(format!(
                "invalid KEEL_API_BASE_URL value '{raw_base_url}': {error}"
            ))
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(AppError::Validation(
                "KEEL_API_BASE_URL must use http or https".to_owned(),
            ));
        }

        let api_token = lookup("KEEL_API_TOKEN")
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        let http_timeout_secs = parse_u64(&lookup, "KEEL_HTTP_TIMEOUT_SECS", 15)?;
        let page_size = parse_u32(&lookup, "KEEL_PAGE_SIZE", 10)?;
        let debounce_ms = parse_u64(&lookup, "KEEL_DEBOUNCE_MS", 300)?;
        let reconnect_ms = parse_u64(&lookup, "KEEL_STATUS_RECONNECT_MS", 3000)?;

        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "KEEL_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        if page_size == 0 {
            return Err(AppError::Validation(
                "KEEL_PAGE_SIZE must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            api_token,
            http_timeout: Duration::from_secs(http_timeout_secs),
            screen: ScreenOptions {
                debounce: Duration::from_millis(debounce_ms),
                page_size,
            },
            // Zero disables automatic reconnects.
            status_reconnect: (reconnect_ms > 0).then(|| Duration::from_millis(reconnect_ms)),
        })
    }
}

fn parse_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u32) -> AppResult<u32> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> AppResult<u64> {
    match lookup(name) {
        Some(value) => value.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use keel_core::AppError;

    use super::ConsoleConfig;

    fn load(pairs: &[(&str, &str)]) -> Result<ConsoleConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ConsoleConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let Ok(config) = load(&[]) else {
            panic!("defaults must load");
        };
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.api_token, None);
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.screen.page_size, 10);
        assert_eq!(config.screen.debounce, Duration::from_millis(300));
        assert_eq!(config.status_reconnect, Some(Duration::from_secs(3)));
    }

    #[test]
    fn blank_token_is_ignored_and_zero_disables_reconnect() {
        let Ok(config) = load(&[("KEEL_API_TOKEN", "  "), ("KEEL_STATUS_RECONNECT_MS", "0")]) else {
            panic!("config must load");
        };
        assert_eq!(config.api_token, None);
        assert_eq!(config.status_reconnect, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("KEEL_PAGE_SIZE", "ten")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("KEEL_PAGE_SIZE", "0")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("KEEL_API_BASE_URL", "ftp://example.com")]),
            Err(AppError::Validation(_))
        ));
    }
}
