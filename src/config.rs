use crate::error::StorefrontError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const DEFAULT_API_URL: &str = "https://bb3-api.ashwinsrivastava.com";
const DEFAULT_MEDIA_URL: &str =
    "https://eu2.contabostorage.com/eabb361130e04e0c98e8b88a22721601:bb-main";
const DEFAULT_FALLBACK_IMAGE: &str = "https://via.placeholder.com/300x300?text=No+Image";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: Url,
    pub media_url: String,
    pub fallback_image: String,
    pub currency_symbol: String,
    pub timeout: Duration,
    pub suggest_debounce: Duration,
    pub debug: bool,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: ConfigDefaults,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigDefaults {
    api_url: Option<String>,
    media_url: Option<String>,
    fallback_image: Option<String>,
    currency_symbol: Option<String>,
    timeout_secs: Option<u64>,
    suggest_debounce_ms: Option<u64>,
}

impl AppConfig {
    pub fn load(
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        debug: bool,
    ) -> Result<Self, StorefrontError> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("storefront-cli");

        let file_config = load_config_file(&config_dir);
        Self::resolve(api_url, timeout_secs, debug, file_config.defaults)
    }

    fn resolve(
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        debug: bool,
        defaults: ConfigDefaults,
    ) -> Result<Self, StorefrontError> {
        // Priority: CLI flags → env vars → config file → defaults
        let api_url_env = std::env::var("STOREFRONT_API_URL").ok();
        let media_url_env = std::env::var("STOREFRONT_MEDIA_URL").ok();

        let api_url = api_url
            .or(api_url_env)
            .or(defaults.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let media_url = media_url_env
            .or(defaults.media_url)
            .unwrap_or_else(|| DEFAULT_MEDIA_URL.to_string());

        let fallback_image = defaults
            .fallback_image
            .unwrap_or_else(|| DEFAULT_FALLBACK_IMAGE.to_string());

        let currency_symbol = defaults
            .currency_symbol
            .unwrap_or_else(|| "₹".to_string());

        let timeout = Duration::from_secs(timeout_secs.or(defaults.timeout_secs).unwrap_or(10));
        let suggest_debounce =
            Duration::from_millis(defaults.suggest_debounce_ms.unwrap_or(300));

        Ok(AppConfig {
            api_url: Self::parse_base_url(&api_url)?,
            media_url: media_url.trim_end_matches('/').to_string(),
            fallback_image,
            currency_symbol,
            timeout,
            suggest_debounce,
            debug,
        })
    }

    /// Parse the API base, forcing a trailing slash so `Url::join` appends
    /// endpoint paths instead of replacing the last segment.
    pub fn parse_base_url(raw: &str) -> Result<Url, StorefrontError> {
        let mut url = Url::parse(raw)
            .map_err(|e| StorefrontError::Config(format!("Invalid API URL '{}': {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StorefrontError::Config(format!(
                "API URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

fn load_config_file(config_dir: &Path) -> ConfigFile {
    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed {}: {}", config_path.display(), e);
                ConfigFile::default()
            }),
            Err(_) => ConfigFile::default(),
        }
    } else {
        ConfigFile::default()
    }
}
