use crate::catalog::CatalogClient;
use crate::proxy::{ProxyEndpoint, ProxyFetcher, ProxyStyle};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Language preference order, most preferred first. A chapter keeps the
    /// highest-priority language variant seen for its number.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base")]
    pub base_url: String,

    /// Minimum spacing between catalog requests in milliseconds
    #[serde(default = "default_request_spacing")]
    pub request_spacing_ms: u64,

    /// Sleep before the single 429 retry in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_mangadex_base")]
    pub mangadex_base_url: String,

    #[serde(default = "default_comick_base")]
    pub comick_base_url: String,

    /// CDN base for Comick image storage keys
    #[serde(default = "default_comick_cdn")]
    pub comick_image_cdn: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_endpoints")]
    pub endpoints: Vec<ProxyEndpointConfig>,

    /// Sleep after a 429 from a relay before moving on, in milliseconds
    #[serde(default = "default_proxy_backoff")]
    pub rate_limit_backoff_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxyEndpointConfig {
    pub base: String,
    /// Whether the relay wants the target URL percent-encoded as a query
    /// parameter (true) or appended raw (false)
    #[serde(default)]
    pub encode_target: bool,
}

fn default_languages() -> Vec<String> {
    vec!["pt-br".to_string(), "en".to_string()]
}
fn default_catalog_base() -> String {
    "https://api.jikan.moe/v4".to_string()
}
fn default_request_spacing() -> u64 {
    1000
}
fn default_retry_backoff() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}
fn default_mangadex_base() -> String {
    "https://api.mangadex.org".to_string()
}
fn default_comick_base() -> String {
    "https://api.comick.io".to_string()
}
fn default_comick_cdn() -> String {
    "https://meo.comick.pictures".to_string()
}
fn default_proxy_backoff() -> u64 {
    1000
}
fn default_proxy_endpoints() -> Vec<ProxyEndpointConfig> {
    vec![
        ProxyEndpointConfig {
            base: "https://corsproxy.io/?".to_string(),
            encode_target: false,
        },
        ProxyEndpointConfig {
            base: "https://api.allorigins.win/raw?url=".to_string(),
            encode_target: true,
        },
    ]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base(),
            request_spacing_ms: default_request_spacing(),
            retry_backoff_ms: default_retry_backoff(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            mangadex_base_url: default_mangadex_base(),
            comick_base_url: default_comick_base(),
            comick_image_cdn: default_comick_cdn(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoints: default_proxy_endpoints(),
            rate_limit_backoff_ms: default_proxy_backoff(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            providers: ProviderConfig::default(),
            proxy: ProxyConfig::default(),
            languages: default_languages(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(cfg) = toml::from_str::<Config>(&content) {
                    return cfg;
                }
            }
        }
        Self::default()
    }
}

impl CatalogConfig {
    /// Create the rate-limited catalog client from this configuration
    pub fn create_client(&self) -> Result<CatalogClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;
        Ok(CatalogClient::new(
            client,
            self.base_url.clone(),
            Duration::from_millis(self.request_spacing_ms),
            Duration::from_millis(self.retry_backoff_ms),
        ))
    }
}

impl ProxyConfig {
    /// Create the rotating proxy fetcher from this configuration
    pub fn create_fetcher(&self, client: reqwest::Client) -> ProxyFetcher {
        let endpoints = self
            .endpoints
            .iter()
            .map(|e| {
                let style = if e.encode_target {
                    ProxyStyle::EncodedQuery
                } else {
                    ProxyStyle::RawAppend
                };
                ProxyEndpoint::new(e.base.clone(), style)
            })
            .collect();
        ProxyFetcher::new(
            client,
            endpoints,
            Duration::from_millis(self.rate_limit_backoff_ms),
        )
    }
}
