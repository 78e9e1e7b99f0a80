//! Extraction orchestrator: runs the provider chain in order, merges partial
//! results first-writer-wins, and layers the remote and headless fallbacks on
//! top when the direct fetches come back empty or blocked.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use wishwell_core::AppConfig;

use crate::error::ExtractError;
use crate::headless::extract_with_headless;
use crate::providers::provider_chain;
use crate::ssrf::{assert_url_is_safe, parse_http_url};
use crate::types::{merge_result, ExtractResponse, ExtractResult};
use crate::unfurl::unfurl_with_microlink;

const WARN_HEADLESS_FAILED: &str =
    "Headless browser fallback could not extract this page (page closed or blocked).";
const WARN_HEADLESS_DISABLED: &str =
    "This site blocks extraction without a browser (enable WISHWELL_HEADLESS_ENABLED).";
const WARN_FILL_MANUALLY: &str =
    "Extraction failed for this site, fill in the fields manually.";

const DEFAULT_SCRAPERAPI_ENDPOINT: &str = "https://api.scraperapi.com/";
const DEFAULT_SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
const DEFAULT_MICROLINK_ENDPOINT: &str = "https://api.microlink.io";

/// Everything the pipeline needs to know, detached from the full application
/// config so the crate can be driven directly in tests and tools.
#[derive(Clone)]
pub struct ExtractConfig {
    pub scraper_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub microlink_api_key: Option<String>,
    pub headless_enabled: bool,
    pub timeout: Duration,
    pub max_body_bytes: usize,
    pub user_agent: String,
    pub scraperapi_endpoint: String,
    pub serper_endpoint: String,
    pub microlink_endpoint: String,
    /// Skip the DNS/IP vetting step (scheme checks still apply). Only for
    /// tests that point the pipeline at loopback mock servers.
    pub allow_private_hosts: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            scraper_api_key: None,
            serper_api_key: None,
            microlink_api_key: None,
            headless_enabled: false,
            timeout: Duration::from_secs(8),
            max_body_bytes: 1_500_000,
            user_agent: "wishwell/0.1 (+wishlist-preview)".to_string(),
            scraperapi_endpoint: DEFAULT_SCRAPERAPI_ENDPOINT.to_string(),
            serper_endpoint: DEFAULT_SERPER_ENDPOINT.to_string(),
            microlink_endpoint: DEFAULT_MICROLINK_ENDPOINT.to_string(),
            allow_private_hosts: false,
        }
    }
}

impl ExtractConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            scraper_api_key: config.scraper_api_key.clone(),
            serper_api_key: config.serper_api_key.clone(),
            microlink_api_key: config.microlink_api_key.clone(),
            headless_enabled: config.headless_enabled,
            timeout: Duration::from_secs(config.extract_timeout_secs),
            max_body_bytes: config.extract_max_body_bytes,
            user_agent: config.extract_user_agent.clone(),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("scraper_api_key", &self.scraper_api_key.as_ref().map(|_| "***"))
            .field("serper_api_key", &self.serper_api_key.as_ref().map(|_| "***"))
            .field(
                "microlink_api_key",
                &self.microlink_api_key.as_ref().map(|_| "***"),
            )
            .field("headless_enabled", &self.headless_enabled)
            .field("timeout", &self.timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("user_agent", &self.user_agent)
            .field("allow_private_hosts", &self.allow_private_hosts)
            .finish_non_exhaustive()
    }
}

/// Listing-metadata extractor. Owns one HTTP client reused across requests.
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
    config: ExtractConfig,
}

impl Extractor {
    /// # Errors
    ///
    /// [`ExtractError::Http`] when the HTTP client cannot be constructed.
    pub fn new(config: ExtractConfig) -> Result<Self, ExtractError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Run the full pipeline for one URL.
    ///
    /// Provider failures degrade into warnings on the response; the only
    /// errors surfaced here are an unusable input URL or one the guard
    /// refuses.
    ///
    /// # Errors
    ///
    /// [`ExtractError::InvalidUrl`] and [`ExtractError::UnsafeUrl`].
    pub async fn extract(&self, raw_url: &str) -> Result<ExtractResponse, ExtractError> {
        let url = if self.config.allow_private_hosts {
            parse_http_url(raw_url)?
        } else {
            assert_url_is_safe(raw_url).await?
        };

        let mut result = ExtractResult::default();
        let mut sources: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();
        let mut blocked = false;
        let mut flagged_headless = false;

        for provider in provider_chain(&url, &self.config) {
            let response = provider.run(&self.client, &self.config, &url).await;
            debug!(
                ?provider,
                source = %response.source,
                blocked = response.blocked,
                needs_headless = response.needs_headless,
                "provider finished"
            );

            if response.blocked {
                blocked = true;
            }
            if response.needs_headless {
                flagged_headless = true;
            }
            // A provider only earns a provenance tag when it contributed data;
            // blocked and error outcomes influence the flags, not the source.
            if response.source != "empty"
                && response.source != "error"
                && response.result.has_data()
                && !sources.contains(&response.source)
            {
                sources.push(response.source.clone());
            }

            result = merge_result(result, response.result);

            if result.has_data() && !response.needs_headless && !response.blocked {
                break;
            }
            if response.blocked {
                break;
            }
        }

        let has_html_data = result.has_data();

        // Unfurl service covers blocked sites and thin pages.
        let mut microlink_used = false;
        if !has_html_data || blocked {
            let micro = unfurl_with_microlink(&self.client, &self.config, raw_url).await;
            if micro.has_data() {
                result = merge_result(result, micro);
                let tag = if has_html_data { "mixed" } else { "microlink" };
                if !sources.contains(&tag.to_string()) {
                    sources.push(tag.to_string());
                }
                microlink_used = true;
            }
        }

        let should_try_headless = self.config.headless_enabled
            && !microlink_used
            && (!result.has_data() || blocked || flagged_headless);

        if should_try_headless {
            let headless = extract_with_headless(&self.config, &url).await;
            if headless.has_data() {
                result = merge_result(result, headless);
                let tag = if sources.is_empty() { "headless" } else { "mixed" };
                sources.push(tag.to_string());
            } else {
                warnings.push(WARN_HEADLESS_FAILED.to_string());
            }
        } else if (blocked || flagged_headless) && !microlink_used && !result.has_data() {
            warnings.push(WARN_HEADLESS_DISABLED.to_string());
        }

        let source = match sources.len() {
            0 => "empty".to_string(),
            1 => sources.remove(0),
            _ => "mixed".to_string(),
        };

        if !result.has_data() && warnings.is_empty() {
            warnings.push(WARN_FILL_MANUALLY.to_string());
        }

        info!(%url, %source, blocked, warnings = warnings.len(), "extraction finished");

        Ok(ExtractResponse {
            result,
            source,
            blocked,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_app_config_maps_pipeline_fields() {
        let app = AppConfig {
            database_url: "postgres://localhost/wishwell".to_string(),
            env: wishwell_core::Environment::Test,
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            admin_username: "admin".to_string(),
            admin_password_hash: "0".repeat(64),
            password_salt: "salt".to_string(),
            session_ttl_secs: 86_400,
            scraper_api_key: Some("sk-123".to_string()),
            serper_api_key: None,
            microlink_api_key: None,
            headless_enabled: true,
            extract_timeout_secs: 3,
            extract_max_body_bytes: 1_500_000,
            extract_user_agent: "wishwell/0.1 (+wishlist-preview)".to_string(),
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
        };

        let config = ExtractConfig::from_app_config(&app);
        assert_eq!(config.scraper_api_key.as_deref(), Some("sk-123"));
        assert!(config.headless_enabled);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.allow_private_hosts);
        assert_eq!(config.scraperapi_endpoint, DEFAULT_SCRAPERAPI_ENDPOINT);
    }

    #[test]
    fn debug_redacts_api_keys() {
        let config = ExtractConfig {
            scraper_api_key: Some("sk-secret".to_string()),
            ..ExtractConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[tokio::test]
    async fn extract_rejects_invalid_url() {
        let extractor = Extractor::new(ExtractConfig::default()).expect("client builds");
        let result = extractor.extract("not a url").await;
        assert!(matches!(result, Err(ExtractError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn extract_rejects_private_target() {
        let extractor = Extractor::new(ExtractConfig::default()).expect("client builds");
        let result = extractor.extract("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(ExtractError::UnsafeUrl { .. })));
    }
}
