//! ScraperAPI fallback: refetch the target page through the proxy service,
//! then run the same generic parser over whatever it returns.

use reqwest::{Client, StatusCode};
use tracing::warn;
use url::Url;

use crate::extractor::ExtractConfig;
use crate::parse::parse_listing_html;
use crate::types::ProviderResponse;

use super::generic::ACCEPT_HTML;

pub async fn extract(client: &Client, config: &ExtractConfig, url: &Url) -> ProviderResponse {
    let Some(api_key) = config.scraper_api_key.as_deref() else {
        return ProviderResponse::empty("empty");
    };

    let response = match client
        .get(&config.scraperapi_endpoint)
        .query(&[
            ("api_key", api_key),
            ("url", url.as_str()),
            ("render", "false"),
        ])
        .header(reqwest::header::ACCEPT, ACCEPT_HTML)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "scraperapi request failed");
            return ProviderResponse::empty("scraperapi-error");
        }
    };

    let status = response.status();
    if !status.is_success() {
        let blocked = status == StatusCode::FORBIDDEN;
        return ProviderResponse {
            blocked,
            ..ProviderResponse::empty(if blocked {
                "scraperapi-blocked"
            } else {
                "scraperapi-error"
            })
        };
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            warn!(%url, error = %e, "scraperapi body read failed");
            return ProviderResponse::empty("scraperapi-error");
        }
    };

    // Relative URLs in the proxied body belong to the target site.
    let result = parse_listing_html(&html, url);
    if result.has_data() {
        ProviderResponse::new(result, "scraperapi")
    } else {
        ProviderResponse::empty("empty")
    }
}
