//! Generic provider: size- and time-bounded fetch of the target page, parsed
//! with the shared metadata parser. Works on any site that serves OG/Twitter
//! tags or JSON-LD without JavaScript.

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use tracing::warn;
use url::Url;

use crate::extractor::ExtractConfig;
use crate::parse::parse_listing_html;
use crate::types::ProviderResponse;

pub(crate) const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

/// Why a bounded fetch did not produce a body.
#[derive(Debug)]
pub(crate) enum FetchError {
    /// 401, 403 or 429: the target actively refused us.
    Blocked(StatusCode),
    Status(StatusCode),
    TooLarge,
    TimedOut,
    Http(reqwest::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocked(status) => write!(f, "blocked with HTTP {status}"),
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::TooLarge => write!(f, "response body over size limit"),
            Self::TimedOut => write!(f, "fetch timed out"),
            Self::Http(e) => write!(f, "{e}"),
        }
    }
}

/// Fetch a page body as text, aborting once more than
/// `config.max_body_bytes` have been received or `config.timeout` has
/// elapsed. The body is read as a stream so an oversized page is dropped
/// without buffering it whole.
pub(crate) async fn fetch_html_with_limit(
    client: &Client,
    config: &ExtractConfig,
    url: &Url,
) -> Result<String, FetchError> {
    let fetch = async {
        let response = client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, ACCEPT_HTML)
            .send()
            .await
            .map_err(FetchError::Http)?;

        let status = response.status();
        if !status.is_success() {
            if matches!(status.as_u16(), 401 | 403 | 429) {
                return Err(FetchError::Blocked(status));
            }
            return Err(FetchError::Status(status));
        }

        let mut received = 0usize;
        let mut body: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::Http)?;
            received += chunk.len();
            if received > config.max_body_bytes {
                return Err(FetchError::TooLarge);
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    };

    tokio::time::timeout(config.timeout, fetch)
        .await
        .map_err(|_| FetchError::TimedOut)?
}

pub async fn extract(client: &Client, config: &ExtractConfig, url: &Url) -> ProviderResponse {
    match fetch_html_with_limit(client, config, url).await {
        Ok(html) => {
            let result = parse_listing_html(&html, url);
            if result.has_data() {
                ProviderResponse::new(result, "html")
            } else {
                ProviderResponse::empty("empty")
            }
        }
        Err(FetchError::Blocked(status)) => {
            warn!(%url, %status, "generic fetch blocked");
            ProviderResponse {
                blocked: true,
                ..ProviderResponse::empty("blocked")
            }
        }
        Err(e) => {
            warn!(%url, error = %e, "generic fetch failed");
            ProviderResponse::empty("error")
        }
    }
}
