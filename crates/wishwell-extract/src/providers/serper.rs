//! Serper fallback: when the page itself cannot be read, a search for its
//! URL often yields a usable title, snippet, and thumbnail.

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::extractor::ExtractConfig;
use crate::types::{dedupe_images, ExtractResult, ProviderResponse};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganicHit {
    title: Option<String>,
    snippet: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    images: Vec<serde_json::Value>,
}

pub async fn extract(client: &Client, config: &ExtractConfig, url: &Url) -> ProviderResponse {
    // provider_chain only schedules this provider when the key is set, so
    // landing here without one is a caller bug, reported as an error outcome.
    let Some(api_key) = config.serper_api_key.as_deref() else {
        warn!(%url, "serper invoked without SERPER_API_KEY");
        return ProviderResponse::empty("serper-error");
    };

    let response = match client
        .post(&config.serper_endpoint)
        .header("X-API-KEY", api_key)
        .json(&serde_json::json!({ "q": url.as_str() }))
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "serper request failed");
            return ProviderResponse::empty("serper-error");
        }
    };

    if !response.status().is_success() {
        return ProviderResponse::empty("serper-error");
    }

    let search: SearchResponse = match response.json().await {
        Ok(search) => search,
        Err(e) => {
            warn!(%url, error = %e, "serper response decode failed");
            return ProviderResponse::empty("serper-error");
        }
    };

    let result = first_hit_result(search);
    if result.has_data() {
        ProviderResponse::new(result, "serper")
    } else {
        ProviderResponse::empty("empty")
    }
}

fn first_hit_result(search: SearchResponse) -> ExtractResult {
    let Some(best) = search.organic.into_iter().next() else {
        return ExtractResult::default();
    };

    let mut images: Vec<String> = Vec::new();
    if let Some(img) = best.image_url {
        images.push(img);
    }
    images.extend(
        best.images
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string)),
    );
    let images = dedupe_images(images);
    let main_image = images.first().cloned();

    ExtractResult {
        title: best.title.filter(|t| !t.is_empty()),
        description: best.snippet.filter(|s| !s.is_empty()),
        images,
        main_image,
        ..ExtractResult::default()
    }
}
