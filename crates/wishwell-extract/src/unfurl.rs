//! Microlink unfurl: metadata-as-a-service fallback used when the page could
//! not be read directly. Every failure mode degrades to an empty result.

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::extractor::ExtractConfig;
use crate::types::{dedupe_images, ExtractResult};

#[derive(Debug, Deserialize)]
struct Envelope {
    data: Option<UnfurlData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnfurlData {
    title: Option<String>,
    description: Option<String>,
    image: Option<MediaRef>,
    logo: Option<MediaRef>,
    screenshot: Option<MediaRef>,
    #[serde(default)]
    links: Vec<LinkRef>,
    price: Option<serde_json::Value>,
    price_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkRef {
    url: Option<String>,
}

pub async fn unfurl_with_microlink(
    client: &Client,
    config: &ExtractConfig,
    url: &str,
) -> ExtractResult {
    let mut request = client.get(&config.microlink_endpoint).query(&[
        ("url", url),
        ("screenshot", "false"),
        ("palette", "false"),
        ("audio", "false"),
        ("video", "false"),
    ]);
    if let Some(api_key) = config.microlink_api_key.as_deref() {
        request = request.header("x-api-key", api_key);
    }

    let fetch = async {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        response.json::<Envelope>().await.map(|e| e.data)
    };

    let data = match tokio::time::timeout(config.timeout, fetch).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => return ExtractResult::default(),
        Ok(Err(e)) => {
            warn!(%url, error = %e, "microlink unfurl failed");
            return ExtractResult::default();
        }
        Err(_) => {
            warn!(%url, "microlink unfurl timed out");
            return ExtractResult::default();
        }
    };

    into_result(data)
}

fn into_result(data: UnfurlData) -> ExtractResult {
    let mut images = Vec::new();
    for media in [data.image, data.logo, data.screenshot] {
        if let Some(url) = media.and_then(|m| m.url) {
            images.push(url);
        }
    }
    images.extend(data.links.into_iter().filter_map(|l| l.url));
    let images = dedupe_images(images);
    let main_image = images.first().cloned();

    let price = match data.price {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    ExtractResult {
        title: data.title.filter(|t| !t.is_empty()),
        description: data.description.filter(|d| !d.is_empty()),
        price,
        currency: data.price_currency.filter(|c| !c.is_empty()),
        images,
        main_image,
    }
}
