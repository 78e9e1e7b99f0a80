//! Galeries Lafayette product pages. The gallery is rendered client-side, so
//! an empty server response flags the headless fallback instead of failing.

use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::warn;
use url::Url;

use crate::parse::{meta_content, resolve_url, selector};
use crate::types::{dedupe_images, ExtractResult, ProviderResponse};

use super::generic::ACCEPT_HTML;

const GALLERY_SELECTORS: &str = ".slick-slide img, .product-gallery img";

#[must_use]
pub fn matches(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host.contains("galerieslafayette"))
}

pub async fn extract(client: &Client, url: &Url) -> ProviderResponse {
    let response = match client
        .get(url.clone())
        .header(reqwest::header::ACCEPT, ACCEPT_HTML)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "galeries fetch failed");
            return ProviderResponse {
                needs_headless: true,
                ..ProviderResponse::empty("error")
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        let blocked = status == StatusCode::FORBIDDEN;
        return ProviderResponse {
            blocked,
            needs_headless: true,
            ..ProviderResponse::empty(if blocked { "blocked" } else { "error" })
        };
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            warn!(%url, error = %e, "galeries body read failed");
            return ProviderResponse {
                needs_headless: true,
                ..ProviderResponse::empty("error")
            };
        }
    };

    let result = extract_from_html(&html, url);
    if result.has_data() {
        ProviderResponse::new(result, "galerieslafayette")
    } else {
        ProviderResponse {
            needs_headless: true,
            ..ProviderResponse::empty("empty")
        }
    }
}

fn extract_from_html(html: &str, base: &Url) -> ExtractResult {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, "meta[property='og:title']").or_else(|| {
        doc.select(&selector("h1"))
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let description = meta_content(&doc, "meta[property='og:description']")
        .or_else(|| meta_content(&doc, "meta[name='description']"));

    let mut images = Vec::new();
    if let Some(og_img) = meta_content(&doc, "meta[property='og:image']") {
        if let Some(resolved) = resolve_url(&og_img, base) {
            images.push(resolved);
        }
    }
    images.extend(
        doc.select(&selector(GALLERY_SELECTORS))
            .filter_map(|el| el.value().attr("data-src").or_else(|| el.value().attr("src")))
            .filter_map(|src| resolve_url(src, base)),
    );
    let images = dedupe_images(images);
    let main_image = images.first().cloned();

    ExtractResult {
        title,
        description,
        images,
        main_image,
        ..ExtractResult::default()
    }
}
