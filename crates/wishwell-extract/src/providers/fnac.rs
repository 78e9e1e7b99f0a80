//! Fnac product pages: server-rendered, but the useful bits live in
//! site-specific markup rather than clean OG tags, and the price often only
//! appears in body text.

use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::Html;
use tracing::warn;
use url::Url;

use crate::parse::{jsonld_any_offer, meta_content, resolve_url, selector};
use crate::types::{dedupe_images, ExtractResult, ProviderResponse};

use super::generic::ACCEPT_HTML;

const GALLERY_SELECTORS: &str = ".ThumbnailSlider__thumbnail img, \
     .f-productVisualsCarousel-list img, \
     .f-visualsCarousel img, \
     [data-product-visual] img";

#[must_use]
pub fn matches(url: &Url) -> bool {
    url.host_str().is_some_and(|host| host.contains("fnac."))
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
            warn!(%url, error = %e, "fnac fetch failed");
            return ProviderResponse::empty("error");
        }
    };

    let status = response.status();
    if !status.is_success() {
        let blocked = status == StatusCode::FORBIDDEN;
        return ProviderResponse {
            blocked,
            ..ProviderResponse::empty(if blocked { "blocked" } else { "error" })
        };
    }

    let html = match response.text().await {
        Ok(html) => html,
        Err(e) => {
            warn!(%url, error = %e, "fnac body read failed");
            return ProviderResponse::empty("error");
        }
    };

    let result = extract_from_html(&html, url);
    if result.has_data() {
        ProviderResponse::new(result, "fnac")
    } else {
        ProviderResponse::empty("empty")
    }
}

fn extract_from_html(html: &str, base: &Url) -> ExtractResult {
    let doc = Html::parse_document(html);

    let h1_title = doc
        .select(&selector("h1"))
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    let title = h1_title.or_else(|| meta_content(&doc, "meta[property='og:title']"));

    let description = meta_content(&doc, "meta[property='og:description']")
        .or_else(|| meta_content(&doc, "meta[name='description']"));

    let mut images: Vec<String> = doc
        .select(&selector(GALLERY_SELECTORS))
        .filter_map(|el| el.value().attr("data-src").or_else(|| el.value().attr("src")))
        .filter_map(|src| resolve_url(src, base))
        .collect();
    // og:image takes the front spot when present.
    if let Some(og_img) = meta_content(&doc, "meta[property='og:image']") {
        if let Some(resolved) = resolve_url(&og_img, base) {
            images.insert(0, resolved);
        }
    }
    let images = dedupe_images(images);
    let main_image = images.first().cloned();

    let price = jsonld_any_offer(&doc).0.or_else(|| body_text_price(&doc));
    let currency = price.map(|_| "EUR".to_string());

    ExtractResult {
        title,
        description,
        price,
        currency,
        images,
        main_image,
    }
}

/// Last resort: "Prix Fnac 1 234,56 €" somewhere in the body text.
fn body_text_price(doc: &Html) -> Option<f64> {
    let re = Regex::new(r"(?i)Prix\s+Fnac\s+([\d\s,]+)€?").expect("valid price regex");
    let body = doc
        .select(&selector("body"))
        .next()
        .map(|el| el.text().collect::<String>())?;
    let raw = re.captures(&body)?.get(1)?.as_str();
    parse_display_price(raw)
}

fn parse_display_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

#[cfg(test)]
#[path = "fnac_test.rs"]
mod tests;
