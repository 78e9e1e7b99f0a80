//! Generic HTML metadata parser: Open Graph, Twitter Card, and JSON-LD
//! Product data combined into one [`ExtractResult`].

use scraper::{Html, Selector};
use url::Url;

use crate::types::{dedupe_images, ExtractResult};

/// Parse listing metadata out of an HTML document.
///
/// Three passes over the same DOM:
/// 1. Open Graph / product meta tags.
/// 2. Twitter Card tags, used only to fill gaps left by pass 1.
/// 3. JSON-LD `Product` blocks (each block parsed independently; a malformed
///    block never aborts the others).
///
/// Scalar precedence is OG, then Twitter, then JSON-LD — first non-empty
/// wins, no mixing within a field. Images are the de-duplicated union in
/// that same order, capped at six. Relative image URLs are resolved against
/// `base`; unresolvable ones are silently dropped.
#[must_use]
pub fn parse_listing_html(html: &str, base: &Url) -> ExtractResult {
    let doc = Html::parse_document(html);

    let og = parse_og(&doc, base);
    let tw = parse_twitter(&doc, base);
    let ld = parse_jsonld(&doc, base);

    let title = og.title.or(tw.title).or(ld.title);
    let description = og.description.or(tw.description).or(ld.description);
    let price = og.price.or(ld.price);
    let currency = best_effort_currency(base, og.currency.or(ld.currency));

    let mut images = og.images;
    images.extend(tw.images);
    images.extend(ld.images);
    let images = dedupe_images(images);
    let main_image = images.first().cloned();

    ExtractResult {
        title,
        description,
        price,
        currency,
        images,
        main_image,
    }
}

fn parse_og(doc: &Html, base: &Url) -> ExtractResult {
    let images = meta_contents(doc, "meta[property='og:image']")
        .into_iter()
        .filter_map(|src| resolve_url(&src, base))
        .collect();

    ExtractResult {
        title: meta_content(doc, "meta[property='og:title']"),
        description: meta_content(doc, "meta[property='og:description']"),
        price: meta_content(doc, "meta[property='product:price:amount']")
            .and_then(|p| p.trim().parse::<f64>().ok()),
        currency: meta_content(doc, "meta[property='product:price:currency']"),
        images,
        main_image: None,
    }
}

fn parse_twitter(doc: &Html, base: &Url) -> ExtractResult {
    let images = meta_contents(doc, "meta[name='twitter:image']")
        .into_iter()
        .filter_map(|src| resolve_url(&src, base))
        .collect();

    ExtractResult {
        title: meta_content(doc, "meta[name='twitter:title']"),
        description: meta_content(doc, "meta[name='twitter:description']"),
        images,
        ..ExtractResult::default()
    }
}

/// Scan every `<script type="application/ld+json">` block for `Product`
/// entries, aggregating the first value seen per field.
fn parse_jsonld(doc: &Html, base: &Url) -> ExtractResult {
    let mut aggregate = ExtractResult::default();

    for script in doc.select(&selector("script[type='application/ld+json']")) {
        let text: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            continue;
        };

        let entries: Vec<&serde_json::Value> = match &value {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for entry in entries {
            if !is_product(entry) {
                continue;
            }

            if aggregate.title.is_none() {
                aggregate.title = string_field(entry, "name");
            }
            if aggregate.description.is_none() {
                aggregate.description = string_field(entry, "description");
            }

            for img in value_as_list(entry.get("image")) {
                if let Some(src) = img.as_str() {
                    if let Some(resolved) = resolve_url(src, base) {
                        aggregate.images.push(resolved);
                    }
                }
            }

            for offer in value_as_list(entry.get("offers")) {
                if aggregate.price.is_none() {
                    aggregate.price = number_field(offer, "price");
                }
                if aggregate.currency.is_none() {
                    aggregate.currency = string_field(offer, "priceCurrency");
                }
            }
        }
    }

    aggregate
}

/// `@type` may be a plain string or an array of strings; the entry counts as
/// a product when any element is exactly `"Product"`.
fn is_product(entry: &serde_json::Value) -> bool {
    match entry.get("@type") {
        Some(serde_json::Value::String(s)) => s == "Product",
        Some(serde_json::Value::Array(items)) => {
            items.iter().any(|t| t.as_str() == Some("Product"))
        }
        _ => false,
    }
}

/// Treat a missing value as an empty list and a scalar as a one-element list.
fn value_as_list(value: Option<&serde_json::Value>) -> Vec<&serde_json::Value> {
    match value {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

fn string_field(entry: &serde_json::Value, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Prices in the wild appear both as JSON numbers and as strings.
fn number_field(entry: &serde_json::Value, key: &str) -> Option<f64> {
    match entry.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Default the currency to EUR for `.fr` hosts when nothing explicit was
/// found; otherwise leave it unset.
fn best_effort_currency(base: &Url, currency: Option<String>) -> Option<String> {
    if currency.is_some() {
        return currency;
    }
    base.host_str()
        .filter(|host| host.ends_with(".fr"))
        .map(|_| "EUR".to_string())
}

/// First `price` / `priceCurrency` found in any JSON-LD offer, regardless of
/// the entry's `@type`. Some retailers attach offers to non-Product entries.
pub(crate) fn jsonld_any_offer(doc: &Html) -> (Option<f64>, Option<String>) {
    let mut price = None;
    let mut currency = None;

    for script in doc.select(&selector("script[type='application/ld+json']")) {
        let text: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
            continue;
        };
        let entries: Vec<&serde_json::Value> = match &value {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for entry in entries {
            for offer in value_as_list(entry.get("offers")) {
                if price.is_none() {
                    price = number_field(offer, "price");
                }
                if currency.is_none() {
                    currency = string_field(offer, "priceCurrency");
                }
                if price.is_some() && currency.is_some() {
                    return (price, currency);
                }
            }
        }
    }

    (price, currency)
}

/// Resolve a possibly-relative URL against the page URL. Failures drop the
/// candidate instead of failing the parse.
pub(crate) fn resolve_url(src: &str, base: &Url) -> Option<String> {
    let trimmed = src.trim();
    if trimmed.is_empty() {
        return None;
    }
    base.join(trimmed).ok().map(|u| u.to_string())
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

pub(crate) fn meta_content(doc: &Html, css: &str) -> Option<String> {
    doc.select(&selector(css))
        .find_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn meta_contents(doc: &Html, css: &str) -> Vec<String> {
    doc.select(&selector(css))
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
