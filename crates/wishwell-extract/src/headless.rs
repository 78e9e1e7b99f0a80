//! Headless Chromium fallback for pages that only render their metadata
//! client-side. Launches a fresh browser per call; every failure mode
//! degrades to an empty result so the orchestrator can keep going.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use scraper::Html;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::extractor::ExtractConfig;
use crate::parse::{jsonld_any_offer, meta_content, resolve_url, selector};
use crate::types::{dedupe_images, ExtractResult};

const GOTO_TIMEOUT: Duration = Duration::from_secs(15);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(4);
const RENDER_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Error)]
enum HeadlessError {
    #[error("browser config: {0}")]
    Config(String),
    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),
    #[error("page render timed out")]
    TimedOut,
}

/// Render the page in headless Chromium and parse the resulting DOM. Returns
/// an empty result when the browser cannot be launched, the page cannot be
/// loaded, or nothing useful was rendered.
pub async fn extract_with_headless(config: &ExtractConfig, url: &Url) -> ExtractResult {
    match render(config, url).await {
        Ok(html) => parse_rendered_html(&html, url),
        Err(e) => {
            warn!(%url, error = %e, "headless render failed");
            ExtractResult::default()
        }
    }
}

async fn render(config: &ExtractConfig, url: &Url) -> Result<String, HeadlessError> {
    let browser_config = BrowserConfig::builder()
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg(format!("--user-agent={}", config.user_agent))
        .build()
        .map_err(HeadlessError::Config)?;

    let (mut browser, mut handler) = Browser::launch(browser_config).await?;
    let events = tokio::spawn(async move { while handler.next().await.is_some() {} });

    let html = page_content(&browser, url).await;

    // Close unconditionally; a leaked Chromium outlives the request.
    if let Err(e) = browser.close().await {
        debug!(error = %e, "browser close failed");
    }
    if let Err(e) = browser.wait().await {
        debug!(error = %e, "browser wait failed");
    }
    events.abort();

    html
}

async fn page_content(browser: &Browser, url: &Url) -> Result<String, HeadlessError> {
    let page = timeout(GOTO_TIMEOUT, browser.new_page(url.as_str()))
        .await
        .map_err(|_| HeadlessError::TimedOut)??;

    // Navigation settling is best effort; client-side apps may never go idle.
    let _ = timeout(SETTLE_TIMEOUT, page.wait_for_navigation()).await;
    tokio::time::sleep(RENDER_DELAY).await;

    let html = timeout(GOTO_TIMEOUT, page.content())
        .await
        .map_err(|_| HeadlessError::TimedOut)??;
    Ok(html)
}

/// The rendered-DOM parse is looser than the generic one: the page title and
/// every `<img>` on the page count as candidates, and any JSON-LD offer may
/// supply the price.
fn parse_rendered_html(html: &str, base: &Url) -> ExtractResult {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, "meta[property='og:title']")
        .or_else(|| first_text(&doc, "h1"))
        .or_else(|| first_text(&doc, "title"));
    let description = meta_content(&doc, "meta[property='og:description']")
        .or_else(|| meta_content(&doc, "meta[name='description']"));

    let mut images = Vec::new();
    if let Some(og_img) = meta_content(&doc, "meta[property='og:image']") {
        if let Some(resolved) = resolve_url(&og_img, base) {
            images.push(resolved);
        }
    }
    images.extend(
        doc.select(&selector("img"))
            .filter_map(|el| el.value().attr("src"))
            .filter_map(|src| resolve_url(src, base)),
    );
    let images = dedupe_images(images);
    let main_image = images.first().cloned();

    let (price, currency) = jsonld_any_offer(&doc);

    ExtractResult {
        title,
        description,
        price,
        currency,
        images,
        main_image,
    }
}

fn first_text(doc: &Html, css: &str) -> Option<String> {
    doc.select(&selector(css))
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://spa.example.com/product/1").expect("valid url")
    }

    #[test]
    fn title_falls_back_to_h1_then_document_title() {
        let html = "<html><head><title>Doc Title</title></head><body><h1>Heading</h1></body></html>";
        let result = parse_rendered_html(html, &base());
        assert_eq!(result.title.as_deref(), Some("Heading"));

        let html = "<html><head><title>Doc Title</title></head><body></body></html>";
        let result = parse_rendered_html(html, &base());
        assert_eq!(result.title.as_deref(), Some("Doc Title"));
    }

    #[test]
    fn collects_every_page_image_after_og() {
        let html = r#"
            <html><head><meta property="og:image" content="/og.jpg" /></head>
            <body><img src="/one.jpg" /><img src="/og.jpg" /><img src="relative.png" /></body></html>
        "#;
        let result = parse_rendered_html(html, &base());
        assert_eq!(
            result.images,
            vec![
                "https://spa.example.com/og.jpg".to_string(),
                "https://spa.example.com/one.jpg".to_string(),
                "https://spa.example.com/product/relative.png".to_string(),
            ]
        );
    }

    #[test]
    fn any_jsonld_offer_supplies_price() {
        let html = r#"
            <html><body>
            <script type="application/ld+json">
            { "@type": "WebPage", "offers": { "price": "89.00", "priceCurrency": "EUR" } }
            </script>
            </body></html>
        "#;
        let result = parse_rendered_html(html, &base());
        assert_eq!(result.price, Some(89.0));
        assert_eq!(result.currency.as_deref(), Some("EUR"));
    }
}
