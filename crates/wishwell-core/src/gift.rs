//! Gift payload validation shared by the create and update routes.

use serde::Deserialize;
use thiserror::Error;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_URL_LEN: usize = 500;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_PRICE: f64 = 1_000_000.0;
pub const MAX_IMAGES: usize = 6;
/// Images may be data URLs; cap the encoded length rather than the pixel size.
pub const MAX_IMAGE_LEN: usize = 4_000_000;

/// Raw request body for gift create/update. Price is accepted as either a
/// JSON number or a string with a comma decimal separator ("49,99").
#[derive(Debug, Clone, Deserialize)]
pub struct GiftPayloadInput {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub price: Option<serde_json::Value>,
    pub currency: Option<String>,
    pub images: Option<Vec<String>>,
    #[serde(rename = "mainImage")]
    pub main_image: Option<String>,
}

/// Validated gift fields, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftPayload {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub images: Vec<String>,
    pub main_image: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("title exceeds {MAX_TITLE_LEN} characters")]
    TitleTooLong,
    #[error("url exceeds {MAX_URL_LEN} characters")]
    UrlTooLong,
    #[error("description exceeds {MAX_DESCRIPTION_LEN} characters")]
    DescriptionTooLong,
    #[error("price is not a valid number")]
    InvalidPrice,
    #[error("price must be between 0 and {MAX_PRICE}")]
    PriceOutOfRange,
    #[error("currency must be a 3-letter code")]
    InvalidCurrency,
    #[error("at most {MAX_IMAGES} images are allowed")]
    TooManyImages,
    #[error("image entries must be non-empty and under {MAX_IMAGE_LEN} characters")]
    InvalidImage,
}

/// Validate and normalize a raw gift payload.
///
/// Empty strings for optional fields collapse to `None`; the title is
/// trimmed and required; the currency is uppercased.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered, field order:
/// title, url, description, price, currency, images.
pub fn validate_gift_payload(input: &GiftPayloadInput) -> Result<GiftPayload, ValidationError> {
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingTitle)?;
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }

    let url = normalize_optional(input.url.as_deref());
    if let Some(u) = &url {
        if u.chars().count() > MAX_URL_LEN {
            return Err(ValidationError::UrlTooLong);
        }
    }

    let description = normalize_optional(input.description.as_deref());
    if let Some(d) = &description {
        if d.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong);
        }
    }

    let price = match &input.price {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => parse_price(value)?,
    };

    let currency = match normalize_optional(input.currency.as_deref()) {
        None => None,
        Some(c) => {
            if c.chars().count() != 3 || !c.chars().all(|ch| ch.is_ascii_alphabetic()) {
                return Err(ValidationError::InvalidCurrency);
            }
            Some(c.to_ascii_uppercase())
        }
    };

    let images = match &input.images {
        None => Vec::new(),
        Some(raw) => {
            if raw.len() > MAX_IMAGES {
                return Err(ValidationError::TooManyImages);
            }
            let mut cleaned = Vec::with_capacity(raw.len());
            for img in raw {
                let trimmed = img.trim();
                if trimmed.is_empty() || trimmed.len() > MAX_IMAGE_LEN {
                    return Err(ValidationError::InvalidImage);
                }
                cleaned.push(trimmed.to_string());
            }
            cleaned
        }
    };

    let main_image = normalize_optional(input.main_image.as_deref())
        .or_else(|| images.first().cloned());

    Ok(GiftPayload {
        title: title.to_string(),
        url,
        description,
        price,
        currency,
        images,
        main_image,
    })
}

fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts a JSON number, or a string like `"49,99"` / `"1 299.00"` with
/// comma decimal separators and embedded whitespace. An empty string means
/// "no price".
fn parse_price(value: &serde_json::Value) -> Result<Option<f64>, ValidationError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or(ValidationError::InvalidPrice)?,
        serde_json::Value::String(s) => {
            let normalized: String = s
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            if normalized.is_empty() {
                return Ok(None);
            }
            normalized
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidPrice)?
        }
        _ => return Err(ValidationError::InvalidPrice),
    };

    if !parsed.is_finite() {
        return Err(ValidationError::InvalidPrice);
    }
    if parsed < 0.0 || parsed > MAX_PRICE {
        return Err(ValidationError::PriceOutOfRange);
    }
    Ok(Some(parsed))
}
