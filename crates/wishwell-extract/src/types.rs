//! Value objects flowing through the extraction pipeline. All of these are
//! request-scoped: built fresh per extraction call, never persisted.

use serde::{Deserialize, Serialize};

/// Hard cap on the image list everywhere in the pipeline.
pub const MAX_IMAGES: usize = 6;

/// Partial listing metadata. Every field is independently optional; absence
/// means "unknown", not "empty".
///
/// Invariant: when `images` is non-empty, `main_image` equals its first
/// element unless a provider explicitly set something else first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
}

impl ExtractResult {
    /// True when any field carries data.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.price.is_some()
            || self.currency.is_some()
            || !self.images.is_empty()
            || self.main_image.is_some()
    }
}

/// What a single provider reported for one URL.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub result: ExtractResult,
    /// Provenance tag, or `"empty"` / `"error"` / a blocked marker.
    pub source: String,
    /// The target actively denied access (401/403/429), as opposed to an
    /// unrelated failure.
    pub blocked: bool,
    /// The provider believes JavaScript rendering is needed for real data.
    pub needs_headless: bool,
}

impl ProviderResponse {
    pub fn new(result: ExtractResult, source: impl Into<String>) -> Self {
        Self {
            result,
            source: source.into(),
            blocked: false,
            needs_headless: false,
        }
    }

    /// An empty response carrying only a degraded-outcome tag.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(ExtractResult::default(), source)
    }
}

/// Final orchestrator output, returned to the preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub result: ExtractResult,
    /// A single provider tag, `"mixed"` when several contributed, or
    /// `"empty"`.
    pub source: String,
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// First-writer-wins merge: fields already set on `base` are kept, gaps are
/// filled from `incoming`. The image list is taken wholesale from whichever
/// side has one first; `main_image` falls back to the head of that list.
#[must_use]
pub fn merge_result(base: ExtractResult, incoming: ExtractResult) -> ExtractResult {
    let images = if base.images.is_empty() {
        incoming.images.clone()
    } else {
        base.images
    };

    let main_image = base
        .main_image
        .or(incoming.main_image)
        .or_else(|| images.first().cloned())
        .or_else(|| incoming.images.first().cloned());

    ExtractResult {
        title: base.title.or(incoming.title),
        description: base.description.or(incoming.description),
        price: base.price.or(incoming.price),
        currency: base.currency.or(incoming.currency),
        images,
        main_image,
    }
}

/// De-duplicate by exact string equality (first occurrence wins) and cap at
/// [`MAX_IMAGES`].
#[must_use]
pub fn dedupe_images(images: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    images
        .into_iter()
        .filter(|img| !img.is_empty() && seen.insert(img.clone()))
        .take(MAX_IMAGES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_title(title: &str) -> ExtractResult {
        ExtractResult {
            title: Some(title.to_string()),
            ..ExtractResult::default()
        }
    }

    #[test]
    fn merge_keeps_base_scalar_fields() {
        let base = ExtractResult {
            title: Some("base".to_string()),
            price: Some(10.0),
            ..ExtractResult::default()
        };
        let incoming = ExtractResult {
            title: Some("incoming".to_string()),
            price: Some(99.0),
            description: Some("filled".to_string()),
            ..ExtractResult::default()
        };

        let merged = merge_result(base, incoming);
        assert_eq!(merged.title.as_deref(), Some("base"));
        assert_eq!(merged.price, Some(10.0));
        assert_eq!(merged.description.as_deref(), Some("filled"));
    }

    #[test]
    fn merge_is_idempotent_on_populated_fields() {
        let base = result_with_title("keep");
        let incoming = result_with_title("discard");
        let once = merge_result(base.clone(), incoming.clone());
        let twice = merge_result(once.clone(), incoming);
        assert_eq!(once.title, twice.title);
        assert_eq!(once.title.as_deref(), Some("keep"));
    }

    #[test]
    fn merge_takes_incoming_images_only_when_base_has_none() {
        let base = ExtractResult {
            images: vec!["a".to_string()],
            ..ExtractResult::default()
        };
        let incoming = ExtractResult {
            images: vec!["b".to_string(), "c".to_string()],
            ..ExtractResult::default()
        };
        let merged = merge_result(base, incoming.clone());
        assert_eq!(merged.images, vec!["a".to_string()]);

        let merged = merge_result(ExtractResult::default(), incoming);
        assert_eq!(merged.images, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn merge_main_image_falls_back_to_first_image() {
        let incoming = ExtractResult {
            images: vec!["x".to_string(), "y".to_string()],
            ..ExtractResult::default()
        };
        let merged = merge_result(ExtractResult::default(), incoming);
        assert_eq!(merged.main_image.as_deref(), Some("x"));
    }

    #[test]
    fn merge_prefers_base_main_image() {
        let base = ExtractResult {
            main_image: Some("chosen".to_string()),
            ..ExtractResult::default()
        };
        let incoming = ExtractResult {
            images: vec!["other".to_string()],
            ..ExtractResult::default()
        };
        let merged = merge_result(base, incoming);
        assert_eq!(merged.main_image.as_deref(), Some("chosen"));
    }

    #[test]
    fn dedupe_preserves_first_occurrence_order() {
        let input = vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
            "c".to_string(),
        ];
        assert_eq!(
            dedupe_images(input),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn dedupe_caps_at_six_entries() {
        let input: Vec<String> = (0..10).map(|i| format!("img-{i}")).collect();
        let out = dedupe_images(input);
        assert_eq!(out.len(), MAX_IMAGES);
        assert_eq!(out[0], "img-0");
        assert_eq!(out[5], "img-5");
    }

    #[test]
    fn has_data_is_false_for_default() {
        assert!(!ExtractResult::default().has_data());
        assert!(result_with_title("x").has_data());
    }

    #[test]
    fn empty_result_serializes_to_empty_object() {
        let json = serde_json::to_string(&ExtractResult::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn main_image_uses_camel_case_key() {
        let result = ExtractResult {
            main_image: Some("x".to_string()),
            ..ExtractResult::default()
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"mainImage\":\"x\""));
    }
}
