use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// A single listing returned by the product search endpoint
///
/// Only `in_stock`, `keh_coverage` and `keh_mount` take part in matching and
/// `url` is what gets forwarded to the notifier. Everything else is carried
/// along for the match report. Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sku: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "inStock")]
    #[serde(deserialize_with = "null_as_default")]
    pub in_stock: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_coverage: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_mount: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_manufacturer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_max_aperture: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_min_focal_length: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_max_focal_length: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_product_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_lens_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_system: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_filter_size: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keh_zoom_prime: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(rename = "salePrice")]
    #[serde(deserialize_with = "null_as_default")]
    pub sale_price: String,
    #[serde(rename = "oldPrice")]
    #[serde(deserialize_with = "null_as_default")]
    pub old_price: String,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(rename = "imageUrl")]
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub swatches: Swatches,
}

/// Variant swatches attached to a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Swatches {
    #[serde(deserialize_with = "null_as_default")]
    pub swatch: Vec<String>,
    #[serde(rename = "lowestPrice")]
    #[serde(deserialize_with = "null_as_default")]
    pub lowest_price: String,
    #[serde(rename = "numberOfAdditionalVariants")]
    #[serde(deserialize_with = "null_as_default")]
    pub number_of_additional_variants: String,
}

/// Decoded search response, in the order the endpoint returned it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(alias = "Result")]
    pub result: Vec<CandidateRecord>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Exact-match filter a listing has to satisfy to count as the wanted item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MatchCriteria {
    #[validate(length(min = 1))]
    #[serde(default = "default_availability")]
    pub availability: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_coverage")]
    pub coverage: String,
    #[validate(length(min = 1))]
    #[serde(default = "default_mount")]
    pub mount: String,
}

impl MatchCriteria {
    pub fn new(
        availability: impl Into<String>,
        coverage: impl Into<String>,
        mount: impl Into<String>,
    ) -> Self {
        Self {
            availability: availability.into(),
            coverage: coverage.into(),
            mount: mount.into(),
        }
    }
}

impl Default for MatchCriteria {
    fn default() -> Self {
        Self {
            availability: default_availability(),
            coverage: default_coverage(),
            mount: default_mount(),
        }
    }
}

fn default_availability() -> String { "yes".to_string() }
fn default_coverage() -> String { "aps-c & dx".to_string() }
fn default_mount() -> String { "sony e mount".to_string() }
