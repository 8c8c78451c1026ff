//! Slot resolution.
//!
//! A slot arrives with an optional raw value and an optional entity-resolution
//! block. The resolution block is kept as raw JSON: the platform's shape is
//! nested several levels deep and a malformed block must degrade to "no
//! resolution" instead of failing the whole request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A named piece of recognized input for the current turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Entity resolution candidates, `{"resolutionsPerAuthority": [...]}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Value>,
}

impl Slot {
    pub fn with_value(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
            resolutions: None,
        }
    }
}

/// Canonical value of a slot.
///
/// The first authority's first canonical name wins whenever one exists, no
/// matter what the raw value says. Otherwise the raw value is used. Empty
/// strings count as absent.
pub fn resolve(slot: Option<&Slot>) -> Option<String> {
    let slot = slot?;
    first_resolution(slot.resolutions.as_ref()).or_else(|| non_empty(slot.value.as_deref()))
}

fn first_resolution(resolutions: Option<&Value>) -> Option<String> {
    let name = resolutions?
        .get("resolutionsPerAuthority")?
        .as_array()?
        .first()?
        .get("values")?
        .as_array()?
        .first()?
        .get("value")?
        .get("name")?
        .as_str();
    non_empty(name)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
