//! Best-effort structured extraction from free-form model output.
//!
//! Models are asked for a JSON object but often wrap it in prose or code
//! fences. Extraction takes the span from the first `{` to the last `}` and
//! deserializes that into a typed payload. Callers decide what to fall back
//! to when extraction fails; nothing here panics or retries.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a model response could not be turned into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJson,

    #[error("malformed JSON object: {0}")]
    Malformed(String),
}

impl From<ExtractError> for productdesk_core::Error {
    fn from(e: ExtractError) -> Self {
        productdesk_core::Error::Parse(e.to_string())
    }
}

/// The first-`{`-to-last-`}` span of `text`, if there is one.
pub fn json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Locate the JSON span in `text` and deserialize it as `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let span = json_span(text).ok_or(ExtractError::NoJson)?;
    serde_json::from_str(span).map_err(|e| ExtractError::Malformed(e.to_string()))
}

/// `{"selected_domains": [...]}` as returned by the selection prompts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainSelection {
    #[serde(default)]
    pub selected_domains: Option<Vec<String>>,
}

/// `{"is_sufficient": bool, "missing_information": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SufficiencyPayload {
    #[serde(default)]
    pub is_sufficient: Option<bool>,
    #[serde(default)]
    pub missing_information: Option<String>,
}
