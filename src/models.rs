use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ============ Submission ============

/// Partner field that receives the `bankMonths` alias.
pub const SUB_ID3: &str = "subID3";
/// Convenience alias accepted from the form, never sent upstream.
pub const BANK_MONTHS: &str = "bankMonths";

/// A lead that passed schema validation.
///
/// Holds only schema fields, with the values exactly as submitted. Serializes as
/// the flat JSON object the partner API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LeadSubmission(Map<String, Value>);

impl LeadSubmission {
    /// Wraps fields already checked by [`crate::validation::validate_submission`].
    pub(crate) fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn campaign_id(&self) -> Option<i64> {
        self.0.get("campaignID").and_then(Value::as_i64)
    }

    /// Folds the `bankMonths` alias into `subID3`.
    ///
    /// An existing `subID3` wins. `bankMonths` is removed either way.
    pub fn normalize(mut self) -> Self {
        if let Some(bank_months) = self.0.remove(BANK_MONTHS) {
            if !self.0.contains_key(SUB_ID3) {
                self.0.insert(SUB_ID3.to_string(), bank_months);
            }
        }
        self
    }
}

/// One schema violation, attributed to a single field.
///
/// An empty `field` refers to the body as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============ Upstream ============

/// Raw answer from the partner API.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    pub status: u16,
    /// Parsed JSON body, or `{"raw": <text>}` when the body was not JSON.
    pub body: Value,
}

impl UpstreamResult {
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }));
        Self { status, body }
    }

    /// The case-sensitive `status` field of the body, if it is a string.
    pub fn body_status(&self) -> Option<&str> {
        self.body.get("status").and_then(Value::as_str)
    }
}
