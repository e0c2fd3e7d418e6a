//! Request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::PechaMetadata;

/// Body of `PUT /metadata/{pecha_id}/category`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignCategoryRequest {
    pub category_id: String,
    pub site: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relate_pecha: Option<bool>,
}

/// Body of `POST /metadata/filter/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    pub page: u32,
    pub limit: u32,
}

impl MetadataFilterRequest {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            filter: None,
            page,
            limit,
        }
    }
}

/// Response of `POST /metadata/filter/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataFilterResponse {
    #[serde(default)]
    pub metadata: Vec<PechaMetadata>,
}

/// Error body the backend sends with non-2xx statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message in the body
    pub fn message(&self) -> Option<String> {
        if let Some(detail) = &self.detail {
            return Some(match detail {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
        self.message.clone().or_else(|| self.error.clone())
    }
}
