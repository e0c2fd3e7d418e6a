//! HTTP client for the metadata backend.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;

use super::error::ApiError;
use super::types::{AssignCategoryRequest, ErrorBody, MetadataFilterRequest, MetadataFilterResponse};
use crate::config::Settings;
use crate::models::{annotations_from_value, AnnotationEntry, CategoryCatalog, PechaMetadata};

const USER_AGENT: &str = concat!("pecha-admin/", env!("CARGO_PKG_VERSION"));

/// Backend client. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            &settings.api_base_url,
            settings.request_timeout(),
            settings.api_token.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET /categories`
    pub async fn fetch_categories(&self) -> Result<CategoryCatalog, ApiError> {
        let url = self.endpoint(&["categories"])?;
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        let body: Value = decode(response).await?;
        Ok(CategoryCatalog::from_value(body)?)
    }

    /// `PUT /metadata/{pecha_id}/category`
    pub async fn assign_category(
        &self,
        pecha_id: &str,
        request: &AssignCategoryRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["metadata", pecha_id, "category"])?;
        tracing::debug!("PUT {} category_id={}", url, request.category_id);
        self.send(self.client.put(url).json(request)).await?;
        Ok(())
    }

    /// `POST /metadata/filter/`
    pub async fn filter_metadata(
        &self,
        request: &MetadataFilterRequest,
    ) -> Result<Vec<PechaMetadata>, ApiError> {
        let url = self.endpoint(&["metadata", "filter", ""])?;
        tracing::debug!("POST {} page={} limit={}", url, request.page, request.limit);
        let response = self.send(self.client.post(url).json(request)).await?;
        let body: MetadataFilterResponse = decode(response).await?;
        Ok(body.metadata)
    }

    /// `GET /annotation/{pecha_id}`
    pub async fn fetch_annotations(&self, pecha_id: &str) -> Result<Vec<AnnotationEntry>, ApiError> {
        let url = self.endpoint(&["annotation", pecha_id])?;
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(url)).await?;
        let body: Value = decode(response).await?;
        Ok(annotations_from_value(body))
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    text.trim().to_string()
                }
            });

        tracing::warn!("Backend returned {}: {}", status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1), None).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.endpoint(&["categories"]).unwrap().as_str(),
            "http://localhost:8000/categories"
        );
        assert_eq!(
            api.endpoint(&["metadata", "filter", ""]).unwrap().as_str(),
            "http://localhost:8000/metadata/filter/"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes_ids() {
        let api = client("https://example.org/api/v2/");
        assert_eq!(
            api.endpoint(&["metadata", "a b/c", "category"]).unwrap().as_str(),
            "https://example.org/api/v2/metadata/a%20b%2Fc/category"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1), None),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.org", Duration::from_secs(1), None),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
