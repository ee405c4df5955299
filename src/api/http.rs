use reqwest::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use async_trait::async_trait;
use log::debug;
use url::Url;

use super::{ ApiError, ThorApi };
use crate::models::capabilities::{
    AnalyzeCodeReply,
    AnalyzeCodeRequest,
    CapabilityAck,
    CloneActionRequest,
    CreateCloneReply,
    CreateCloneRequest,
    CreateDatasetReply,
    CreateDatasetRequest,
    GenerateCodeReply,
    GenerateCodeRequest,
    ListClonesReply,
    NetworkScanReply,
    NetworkScanRequest,
    SuggestReply,
    UpdateCloneRequest,
};
use crate::models::catalog::{ AckReply, CloneModelRequest, DownloadRequest, ModelListReply };
use crate::models::chat::{ ChatReply, ChatRequest, PermissionDecision, PermissionReply };

/// Error body the backend attaches to non-2xx responses.
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug)]
pub struct HttpApiClient {
    http: HttpClient,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpApiClient {
    pub fn new(base_url: Url, api_key: Option<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), route)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str
    ) -> Result<T, ApiError> {
        let request = match &self.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        };

        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            source: e,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            source: e,
        })?;

        if !status.is_success() {
            let detail = serde_json
                ::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.or(b.message))
                .unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                });
            debug!("{} -> {}: {}", url, status, detail);
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        body: &B
    ) -> Result<T, ApiError> {
        let url = self.endpoint(route);
        self.execute(self.http.post(&url).json(body), &url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T, ApiError> {
        let url = self.endpoint(route);
        self.execute(self.http.get(&url), &url).await
    }
}

#[async_trait]
impl ThorApi for HttpApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.post_json("/api/chat", request).await
    }

    async fn permission(
        &self,
        decision: &PermissionDecision
    ) -> Result<PermissionReply, ApiError> {
        self.post_json("/api/permission", decision).await
    }

    async fn list_models(&self) -> Result<ModelListReply, ApiError> {
        self.get_json("/api/models/list").await
    }

    async fn download_model(&self, request: &DownloadRequest) -> Result<AckReply, ApiError> {
        self.post_json("/api/models/download", request).await
    }

    async fn clone_model(&self, request: &CloneModelRequest) -> Result<AckReply, ApiError> {
        self.post_json("/api/models/clone", request).await
    }

    async fn generate_code(
        &self,
        request: &GenerateCodeRequest
    ) -> Result<GenerateCodeReply, ApiError> {
        self.post_json("/api/thor/generate-code", request).await
    }

    async fn analyze_code(
        &self,
        request: &AnalyzeCodeRequest
    ) -> Result<AnalyzeCodeReply, ApiError> {
        self.post_json("/api/thor/analyze-code", request).await
    }

    async fn create_dataset(
        &self,
        request: &CreateDatasetRequest
    ) -> Result<CreateDatasetReply, ApiError> {
        self.post_json("/api/thor/create-dataset", request).await
    }

    async fn network_scan(
        &self,
        request: &NetworkScanRequest
    ) -> Result<NetworkScanReply, ApiError> {
        self.post_json("/api/thor/network-scan", request).await
    }

    async fn list_clones(&self) -> Result<ListClonesReply, ApiError> {
        self.post_json("/api/thor/list-clones", &json!({})).await
    }

    async fn create_clone(
        &self,
        request: &CreateCloneRequest
    ) -> Result<CreateCloneReply, ApiError> {
        self.post_json("/api/thor/create-clone", request).await
    }

    async fn update_clone(&self, request: &UpdateCloneRequest) -> Result<CapabilityAck, ApiError> {
        self.post_json("/api/thor/update-clone", request).await
    }

    async fn activate_clone(
        &self,
        request: &CloneActionRequest
    ) -> Result<CapabilityAck, ApiError> {
        self.post_json("/api/thor/activate-clone", request).await
    }

    async fn deactivate_clones(&self) -> Result<CapabilityAck, ApiError> {
        self.post_json("/api/thor/deactivate-clones", &json!({})).await
    }

    async fn suggest_improvements(&self) -> Result<SuggestReply, ApiError> {
        self.post_json("/api/thor/suggest-improvements", &json!({})).await
    }
}
