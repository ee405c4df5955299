pub mod http;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

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

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid backend URL '{url}': {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server returned {status} for {url}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The backend surface this client drives. One method per contract point;
/// the reqwest implementation lives in [`http`], and tests substitute
/// scripted impls.
#[async_trait]
pub trait ThorApi: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
    async fn permission(&self, decision: &PermissionDecision) -> Result<PermissionReply, ApiError>;

    async fn list_models(&self) -> Result<ModelListReply, ApiError>;
    async fn download_model(&self, request: &DownloadRequest) -> Result<AckReply, ApiError>;
    async fn clone_model(&self, request: &CloneModelRequest) -> Result<AckReply, ApiError>;

    async fn generate_code(&self, request: &GenerateCodeRequest) -> Result<GenerateCodeReply, ApiError>;
    async fn analyze_code(&self, request: &AnalyzeCodeRequest) -> Result<AnalyzeCodeReply, ApiError>;
    async fn create_dataset(&self, request: &CreateDatasetRequest) -> Result<CreateDatasetReply, ApiError>;
    async fn network_scan(&self, request: &NetworkScanRequest) -> Result<NetworkScanReply, ApiError>;

    async fn list_clones(&self) -> Result<ListClonesReply, ApiError>;
    async fn create_clone(&self, request: &CreateCloneRequest) -> Result<CreateCloneReply, ApiError>;
    async fn update_clone(&self, request: &UpdateCloneRequest) -> Result<CapabilityAck, ApiError>;
    async fn activate_clone(&self, request: &CloneActionRequest) -> Result<CapabilityAck, ApiError>;
    async fn deactivate_clones(&self) -> Result<CapabilityAck, ApiError>;
    async fn suggest_improvements(&self) -> Result<SuggestReply, ApiError>;
}


/// Build the HTTP-backed client. Fails fast on an unparseable base URL so
/// the composition root aborts instead of limping along.
pub fn new_client(
    base_url: &str,
    api_key: Option<String>
) -> Result<Arc<dyn ThorApi>, ApiError> {
    let parsed = Url::parse(base_url).map_err(|e| ApiError::BadUrl {
        url: base_url.to_string(),
        source: e,
    })?;
    Ok(Arc::new(http::HttpApiClient::new(parsed, api_key)))
}
