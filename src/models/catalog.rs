use serde::{ Serialize, Deserialize };

#[derive(Deserialize, Debug, Clone)]
pub struct ModelEntry {
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelListReply {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Serialize, Debug, Clone)]
pub struct DownloadRequest {
    pub model_name: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CloneModelRequest {
    pub original_model: String,
    pub new_model_name: String,
    pub modifications: serde_json::Value,
}

/// Shared acknowledgement shape for the model management endpoints.
#[derive(Deserialize, Debug, Clone)]
pub struct AckReply {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
