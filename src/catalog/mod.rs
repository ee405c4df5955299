use log::{ info, warn };
use std::sync::Arc;

use crate::api::ThorApi;
use crate::error::{ ControlError, ValidationError };
use crate::models::catalog::{ AckReply, CloneModelRequest, DownloadRequest, ModelEntry };

const DEFAULT_SOURCE: &str = "huggingface";

/// One model-selection list. Refreshing keeps the current selection when it
/// still exists among the new options and drops it otherwise.
#[derive(Debug, Default)]
pub struct ModelPicker {
    options: Vec<ModelEntry>,
    selected: Option<String>,
}

impl ModelPicker {
    pub fn options(&self) -> &[ModelEntry] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select by name; only names present among the options are accepted.
    pub fn select(&mut self, name: &str) -> bool {
        if self.options.iter().any(|m| m.name == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn refresh(&mut self, options: Vec<ModelEntry>) {
        self.options = options;
        if let Some(current) = self.selected.as_deref() {
            if !self.options.iter().any(|m| m.name == current) {
                warn!("Previously selected model '{}' is gone after refresh", current);
                self.selected = None;
            }
        }
    }
}

/// Model management: download, clone, and the two selection lists fed by a
/// single list refresh.
pub struct CatalogController {
    api: Arc<dyn ThorApi>,
    in_flight: bool,
    pub preferred: ModelPicker,
    pub clone_source: ModelPicker,
}

impl CatalogController {
    pub fn new(api: Arc<dyn ThorApi>) -> Self {
        Self {
            api,
            in_flight: false,
            preferred: ModelPicker::default(),
            clone_source: ModelPicker::default(),
        }
    }

    /// The disabled-form equivalent: reject a second submission while one
    /// request is outstanding.
    fn guard(&mut self) -> Result<(), ControlError> {
        if self.in_flight {
            return Err(ControlError::Busy);
        }
        self.in_flight = true;
        Ok(())
    }

    fn ack_to_result(reply: AckReply, fallback: &str) -> Result<String, ControlError> {
        if reply.success {
            Ok(reply.message.unwrap_or_else(|| fallback.to_string()))
        } else {
            let detail = reply.error
                .or(reply.message)
                .unwrap_or_else(|| fallback.to_string());
            Err(ControlError::Backend(detail))
        }
    }

    /// Refresh both pickers from one `/api/models/list` call. Returns the
    /// number of models listed.
    pub async fn refresh_models(&mut self) -> Result<usize, ControlError> {
        self.guard()?;
        let result = self.api.list_models().await;
        self.in_flight = false;

        let reply = result?;
        let count = reply.models.len();
        info!("Model list refreshed: {} models", count);
        self.preferred.refresh(reply.models.clone());
        self.clone_source.refresh(reply.models);
        Ok(count)
    }

    pub async fn download(
        &mut self,
        model_name: &str,
        source: &str,
        repo_url: Option<&str>
    ) -> Result<String, ControlError> {
        let model_name = model_name.trim();
        if model_name.is_empty() {
            return Err(ValidationError::Required { field: "model name" }.into());
        }
        let source = match source.trim() {
            "" => DEFAULT_SOURCE,
            s => s,
        };
        let repo_url = repo_url.map(str::trim).filter(|u| !u.is_empty());
        if source == "github" && repo_url.is_none() {
            return Err(ValidationError::Required { field: "repository URL" }.into());
        }

        self.guard()?;
        let request = DownloadRequest {
            model_name: model_name.to_string(),
            source: source.to_string(),
            repo_url: repo_url.map(str::to_string),
        };
        let result = self.api.download_model(&request).await;
        self.in_flight = false;

        Self::ack_to_result(result?, "model download failed")
    }

    /// Clone a model with user-supplied modifications. The modifications
    /// text is parsed locally; invalid JSON never reaches the network.
    pub async fn clone_model(
        &mut self,
        original_model: &str,
        new_model_name: &str,
        modifications_json: &str
    ) -> Result<String, ControlError> {
        let original_model = original_model.trim();
        let new_model_name = new_model_name.trim();
        if original_model.is_empty() {
            return Err(ValidationError::Required { field: "original model" }.into());
        }
        if new_model_name.is_empty() {
            return Err(ValidationError::Required { field: "new model name" }.into());
        }

        let modifications = match modifications_json.trim() {
            "" => serde_json::Value::Object(Default::default()),
            text =>
                serde_json::from_str(text).map_err(|e| ValidationError::InvalidJson {
                    field: "modifications",
                    source: e,
                })?,
        };

        self.guard()?;
        let request = CloneModelRequest {
            original_model: original_model.to_string(),
            new_model_name: new_model_name.to_string(),
            modifications,
        };
        let result = self.api.clone_model(&request).await;
        self.in_flight = false;

        Self::ack_to_result(result?, "model clone failed")
    }
}
