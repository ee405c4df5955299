use log::info;
use std::sync::Arc;

use crate::api::ThorApi;
use crate::error::{ ControlError, ValidationError };
use crate::models::capabilities::{
    AnalysisReport,
    AnalyzeCodeRequest,
    CloneActionRequest,
    CloneRow,
    CloneUpdates,
    CreateCloneRequest,
    CreateDatasetRequest,
    DatasetPreview,
    GenerateCodeRequest,
    GeneratedCode,
    NetworkScanRequest,
    ScriptBundle,
    Suggestions,
    UpdateCloneRequest,
};

/// The advanced-capabilities surface: independent request/render pairs
/// sharing one in-flight guard, one validation rule (required input must be
/// non-blank) and one failure rule (an `error` status is surfaced with the
/// server message when present).
pub struct CapabilitiesController {
    api: Arc<dyn ThorApi>,
    in_flight: bool,
}

fn ensure_ok(status: &Option<String>, message: &Option<String>) -> Result<(), ControlError> {
    if status.as_deref() == Some("error") {
        let detail = message.clone().unwrap_or_else(|| "operation failed".to_string());
        return Err(ControlError::Backend(detail));
    }
    Ok(())
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed)
}

impl CapabilitiesController {
    pub fn new(api: Arc<dyn ThorApi>) -> Self {
        Self { api, in_flight: false }
    }

    fn guard(&mut self) -> Result<(), ControlError> {
        if self.in_flight {
            return Err(ControlError::Busy);
        }
        self.in_flight = true;
        Ok(())
    }

    pub async fn generate_code(
        &mut self,
        description: &str,
        language: &str
    ) -> Result<GeneratedCode, ControlError> {
        let description = required(description, "code description")?;
        let language = required(language, "language")?;

        self.guard()?;
        let request = GenerateCodeRequest {
            description: description.to_string(),
            language: language.to_string(),
        };
        let result = self.api.generate_code(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        let code = reply.code.ok_or_else(|| {
            ControlError::Backend("no code in response".to_string())
        })?;
        Ok(GeneratedCode { language: language.to_string(), code })
    }

    pub async fn analyze_code(&mut self, code: &str) -> Result<AnalysisReport, ControlError> {
        let code = required(code, "code")?;

        self.guard()?;
        let request = AnalyzeCodeRequest { code: code.to_string() };
        let result = self.api.analyze_code(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        reply.analysis.ok_or_else(|| {
            ControlError::Backend("no analysis in response".to_string())
        })
    }

    pub async fn create_dataset(
        &mut self,
        description: &str,
        format: &str,
        size: u32
    ) -> Result<DatasetPreview, ControlError> {
        let description = required(description, "dataset description")?;
        let format = required(format, "format")?;

        self.guard()?;
        let request = CreateDatasetRequest {
            description: description.to_string(),
            format: format.to_string(),
            size,
        };
        let result = self.api.create_dataset(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        let dataset = reply.dataset.ok_or_else(|| {
            ControlError::Backend("no dataset in response".to_string())
        })?;
        let body = match dataset {
            serde_json::Value::String(raw) => raw,
            other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
        };
        Ok(DatasetPreview { format: format.to_string(), body })
    }

    pub async fn network_script(
        &mut self,
        target_description: &str
    ) -> Result<ScriptBundle, ControlError> {
        let target_description = required(target_description, "target description")?;

        self.guard()?;
        let request = NetworkScanRequest {
            target_description: target_description.to_string(),
        };
        let result = self.api.network_scan(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        let script = reply.result.ok_or_else(|| {
            ControlError::Backend("no script in response".to_string())
        })?;
        match script.script {
            Some(body) => Ok(ScriptBundle { script: body, explanation: script.explanation }),
            None => Err(ControlError::Backend("no script in response".to_string())),
        }
    }

    pub async fn list_clones(&mut self) -> Result<Vec<CloneRow>, ControlError> {
        self.guard()?;
        let result = self.api.list_clones().await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        Ok(reply.clones.into_iter().map(CloneRow::from).collect())
    }

    pub async fn create_clone(&mut self, description: &str) -> Result<String, ControlError> {
        let description = required(description, "clone description")?;

        self.guard()?;
        let request = CreateCloneRequest { description: description.to_string() };
        let result = self.api.create_clone(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        let name = reply.clone
            .map(|c| c.name)
            .ok_or_else(|| ControlError::Backend("no clone in response".to_string()))?;
        info!("Created clone {}", name);
        Ok(name)
    }

    /// Update a clone's description and/or capability map. The capabilities
    /// text is user-supplied JSON validated locally; it must be an object,
    /// since the backend merges it into the existing map.
    pub async fn update_clone(
        &mut self,
        clone_name: &str,
        description: Option<&str>,
        capabilities_json: Option<&str>
    ) -> Result<String, ControlError> {
        let clone_name = required(clone_name, "clone name")?;

        let description = description.map(str::trim).filter(|d| !d.is_empty());
        let capabilities = match capabilities_json.map(str::trim).filter(|c| !c.is_empty()) {
            Some(text) => {
                let value: serde_json::Value = serde_json
                    ::from_str(text)
                    .map_err(|e| ValidationError::InvalidJson {
                        field: "capabilities",
                        source: e,
                    })?;
                if !value.is_object() {
                    return Err(ValidationError::NotAnObject { field: "capabilities" }.into());
                }
                Some(value)
            }
            None => None,
        };
        if description.is_none() && capabilities.is_none() {
            return Err(ValidationError::Required { field: "updates" }.into());
        }

        self.guard()?;
        let request = UpdateCloneRequest {
            clone_name: clone_name.to_string(),
            updates: CloneUpdates {
                description: description.map(str::to_string),
                capabilities,
            },
        };
        let result = self.api.update_clone(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        Ok(reply.message.unwrap_or_else(|| format!("Clone {} updated", clone_name)))
    }

    pub async fn activate_clone(&mut self, clone_name: &str) -> Result<String, ControlError> {
        let clone_name = required(clone_name, "clone name")?;

        self.guard()?;
        let request = CloneActionRequest { clone_name: clone_name.to_string() };
        let result = self.api.activate_clone(&request).await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        info!("Activated clone {}", clone_name);
        Ok(reply.message.unwrap_or_else(|| format!("Clone {} activated", clone_name)))
    }

    pub async fn deactivate_clones(&mut self) -> Result<String, ControlError> {
        self.guard()?;
        let result = self.api.deactivate_clones().await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        Ok(reply.message.unwrap_or_else(|| "All clones deactivated".to_string()))
    }

    pub async fn suggest_improvements(&mut self) -> Result<Suggestions, ControlError> {
        self.guard()?;
        let result = self.api.suggest_improvements().await;
        self.in_flight = false;

        let reply = result?;
        ensure_ok(&reply.status, &reply.message)?;
        reply.suggestions.ok_or_else(|| {
            ControlError::Backend("no suggestions in response".to_string())
        })
    }
}
