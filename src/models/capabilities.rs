use serde::{ Serialize, Deserialize };
use serde_json::Value as JsonValue;

// --- Code generation ---

#[derive(Serialize, Debug, Clone)]
pub struct GenerateCodeRequest {
    pub description: String,
    pub language: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GenerateCodeReply {
    pub status: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

// --- Code analysis ---

#[derive(Serialize, Debug, Clone)]
pub struct AnalyzeCodeRequest {
    pub code: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnalyzeCodeReply {
    pub status: Option<String>,
    pub analysis: Option<AnalysisReport>,
    pub message: Option<String>,
}

/// The backend returns either a structured report or free text.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum AnalysisReport {
    Structured(CodeAnalysis),
    Text(String),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CodeAnalysis {
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

// --- Dataset generation ---

#[derive(Serialize, Debug, Clone)]
pub struct CreateDatasetRequest {
    pub description: String,
    pub format: String,
    pub size: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateDatasetReply {
    pub status: Option<String>,
    pub dataset: Option<JsonValue>,
    pub message: Option<String>,
}

// --- Network script generation ---

#[derive(Serialize, Debug, Clone)]
pub struct NetworkScanRequest {
    pub target_description: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NetworkScanReply {
    pub status: Option<String>,
    pub result: Option<NetworkScript>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NetworkScript {
    pub script: Option<String>,
    pub explanation: Option<String>,
}

// --- Clone management ---

#[derive(Deserialize, Debug, Clone)]
pub struct CloneInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub capabilities: serde_json::Map<String, JsonValue>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ListClonesReply {
    pub status: Option<String>,
    #[serde(default)]
    pub clones: Vec<CloneInfo>,
    pub message: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CreateCloneRequest {
    pub description: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateCloneReply {
    pub status: Option<String>,
    pub clone: Option<CloneSummary>,
    pub message: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CloneSummary {
    pub name: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct UpdateCloneRequest {
    pub clone_name: String,
    pub updates: CloneUpdates,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct CloneUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<JsonValue>,
}

#[derive(Serialize, Debug, Clone)]
pub struct CloneActionRequest {
    pub clone_name: String,
}

/// Acknowledgement shape shared by the remaining capability endpoints.
#[derive(Deserialize, Debug, Clone)]
pub struct CapabilityAck {
    pub status: Option<String>,
    pub message: Option<String>,
}

// --- Self-improvement suggestions ---

#[derive(Deserialize, Debug, Clone)]
pub struct SuggestReply {
    pub status: Option<String>,
    pub suggestions: Option<Suggestions>,
    pub message: Option<String>,
}

/// The suggestions payload is unreconciled in the backend contract: it may
/// arrive as a plain string, a `{text}` wrapper, or a list of structured
/// items. No shape is authoritative.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Suggestions {
    Detailed(Vec<SuggestionItem>),
    Wrapped { text: String },
    Text(String),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SuggestionItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub implementation: String,
}

// --- View models ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusBadge {
    Active,
    Dormant,
}

impl StatusBadge {
    pub fn label(&self) -> &'static str {
        match self {
            StatusBadge::Active => "ACTIVE",
            StatusBadge::Dormant => "dormant",
        }
    }
}

/// Row shape the frontend renders for a clone listing.
#[derive(Clone, Debug)]
pub struct CloneRow {
    pub name: String,
    pub description: String,
    pub base_version: String,
    pub created_at: String,
    pub badge: StatusBadge,
    pub capability_count: usize,
}

impl From<CloneInfo> for CloneRow {
    fn from(info: CloneInfo) -> Self {
        let badge = if info.is_active { StatusBadge::Active } else { StatusBadge::Dormant };
        Self {
            name: info.name,
            description: info.description,
            base_version: info.base_version,
            created_at: info.created_at,
            badge,
            capability_count: info.capabilities.len(),
        }
    }
}

/// Rendered result of a code generation request.
#[derive(Clone, Debug)]
pub struct GeneratedCode {
    pub language: String,
    pub code: String,
}

/// Rendered result of a dataset request; `body` is pretty-printed when the
/// backend returned a structured document.
#[derive(Clone, Debug)]
pub struct DatasetPreview {
    pub format: String,
    pub body: String,
}

/// Rendered result of a network script request.
#[derive(Clone, Debug)]
pub struct ScriptBundle {
    pub script: String,
    pub explanation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_parse_plain_string() {
        let parsed: Suggestions = serde_json::from_str(r#""add more tests""#).unwrap();
        assert!(matches!(parsed, Suggestions::Text(ref s) if s == "add more tests"));
    }

    #[test]
    fn suggestions_parse_text_wrapper() {
        let parsed: Suggestions = serde_json::from_str(r#"{"text":"refactor the engine"}"#).unwrap();
        assert!(matches!(parsed, Suggestions::Wrapped { ref text } if text == "refactor the engine"));
    }

    #[test]
    fn suggestions_parse_detailed_items() {
        let raw = r#"[{"title":"Cache","description":"add caching","priority":"high","implementation":"use redis"}]"#;
        let parsed: Suggestions = serde_json::from_str(raw).unwrap();
        match parsed {
            Suggestions::Detailed(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].title, "Cache");
                assert_eq!(items[0].priority, "high");
            }
            other => panic!("expected detailed items, got {:?}", other),
        }
    }

    #[test]
    fn analysis_parses_structured_and_text() {
        let structured: AnalysisReport =
            serde_json::from_str(r#"{"issues":["a"],"improvements":[],"summary":"ok"}"#).unwrap();
        match structured {
            AnalysisReport::Structured(report) => {
                assert_eq!(report.issues, vec!["a"]);
                assert_eq!(report.summary.as_deref(), Some("ok"));
            }
            other => panic!("expected structured report, got {:?}", other),
        }

        let text: AnalysisReport = serde_json::from_str(r#""looks fine""#).unwrap();
        assert!(matches!(text, AnalysisReport::Text(ref s) if s == "looks fine"));
    }

    #[test]
    fn clone_row_derives_badge_and_capability_count() {
        let info: CloneInfo = serde_json::from_str(
            r#"{"name":"THOR2","description":"test","base_version":"1.0",
                "created_at":"2024-01-01T00:00:00","is_active":true,
                "capabilities":{"code":true,"net":false}}"#,
        )
        .unwrap();
        let row = CloneRow::from(info);
        assert_eq!(row.badge, StatusBadge::Active);
        assert_eq!(row.capability_count, 2);
    }
}
