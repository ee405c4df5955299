use serde::{ Serialize, Deserialize };

#[derive(Serialize, Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatReply {
    pub conversation_id: Option<String>,
    pub response: Option<String>,
    #[serde(default)]
    pub requires_permission: bool,
    pub permission_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct PermissionDecision {
    pub permission_granted: bool,
    pub operation: String,
    pub conversation_id: Option<String>,
}

/// The backend answers a permission decision with either a final response
/// or an `error` field on an otherwise successful status.
#[derive(Deserialize, Debug, Clone)]
pub struct PermissionReply {
    pub response: Option<String>,
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
    System,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "you",
            Sender::Ai => "thor",
            Sender::System => "system",
        }
    }
}

/// One line of the local append-only transcript. Entries are never mutated
/// or deleted; the timestamp is RFC 3339.
#[derive(Clone, Debug, Serialize)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub content: String,
    pub timestamp: String,
}
