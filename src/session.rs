use chrono::Utc;
use log::info;

use crate::models::chat::{ Sender, TranscriptEntry };

/// Where the chat exchange currently stands. A turn moves
/// Idle -> AwaitingResponse -> Idle, with an optional detour through
/// AwaitingPermission when the server demands user consent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChatPhase {
    #[default]
    Idle,
    AwaitingResponse,
    AwaitingPermission,
}

/// A server-initiated pause awaiting explicit user consent. At most one is
/// outstanding at a time; there is no queue.
#[derive(Clone, Debug)]
pub struct PermissionRequest {
    pub reason: String,
}

/// All mutable chat session state: the cached conversation identifier, the
/// protocol phase, the pending permission request, the visible route, and
/// the append-only transcript.
#[derive(Debug, Default)]
pub struct SessionState {
    conversation_id: Option<String>,
    phase: ChatPhase,
    pending_permission: Option<PermissionRequest>,
    route: Option<String>,
    transcript: Vec<TranscriptEntry>,
}

impl SessionState {
    pub fn new(conversation_id: Option<String>) -> Self {
        let route = conversation_id.as_deref().map(|id| format!("/conversation/{}", id));
        Self {
            conversation_id,
            route,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn pending_reason(&self) -> Option<&str> {
        self.pending_permission.as_ref().map(|p| p.reason.as_str())
    }

    fn append(&mut self, sender: Sender, content: &str) {
        self.transcript.push(TranscriptEntry {
            sender,
            content: content.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    /// Record the outgoing user message and mark the request in flight.
    pub fn begin_turn(&mut self, message: &str) {
        self.append(Sender::User, message);
        self.phase = ChatPhase::AwaitingResponse;
    }

    /// Append the final AI reply and return to Idle.
    pub fn complete_turn(&mut self, content: &str) {
        self.append(Sender::Ai, content);
        self.phase = ChatPhase::Idle;
    }

    /// Append a system-level error entry and return to Idle. The failed turn
    /// is terminal; the user must resubmit.
    pub fn fail_turn(&mut self, content: &str) {
        self.append(Sender::System, content);
        self.phase = ChatPhase::Idle;
    }

    /// Park the turn behind a consent prompt. No message is appended until
    /// the decision round-trip completes.
    pub fn require_permission(&mut self, reason: String) {
        self.pending_permission = Some(PermissionRequest { reason });
        self.phase = ChatPhase::AwaitingPermission;
    }

    /// Take the pending request, unconditionally clearing it so the prompt
    /// can never wedge, and put the decision request in flight.
    pub fn take_permission(&mut self) -> Option<PermissionRequest> {
        let pending = self.pending_permission.take()?;
        self.phase = ChatPhase::AwaitingResponse;
        Some(pending)
    }

    /// Adopt the server-issued conversation identifier on the first reply
    /// that carries one; later replies never change it or the route.
    /// Returns true when the route changed.
    pub fn adopt_conversation(&mut self, id: &str) -> bool {
        if self.conversation_id.is_some() || id.is_empty() {
            return false;
        }
        info!("Adopted conversation {}", id);
        self.conversation_id = Some(id.to_string());
        self.route = Some(format!("/conversation/{}", id));
        true
    }
}
