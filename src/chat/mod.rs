use log::{ info, error };
use std::sync::Arc;

use crate::api::ThorApi;
use crate::error::ControlError;
use crate::models::chat::{ ChatRequest, PermissionDecision };
use crate::session::{ ChatPhase, SessionState };

const NO_RESPONSE: &str = "The assistant did not return a response.";

/// What a completed controller call means for the frontend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input; nothing was sent and nothing changed.
    Ignored,
    /// Final AI reply, already appended to the transcript.
    Answered { text: String },
    /// The server paused the turn; a consent decision is now pending.
    PermissionRequested { reason: String },
    /// Transport or application failure; a system entry was appended and
    /// the turn is over.
    Failed { detail: String },
}

/// Drives the two-phase chat exchange against the backend, owning the
/// session state so the protocol can be exercised without any frontend.
pub struct ChatController {
    api: Arc<dyn ThorApi>,
    session: SessionState,
}

impl ChatController {
    pub fn new(api: Arc<dyn ThorApi>, conversation_id: Option<String>) -> Self {
        Self {
            api,
            session: SessionState::new(conversation_id),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Submit one user message. Whitespace-only input is a no-op, and a
    /// submit while a turn is in flight is rejected outright; there is no
    /// queue.
    pub async fn send(&mut self, input: &str) -> Result<SendOutcome, ControlError> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        match self.session.phase() {
            ChatPhase::Idle => {}
            ChatPhase::AwaitingResponse => {
                return Err(ControlError::Busy);
            }
            ChatPhase::AwaitingPermission => {
                return Err(ControlError::PermissionPending);
            }
        }

        self.session.begin_turn(message);
        let request = ChatRequest {
            message: message.to_string(),
            conversation_id: self.session.conversation_id().map(str::to_string),
        };

        match self.api.chat(&request).await {
            Ok(reply) => {
                if let Some(id) = reply.conversation_id.as_deref() {
                    self.session.adopt_conversation(id);
                }

                if reply.requires_permission {
                    let reason = reply.permission_reason.clone().unwrap_or_default();
                    info!("Permission requested: {}", reason);
                    self.session.require_permission(reason.clone());
                    return Ok(SendOutcome::PermissionRequested { reason });
                }

                match reply.response {
                    Some(text) => {
                        self.session.complete_turn(&text);
                        Ok(SendOutcome::Answered { text })
                    }
                    None => {
                        let detail = reply.error.unwrap_or_else(|| NO_RESPONSE.to_string());
                        self.session.fail_turn(&detail);
                        Ok(SendOutcome::Failed { detail })
                    }
                }
            }
            Err(e) => {
                error!("Chat request failed: {}", e);
                let detail = e.to_string();
                self.session.fail_turn(&detail);
                Ok(SendOutcome::Failed { detail })
            }
        }
    }

    /// Answer the pending permission request. The pending state is cleared
    /// unconditionally before the decision is posted, success or failure,
    /// so the prompt cannot get stuck.
    pub async fn resolve_permission(
        &mut self,
        granted: bool
    ) -> Result<SendOutcome, ControlError> {
        let pending = self.session.take_permission().ok_or(ControlError::NoPendingPermission)?;
        info!(
            "Posting permission decision: granted={} operation={}",
            granted,
            pending.reason
        );

        let decision = PermissionDecision {
            permission_granted: granted,
            operation: pending.reason,
            conversation_id: self.session.conversation_id().map(str::to_string),
        };

        match self.api.permission(&decision).await {
            Ok(reply) => match reply.response {
                Some(text) => {
                    self.session.complete_turn(&text);
                    Ok(SendOutcome::Answered { text })
                }
                None => {
                    let detail = reply.error.unwrap_or_else(|| NO_RESPONSE.to_string());
                    self.session.fail_turn(&detail);
                    Ok(SendOutcome::Failed { detail })
                }
            },
            Err(e) => {
                error!("Permission request failed: {}", e);
                let detail = e.to_string();
                self.session.fail_turn(&detail);
                Ok(SendOutcome::Failed { detail })
            }
        }
    }
}
