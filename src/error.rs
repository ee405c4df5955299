use thiserror::Error;

use crate::api::ApiError;

/// Local input failure, detected before any network call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be valid JSON: {source}")]
    InvalidJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} must be a JSON object")]
    NotAnObject { field: &'static str },
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The backend reported failure inside an otherwise successful payload.
    #[error("{0}")]
    Backend(String),
    #[error("another request is already in flight")]
    Busy,
    #[error("a permission request is awaiting a decision")]
    PermissionPending,
    #[error("no permission request is pending")]
    NoPendingPermission,
}
