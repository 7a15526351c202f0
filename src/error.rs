// src/error.rs
use thiserror::Error;

/// Failure reported by an external collaborator (credentials, storage, rendering).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account already exists for {0}")]
    AccountExists(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("rendering failed: {0}")]
    Rendering(String),

    #[error("storage failed: {0}")]
    Storage(String),
}

/// Rejected step in the landing / authenticating / building flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("form is incomplete: {0}")]
    FormIncomplete(&'static str),

    #[error(transparent)]
    Rejected(#[from] CollaboratorError),
}

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;
