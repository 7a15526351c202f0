// src/types/response.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ===== Collaborator Results =====

/// Account accepted by the credential verifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedUser {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub document_id: Uuid,
    pub owner: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Error body returned by a remote render service.
#[derive(Debug, Deserialize)]
pub struct RenderServiceError {
    pub error: Option<String>,
    pub status: Option<String>,
}
