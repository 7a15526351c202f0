// src/services/mod.rs
//! External collaborators of a builder session: credentials, persistence, PDF rendering

pub mod accounts;
pub mod document_store;
pub mod pdf;

pub use accounts::SqliteAccounts;
pub use document_store::{FileDocumentStore, InMemoryDocumentStore};
pub use pdf::{HttpPdfRenderer, TypstPdfRenderer};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::core::flow::{LoginForm, SignupForm};
use crate::error::CollaboratorResult;
use crate::types::{ExportedPdf, ResumeDocument, SaveReceipt, VerifiedUser};

#[rocket::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, form: &LoginForm) -> CollaboratorResult<VerifiedUser>;

    async fn register(&self, form: &SignupForm) -> CollaboratorResult<VerifiedUser>;
}

#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Save (or overwrite) `document` under `document_id` for `owner`.
    async fn save(
        &self,
        owner: &str,
        document_id: Uuid,
        document: &ResumeDocument,
    ) -> CollaboratorResult<SaveReceipt>;

    async fn load(&self, owner: &str, document_id: Uuid) -> CollaboratorResult<ResumeDocument>;

    async fn list(&self, owner: &str) -> CollaboratorResult<Vec<Uuid>>;
}

#[rocket::async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, document: &ResumeDocument) -> CollaboratorResult<ExportedPdf>;
}

/// Remote render service when `RENDER_SERVICE_URL` is set, local typst otherwise.
pub fn renderer_from_config(config: &AppConfig) -> Result<Arc<dyn PdfRenderer>> {
    match &config.render_service_url {
        Some(url) => {
            info!("PDF rendering via {}", url);
            Ok(Arc::new(HttpPdfRenderer::new(url.clone())?))
        }
        None => {
            info!(
                "PDF rendering via typst with templates in {}",
                config.paths.templates_path.display()
            );
            Ok(Arc::new(TypstPdfRenderer::new(
                config.paths.templates_path.clone(),
                config.render_workspace(),
            )))
        }
    }
}
