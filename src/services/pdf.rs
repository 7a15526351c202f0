// src/services/pdf.rs
//! PDF export: local typst compilation or a remote render service

use chrono::{Datelike, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::services::PdfRenderer;
use crate::types::{ExportedPdf, RenderServiceError, ResumeDocument};
use crate::utils::{self, sanitize_filename};

const TEMPLATE_FILE: &str = "resume.typ";
const DATA_FILE: &str = "resume.toml";
const OUTPUT_FILE: &str = "resume.pdf";
const RENDER_ENDPOINT: &str = "/render";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// `<Full_Name>_Resume_<year>.pdf`, or `resume_Resume_<year>.pdf` without a usable name.
pub fn export_filename(document: &ResumeDocument) -> String {
    let name = sanitize_filename(&document.personal_info.full_name);
    let name = if name.is_empty() { "resume" } else { name.as_str() };
    format!("{}_Resume_{}.pdf", name, Utc::now().year())
}

fn rendering(message: impl Into<String>) -> CollaboratorError {
    CollaboratorError::Rendering(message.into())
}

/// Compiles `resume.typ` with the `typst` CLI in a throwaway workspace.
pub struct TypstPdfRenderer {
    templates_dir: PathBuf,
    workspace_root: PathBuf,
}

impl TypstPdfRenderer {
    pub fn new(templates_dir: PathBuf, workspace_root: PathBuf) -> Self {
        Self {
            templates_dir,
            workspace_root,
        }
    }

    fn template_path(&self) -> PathBuf {
        self.templates_dir.join(TEMPLATE_FILE)
    }

    async fn prepare_workspace(
        &self,
        workspace: &Path,
        document: &ResumeDocument,
    ) -> CollaboratorResult<()> {
        let template = self.template_path();
        if !template.exists() {
            return Err(rendering(format!(
                "template not found: {}",
                template.display()
            )));
        }

        let data = toml::to_string(document)
            .map_err(|e| rendering(format!("failed to serialize resume data: {}", e)))?;

        utils::write_file_safe(&workspace.join(DATA_FILE), data.as_bytes())
            .await
            .map_err(|e| rendering(e.to_string()))?;

        tokio::fs::copy(&template, workspace.join(TEMPLATE_FILE))
            .await
            .map_err(|e| rendering(format!("failed to copy template: {}", e)))?;

        Ok(())
    }

    async fn compile(&self, workspace: &Path) -> CollaboratorResult<Vec<u8>> {
        let output = Command::new("typst")
            .current_dir(workspace)
            .arg("compile")
            .arg(TEMPLATE_FILE)
            .arg(OUTPUT_FILE)
            .output()
            .await
            .map_err(|e| {
                error!("Failed to execute typst: {}", e);
                CollaboratorError::Unavailable(format!("typst is not available: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(rendering(format!("typst compilation failed: {}", stderr.trim())));
        }

        tokio::fs::read(workspace.join(OUTPUT_FILE))
            .await
            .map_err(|e| rendering(format!("compiled PDF is missing: {}", e)))
    }
}

#[rocket::async_trait]
impl PdfRenderer for TypstPdfRenderer {
    async fn render(&self, document: &ResumeDocument) -> CollaboratorResult<ExportedPdf> {
        let workspace = self.workspace_root.join(Uuid::new_v4().to_string());
        debug!("Rendering in workspace {}", workspace.display());

        let result = match self.prepare_workspace(&workspace, document).await {
            Ok(()) => self.compile(&workspace).await,
            Err(e) => Err(e),
        };

        if workspace.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&workspace).await {
                warn!("Failed to clean up render workspace {}: {}", workspace.display(), e);
            }
        }

        let bytes = result?;
        let filename = export_filename(document);
        info!("Rendered {} ({} bytes)", filename, bytes.len());

        Ok(ExportedPdf { bytes, filename })
    }
}

/// Posts the document JSON to `<base_url>/render` and reads back PDF bytes.
pub struct HttpPdfRenderer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPdfRenderer {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RENDER_ENDPOINT)
    }
}

#[rocket::async_trait]
impl PdfRenderer for HttpPdfRenderer {
    async fn render(&self, document: &ResumeDocument) -> CollaboratorResult<ExportedPdf> {
        let url = self.endpoint();
        debug!("Calling render service: {}", url);

        let response = self
            .client
            .post(&url)
            .json(document)
            .send()
            .await
            .map_err(|e| {
                error!("Render service unreachable: {}", e);
                CollaboratorError::Unavailable(format!("render service unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RenderServiceError>(&body)
                .ok()
                .and_then(|e| e.error.or(e.status))
                .unwrap_or(body);
            return Err(rendering(format!("HTTP {}: {}", status, message)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| rendering(format!("failed to read PDF body: {}", e)))?
            .to_vec();

        Ok(ExportedPdf {
            bytes,
            filename: export_filename(document),
        })
    }
}
