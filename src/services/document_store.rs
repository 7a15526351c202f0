// src/services/document_store.rs
//! Resume persistence: JSON files per owner, or process memory

use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::services::DocumentStore;
use crate::types::{ResumeDocument, SaveReceipt};
use crate::utils::{self, owner_dir_name};

const DOCUMENT_EXTENSION: &str = "json";

/// Stores each document as `<root>/<owner>/<document id>.json`.
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn owner_dir(&self, owner: &str) -> PathBuf {
        self.root.join(owner_dir_name(owner))
    }

    fn document_path(&self, owner: &str, document_id: Uuid) -> PathBuf {
        self.owner_dir(owner)
            .join(format!("{}.{}", document_id, DOCUMENT_EXTENSION))
    }
}

#[rocket::async_trait]
impl DocumentStore for FileDocumentStore {
    async fn save(
        &self,
        owner: &str,
        document_id: Uuid,
        document: &ResumeDocument,
    ) -> CollaboratorResult<SaveReceipt> {
        let path = self.document_path(owner, document_id);
        let content = serde_json::to_vec_pretty(document)
            .map_err(|e| CollaboratorError::Storage(e.to_string()))?;

        utils::write_file_safe(&path, &content).await.map_err(|e| {
            error!("Failed to save document {}: {:#}", document_id, e);
            CollaboratorError::Storage(e.to_string())
        })?;

        info!("Saved document {} for {} to {}", document_id, owner, path.display());

        Ok(SaveReceipt {
            document_id,
            owner: owner.to_string(),
            saved_at: Utc::now(),
        })
    }

    async fn load(&self, owner: &str, document_id: Uuid) -> CollaboratorResult<ResumeDocument> {
        let path = self.document_path(owner, document_id);
        if !path.exists() {
            return Err(CollaboratorError::NotFound(document_id.to_string()));
        }

        let content = utils::read_file_safe(&path)
            .await
            .map_err(|e| CollaboratorError::Storage(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            CollaboratorError::Storage(format!("Corrupt document {}: {}", path.display(), e))
        })
    }

    async fn list(&self, owner: &str) -> CollaboratorResult<Vec<Uuid>> {
        let dir = self.owner_dir(owner);
        let mut ids = Vec::new();

        if !dir.exists() {
            return Ok(ids);
        }

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| CollaboratorError::Storage(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CollaboratorError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok())
            {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }
}

/// Documents kept for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<(String, Uuid), ResumeDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[rocket::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(
        &self,
        owner: &str,
        document_id: Uuid,
        document: &ResumeDocument,
    ) -> CollaboratorResult<SaveReceipt> {
        self.documents
            .write()
            .await
            .insert((owner.to_string(), document_id), document.clone());

        Ok(SaveReceipt {
            document_id,
            owner: owner.to_string(),
            saved_at: Utc::now(),
        })
    }

    async fn load(&self, owner: &str, document_id: Uuid) -> CollaboratorResult<ResumeDocument> {
        self.documents
            .read()
            .await
            .get(&(owner.to_string(), document_id))
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(document_id.to_string()))
    }

    async fn list(&self, owner: &str) -> CollaboratorResult<Vec<Uuid>> {
        let mut ids: Vec<Uuid> = self
            .documents
            .read()
            .await
            .keys()
            .filter(|(key_owner, _)| key_owner == owner)
            .map(|(_, id)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
