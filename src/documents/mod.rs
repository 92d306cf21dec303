/// Document uploads on local disk
///
/// Files live under `{base}/{account_id}/{unix_millis}-{id}-{file_name}` with a
/// metadata row per upload.
use crate::error::{PortalError, PortalResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, SqlitePool};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Stored document metadata
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub account_id: String,
    pub file_name: String,
    #[serde(skip_serializing, default)]
    pub file_path: String,
    pub kind: String,
    pub size: i64,
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Document store
pub struct DocumentStore {
    db: SqlitePool,
    base_path: PathBuf,
    max_size: usize,
}

impl DocumentStore {
    pub fn new(db: SqlitePool, base_path: PathBuf, max_size: usize) -> Self {
        Self {
            db,
            base_path,
            max_size,
        }
    }

    /// Reject empty or oversized uploads
    pub fn check_upload(&self, data: &[u8]) -> PortalResult<()> {
        if data.is_empty() {
            return Err(PortalError::Validation("Uploaded file is empty".to_string()));
        }

        if data.len() > self.max_size {
            return Err(PortalError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                self.max_size
            )));
        }

        Ok(())
    }

    /// Write an uploaded file to disk and record it
    pub async fn store(
        &self,
        account_id: &str,
        file_name: &str,
        kind: &str,
        data: &[u8],
    ) -> PortalResult<Document> {
        self.check_upload(data)?;

        let file_name = sanitize_file_name(file_name);
        let kind = match kind.trim() {
            "" => "other".to_string(),
            k => k.to_lowercase(),
        };

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let dir = self.base_path.join(account_id);
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}-{}-{}", now.timestamp_millis(), id, file_name));
        fs::write(&path, data).await?;

        let document = Document {
            id,
            account_id: account_id.to_string(),
            file_name,
            file_path: path.to_string_lossy().into_owned(),
            kind,
            size: data.len() as i64,
            sha256: hex::encode(Sha256::digest(data)),
            uploaded_at: now,
        };

        let inserted = sqlx::query(
            "INSERT INTO document (id, account_id, file_name, file_path, kind, size, sha256, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&document.id)
        .bind(&document.account_id)
        .bind(&document.file_name)
        .bind(&document.file_path)
        .bind(&document.kind)
        .bind(document.size)
        .bind(&document.sha256)
        .bind(document.uploaded_at)
        .execute(&self.db)
        .await;

        if let Err(e) = inserted {
            remove_quietly(&path).await;
            return Err(e.into());
        }

        tracing::info!(
            account_id = %account_id,
            kind = %document.kind,
            size = document.size,
            "stored document"
        );

        Ok(document)
    }

    /// Documents uploaded by an account, newest first
    pub async fn list(&self, account_id: &str) -> PortalResult<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT id, account_id, file_name, file_path, kind, size, sha256, uploaded_at
             FROM document WHERE account_id = ?1
             ORDER BY uploaded_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        Ok(documents)
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        tracing::warn!("Failed to remove orphaned upload {}: {}", path.display(), e);
    }
}

/// Keep the final path component and replace anything outside `[A-Za-z0-9._-]`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
