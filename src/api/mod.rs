/// API routes and handlers
pub mod account;
pub mod admin;
pub mod consent;
pub mod dashboard;
pub mod documents;
pub mod students;

use crate::{
    context::AppContext,
    db::account::Account,
    error::{PortalError, PortalResult},
    profile::StudentProfile,
};
use axum::{body::Bytes, extract::multipart::Field, Router};
use serde::Serialize;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(account::routes())
        .merge(documents::routes())
        .merge(consent::routes())
        .merge(admin::routes())
        .merge(students::routes())
        .merge(dashboard::routes())
}

/// An account together with its student profile, if any
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub account: Account,
    pub profile: Option<StudentProfile>,
}

impl ProfileView {
    pub async fn load(ctx: &AppContext, account: Account) -> PortalResult<Self> {
        let profile = ctx.profile_store.get(&account.id).await?;
        Ok(Self { account, profile })
    }
}

/// A file part read from a multipart body
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub async fn read(field: Field<'_>) -> PortalResult<Self> {
        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload".to_string());
        let data = field.bytes().await?;

        Ok(Self { file_name, data })
    }

    /// Lower-cased extension of the client-supplied name
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    /// Accept only resume formats (PDF or Word)
    pub fn ensure_resume_format(&self) -> PortalResult<()> {
        match self.extension().as_deref() {
            Some("pdf" | "doc" | "docx") => Ok(()),
            _ => Err(PortalError::Validation(
                "Resume must be a PDF, DOC or DOCX file".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            data: Bytes::from_static(b"data"),
        }
    }

    #[test]
    fn test_resume_format() {
        assert!(file("cv.PDF").ensure_resume_format().is_ok());
        assert!(file("cv.docx").ensure_resume_format().is_ok());
        assert!(file("cv.doc").ensure_resume_format().is_ok());
        assert!(file("cv.exe").ensure_resume_format().is_err());
        assert!(file("resume").ensure_resume_format().is_err());
    }
}
