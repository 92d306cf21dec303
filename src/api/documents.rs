/// Document upload and listing for the caller
use crate::{
    account::Role,
    api::{account::store_resume, UploadedFile},
    auth::AuthContext,
    context::AppContext,
    documents::Document,
    error::{PortalError, PortalResult},
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;

/// Build document routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/documents", get(list_documents).post(upload_document))
}

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<Document>,
}

/// Multipart field `document` plus an optional `type` text field
async fn upload_document(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    WithRejection(mut multipart, _): WithRejection<Multipart, PortalError>,
) -> PortalResult<(StatusCode, Json<Document>)> {
    let mut file = None;
    let mut kind = String::new();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("document") => file = Some(UploadedFile::read(field).await?),
            Some("type") => kind = field.text().await?,
            _ => {}
        }
    }

    let file = file.ok_or_else(|| PortalError::Validation("No file uploaded".to_string()))?;

    // A student's resume also updates the profile
    let document = if auth.role() == Role::Student && kind.trim().eq_ignore_ascii_case("resume") {
        store_resume(&ctx, &auth.account.id, file).await?
    } else {
        ctx.document_store
            .store(&auth.account.id, &file.file_name, &kind, &file.data)
            .await?
    };

    Ok((StatusCode::CREATED, Json(document)))
}

async fn list_documents(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> PortalResult<Json<DocumentsResponse>> {
    let documents = ctx.document_store.list(&auth.account.id).await?;
    Ok(Json(DocumentsResponse { documents }))
}
