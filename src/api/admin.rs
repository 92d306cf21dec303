/// Admin bulk upload endpoint
use crate::{
    auth::AdminAuth,
    context::AppContext,
    error::{PortalError, PortalResult},
    import::ImportReport,
};
use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::WithRejection;

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/admin/upload-csv", post(upload_csv))
}

/// Provision accounts from the CSV in multipart field `csvfile`
async fn upload_csv(
    State(ctx): State<AppContext>,
    AdminAuth(auth): AdminAuth,
    WithRejection(mut multipart, _): WithRejection<Multipart, PortalError>,
) -> PortalResult<Json<ImportReport>> {
    let mut csv = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("csvfile") {
            csv = Some(field.bytes().await?);
        }
    }

    let csv = csv.ok_or_else(|| PortalError::Validation("No file uploaded".to_string()))?;

    tracing::info!(
        admin_id = %auth.account.id,
        bytes = csv.len(),
        "starting bulk import"
    );

    let report = ctx.bulk_importer().import(&csv).await?;
    Ok(Json(report))
}
