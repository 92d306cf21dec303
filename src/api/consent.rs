/// Consent endpoints
use crate::{
    auth::AuthContext,
    consent::{Consent, ConsentUpdate},
    context::AppContext,
    error::{PortalError, PortalResult},
};
use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::WithRejection;

pub fn routes() -> Router<AppContext> {
    Router::new().route("/consent", get(get_consent).put(update_consent))
}

async fn get_consent(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> PortalResult<Json<Consent>> {
    Ok(Json(ctx.consent_manager.get_or_create(&auth.account.id).await?))
}

async fn update_consent(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    WithRejection(Json(update), _): WithRejection<Json<ConsentUpdate>, PortalError>,
) -> PortalResult<Json<Consent>> {
    Ok(Json(ctx.consent_manager.update(&auth.account.id, update).await?))
}
