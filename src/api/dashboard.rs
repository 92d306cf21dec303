/// Role dashboards: JSON summaries of what each role can see
use crate::{
    account::Role,
    auth::{AdminAuth, ClerkAuth, StudentAuth},
    context::AppContext,
    error::PortalResult,
};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/admin/dashboard", get(admin_dashboard))
        .route("/clerk/dashboard", get(clerk_dashboard))
        .route("/student/dashboard", get(student_dashboard))
}

async fn admin_dashboard(
    State(ctx): State<AppContext>,
    AdminAuth(auth): AdminAuth,
) -> PortalResult<Json<Value>> {
    let accounts = &ctx.account_manager;
    let all_students = accounts.list_accounts(Some(Role::Student), true).await?;
    let active_students = all_students.iter().filter(|a| a.is_active).count();

    Ok(Json(json!({
        "role": Role::Admin,
        "name": auth.account.full_name(),
        "students": {
            "total": all_students.len(),
            "active": active_students,
            "inactive": all_students.len() - active_students,
        },
        "clerks": accounts.count_active(Role::Clerk).await?,
        "admins": accounts.count_active(Role::Admin).await?,
    })))
}

async fn clerk_dashboard(
    State(ctx): State<AppContext>,
    ClerkAuth(auth): ClerkAuth,
) -> PortalResult<Json<Value>> {
    Ok(Json(json!({
        "role": Role::Clerk,
        "name": auth.account.full_name(),
        "activeStudents": ctx.account_manager.count_active(Role::Student).await?,
    })))
}

async fn student_dashboard(
    State(ctx): State<AppContext>,
    StudentAuth(auth): StudentAuth,
) -> PortalResult<Json<Value>> {
    let id = &auth.account.id;
    let profile = ctx.profile_store.get(id).await?;
    let documents = ctx.document_store.list(id).await?;
    let consent = ctx.consent_manager.get_or_create(id).await?;

    let (has_education, has_resume) = profile
        .as_ref()
        .map(|p| (p.education.is_some(), p.resume.is_some()))
        .unwrap_or((false, false));

    Ok(Json(json!({
        "role": Role::Student,
        "name": auth.account.full_name(),
        "profile": {
            "education": has_education,
            "resume": has_resume,
        },
        "documents": documents.len(),
        "consentGiven": consent.consent_date.is_some(),
    })))
}
