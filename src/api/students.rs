/// Student record management (admin) and read-only listing (clerk)
use crate::{
    account::{Role, SignupRequest},
    api::{
        account::{apply_profile_update, ProfileUpdateRequest},
        ProfileView,
    },
    auth::{AdminAuth, ClerkAuth},
    context::AppContext,
    db::account::Account,
    error::{PortalError, PortalResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use validator::Validate;

/// Build student management routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(deactivate_student),
        )
        .route("/clerk/students", get(clerk_list_students))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListStudentsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create a student account on behalf of the student
async fn create_student(
    State(ctx): State<AppContext>,
    AdminAuth(auth): AdminAuth,
    WithRejection(Json(req), _): WithRejection<Json<SignupRequest>, PortalError>,
) -> PortalResult<(StatusCode, Json<ProfileView>)> {
    req.validate()?;

    let account = ctx
        .account_manager
        .create_account(req.new_account())
        .await?;

    let profile = match req.profile {
        Some(input) if !input.is_empty() => {
            Some(ctx.profile_store.upsert(&account.id, input).await?)
        }
        _ => None,
    };

    tracing::info!(admin_id = %auth.account.id, account_id = %account.id, "admin created student");

    Ok((StatusCode::CREATED, Json(ProfileView { account, profile })))
}

async fn list_students(
    State(ctx): State<AppContext>,
    AdminAuth(_): AdminAuth,
    Query(query): Query<ListStudentsQuery>,
) -> PortalResult<Json<Vec<ProfileView>>> {
    Ok(Json(load_students(&ctx, query.include_inactive).await?))
}

async fn clerk_list_students(
    State(ctx): State<AppContext>,
    ClerkAuth(_): ClerkAuth,
) -> PortalResult<Json<Vec<ProfileView>>> {
    Ok(Json(load_students(&ctx, false).await?))
}

async fn get_student(
    State(ctx): State<AppContext>,
    AdminAuth(_): AdminAuth,
    Path(id): Path<String>,
) -> PortalResult<Json<ProfileView>> {
    let account = find_student(&ctx, &id).await?;
    Ok(Json(ProfileView::load(&ctx, account).await?))
}

async fn update_student(
    State(ctx): State<AppContext>,
    AdminAuth(auth): AdminAuth,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<ProfileUpdateRequest>, PortalError>,
) -> PortalResult<Json<ProfileView>> {
    let account = find_student(&ctx, &id).await?;
    let view = apply_profile_update(&ctx, &account.id, account.role, req).await?;

    tracing::info!(admin_id = %auth.account.id, account_id = %id, "admin updated student");
    Ok(Json(view))
}

/// Soft delete: the record is deactivated, never removed
async fn deactivate_student(
    State(ctx): State<AppContext>,
    AdminAuth(auth): AdminAuth,
    Path(id): Path<String>,
) -> PortalResult<Json<Account>> {
    find_student(&ctx, &id).await?;
    let account = ctx.account_manager.set_active(&id, false).await?;

    tracing::info!(admin_id = %auth.account.id, account_id = %id, "admin deactivated student");
    Ok(Json(account))
}

async fn find_student(ctx: &AppContext, id: &str) -> PortalResult<Account> {
    let account = ctx.account_manager.get_account(id).await?;
    if account.role != Role::Student {
        return Err(PortalError::NotFound("Student not found".to_string()));
    }
    Ok(account)
}

async fn load_students(ctx: &AppContext, include_inactive: bool) -> PortalResult<Vec<ProfileView>> {
    let accounts = ctx
        .account_manager
        .list_accounts(Some(Role::Student), include_inactive)
        .await?;

    let mut students = Vec::with_capacity(accounts.len());
    for account in accounts {
        students.push(ProfileView::load(ctx, account).await?);
    }

    Ok(students)
}
