/// Signup, login and self-service profile endpoints
use crate::{
    account::{
        ChangePasswordRequest, IdentityUpdate, LoginRequest, LoginResponse, Role, SignupRequest,
        SignupResponse,
    },
    api::{ProfileView, UploadedFile},
    auth::AuthContext,
    context::AppContext,
    documents::Document,
    error::{PortalError, PortalResult},
    profile::{ProfileInput, ResumeMeta},
};
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/password", put(change_password))
        .route("/profile/deactivate", put(deactivate))
}

/// Identity and profile changes in one request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(flatten)]
    pub identity: IdentityUpdate,
    pub profile: Option<ProfileInput>,
}

/// Student signup. Accepts a JSON body, or multipart with a `data` JSON part
/// and an optional `resume` file.
async fn signup(
    State(ctx): State<AppContext>,
    request: Request,
) -> PortalResult<(StatusCode, Json<SignupResponse>)> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let (req, resume) = if is_multipart {
        let WithRejection(multipart, _) =
            WithRejection::<Multipart, PortalError>::from_request(request, &ctx).await?;
        read_signup_form(multipart).await?
    } else {
        let WithRejection(Json(req), _) =
            WithRejection::<Json<SignupRequest>, PortalError>::from_request(request, &ctx)
                .await?;
        (req, None)
    };

    // Everything is checked before the account is written
    req.validate()?;
    if let Some(ref resume) = resume {
        resume.ensure_resume_format()?;
        ctx.document_store.check_upload(&resume.data)?;
    }

    let issued = ctx
        .account_manager
        .issue_credentials(req.new_account())
        .await?;
    let account_id = issued.account.id.clone();

    let mut profile = match req.profile {
        Some(input) if !input.is_empty() => {
            Some(ctx.profile_store.upsert(&account_id, input).await?)
        }
        _ => None,
    };

    if let Some(resume) = resume {
        store_resume(&ctx, &account_id, resume).await?;
        profile = ctx.profile_store.get(&account_id).await?;
    }

    tracing::info!(account_id = %account_id, "student signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            account: issued.account,
            profile,
            token: issued.token,
        }),
    ))
}

async fn read_signup_form(
    mut multipart: Multipart,
) -> PortalResult<(SignupRequest, Option<UploadedFile>)> {
    let mut data = None;
    let mut resume = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("data") => {
                let text = field.text().await?;
                data = Some(serde_json::from_str::<SignupRequest>(&text).map_err(|e| {
                    PortalError::Validation(format!("Invalid signup data: {}", e))
                })?);
            }
            Some("resume") => resume = Some(UploadedFile::read(field).await?),
            _ => {}
        }
    }

    let data =
        data.ok_or_else(|| PortalError::Validation("Missing signup data".to_string()))?;
    Ok((data, resume))
}

/// Save a resume as a document and point the profile at it
pub(crate) async fn store_resume(
    ctx: &AppContext,
    account_id: &str,
    resume: UploadedFile,
) -> PortalResult<Document> {
    resume.ensure_resume_format()?;

    let document = ctx
        .document_store
        .store(account_id, &resume.file_name, "resume", &resume.data)
        .await?;

    ctx.profile_store
        .set_resume(
            account_id,
            ResumeMeta {
                file_name: document.file_name.clone(),
                file_path: document.file_path.clone(),
                file_size: document.size,
                uploaded_at: document.uploaded_at,
            },
        )
        .await?;

    Ok(document)
}

/// Login; the response says where the caller's dashboard is
async fn login(
    State(ctx): State<AppContext>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, PortalError>,
) -> PortalResult<Json<LoginResponse>> {
    let issued = ctx.account_manager.login(&req.email, &req.password).await?;
    let redirect = issued.account.role.dashboard_path().to_string();

    tracing::info!(account_id = %issued.account.id, role = %issued.account.role, "login");

    Ok(Json(LoginResponse {
        account: issued.account,
        token: issued.token,
        redirect,
    }))
}

async fn logout(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.account_manager.delete_session(&auth.session_id).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

async fn get_profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> PortalResult<Json<ProfileView>> {
    Ok(Json(ProfileView::load(&ctx, auth.account).await?))
}

async fn update_profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<ProfileUpdateRequest>, PortalError>,
) -> PortalResult<Json<ProfileView>> {
    let view = apply_profile_update(&ctx, &auth.account.id, auth.role(), req).await?;
    Ok(Json(view))
}

/// Validate first, then write identity and profile changes
pub(crate) async fn apply_profile_update(
    ctx: &AppContext,
    account_id: &str,
    role: Role,
    req: ProfileUpdateRequest,
) -> PortalResult<ProfileView> {
    if let Some(ref profile) = req.profile {
        if role != Role::Student {
            return Err(PortalError::Validation(
                "Only student accounts have a profile".to_string(),
            ));
        }
        profile.validate()?;
    }

    let account = ctx
        .account_manager
        .update_identity(account_id, req.identity)
        .await?;

    let profile = match req.profile {
        Some(input) => Some(ctx.profile_store.upsert(account_id, input).await?),
        None => ctx.profile_store.get(account_id).await?,
    };

    Ok(ProfileView { account, profile })
}

async fn change_password(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<ChangePasswordRequest>, PortalError>,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.account_manager
        .change_password(&auth.account.id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password updated" })))
}

/// Soft-deactivate the caller's own account
async fn deactivate(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> PortalResult<Json<serde_json::Value>> {
    ctx.account_manager
        .set_active(&auth.account.id, false)
        .await?;

    Ok(Json(json!({ "message": "Account deactivated" })))
}
