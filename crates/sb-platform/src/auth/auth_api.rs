//! Auth API
//!
//! Registration, login and the caller's own profile.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::auth::account_service::AccountService;
use crate::shared::api_common::{ApiJson, MessageResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::api::UserResponse;
use crate::user::entity::{ProfileUpdate, Role};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// volunteer (default), coordinator, admin or organizer
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            contact: req.contact,
            profile_picture: req.profile_picture,
        }
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub account_service: Arc<AccountService>,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    operation_id = "postApiAuthRegister",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Invalid input or username taken"),
        (status = 403, description = "Privileged role not allowed")
    )
)]
pub async fn register(
    State(state): State<AuthState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), PlatformError> {
    state.account_service
        .register(&req.username, &req.password, req.role.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("User registered successfully"))))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    operation_id = "postApiAuthLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, PlatformError> {
    let result = state.account_service.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse {
        token: result.token,
        role: result.role,
    }))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "auth",
    operation_id = "getApiAuthProfile",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    State(state): State<AuthState>,
    auth: Authenticated,
) -> Result<Json<UserResponse>, PlatformError> {
    let user = state.account_service.get_profile(&auth.user_id).await?;
    Ok(Json(user.into()))
}

/// Update the caller's profile; omitted fields are unchanged
#[utoipa::path(
    put,
    path = "/profile",
    tag = "auth",
    operation_id = "putApiAuthProfile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AuthState>,
    auth: Authenticated,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, PlatformError> {
    let user = state.account_service
        .update_profile(&auth.user_id, req.into())
        .await?;
    Ok(Json(user.into()))
}

pub fn auth_router(state: AuthState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(get_profile, update_profile))
        .with_state(state)
}
