//! Shifts Admin API
//!
//! Organizer-only shift management: publish, delete, and move volunteers
//! through the application lifecycle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::{ApiJson, MessageResponse};
use crate::shared::authorization::caps;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authorized;
use crate::shift::api::{ShiftResponse, ShiftsState};
use crate::shift::entity::NewShift;
use crate::shift::service::ShiftWithMembers;
use crate::user::api::UserSummaryResponse;

/// Shift with applicant and assignee contact details
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminShiftResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub task: String,
    pub action: String,
    pub completed: bool,
    pub applied_users: Vec<UserSummaryResponse>,
    pub assigned_users: Vec<UserSummaryResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ShiftWithMembers> for AdminShiftResponse {
    fn from(entry: ShiftWithMembers) -> Self {
        let shift = entry.shift;
        Self {
            id: shift.id,
            date: shift.date,
            time: shift.time,
            location: shift.location,
            task: shift.task,
            action: shift.action,
            completed: shift.completed,
            applied_users: entry.applied_users.into_iter().map(Into::into).collect(),
            assigned_users: entry.assigned_users.into_iter().map(Into::into).collect(),
            created_at: shift.created_at.to_rfc3339(),
            updated_at: shift.updated_at.to_rfc3339(),
        }
    }
}

/// Blank or missing required fields are rejected with a single message
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShiftRequest {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub task: String,
    pub action: Option<String>,
}

impl From<CreateShiftRequest> for NewShift {
    fn from(req: CreateShiftRequest) -> Self {
        Self {
            date: req.date,
            time: req.time,
            location: req.location,
            task: req.task,
            action: req.action,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftMessageResponse {
    pub message: String,
    pub shift: ShiftResponse,
}

impl ShiftMessageResponse {
    fn new(message: &str, shift: impl Into<ShiftResponse>) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            shift: shift.into(),
        })
    }
}

/// List all shifts with member details
#[utoipa::path(
    get,
    path = "",
    tag = "admin-shifts",
    operation_id = "getApiAdminShifts",
    responses(
        (status = 200, description = "Shifts with applicants and assignees", body = Vec<AdminShiftResponse>),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shifts_with_members(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
) -> Result<Json<Vec<AdminShiftResponse>>, PlatformError> {
    let shifts = state.shift_service.list_with_members().await?;
    Ok(Json(shifts.into_iter().map(AdminShiftResponse::from).collect()))
}

/// Publish a new shift
#[utoipa::path(
    post,
    path = "/create",
    tag = "admin-shifts",
    operation_id = "postApiAdminShiftsCreate",
    request_body = CreateShiftRequest,
    responses(
        (status = 201, description = "Shift created", body = ShiftMessageResponse),
        (status = 400, description = "Missing required fields"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_shift(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
    ApiJson(req): ApiJson<CreateShiftRequest>,
) -> Result<(StatusCode, Json<ShiftMessageResponse>), PlatformError> {
    let shift = state.shift_service.create(req.into()).await?;
    Ok((StatusCode::CREATED, ShiftMessageResponse::new("Shift created successfully", shift)))
}

/// Delete a shift
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "admin-shifts",
    operation_id = "deleteApiAdminShift",
    params(
        ("id" = String, Path, description = "Shift ID")
    ),
    responses(
        (status = 200, description = "Shift deleted", body = MessageResponse),
        (status = 404, description = "Shift not found"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_shift(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state.shift_service.delete(&id).await?;
    Ok(Json(MessageResponse::new("Shift deleted successfully")))
}

/// Assign a user directly, without an application
#[utoipa::path(
    post,
    path = "/{id}/assign/{user_id}",
    tag = "admin-shifts",
    operation_id = "postApiAdminShiftAssign",
    params(
        ("id" = String, Path, description = "Shift ID"),
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User assigned", body = ShiftMessageResponse),
        (status = 400, description = "User already assigned"),
        (status = 404, description = "Shift or user not found"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_user(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<ShiftMessageResponse>, PlatformError> {
    let shift = state.shift_service.assign(&id, &user_id).await?;
    Ok(ShiftMessageResponse::new("User assigned successfully", shift))
}

/// Approve a pending application
#[utoipa::path(
    post,
    path = "/{id}/approve/{user_id}",
    tag = "admin-shifts",
    operation_id = "postApiAdminShiftApprove",
    params(
        ("id" = String, Path, description = "Shift ID"),
        ("user_id" = String, Path, description = "Applicant user ID")
    ),
    responses(
        (status = 200, description = "Application approved", body = ShiftMessageResponse),
        (status = 400, description = "User has not applied or is already assigned"),
        (status = 404, description = "Shift not found"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_application(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<ShiftMessageResponse>, PlatformError> {
    let shift = state.shift_service.approve(&id, &user_id).await?;
    Ok(ShiftMessageResponse::new("User approved successfully", shift))
}

/// Deny a pending application
#[utoipa::path(
    post,
    path = "/{id}/deny/{user_id}",
    tag = "admin-shifts",
    operation_id = "postApiAdminShiftDeny",
    params(
        ("id" = String, Path, description = "Shift ID"),
        ("user_id" = String, Path, description = "Applicant user ID")
    ),
    responses(
        (status = 200, description = "Application denied", body = ShiftMessageResponse),
        (status = 400, description = "User has not applied"),
        (status = 404, description = "Shift not found"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deny_application(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<ShiftMessageResponse>, PlatformError> {
    let shift = state.shift_service.deny(&id, &user_id).await?;
    Ok(ShiftMessageResponse::new("User denied successfully", shift))
}

/// Mark a shift completed
#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = "admin-shifts",
    operation_id = "postApiAdminShiftComplete",
    params(
        ("id" = String, Path, description = "Shift ID")
    ),
    responses(
        (status = 200, description = "Shift completed", body = ShiftMessageResponse),
        (status = 404, description = "Shift not found"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_shift(
    State(state): State<ShiftsState>,
    _auth: Authorized<caps::ManageShifts>,
    Path(id): Path<String>,
) -> Result<Json<ShiftMessageResponse>, PlatformError> {
    let shift = state.shift_service.complete(&id).await?;
    Ok(ShiftMessageResponse::new("Shift marked as completed", shift))
}

pub fn admin_shifts_router(state: ShiftsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_shifts_with_members))
        .routes(routes!(create_shift))
        .routes(routes!(delete_shift))
        .routes(routes!(assign_user))
        .routes(routes!(approve_application))
        .routes(routes!(deny_application))
        .routes(routes!(complete_shift))
        .with_state(state)
}
