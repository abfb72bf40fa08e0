//! Shifts API
//!
//! Endpoints for any signed-in user: browse shifts, apply, and manage the
//! caller's own assignments.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::{ApiJson, MessageResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::shift::entity::Shift;
use crate::shift::service::ShiftService;

/// Shift as returned to clients, members given by user ID
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub task: String,
    pub action: String,
    pub completed: bool,
    pub applied_users: Vec<String>,
    pub assigned_users: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Shift> for ShiftResponse {
    fn from(shift: Shift) -> Self {
        Self {
            id: shift.id,
            date: shift.date,
            time: shift.time,
            location: shift.location,
            task: shift.task,
            action: shift.action,
            completed: shift.completed,
            applied_users: shift.applied_users,
            assigned_users: shift.assigned_users,
            created_at: shift.created_at.to_rfc3339(),
            updated_at: shift.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub shift_id: String,
}

#[derive(Clone)]
pub struct ShiftsState {
    pub shift_service: Arc<ShiftService>,
}

fn to_responses(shifts: Vec<Shift>) -> Json<Vec<ShiftResponse>> {
    Json(shifts.into_iter().map(ShiftResponse::from).collect())
}

/// List all shifts
#[utoipa::path(
    get,
    path = "",
    tag = "shifts",
    operation_id = "getApiShifts",
    responses(
        (status = 200, description = "All shifts", body = Vec<ShiftResponse>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_shifts(
    State(state): State<ShiftsState>,
    _auth: Authenticated,
) -> Result<Json<Vec<ShiftResponse>>, PlatformError> {
    Ok(to_responses(state.shift_service.list().await?))
}

/// Apply for a shift
#[utoipa::path(
    post,
    path = "/apply",
    tag = "shifts",
    operation_id = "postApiShiftsApply",
    request_body = ApplyRequest,
    responses(
        (status = 200, description = "Application recorded", body = MessageResponse),
        (status = 400, description = "Already applied or assigned"),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply_for_shift(
    State(state): State<ShiftsState>,
    auth: Authenticated,
    ApiJson(req): ApiJson<ApplyRequest>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state.shift_service.apply(&req.shift_id, &auth.user_id).await?;
    Ok(Json(MessageResponse::new("Shift application successful.")))
}

/// Shifts the caller is assigned to
#[utoipa::path(
    get,
    path = "/assigned",
    tag = "shifts",
    operation_id = "getApiShiftsAssigned",
    responses(
        (status = 200, description = "Assigned shifts", body = Vec<ShiftResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assigned_shifts(
    State(state): State<ShiftsState>,
    auth: Authenticated,
) -> Result<Json<Vec<ShiftResponse>>, PlatformError> {
    Ok(to_responses(state.shift_service.list_assigned(&auth.user_id).await?))
}

/// Completed shifts the caller was assigned to
#[utoipa::path(
    get,
    path = "/completed",
    tag = "shifts",
    operation_id = "getApiShiftsCompleted",
    responses(
        (status = 200, description = "Completed shifts", body = Vec<ShiftResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_completed_shifts(
    State(state): State<ShiftsState>,
    auth: Authenticated,
) -> Result<Json<Vec<ShiftResponse>>, PlatformError> {
    Ok(to_responses(state.shift_service.list_completed(&auth.user_id).await?))
}

/// Withdraw from a shift the caller is assigned to
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = "shifts",
    operation_id = "postApiShiftsCancel",
    params(
        ("id" = String, Path, description = "Shift ID")
    ),
    responses(
        (status = 200, description = "Assignment cancelled", body = MessageResponse),
        (status = 404, description = "Shift not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_assignment(
    State(state): State<ShiftsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, PlatformError> {
    state.shift_service.cancel_assignment(&id, &auth.user_id).await?;
    Ok(Json(MessageResponse::new("Shift assignment cancelled.")))
}

pub fn shifts_router(state: ShiftsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_shifts))
        .routes(routes!(apply_for_shift))
        .routes(routes!(list_assigned_shifts))
        .routes(routes!(list_completed_shifts))
        .routes(routes!(cancel_assignment))
        .with_state(state)
}
