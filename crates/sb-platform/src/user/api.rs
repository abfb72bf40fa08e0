//! Volunteers Admin API
//!
//! Organizer-only endpoints for listing and removing volunteer accounts.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::api_common::MessageResponse;
use crate::shared::authorization::caps;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authorized;
use crate::user::entity::{Role, User};
use crate::user::repository::UserRepository;

/// User without credentials
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub contact: String,
    pub profile_picture: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            name: user.name,
            email: user.email,
            contact: user.contact,
            profile_picture: user.profile_picture,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

/// Contact details shown to organizers alongside shift membership
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummaryResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub contact: String,
}

impl From<User> for UserSummaryResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            contact: user.contact,
        }
    }
}

#[derive(Clone)]
pub struct VolunteersState {
    pub user_repo: Arc<dyn UserRepository>,
}

/// List volunteer accounts
#[utoipa::path(
    get,
    path = "",
    tag = "admin-volunteers",
    operation_id = "getApiAdminVolunteers",
    responses(
        (status = 200, description = "Volunteer accounts", body = Vec<UserResponse>),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_volunteers(
    State(state): State<VolunteersState>,
    _auth: Authorized<caps::ManageVolunteers>,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    let volunteers = state.user_repo.find_by_role(Role::Volunteer).await?;
    Ok(Json(volunteers.into_iter().map(UserResponse::from).collect()))
}

/// Delete a volunteer account
///
/// Only volunteer-role accounts can be removed here. Shifts keep any
/// references to the deleted user.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "admin-volunteers",
    operation_id = "deleteApiAdminVolunteer",
    params(
        ("id" = String, Path, description = "Volunteer user ID")
    ),
    responses(
        (status = 200, description = "Volunteer deleted", body = MessageResponse),
        (status = 404, description = "Volunteer not found"),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_volunteer(
    State(state): State<VolunteersState>,
    auth: Authorized<caps::ManageVolunteers>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, PlatformError> {
    let is_volunteer = state.user_repo
        .find_by_id(&id)
        .await?
        .is_some_and(|user| user.role == Role::Volunteer);
    if !is_volunteer || !state.user_repo.delete(&id).await? {
        return Err(PlatformError::not_found("Volunteer", id));
    }

    info!(user_id = %id, deleted_by = %auth.user_id, "Volunteer deleted");
    Ok(Json(MessageResponse::new("Volunteer deleted successfully")))
}

pub fn volunteers_router(state: VolunteersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_volunteers))
        .routes(routes!(delete_volunteer))
        .with_state(state)
}
