//! Statistics Admin API

use std::sync::Arc;

use axum::{extract::State, Json};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::shared::authorization::caps;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authorized;
use crate::statistics::aggregator::{Statistics, StatisticsService};

#[derive(Clone)]
pub struct StatisticsState {
    pub statistics_service: Arc<StatisticsService>,
}

/// Aggregate participation metrics
#[utoipa::path(
    get,
    path = "",
    tag = "admin-statistics",
    operation_id = "getApiAdminStatistics",
    responses(
        (status = 200, description = "Volunteer and shift statistics", body = Statistics),
        (status = 403, description = "Organizer role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_statistics(
    State(state): State<StatisticsState>,
    _auth: Authorized<caps::ViewStatistics>,
) -> Result<Json<Statistics>, PlatformError> {
    Ok(Json(state.statistics_service.compute().await?))
}

pub fn statistics_router(state: StatisticsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_statistics))
        .with_state(state)
}
