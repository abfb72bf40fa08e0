//! Service wiring and the `/api` router
//!
//! The server binary and the HTTP tests both assemble the application
//! through `PlatformServices` and `api_router`, so they exercise the same
//! routes, extractors and layers.

use std::sync::Arc;

use axum::Router;
use sb_config::AppConfig;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::auth::account_service::AccountService;
use crate::auth::auth_api::{auth_router, AuthState};
use crate::auth::auth_service::{AuthService, TokenConfig};
use crate::auth::password_service::{Argon2Config, PasswordPolicy, PasswordService};
use crate::seed::DevDataSeeder;
use crate::shared::error::Result;
use crate::shared::middleware::{AppState, AuthLayer};
use crate::shift::admin_api::admin_shifts_router;
use crate::shift::api::{shifts_router, ShiftsState};
use crate::shift::repository::{InMemoryShiftRepository, MongoShiftRepository, ShiftRepository};
use crate::shift::service::ShiftService;
use crate::statistics::aggregator::StatisticsService;
use crate::statistics::api::{statistics_router, StatisticsState};
use crate::user::api::{volunteers_router, VolunteersState};
use crate::user::repository::{InMemoryUserRepository, MongoUserRepository, UserRepository};

/// Shared services behind the HTTP layer
#[derive(Clone)]
pub struct PlatformServices {
    pub user_repo: Arc<dyn UserRepository>,
    pub shift_repo: Arc<dyn ShiftRepository>,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub account_service: Arc<AccountService>,
    pub shift_service: Arc<ShiftService>,
    pub statistics_service: Arc<StatisticsService>,
}

impl PlatformServices {
    pub fn new(
        config: &AppConfig,
        user_repo: Arc<dyn UserRepository>,
        shift_repo: Arc<dyn ShiftRepository>,
        argon2: Argon2Config,
    ) -> Result<Self> {
        let auth_service = Arc::new(AuthService::new(TokenConfig::from(&config.auth)));
        let password_service = Arc::new(PasswordService::new(
            argon2,
            PasswordPolicy {
                min_length: config.auth.password_min_length,
                max_length: config.auth.password_max_length,
            },
        )?);

        let account_service = Arc::new(
            AccountService::new(user_repo.clone(), password_service.clone(), auth_service.clone())
                .with_privileged_registration(config.auth.allow_privileged_self_registration),
        );
        let shift_service = Arc::new(
            ShiftService::new(shift_repo.clone(), user_repo.clone())
                .with_max_attempts(config.store.cas_max_attempts),
        );
        let statistics_service = Arc::new(StatisticsService::new(user_repo.clone(), shift_repo.clone()));

        Ok(Self {
            user_repo,
            shift_repo,
            auth_service,
            password_service,
            account_service,
            shift_service,
            statistics_service,
        })
    }

    /// Services over MongoDB collections
    pub fn with_mongodb(config: &AppConfig, db: &mongodb::Database, argon2: Argon2Config) -> Result<Self> {
        Self::new(
            config,
            Arc::new(MongoUserRepository::new(db)),
            Arc::new(MongoShiftRepository::new(db)),
            argon2,
        )
    }

    /// Services over process-local stores
    pub fn in_memory(config: &AppConfig, argon2: Argon2Config) -> Result<Self> {
        Self::new(
            config,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryShiftRepository::new()),
            argon2,
        )
    }

    pub fn dev_seeder(&self) -> DevDataSeeder {
        DevDataSeeder::new(
            self.user_repo.clone(),
            self.shift_repo.clone(),
            self.password_service.clone(),
        )
    }
}

/// Build the `/api` router and its OpenAPI document
pub fn api_router(services: &PlatformServices) -> (Router, OpenApi) {
    let shifts_state = ShiftsState {
        shift_service: services.shift_service.clone(),
    };

    let (router, mut openapi) = OpenApiRouter::new()
        .nest(
            "/api/auth",
            auth_router(AuthState {
                account_service: services.account_service.clone(),
            }),
        )
        .nest("/api/shifts", shifts_router(shifts_state.clone()))
        .nest("/api/admin/shifts", admin_shifts_router(shifts_state))
        .nest(
            "/api/admin/volunteers",
            volunteers_router(VolunteersState {
                user_repo: services.user_repo.clone(),
            }),
        )
        .nest(
            "/api/admin/statistics",
            statistics_router(StatisticsState {
                statistics_service: services.statistics_service.clone(),
            }),
        )
        .split_for_parts();

    openapi.info.title = "ShiftBoard API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Volunteer shift coordination".to_string());
    openapi
        .components
        .get_or_insert_with(Default::default)
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );

    let app_state = AppState {
        auth_service: services.auth_service.clone(),
    };
    let router = router.layer(AuthLayer::new(app_state));

    (router, openapi)
}
