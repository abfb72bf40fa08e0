//! ShiftBoard Platform Server
//!
//! REST APIs for volunteer shift coordination:
//! - Auth APIs: register, login, profile
//! - Shift APIs: browse, apply, own assignments
//! - Admin APIs: shift management, volunteers, statistics
//!
//! ## Configuration
//!
//! Read from `config.toml` (or `SHIFTBOARD_CONFIG`), then overridden by
//! environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SHIFTBOARD_HTTP_PORT` | `5000` | HTTP API port |
//! | `SHIFTBOARD_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `SHIFTBOARD_MONGODB_DATABASE` | `shiftboard` | MongoDB database name |
//! | `SHIFTBOARD_STORE_BACKEND` | `mongodb` | `mongodb` or `memory` |
//! | `SHIFTBOARD_JWT_SECRET` | - | HS256 signing secret (required outside dev mode) |
//! | `SHIFTBOARD_DEV_MODE` | `false` | Seed admin account and sample shifts |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `RUST_LOG` | `info` | Log level |

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowHeaders, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use sb_config::{AppConfig, StoreBackend};
use sb_platform::auth::Argon2Config;
use sb_platform::shared::{health_router, HealthState};
use sb_platform::{api_router, initialize_indexes, PlatformServices};

#[tokio::main]
async fn main() -> Result<()> {
    sb_common::logging::init_logging("sb-platform-server");

    info!("Starting ShiftBoard Platform Server");

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.auth.jwt_secret.is_empty() {
        warn!("No JWT secret configured, using the development secret");
    }

    let (services, db) = match config.store.backend {
        StoreBackend::Mongodb => {
            info!(uri = %config.mongodb.uri, database = %config.mongodb.database, "Connecting to MongoDB");
            let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = client.database(&config.mongodb.database);
            initialize_indexes(&db).await?;
            let services = PlatformServices::with_mongodb(&config, &db, Argon2Config::default())?;
            (services, Some(db))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            (PlatformServices::in_memory(&config, Argon2Config::default())?, None)
        }
    };

    if config.dev_mode {
        services.dev_seeder().seed(&config.seed).await?;
    }

    let health_state = HealthState::new(db, env!("CARGO_PKG_VERSION"));
    let (api, openapi) = api_router(&services);

    let app = Router::new()
        .merge(api)
        .merge(health_router(health_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    health_state.set_ready();
    info!("API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ShiftBoard Platform Server shutdown complete");
    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config.http.cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
