use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use service::{repo::seaorm::SeaOrmStore, services::Services};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) first; without a readable file, env vars.
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => AppConfig::from_env().map_err(|env_err| {
            StartupError::InvalidConfig(format!("config file: {file_err}; environment: {env_err}"))
        }),
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Router over a ready service set; shared by `run` and the HTTP tests.
pub fn app(services: Services) -> Router {
    routes::build_router(AppState { services }, build_cors())
}

/// Public entry: load config, migrate, build the app and serve.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = load_config()?;
    if cfg.logging.json { init_logging_json() } else { init_logging_default() }

    let db = models::db::connect_with_config(&cfg.database).await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        warn!(error = %e, "migrations failed");
        return Err(e.into());
    }

    let services = Services::from_store(Arc::new(SeaOrmStore::new(db)));
    let app = app(services);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
