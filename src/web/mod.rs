use axum::{http::Method, routing::get, Router};
use rust_embed::RustEmbed;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::config::ServerConfig;
use crate::web::routes::*;

pub mod error;
pub mod models;
pub mod routes;

pub use error::{AppError, PageError};

#[derive(RustEmbed, Clone)]
#[folder = "templates"]
pub struct Templates;

/// Compiles every embedded template into one `Tera` instance.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut sources = Vec::new();
    for name in Templates::iter() {
        let Some(file) = Templates::get(&name) else {
            continue;
        };
        let source = String::from_utf8(file.data.into_owned())
            .map_err(|e| tera::Error::msg(format!("template {name} is not UTF-8: {e}")))?;
        sources.push((name.to_string(), source));
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(sources)?;
    Ok(tera)
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub templates: Arc<Tera>,
    pub config: Arc<ServerConfig>,
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(
    db_pool: DatabaseConnection,
    config: Arc<ServerConfig>,
) -> Result<Router, tera::Error> {
    let app_state = Arc::new(AppState {
        db_pool,
        templates: Arc::new(load_templates()?),
        config,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Ok(Router::new()
        .route("/api/health", get(health_check_handler))
        .nest("/api/pods", create_pods_router())
        .nest("/api/vps", vps_router())
        .merge(page_router())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
