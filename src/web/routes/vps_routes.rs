use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::db::services::{self, ImportReport};
use crate::web::models::{VpsListQuery, VpsServerPayload, VpsServerResponse};
use crate::web::routes::import_routes::read_csv_upload;
use crate::web::{AppError, AppState};

async fn list_vps_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<VpsListQuery>,
) -> Result<Json<Vec<VpsServerResponse>>, AppError> {
    let servers = services::list_vps_servers(&app_state.db_pool, &query.into()).await?;
    Ok(Json(servers.into_iter().map(VpsServerResponse::summary).collect()))
}

async fn create_vps_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<VpsServerPayload>,
) -> Result<(StatusCode, Json<VpsServerResponse>), AppError> {
    let (code, changes) = payload.into_parts()?;
    let code = code.ok_or_else(|| AppError::InvalidInput("code is required".to_string()))?;
    let created = services::create_vps(&app_state.db_pool, &code, changes).await?;
    Ok((StatusCode::CREATED, Json(VpsServerResponse::detail(created))))
}

async fn get_vps_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<VpsServerResponse>, AppError> {
    let server = services::get_vps_by_slug(&app_state.db_pool, &slug).await?;
    Ok(Json(VpsServerResponse::detail(server)))
}

async fn update_vps_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<VpsServerPayload>,
) -> Result<Json<VpsServerResponse>, AppError> {
    let (code, changes) = payload.into_parts()?;
    let updated =
        services::update_vps(&app_state.db_pool, &slug, code.as_deref(), changes).await?;
    Ok(Json(VpsServerResponse::detail(updated)))
}

async fn delete_vps_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    services::delete_vps(&app_state.db_pool, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn import_csv_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ImportReport>, AppError> {
    let bytes = read_csv_upload(multipart).await.map_err(AppError::InvalidInput)?;
    let report = services::import_vps_csv(&app_state.db_pool, &bytes).await?;
    Ok(Json(report))
}

pub fn vps_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_vps_handler).post(create_vps_handler))
        .route("/import", post(import_csv_handler))
        .route(
            "/{slug}",
            get(get_vps_handler)
                .put(update_vps_handler)
                .delete(delete_vps_handler),
        )
}
