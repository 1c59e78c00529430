use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::entities::pod;
use crate::db::services::{self, PodWithCount};
use crate::web::models::{PodListQuery, PodPayload, VpsServerResponse};
use crate::web::{AppError, AppState};

#[derive(Serialize)]
pub struct PodDetailResponse {
    #[serde(flatten)]
    pub pod: pod::Model,
    pub servers: Vec<VpsServerResponse>,
}

#[derive(Serialize)]
pub struct PodDeletedResponse {
    pub detached_servers: u64,
}

// --- Route Handlers ---

async fn list_pods_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<PodListQuery>,
) -> Result<Json<Vec<PodWithCount>>, AppError> {
    let pods = services::list_pods_with_count(&app_state.db_pool, query.q.as_deref()).await?;
    Ok(Json(pods))
}

async fn create_pod_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<PodPayload>,
) -> Result<(StatusCode, Json<pod::Model>), AppError> {
    let created = services::create_pod(&app_state.db_pool, payload.into()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_pod_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<PodDetailResponse>, AppError> {
    let (pod, servers) = services::get_pod_with_servers(&app_state.db_pool, &slug).await?;
    Ok(Json(PodDetailResponse {
        pod,
        servers: servers.into_iter().map(VpsServerResponse::summary).collect(),
    }))
}

async fn update_pod_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<PodPayload>,
) -> Result<Json<pod::Model>, AppError> {
    let updated = services::update_pod(&app_state.db_pool, &slug, payload.into()).await?;
    Ok(Json(updated))
}

async fn delete_pod_handler(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<PodDeletedResponse>, AppError> {
    let detached_servers = services::delete_pod(&app_state.db_pool, &slug).await?;
    Ok(Json(PodDeletedResponse { detached_servers }))
}

// --- Router ---

pub fn create_pods_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_pods_handler).post(create_pod_handler))
        .route(
            "/{slug}",
            get(get_pod_handler)
                .put(update_pod_handler)
                .delete(delete_pod_handler),
        )
}
