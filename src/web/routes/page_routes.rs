//! Server-rendered HTML pages.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use crate::db::enums::Provider;
use crate::db::services;
use crate::version::VERSION;
use crate::web::error::PageError;
use crate::web::models::{PodListQuery, VpsListQuery, VpsServerResponse};
use crate::web::routes::import_routes::read_csv_upload;
use crate::web::AppState;

#[derive(Serialize)]
struct ProviderOption {
    value: &'static str,
    label: &'static str,
}

fn provider_options() -> Vec<ProviderOption> {
    [Provider::Ionos, Provider::Contabo, Provider::Other]
        .into_iter()
        .map(|p| ProviderOption {
            value: p.as_str(),
            label: p.label(),
        })
        .collect()
}

fn page_context(active_nav: &str, title: &str) -> Context {
    let mut context = Context::new();
    context.insert("active_nav", active_nav);
    context.insert("title", title);
    context
}

fn render(app_state: &AppState, template: &str, context: &Context) -> Result<Html<String>, PageError> {
    Ok(Html(app_state.templates.render(template, context)?))
}

async fn dashboard_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let (total, active) = services::count_vps_servers(&app_state.db_pool).await?;
    let pods = services::count_pods(&app_state.db_pool).await?;

    let mut context = page_context("dashboard", "Dashboard");
    context.insert("server_count", &total);
    context.insert("active_count", &active);
    context.insert("pod_count", &pods);
    render(&app_state, "dashboard.html", &context)
}

async fn devices_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let (total, active) = services::count_vps_servers(&app_state.db_pool).await?;
    let mut context = page_context("devices", "Devices");
    context.insert("server_count", &total);
    context.insert("active_count", &active);
    render(&app_state, "devices.html", &context)
}

async fn vps_list_page(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<VpsListQuery>,
) -> Result<Html<String>, PageError> {
    let servers = services::list_vps_servers(&app_state.db_pool, &query.clone().into()).await?;
    let pods = services::list_pods_with_count(&app_state.db_pool, None).await?;

    let mut context = page_context("devices", "VPS servers");
    context.insert(
        "servers",
        &servers
            .into_iter()
            .map(VpsServerResponse::summary)
            .collect::<Vec<_>>(),
    );
    context.insert("filter_q", query.q.as_deref().unwrap_or_default());
    context.insert("filter_provider", query.provider.as_deref().unwrap_or_default());
    context.insert("filter_active", query.active.as_deref().unwrap_or_default());
    context.insert("filter_pod", query.pod.as_deref().unwrap_or_default());
    context.insert("providers", &provider_options());
    context.insert("pods", &pods);
    render(&app_state, "vps_list.html", &context)
}

async fn vps_detail_page(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let (server, pod) = services::get_vps_with_pod(&app_state.db_pool, &slug).await?;
    let provider_label = server.provider.label();

    let mut context = page_context("devices", &server.code);
    context.insert("server", &VpsServerResponse::detail(server));
    context.insert("provider_label", provider_label);
    context.insert("pod", &pod);
    render(&app_state, "vps_detail.html", &context)
}

async fn pods_page(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<PodListQuery>,
) -> Result<Html<String>, PageError> {
    let pods = services::list_pods_with_count(&app_state.db_pool, query.q.as_deref()).await?;
    let mut context = page_context("pods", "Pods");
    context.insert("pods", &pods);
    context.insert("q", &query.q.unwrap_or_default());
    render(&app_state, "pods.html", &context)
}

async fn pod_detail_page(
    State(app_state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Html<String>, PageError> {
    let (pod, servers) = services::get_pod_with_servers(&app_state.db_pool, &slug).await?;
    let mut context = page_context("pods", &pod.name);
    context.insert("pod", &pod);
    context.insert(
        "servers",
        &servers
            .into_iter()
            .map(VpsServerResponse::summary)
            .collect::<Vec<_>>(),
    );
    render(&app_state, "pod_detail.html", &context)
}

fn placeholder(app_state: &AppState, nav: &str, title: &str) -> Result<Html<String>, PageError> {
    render(app_state, "placeholder.html", &page_context(nav, title))
}

async fn monitoring_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    placeholder(&app_state, "monitoring", "Monitoring")
}

async fn provisioning_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    placeholder(&app_state, "provisioning", "Provisioning")
}

async fn jobs_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    placeholder(&app_state, "jobs", "Jobs")
}

async fn docs_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    placeholder(&app_state, "docs", "Docs")
}

async fn settings_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let config = &app_state.config;
    let backend = if config.uses_sqlite() { "SQLite" } else { "PostgreSQL" };

    let mut context = page_context("settings", "Settings");
    context.insert("version", VERSION);
    context.insert("database_backend", backend);
    context.insert("http_addr", &config.http_addr);
    context.insert("data_dir", &config.data_dir);
    context.insert("log_dir", &config.log_dir);
    context.insert("max_db_connections", &config.max_db_connections);
    render(&app_state, "settings.html", &context)
}

async fn import_form_page(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    render(&app_state, "import_csv.html", &page_context("devices", "Import VPS from CSV"))
}

async fn import_submit_page(
    State(app_state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PageError> {
    let upload = match multipart {
        Ok(multipart) => read_csv_upload(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };

    let mut context = page_context("devices", "Import VPS from CSV");
    let bytes = match upload {
        Ok(bytes) => bytes,
        Err(message) => {
            context.insert("form_error", &message);
            let page = render(&app_state, "import_csv.html", &context)?;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    let report = services::import_vps_csv(&app_state.db_pool, &bytes).await?;
    context.insert("total_rows", &report.total_rows());
    context.insert("report", &report);
    Ok(render(&app_state, "import_csv.html", &context)?.into_response())
}

pub fn page_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/monitoring/", get(monitoring_page))
        .route("/devices/", get(devices_page))
        .route("/devices/vps/", get(vps_list_page))
        .route("/devices/vps/{slug}/", get(vps_detail_page))
        .route("/pods/", get(pods_page))
        .route("/pods/{slug}/", get(pod_detail_page))
        .route("/provisioning/", get(provisioning_page))
        .route("/jobs/", get(jobs_page))
        .route("/docs/", get(docs_page))
        .route("/settings/", get(settings_page))
        .route(
            "/admin/vps/import-csv/",
            get(import_form_page).post(import_submit_page),
        )
}
