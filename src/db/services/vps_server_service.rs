use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::debug;

use crate::db::entities::{pod, vps_server};
use crate::db::enums::Provider;
use crate::db::services::{contains_ignore_case, icontains, is_unique_violation, search_in_sql};
use crate::db::slug::slugify;

pub const DEFAULT_SSH_USER: &str = "root";

#[derive(Debug, thiserror::Error)]
pub enum VpsError {
    #[error("Database error: {0}")]
    DbErr(DbErr),
    #[error("VPS server '{0}' not found")]
    NotFound(String),
    #[error("Unknown pod '{0}'")]
    UnknownPod(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<DbErr> for VpsError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            VpsError::Conflict("a VPS server with this code or slug already exists".to_string())
        } else {
            VpsError::DbErr(err)
        }
    }
}

/// Field changes for a VPS server.
///
/// `None` leaves the stored value untouched on update and falls back to the
/// column default on create. `main_ip` and `pod` are doubly optional so an
/// explicit empty value can clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpsChanges {
    pub slug: Option<String>,
    pub friendly_name: Option<String>,
    pub provider: Option<Provider>,
    pub package: Option<String>,
    pub main_ip: Option<Option<String>>,
    pub hostname: Option<String>,
    pub domain: Option<String>,
    pub webmail_url: Option<String>,
    pub panel_url: Option<String>,
    pub panel_username: Option<String>,
    pub panel_password: Option<String>,
    pub ssh_host: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_notes: Option<String>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
    /// Pod slug or name; `Some(None)` detaches the server from its pod.
    pub pod: Option<Option<String>>,
}

/// Query-string filters for the server list. Every supplied predicate must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpsFilter {
    pub q: Option<String>,
    pub provider: Option<String>,
    pub active: Option<String>,
    pub pod: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Normalises an IP column: blank means absent, anything else must be IPv4.
pub fn parse_main_ip(raw: &str) -> Result<Option<String>, VpsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<Ipv4Addr>()
        .map(|ip| Some(ip.to_string()))
        .map_err(|_| VpsError::InvalidInput(format!("'{trimmed}' is not a valid IPv4 address")))
}

/// Blank provider values fall back to IONOS.
pub fn parse_provider(raw: &str) -> Result<Provider, VpsError> {
    if raw.trim().is_empty() {
        return Ok(Provider::default());
    }
    raw.parse::<Provider>()
        .map_err(|e| VpsError::InvalidInput(e.to_string()))
}

pub fn ssh_user_or_default(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_SSH_USER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `active` query parameter: only the literal strings "true" and "false" filter.
fn parse_active_flag(raw: Option<&str>) -> Option<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "true" => Some(true),
        Some(v) if v == "false" => Some(false),
        _ => None,
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Resolves a pod reference by slug first, then by exact name.
pub async fn find_pod_by_ref<C: ConnectionTrait>(
    conn: &C,
    reference: &str,
) -> Result<Option<pod::Model>, DbErr> {
    if let Some(found) = pod::Entity::find()
        .filter(pod::Column::Slug.eq(reference))
        .one(conn)
        .await?
    {
        return Ok(Some(found));
    }
    pod::Entity::find()
        .filter(pod::Column::Name.eq(reference))
        .one(conn)
        .await
}

async fn resolve_pod_change<C: ConnectionTrait>(
    conn: &C,
    pod_change: &Option<Option<String>>,
) -> Result<Option<Option<i32>>, VpsError> {
    match pod_change {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(reference)) => {
            let found = find_pod_by_ref(conn, reference)
                .await?
                .ok_or_else(|| VpsError::UnknownPod(reference.clone()))?;
            Ok(Some(Some(found.id)))
        }
    }
}

/// Rejects slugs that would leave a server without a reachable URL.
fn require_slug(slug: &str, code: &str) -> Result<(), VpsError> {
    if slug.trim().is_empty() {
        return Err(VpsError::InvalidInput(format!(
            "cannot derive a slug from code '{code}'"
        )));
    }
    Ok(())
}

fn new_active_model(
    code: &str,
    changes: VpsChanges,
    pod_id: Option<i32>,
    default_is_active: bool,
) -> Result<vps_server::ActiveModel, VpsError> {
    let slug = match changes.slug.as_deref().map(str::trim) {
        Some(provided) if !provided.is_empty() => provided.to_string(),
        _ => slugify(code),
    };
    require_slug(&slug, code)?;

    let now = Utc::now();
    Ok(vps_server::ActiveModel {
        code: Set(code.to_owned()),
        slug: Set(slug),
        friendly_name: Set(changes.friendly_name.unwrap_or_default()),
        provider: Set(changes.provider.unwrap_or_default()),
        package: Set(changes.package.unwrap_or_default()),
        main_ip: Set(changes.main_ip.flatten()),
        hostname: Set(changes.hostname.unwrap_or_default()),
        domain: Set(changes.domain.unwrap_or_default()),
        webmail_url: Set(changes.webmail_url.unwrap_or_default()),
        panel_url: Set(changes.panel_url.unwrap_or_default()),
        panel_username: Set(changes.panel_username.unwrap_or_default()),
        panel_password: Set(changes.panel_password.unwrap_or_default()),
        ssh_host: Set(changes.ssh_host.unwrap_or_default()),
        ssh_user: Set(changes.ssh_user.unwrap_or_else(|| DEFAULT_SSH_USER.to_string())),
        ssh_notes: Set(changes.ssh_notes.unwrap_or_default()),
        is_active: Set(changes.is_active.unwrap_or(default_is_active)),
        notes: Set(changes.notes.unwrap_or_default()),
        pod_id: Set(pod_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    })
}

fn apply_changes(
    active_model: &mut vps_server::ActiveModel,
    changes: VpsChanges,
    pod_id: Option<Option<i32>>,
) {
    if let Some(v) = changes.slug {
        active_model.slug = Set(v);
    }
    if let Some(v) = changes.friendly_name {
        active_model.friendly_name = Set(v);
    }
    if let Some(v) = changes.provider {
        active_model.provider = Set(v);
    }
    if let Some(v) = changes.package {
        active_model.package = Set(v);
    }
    if let Some(v) = changes.main_ip {
        active_model.main_ip = Set(v);
    }
    if let Some(v) = changes.hostname {
        active_model.hostname = Set(v);
    }
    if let Some(v) = changes.domain {
        active_model.domain = Set(v);
    }
    if let Some(v) = changes.webmail_url {
        active_model.webmail_url = Set(v);
    }
    if let Some(v) = changes.panel_url {
        active_model.panel_url = Set(v);
    }
    if let Some(v) = changes.panel_username {
        active_model.panel_username = Set(v);
    }
    if let Some(v) = changes.panel_password {
        active_model.panel_password = Set(v);
    }
    if let Some(v) = changes.ssh_host {
        active_model.ssh_host = Set(v);
    }
    if let Some(v) = changes.ssh_user {
        active_model.ssh_user = Set(v);
    }
    if let Some(v) = changes.ssh_notes {
        active_model.ssh_notes = Set(v);
    }
    if let Some(v) = changes.is_active {
        active_model.is_active = Set(v);
    }
    if let Some(v) = changes.notes {
        active_model.notes = Set(v);
    }
    if let Some(v) = pod_id {
        active_model.pod_id = Set(v);
    }
    active_model.updated_at = Set(Utc::now());
}

// --- Queries ---

pub async fn list_vps_servers(
    db: &DatabaseConnection,
    filter: &VpsFilter,
) -> Result<Vec<vps_server::Model>, DbErr> {
    let mut query = vps_server::Entity::find();
    let search = non_blank(filter.q.as_ref());
    let sql_search = search_in_sql(db.get_database_backend());

    if let Some(q) = search.filter(|_| sql_search) {
        query = query.filter(
            Condition::any()
                .add(icontains(vps_server::Column::Code, q))
                .add(icontains(vps_server::Column::FriendlyName, q))
                .add(icontains(vps_server::Column::MainIp, q))
                .add(icontains(vps_server::Column::Hostname, q))
                .add(icontains(vps_server::Column::Domain, q)),
        );
    }

    if let Some(raw) = non_blank(filter.provider.as_ref()) {
        match raw.parse::<Provider>() {
            Ok(provider) => query = query.filter(vps_server::Column::Provider.eq(provider)),
            Err(_) => {
                debug!(provider = raw, "Unknown provider filter, returning no servers.");
                return Ok(Vec::new());
            }
        }
    }

    if let Some(active) = parse_active_flag(filter.active.as_deref()) {
        query = query.filter(vps_server::Column::IsActive.eq(active));
    }

    if let Some(pod_slug) = non_blank(filter.pod.as_ref()) {
        match pod::Entity::find()
            .filter(pod::Column::Slug.eq(pod_slug))
            .one(db)
            .await?
        {
            Some(found) => query = query.filter(vps_server::Column::PodId.eq(found.id)),
            None => return Ok(Vec::new()),
        }
    }

    let servers = query
        .order_by_asc(vps_server::Column::Code)
        .all(db)
        .await?;

    Ok(match search {
        Some(q) if !sql_search => servers
            .into_iter()
            .filter(|server| server_matches(server, q))
            .collect(),
        _ => servers,
    })
}

/// In-memory counterpart of the `q` condition built with [`icontains`].
fn server_matches(server: &vps_server::Model, q: &str) -> bool {
    [
        server.code.as_str(),
        server.friendly_name.as_str(),
        server.main_ip.as_deref().unwrap_or_default(),
        server.hostname.as_str(),
        server.domain.as_str(),
    ]
    .into_iter()
    .any(|field| contains_ignore_case(field, q))
}

pub async fn get_vps_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<vps_server::Model, VpsError> {
    vps_server::Entity::find()
        .filter(vps_server::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| VpsError::NotFound(slug.to_string()))
}

/// Server together with the pod it belongs to, for the detail view.
pub async fn get_vps_with_pod(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<(vps_server::Model, Option<pod::Model>), VpsError> {
    vps_server::Entity::find()
        .filter(vps_server::Column::Slug.eq(slug))
        .find_also_related(pod::Entity)
        .one(db)
        .await?
        .ok_or_else(|| VpsError::NotFound(slug.to_string()))
}

pub async fn count_vps_servers(db: &DatabaseConnection) -> Result<(u64, u64), DbErr> {
    use sea_orm::PaginatorTrait;

    let total = vps_server::Entity::find().count(db).await?;
    let active = vps_server::Entity::find()
        .filter(vps_server::Column::IsActive.eq(true))
        .count(db)
        .await?;
    Ok((total, active))
}

// --- Mutations ---

pub async fn create_vps(
    db: &DatabaseConnection,
    code: &str,
    changes: VpsChanges,
) -> Result<vps_server::Model, VpsError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(VpsError::InvalidInput("code must not be empty".to_string()));
    }

    let pod_id = resolve_pod_change(db, &changes.pod).await?.flatten();
    let created = new_active_model(code, changes, pod_id, true)?.insert(db).await?;
    Ok(created)
}

/// Updates the server found by `slug`. A new `code` may be supplied; a blank
/// slug in `changes` is re-derived from the resulting code.
pub async fn update_vps(
    db: &DatabaseConnection,
    slug: &str,
    new_code: Option<&str>,
    mut changes: VpsChanges,
) -> Result<vps_server::Model, VpsError> {
    let existing = get_vps_by_slug(db, slug).await?;
    let pod_id = resolve_pod_change(db, &changes.pod).await?;

    let code = match new_code.map(str::trim) {
        Some("") => return Err(VpsError::InvalidInput("code must not be empty".to_string())),
        Some(code) => code.to_string(),
        None => existing.code.clone(),
    };
    if matches!(changes.slug.as_deref().map(str::trim), Some("")) {
        changes.slug = Some(slugify(&code));
    }
    if let Some(slug) = changes.slug.as_deref() {
        require_slug(slug, &code)?;
    }

    let mut active_model = existing.into_active_model();
    active_model.code = Set(code);
    apply_changes(&mut active_model, changes, pod_id);
    Ok(active_model.update(db).await?)
}

pub async fn delete_vps(db: &DatabaseConnection, slug: &str) -> Result<(), VpsError> {
    let result = vps_server::Entity::delete_many()
        .filter(vps_server::Column::Slug.eq(slug))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(VpsError::NotFound(slug.to_string()));
    }
    Ok(())
}

/// Creates or updates the server keyed by `code` inside one transaction.
///
/// `default_is_active` applies only when a row is created and `changes`
/// carries no `is_active` value.
pub async fn upsert_by_code(
    db: &DatabaseConnection,
    code: &str,
    changes: VpsChanges,
    default_is_active: bool,
) -> Result<UpsertAction, VpsError> {
    let txn = db.begin().await?;

    let pod_id = resolve_pod_change(&txn, &changes.pod).await?;
    let existing = vps_server::Entity::find()
        .filter(vps_server::Column::Code.eq(code))
        .one(&txn)
        .await?;

    let action = match existing {
        Some(model) => {
            if let Some(slug) = changes.slug.as_deref() {
                require_slug(slug, code)?;
            }
            let mut active_model = model.into_active_model();
            apply_changes(&mut active_model, changes, pod_id);
            active_model.update(&txn).await?;
            UpsertAction::Updated
        }
        None => {
            new_active_model(code, changes, pod_id.flatten(), default_is_active)?
                .insert(&txn)
                .await?;
            UpsertAction::Created
        }
    };

    txn.commit().await?;
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_main_ip() {
        assert_eq!(parse_main_ip("  ").unwrap(), None);
        assert_eq!(
            parse_main_ip(" 74.208.171.116 ").unwrap(),
            Some("74.208.171.116".to_string())
        );
        assert!(matches!(parse_main_ip("not-an-ip"), Err(VpsError::InvalidInput(_))));
        assert!(parse_main_ip("2001:db8::1").is_err());
    }

    #[test]
    fn test_parse_provider_defaults_to_ionos() {
        assert_eq!(parse_provider("").unwrap(), Provider::Ionos);
        assert_eq!(parse_provider("contabo").unwrap(), Provider::Contabo);
        assert!(parse_provider("aws").is_err());
    }

    #[test]
    fn test_parse_active_flag_is_tri_state() {
        assert_eq!(parse_active_flag(Some("true")), Some(true));
        assert_eq!(parse_active_flag(Some("FALSE")), Some(false));
        assert_eq!(parse_active_flag(Some("yes")), None);
        assert_eq!(parse_active_flag(None), None);
    }

    #[test]
    fn test_new_active_model_requires_a_slug() {
        let err = new_active_model("###", VpsChanges::default(), None, true).unwrap_err();
        assert!(matches!(err, VpsError::InvalidInput(msg) if msg.contains("###")));

        let given = VpsChanges {
            slug: Some("hash-box".to_string()),
            ..Default::default()
        };
        assert!(new_active_model("###", given, None, true).is_ok());
    }

    #[test]
    fn test_ssh_user_default() {
        assert_eq!(ssh_user_or_default(""), "root");
        assert_eq!(ssh_user_or_default(" deploy "), "deploy");
    }
}
