use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use sea_orm::JoinType;
use serde::Serialize;
use tracing::info;

use crate::db::entities::{pod, vps_server};
use crate::db::services::{contains_ignore_case, icontains, is_unique_violation, search_in_sql};
use crate::db::slug::slug_or_derive;

#[derive(Debug, thiserror::Error)]
pub enum PodError {
    #[error("Database error: {0}")]
    DbErr(DbErr),
    #[error("Pod '{0}' not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<DbErr> for PodError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            PodError::Conflict("a pod with this name or slug already exists".to_string())
        } else {
            PodError::DbErr(err)
        }
    }
}

/// A pod plus the number of servers assigned to it.
#[derive(FromQueryResult, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PodWithCount {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub provider: String,
    pub purpose: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub server_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodInput {
    pub name: String,
    pub slug: Option<String>,
    pub provider: String,
    pub purpose: String,
    pub notes: String,
}

/// Lists pods ordered by name, each annotated with its server count.
/// `q` matches name, purpose or notes case-insensitively.
pub async fn list_pods_with_count(
    db: &DatabaseConnection,
    q: Option<&str>,
) -> Result<Vec<PodWithCount>, DbErr> {
    let mut query = pod::Entity::find()
        .column_as(
            Expr::col((vps_server::Entity, vps_server::Column::Id)).count(),
            "server_count",
        )
        .join(JoinType::LeftJoin, pod::Relation::VpsServer.def())
        .group_by(pod::Column::Id);

    let search = q.map(str::trim).filter(|q| !q.is_empty());
    let sql_search = search_in_sql(db.get_database_backend());

    if let Some(q) = search.filter(|_| sql_search) {
        query = query.filter(
            Condition::any()
                .add(icontains(pod::Column::Name, q))
                .add(icontains(pod::Column::Purpose, q))
                .add(icontains(pod::Column::Notes, q)),
        );
    }

    let pods = query
        .order_by_asc(pod::Column::Name)
        .into_model::<PodWithCount>()
        .all(db)
        .await?;

    Ok(match search {
        Some(q) if !sql_search => pods
            .into_iter()
            .filter(|p| {
                [&p.name, &p.purpose, &p.notes]
                    .into_iter()
                    .any(|field| contains_ignore_case(field, q))
            })
            .collect(),
        _ => pods,
    })
}

pub async fn count_pods(db: &DatabaseConnection) -> Result<u64, DbErr> {
    pod::Entity::find().count(db).await
}

pub async fn get_pod_by_slug(db: &DatabaseConnection, slug: &str) -> Result<pod::Model, PodError> {
    pod::Entity::find()
        .filter(pod::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| PodError::NotFound(slug.to_string()))
}

/// Fetches a pod and its member servers ordered by code.
pub async fn get_pod_with_servers(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<(pod::Model, Vec<vps_server::Model>), PodError> {
    let found = get_pod_by_slug(db, slug).await?;
    let servers = vps_server::Entity::find()
        .filter(vps_server::Column::PodId.eq(found.id))
        .order_by_asc(vps_server::Column::Code)
        .all(db)
        .await?;
    Ok((found, servers))
}

fn validate(input: &PodInput) -> Result<(String, String), PodError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(PodError::InvalidInput("name must not be empty".to_string()));
    }
    let slug = slug_or_derive(input.slug.as_deref(), name);
    if slug.is_empty() {
        return Err(PodError::InvalidInput(format!(
            "cannot derive a slug from name '{name}'"
        )));
    }
    Ok((name.to_string(), slug))
}

pub async fn create_pod(db: &DatabaseConnection, input: PodInput) -> Result<pod::Model, PodError> {
    let (name, slug) = validate(&input)?;
    let now = Utc::now();

    let new_pod = pod::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        provider: Set(input.provider.trim().to_string()),
        purpose: Set(input.purpose.trim().to_string()),
        notes: Set(input.notes.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(new_pod.insert(db).await?)
}

pub async fn update_pod(
    db: &DatabaseConnection,
    slug: &str,
    input: PodInput,
) -> Result<pod::Model, PodError> {
    let existing = get_pod_by_slug(db, slug).await?;
    let (name, new_slug) = validate(&input)?;

    let mut active_model = existing.into_active_model();
    active_model.name = Set(name);
    active_model.slug = Set(new_slug);
    active_model.provider = Set(input.provider.trim().to_string());
    active_model.purpose = Set(input.purpose.trim().to_string());
    active_model.notes = Set(input.notes.trim().to_string());
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

/// Deletes a pod. Member servers are detached, never deleted.
/// Returns how many servers were detached.
pub async fn delete_pod(db: &DatabaseConnection, slug: &str) -> Result<u64, PodError> {
    let pod_id = get_pod_by_slug(db, slug).await?.id;

    let detached = db
        .transaction::<_, u64, DbErr>(|txn| {
            Box::pin(async move {
                let detached = vps_server::Entity::update_many()
                    .col_expr(vps_server::Column::PodId, Expr::value(Option::<i32>::None))
                    .col_expr(vps_server::Column::UpdatedAt, Expr::value(Utc::now()))
                    .filter(vps_server::Column::PodId.eq(pod_id))
                    .exec(txn)
                    .await?
                    .rows_affected;

                pod::Entity::delete_by_id(pod_id).exec(txn).await?;
                Ok(detached)
            })
        })
        .await
        .map_err(|e| match e {
            sea_orm::TransactionError::Connection(db_err) => PodError::from(db_err),
            sea_orm::TransactionError::Transaction(db_err) => PodError::from(db_err),
        })?;

    info!(pod = slug, detached_servers = detached, "Pod deleted.");
    Ok(detached)
}
