use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::Provider;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vps_servers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Short label such as `DS1-VPS-XS`; the upsert key for CSV imports.
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub friendly_name: String,
    pub provider: Provider,
    pub package: String,
    pub main_ip: Option<String>,
    pub hostname: String,
    pub domain: String,
    pub webmail_url: String,
    pub panel_url: String,
    pub panel_username: String,
    // Plaintext. Only exposed by detail views.
    pub panel_password: String,
    pub ssh_host: String,
    pub ssh_user: String,
    pub ssh_notes: String,
    pub is_active: bool,
    pub notes: String,
    pub pod_id: Option<i32>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pod::Entity",
        from = "Column::PodId",
        to = "super::pod::Column::Id",
        on_delete = "SetNull",
        on_update = "Cascade"
    )]
    Pod,
}

impl Related<super::pod::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
