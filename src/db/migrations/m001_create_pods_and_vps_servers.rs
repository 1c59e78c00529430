use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_create_pods_and_vps_servers"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pods::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Pods::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Pods::Provider).string().not_null().default(""))
                    .col(ColumnDef::new(Pods::Purpose).string().not_null().default(""))
                    .col(ColumnDef::new(Pods::Notes).text().not_null().default(""))
                    .col(ColumnDef::new(Pods::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Pods::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VpsServers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VpsServers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VpsServers::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(VpsServers::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(VpsServers::FriendlyName).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::Provider).string().not_null().default("IONOS"))
                    .col(ColumnDef::new(VpsServers::Package).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::MainIp).string().null())
                    .col(ColumnDef::new(VpsServers::Hostname).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::Domain).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::WebmailUrl).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::PanelUrl).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::PanelUsername).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::PanelPassword).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::SshHost).string().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::SshUser).string().not_null().default("root"))
                    .col(ColumnDef::new(VpsServers::SshNotes).text().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(VpsServers::Notes).text().not_null().default(""))
                    .col(ColumnDef::new(VpsServers::PodId).integer().null())
                    .col(ColumnDef::new(VpsServers::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(VpsServers::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vps_servers_pod_id")
                            .from(VpsServers::Table, VpsServers::PodId)
                            .to(Pods::Table, Pods::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Pod detail and the `pod` list filter both look servers up by pod.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_vps_servers_pod_id")
                    .table(VpsServers::Table)
                    .col(VpsServers::PodId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VpsServers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pods::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Pods {
    Table,
    Id,
    Name,
    Slug,
    Provider,
    Purpose,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VpsServers {
    Table,
    Id,
    Code,
    Slug,
    FriendlyName,
    Provider,
    Package,
    MainIp,
    Hostname,
    Domain,
    WebmailUrl,
    PanelUrl,
    PanelUsername,
    PanelPassword,
    SshHost,
    SshUser,
    SshNotes,
    IsActive,
    Notes,
    PodId,
    CreatedAt,
    UpdatedAt,
}
