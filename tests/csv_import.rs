mod common;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use vps_inventory::db::entities::vps_server;
use vps_inventory::db::enums::Provider;
use vps_inventory::db::services::{self, PodInput, import_vps_csv};

use common::build_test_context;

const SAMPLE: &str = "code,friendly_name,provider,main_ip,hostname,is_active,ssh_user\n\
DS1-VPS-XS,cesserver1,IONOS,74.208.171.116,mail1.example.com,Yes,\n\
DS2-VPS-S,cesserver2,CONTABO,80.1.2.3,mail2.example.com,0,deploy\n";

async fn find_by_code(db: &sea_orm::DatabaseConnection, code: &str) -> Option<vps_server::Model> {
    vps_server::Entity::find()
        .filter(vps_server::Column::Code.eq(code))
        .one(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_reimport_is_idempotent() {
    let ctx = build_test_context().await;

    let first = import_vps_csv(&ctx.db, SAMPLE.as_bytes()).await.unwrap();
    assert_eq!(first.created, 2);
    assert_eq!(first.updated, 0);
    let before = find_by_code(&ctx.db, "DS2-VPS-S").await.unwrap();

    let second = import_vps_csv(&ctx.db, SAMPLE.as_bytes()).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 2);
    assert!(second.failed.is_empty());

    let after = find_by_code(&ctx.db, "DS2-VPS-S").await.unwrap();
    assert_eq!(before.id, after.id);
    assert_eq!(before.slug, after.slug);
    assert_eq!(after.provider, Provider::Contabo);
    assert_eq!(after.ssh_user, "deploy");
    assert!(!after.is_active);

    let first_row = find_by_code(&ctx.db, "DS1-VPS-XS").await.unwrap();
    assert!(first_row.is_active);
    assert_eq!(first_row.slug, "ds1-vps-xs");
    assert_eq!(first_row.main_ip.as_deref(), Some("74.208.171.116"));
}

#[tokio::test]
async fn test_code_only_row_uses_defaults() {
    let ctx = build_test_context().await;
    let csv = "code,friendly_name,provider,ssh_user,is_active\nABC123,,,,\n";

    let report = import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();
    assert_eq!(report.created, 1);

    let server = find_by_code(&ctx.db, "ABC123").await.unwrap();
    assert_eq!(server.provider, Provider::Ionos);
    assert_eq!(server.ssh_user, "root");
    assert!(!server.is_active);
    assert_eq!(server.slug, "abc123");
    assert_eq!(server.main_ip, None);
}

#[tokio::test]
async fn test_missing_is_active_column_creates_inactive() {
    let ctx = build_test_context().await;
    import_vps_csv(&ctx.db, b"code\nONLY-CODE\n").await.unwrap();
    let server = find_by_code(&ctx.db, "ONLY-CODE").await.unwrap();
    assert!(!server.is_active);
    assert_eq!(server.ssh_user, "root");
}

#[tokio::test]
async fn test_bom_header_still_yields_code() {
    let ctx = build_test_context().await;
    let csv = "\u{feff}Code,friendly_name\nBOM-1,First\n";

    let report = import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 0);
    assert!(find_by_code(&ctx.db, "BOM-1").await.is_some());
}

#[tokio::test]
async fn test_empty_code_rows_are_skipped_with_warning() {
    let ctx = build_test_context().await;
    let csv = "code,friendly_name\n,nameless\n  ,blank\nREAL-1,real\n";

    let report = import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 2);
    let warning = report.missing_code_warning.unwrap();
    assert!(warning.contains("\"friendly_name\""));

    let all = vps_server::Entity::find().all(&ctx.db).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_wrong_code_header_skips_everything() {
    let ctx = build_test_context().await;
    let report = import_vps_csv(&ctx.db, b"server_code,name\nA,B\n").await.unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.skipped, 1);
    assert!(report.missing_code_warning.is_some());
}

#[tokio::test]
async fn test_is_active_values() {
    let ctx = build_test_context().await;
    let csv = "code,is_active\nA-YES,Yes\nA-ZERO,0\nA-MAYBE,maybe\nA-Y,y\n";
    import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();

    assert!(find_by_code(&ctx.db, "A-YES").await.unwrap().is_active);
    assert!(!find_by_code(&ctx.db, "A-ZERO").await.unwrap().is_active);
    assert!(!find_by_code(&ctx.db, "A-MAYBE").await.unwrap().is_active);
    assert!(find_by_code(&ctx.db, "A-Y").await.unwrap().is_active);
}

#[tokio::test]
async fn test_absent_column_is_preserved_on_update() {
    let ctx = build_test_context().await;
    import_vps_csv(&ctx.db, b"code,hostname,notes\nKEEP-1,host.example.com,first\n")
        .await
        .unwrap();

    let report = import_vps_csv(&ctx.db, b"code,notes\nKEEP-1,second\n")
        .await
        .unwrap();
    assert_eq!(report.updated, 1);

    let server = find_by_code(&ctx.db, "KEEP-1").await.unwrap();
    assert_eq!(server.hostname, "host.example.com");
    assert_eq!(server.notes, "second");
}

#[tokio::test]
async fn test_empty_column_resets_on_update() {
    let ctx = build_test_context().await;
    import_vps_csv(&ctx.db, b"code,hostname,ssh_user\nRESET-1,host.example.com,deploy\n")
        .await
        .unwrap();
    import_vps_csv(&ctx.db, b"code,hostname,ssh_user\nRESET-1,,\n")
        .await
        .unwrap();

    let server = find_by_code(&ctx.db, "RESET-1").await.unwrap();
    assert_eq!(server.hostname, "");
    assert_eq!(server.ssh_user, "root");
}

#[tokio::test]
async fn test_failed_row_does_not_stop_import() {
    let ctx = build_test_context().await;
    let csv = "code,main_ip,provider\nGOOD-1,10.0.0.1,\nBAD-IP,not-an-ip,\nBAD-PROV,,aws\nGOOD-2,,contabo\n";

    let report = import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(report.failed[0].line, 3);
    assert_eq!(report.failed[0].code.as_deref(), Some("BAD-IP"));
    assert_eq!(report.total_rows(), 4);

    assert!(find_by_code(&ctx.db, "GOOD-2").await.is_some());
    assert!(find_by_code(&ctx.db, "BAD-IP").await.is_none());
}

#[tokio::test]
async fn test_pod_column_assigns_and_unknown_pod_fails_row() {
    let ctx = build_test_context().await;
    let pod = services::create_pod(
        &ctx.db,
        PodInput {
            name: "Mail Pod".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let csv = "code,pod\nIN-POD,mail-pod\nBY-NAME,Mail Pod\nLOST,nowhere\n";
    let report = import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].code.as_deref(), Some("LOST"));

    assert_eq!(find_by_code(&ctx.db, "IN-POD").await.unwrap().pod_id, Some(pod.id));
    assert_eq!(find_by_code(&ctx.db, "BY-NAME").await.unwrap().pod_id, Some(pod.id));
}

#[tokio::test]
async fn test_duplicate_slug_is_reported_as_failure() {
    let ctx = build_test_context().await;
    let csv = "code,slug\nFIRST,shared\nSECOND,shared\n";

    let report = import_vps_csv(&ctx.db, csv.as_bytes()).await.unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].error.contains("Conflict"));
}

#[tokio::test]
async fn test_code_without_slug_characters_is_rejected() {
    let ctx = build_test_context().await;
    let report = import_vps_csv(&ctx.db, b"code\n###\n+++\n").await.unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.failed.len(), 2);
    for failure in &report.failed {
        assert!(failure.error.contains("cannot derive a slug"), "{}", failure.error);
    }

    let with_slug = import_vps_csv(&ctx.db, b"code,slug\n###,hash-box\n").await.unwrap();
    assert_eq!(with_slug.created, 1);
    assert_eq!(find_by_code(&ctx.db, "###").await.unwrap().slug, "hash-box");

    let blank_slug = import_vps_csv(&ctx.db, b"code,slug\n###,\n").await.unwrap();
    assert_eq!(blank_slug.failed.len(), 1);
    assert_eq!(find_by_code(&ctx.db, "###").await.unwrap().slug, "hash-box");
}
