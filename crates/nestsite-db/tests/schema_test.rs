//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    nestsite_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "agency",
        "tenant",
        "property",
        "site_domain",
        "user",
        "membership",
        "room",
        "property_host",
        "pricing_rule",
        "media_asset",
        "content_block",
        "_migration",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    nestsite_db::run_migrations(&db).await.unwrap();
    nestsite_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_hostnames() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    nestsite_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE site_domain SET \
         property_id = 'p1', tenant_id = 't1', \
         hostname = 'casa.example', is_primary = true",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let result = db
        .query(
            "CREATE site_domain SET \
             property_id = 'p2', tenant_id = 't2', \
             hostname = 'casa.example', is_primary = false",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate hostname should be rejected");
}

#[tokio::test]
async fn status_assertion_rejects_unknown_values() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    nestsite_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE property SET \
             tenant_id = 't1', slug = 'casa', name = 'Casa', \
             theme = 'classic', status = 'Deleted'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown status should be rejected");
}
