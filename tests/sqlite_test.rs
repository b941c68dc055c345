use rustf_datasource::{
    DatabaseBackend, DatasourceConfig, DatasourceDescriptor, DatasourceRegistry, DatasourcesConfig,
    Error, SqlxFactory, DS,
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn memory_config(pools: &[&str], default: &str) -> DatasourcesConfig {
    let mut config = DatasourcesConfig::new();
    for name in pools {
        let mut entry = DatasourceConfig::new("sqlite::memory:");
        entry.pool.max_connections = 1;
        if *name == default {
            entry = entry.default_datasource();
        }
        config.add_datasource(*name, entry);
    }
    config
}

#[tokio::test]
async fn test_registry_from_config_with_sqlite_pools() {
    let config = memory_config(&["analytics", "primary"], "primary");
    let registry = Arc::new(assert_ok!(
        DatasourceRegistry::from_config(SqlxFactory, &config).await
    ));

    assert_eq!(registry.default_name(), "primary");
    assert_eq!(registry.names(), vec!["analytics", "primary"]);

    let mut ctx = registry.context();
    assert_ok!(ctx.select("analytics"));
    let pool = assert_ok!(ctx.resolve_current());
    assert_eq!(pool.backend(), DatabaseBackend::Sqlite);
    assert_ok!(pool.ping().await);
}

#[tokio::test]
async fn test_add_and_select_sqlite_tenant() {
    let primary = DatasourceDescriptor::new("primary", "sqlite::memory:");
    let registry = Arc::new(assert_ok!(DatasourceRegistry::new(SqlxFactory, primary).await));

    let tenant = assert_ok!(DatasourceDescriptor::builder("tenant_1")
        .url("sqlite::memory:")
        .max_connections(2)
        .build());

    let mut ctx = registry.context();
    assert_ok!(ctx.add_and_select(tenant, false).await);
    assert_eq!(ctx.current_selection(), Some("tenant_1"));
    assert_ok!(assert_ok!(ctx.resolve_current()).ping().await);

    ctx.select_default();
    let removed = assert_ok!(ctx.remove("tenant_1").await).unwrap();
    removed.close().await;
    assert!(removed.is_closed());
}

#[tokio::test]
async fn test_unsupported_scheme_is_rejected() {
    let primary = DatasourceDescriptor::new("primary", "sqlite::memory:");
    let registry = assert_ok!(DatasourceRegistry::new(SqlxFactory, primary).await);

    let err = assert_err!(
        registry
            .add(DatasourceDescriptor::new("cache", "redis://localhost"), false)
            .await
    );
    assert!(matches!(err, Error::Construction { .. }));
    assert!(!registry.contains("cache"));
}

#[tokio::test]
async fn test_global_registry() {
    assert!(DS::context().is_err());

    assert_ok!(DS::init(memory_config(&["primary", "reports"], "primary")).await);
    assert!(DS::is_initialized());

    let mut ctx = assert_ok!(DS::context());
    assert_ok!(ctx.select("reports"));
    assert_ok!(assert_ok!(ctx.resolve_current()).ping().await);

    let again = DS::init(memory_config(&["primary"], "primary")).await;
    assert!(matches!(again, Err(Error::Internal(_))));
}

#[tokio::test]
async fn test_empty_config_is_rejected() {
    let result = DatasourceRegistry::from_config(SqlxFactory, &DatasourcesConfig::new()).await;
    assert!(matches!(result, Err(Error::Config(_))));
}
