//! sqlx connection pools as datasource handles
//!
//! [`SqlxFactory`] picks the backend from the descriptor URL scheme and opens
//! a pool configured from the descriptor's [`PoolSettings`].

use crate::datasource::descriptor::{DatabaseBackend, DatasourceDescriptor, PoolSettings};
use crate::datasource::factory::DatasourceFactory;
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::pool::PoolOptions;
use sqlx::{Database, MySql, MySqlPool, PgPool, Postgres, Sqlite, SqlitePool};
use std::time::Duration;

/// A connection pool for one of the supported backends
#[derive(Debug, Clone)]
pub enum SqlxPool {
    Postgres(PgPool),
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

impl SqlxPool {
    /// Get the database backend type
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Postgres(_) => DatabaseBackend::Postgres,
            Self::MySql(_) => DatabaseBackend::MySql,
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
        }
    }

    /// Test database connectivity
    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::MySql(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Self::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    /// Number of connections currently held by the pool
    pub fn size(&self) -> u32 {
        match self {
            Self::Postgres(pool) => pool.size(),
            Self::MySql(pool) => pool.size(),
            Self::Sqlite(pool) => pool.size(),
        }
    }

    /// Close the pool, waiting for checked out connections to be returned
    pub async fn close(&self) {
        match self {
            Self::Postgres(pool) => pool.close().await,
            Self::MySql(pool) => pool.close().await,
            Self::Sqlite(pool) => pool.close().await,
        }
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Postgres(pool) => pool.is_closed(),
            Self::MySql(pool) => pool.is_closed(),
            Self::Sqlite(pool) => pool.is_closed(),
        }
    }

    /// Get the PostgreSQL pool, if this is one
    pub fn as_postgres(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(pool) => Some(pool),
            _ => None,
        }
    }

    /// Get the MySQL pool, if this is one
    pub fn as_mysql(&self) -> Option<&MySqlPool> {
        match self {
            Self::MySql(pool) => Some(pool),
            _ => None,
        }
    }

    /// Get the SQLite pool, if this is one
    pub fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            Self::Sqlite(pool) => Some(pool),
            _ => None,
        }
    }
}

/// Builds sqlx pools from datasource descriptors
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxFactory;

impl SqlxFactory {
    fn options<DB: Database>(settings: &PoolSettings) -> PoolOptions<DB> {
        PoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout))
            .idle_timeout(seconds(settings.idle_timeout))
            .max_lifetime(seconds(settings.max_lifetime))
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[async_trait]
impl DatasourceFactory for SqlxFactory {
    type Handle = SqlxPool;

    async fn build(&self, descriptor: &DatasourceDescriptor) -> Result<SqlxPool> {
        let backend = descriptor.backend()?;
        log::debug!(
            "Opening {} pool for datasource '{}': {}",
            backend,
            descriptor.name,
            descriptor.sanitized_url()
        );

        let url = descriptor.url.as_str();
        let pool = match backend {
            DatabaseBackend::Postgres => Self::options::<Postgres>(&descriptor.pool)
                .connect(url)
                .await
                .map(SqlxPool::Postgres),
            DatabaseBackend::MySql => Self::options::<MySql>(&descriptor.pool)
                .connect(url)
                .await
                .map(SqlxPool::MySql),
            DatabaseBackend::Sqlite => Self::options::<Sqlite>(&descriptor.pool)
                .connect(url)
                .await
                .map(SqlxPool::Sqlite),
        };

        pool.map_err(|e| Error::construction(&descriptor.name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(name: &str) -> DatasourceDescriptor {
        DatasourceDescriptor::builder(name)
            .url("sqlite::memory:")
            .max_connections(1)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_build_sqlite_pool() {
        let pool = SqlxFactory.build(&memory("mem")).await.unwrap();

        assert_eq!(pool.backend(), DatabaseBackend::Sqlite);
        assert!(pool.as_sqlite().is_some());
        assert!(pool.as_postgres().is_none());
        pool.ping().await.unwrap();

        pool.close().await;
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let descriptor = DatasourceDescriptor::new("cache", "redis://localhost");
        let result = SqlxFactory.build(&descriptor).await;

        assert!(matches!(result, Err(Error::Construction { ref name, .. }) if name == "cache"));
    }

    #[tokio::test]
    async fn test_connect_failure_is_construction_error() {
        let descriptor = DatasourceDescriptor::builder("broken")
            .url("sqlite:///nonexistent-dir/for/sure/db.sqlite")
            .connect_timeout(1)
            .build()
            .unwrap();

        let err = SqlxFactory.build(&descriptor).await.unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_zero_disables_timeouts() {
        assert_eq!(seconds(0), None);
        assert_eq!(seconds(5), Some(Duration::from_secs(5)));
    }
}
