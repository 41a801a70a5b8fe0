//! Store connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};

use finsync_domain::{Result, StoreConfig};
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::info;

use crate::errors::InfraError;

/// Connection manager for one relational store.
pub struct StoreManager {
    pool: r2d2::Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl StoreManager {
    /// Open (or create) the store at the configured path.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = PathBuf::from(&config.path);
        let manager = SqliteConnectionManager::file(&path);
        let pool = r2d2::Pool::builder()
            .max_size(config.pool_size.max(1))
            .build(manager)
            .map_err(InfraError::Pool)?;

        info!(
            store_path = %path.display(),
            max_connections = pool.max_size(),
            "store pool initialised"
        );

        Ok(Self { pool, path })
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        let conn = self.pool.get().map_err(InfraError::Pool)?;
        Ok(conn)
    }

    /// Ensure the given schema exists on the current database.
    pub fn run_migrations(&self, schema_sql: &str) -> Result<()> {
        let conn = self.get_connection()?;
        conn.execute_batch(schema_sql).map_err(InfraError::Sql)?;
        Ok(())
    }

    /// Return the configured store path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verify the store is reachable with a trivial round trip.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(InfraError::Sql)?;
        Ok(())
    }
}
