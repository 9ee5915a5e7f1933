pub mod connection;
pub mod test_utils;

use crate::error::{DeployError, Result};
use tokio_postgres::{Client, NoTls};

/// Access to the target database, at the granularity the executor needs:
/// running a statement for effect, and counting rows for condition gates.
#[allow(async_fn_in_trait)]
pub trait Database {
    async fn execute(&self, sql: &str) -> Result<()>;
    async fn query_row_count(&self, sql: &str) -> Result<u64>;
}

/// Live Postgres-backed implementation.
pub struct PgDatabase {
    client: Client,
}

impl PgDatabase {
    /// Connect using a `postgres://` URL. The connection task is spawned
    /// onto the current runtime and logs on failure.
    pub async fn connect(url: &str) -> Result<Self> {
        let config = connection::DatabaseConfig::from_url(url)?;
        let conn_str = config.to_connection_string();

        let (client, conn) = tokio_postgres::connect(&conn_str, NoTls)
            .await
            .map_err(|e| DeployError::DatabaseConnection {
                message: format!("failed to connect to {}:{}", config.host, config.port),
                source: e,
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::error!("database connection error: {}", e);
            }
        });

        Ok(Self { client })
    }
}

impl Database for PgDatabase {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.client
            .batch_execute(sql)
            .await
            .map_err(|e| DeployError::Database {
                message: "statement execution failed".to_string(),
                source: Some(e),
            })
    }

    async fn query_row_count(&self, sql: &str) -> Result<u64> {
        let rows = self
            .client
            .query(sql, &[])
            .await
            .map_err(|e| DeployError::Database {
                message: "condition query failed".to_string(),
                source: Some(e),
            })?;
        Ok(rows.len() as u64)
    }
}
