//! PostgreSQL backend implementation.
//!
//! Uses the synchronous `postgres` client without TLS. Statements compiled
//! by this crate already use `$n` placeholders; caller-supplied raw SQL may
//! use `?` or `:name` and is rewritten before it is prepared.

mod conversion;

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tracing::debug;

use super::backend::{Connection, Dialect, ExecOutcome, ResultSet};
use super::config::{ConnectOptions, PostgresConfig};
use super::params::Params;
use super::value::Value;
use super::DbError;

pub use conversion::{bind_compiled, read_value, rewrite_placeholders};

/// PostgreSQL connection.
///
/// `Client` needs `&mut self` for every call, so it lives behind a mutex held
/// for one prepare/execute at a time.
pub struct PostgresConnection {
    client: Mutex<Client>,
}

impl PostgresConnection {
    /// Connect using a structured configuration plus driver options.
    ///
    /// # Errors
    /// Returns `DbError::OpenFailed` if the configuration is incomplete or the
    /// server cannot be reached.
    pub fn connect(config: &PostgresConfig, options: &ConnectOptions) -> Result<Self, DbError> {
        let mut pg = config.to_pg_config()?;
        if let Some(secs) = options.connect_timeout_secs {
            pg.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(name) = &options.application_name {
            pg.application_name(name);
        }

        let client = pg.connect(NoTls).map_err(|e| DbError::OpenFailed {
            target: config.describe(),
            message: e.to_string(),
        })?;
        debug!(target_db = %config.describe(), "connected to postgres");

        Ok(Self {
            client: Mutex::new(client),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Client>, DbError> {
        self.client.lock().map_err(|_| DbError::LockPoisoned)
    }
}

impl PostgresConnection {
    fn run_query(&self, sql: &str, values: &[Value]) -> Result<ResultSet, DbError> {
        let refs: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        let mut client = self.lock()?;
        let statement = client.prepare(sql).map_err(query_failed)?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>();
        let rows = client.query(&statement, &refs).map_err(query_failed)?;

        let mut result = ResultSet {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in &rows {
            let values = (0..row.len())
                .map(|i| read_value(row, i))
                .collect::<Result<Vec<_>, _>>()?;
            result.rows.push(values);
        }
        Ok(result)
    }

    fn run_execute(&self, sql: &str, values: &[Value]) -> Result<ExecOutcome, DbError> {
        let refs: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

        let mut client = self.lock()?;
        let affected = client.execute(sql, &refs).map_err(query_failed)?;

        // PostgreSQL has no last-insert-id; callers use RETURNING instead.
        Ok(ExecOutcome {
            affected_rows: affected,
            last_insert_id: None,
        })
    }
}

impl Connection for PostgresConnection {
    fn query(&self, sql: &str, params: &Params) -> Result<ResultSet, DbError> {
        let (sql, values) = rewrite_placeholders(sql, params)?;
        self.run_query(&sql, &values)
    }

    fn execute(&self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError> {
        let (sql, values) = rewrite_placeholders(sql, params)?;
        self.run_execute(&sql, &values)
    }

    fn query_compiled(&self, sql: &str, params: &Params) -> Result<ResultSet, DbError> {
        let (sql, values) = bind_compiled(sql, params)?;
        self.run_query(&sql, &values)
    }

    fn execute_compiled(&self, sql: &str, params: &Params) -> Result<ExecOutcome, DbError> {
        let (sql, values) = bind_compiled(sql, params)?;
        self.run_execute(&sql, &values)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn backend_name(&self) -> &'static str {
        "Postgres"
    }
}

fn query_failed(e: postgres::Error) -> DbError {
    DbError::QueryFailed {
        message: e.to_string(),
    }
}
