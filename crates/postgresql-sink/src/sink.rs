//! PostgreSQL implementation of the sink traits.

use crate::args::PostgreSQLSinkArgs;
use crate::sql::{
    build_insert_sql, build_query_procedure_sql, build_void_procedure_sql,
    MAX_ROWS_PER_STATEMENT,
};
use bulk_sink::{BulkSink, ProcedureRow, ProcedureSink, ProcedureValue, SinkError};
use pipeline_core::Record;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, info};

/// An open connection plus the task driving it.
pub struct PostgreSQLHandle {
    client: Client,
    connection: JoinHandle<()>,
}

/// Loads records into a PostgreSQL table.
///
/// Each [`BulkSink::bulk_write`] runs in its own transaction and sends one
/// multi-row INSERT per chunk. Chunks are reported as sent after each
/// statement; nothing is visible until the commit succeeds. Procedures are
/// called over a short-lived connection of their own.
///
/// The destination table must exist with these column types:
///
/// ```sql
/// CREATE TABLE imported_data (
///     date DATE NOT NULL,
///     latin_text TEXT NOT NULL,
///     local_text TEXT NOT NULL,
///     even_value BIGINT NOT NULL,
///     decimal_value DOUBLE PRECISION NOT NULL
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PostgreSQLSink {
    connection_string: String,
    table: String,
}

impl PostgreSQLSink {
    pub fn new(connection_string: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            table: table.into(),
        }
    }

    /// Build a sink from CLI arguments; `None` without a connection string.
    pub fn from_args(args: &PostgreSQLSinkArgs) -> Option<Self> {
        args.postgresql_connection_string
            .as_ref()
            .map(|conn| Self::new(conn.clone(), args.postgresql_table.clone()))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn connect(&self) -> Result<PostgreSQLHandle, tokio_postgres::Error> {
        let (client, connection) = tokio_postgres::connect(&self.connection_string, NoTls).await?;

        // Spawn the connection task
        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        // Test connection
        client.simple_query("SELECT 1").await?;

        Ok(PostgreSQLHandle { client, connection })
    }

    async fn disconnect(handle: PostgreSQLHandle) {
        let PostgreSQLHandle { client, connection } = handle;
        drop(client);
        if let Err(e) = connection.await {
            debug!("PostgreSQL connection task ended abnormally: {}", e);
        }
    }
}

#[async_trait::async_trait]
impl BulkSink for PostgreSQLSink {
    type Handle = PostgreSQLHandle;

    async fn open(&self) -> Result<PostgreSQLHandle, SinkError> {
        let handle = self.connect().await.map_err(SinkError::connect)?;
        debug!("Opened PostgreSQL connection for table {}", self.table);
        Ok(handle)
    }

    async fn bulk_write(
        &self,
        handle: &mut PostgreSQLHandle,
        records: &[Record],
        chunk_size: usize,
        on_chunk_sent: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64, SinkError> {
        let chunk_size = chunk_size.clamp(1, MAX_ROWS_PER_STATEMENT);
        let mut sent = 0u64;

        let transaction = handle
            .client
            .transaction()
            .await
            .map_err(|e| SinkError::write(sent, e))?;

        let full_chunk_sql = build_insert_sql(&self.table, chunk_size);

        for chunk in records.chunks(chunk_size) {
            let partial_sql;
            let sql = if chunk.len() == chunk_size {
                &full_chunk_sql
            } else {
                partial_sql = build_insert_sql(&self.table, chunk.len());
                &partial_sql
            };

            let params = chunk_params(chunk);
            transaction
                .execute(sql.as_str(), &params)
                .await
                .map_err(|e| SinkError::write(sent, e))?;

            sent += chunk.len() as u64;
            on_chunk_sent(sent);
        }

        transaction
            .commit()
            .await
            .map_err(|e| SinkError::write(sent, e))?;

        info!("Inserted {} rows into {}", sent, self.table);
        Ok(sent)
    }

    async fn close(&self, handle: PostgreSQLHandle) -> Result<(), SinkError> {
        Self::disconnect(handle).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProcedureSink for PostgreSQLSink {
    async fn call_query(&self, name: &str) -> Result<Option<ProcedureRow>, SinkError> {
        let handle = self
            .connect()
            .await
            .map_err(|e| SinkError::procedure(name, e))?;

        let result = handle
            .client
            .query(build_query_procedure_sql(name).as_str(), &[])
            .await;
        Self::disconnect(handle).await;

        let rows = result.map_err(|e| SinkError::procedure(name, e))?;
        debug!("Procedure {} returned {} rows", name, rows.len());

        rows.first()
            .map(|row| row_to_procedure_row(row).map_err(|e| SinkError::procedure(name, e)))
            .transpose()
    }

    async fn call_void(&self, name: &str) -> Result<(), SinkError> {
        let handle = self
            .connect()
            .await
            .map_err(|e| SinkError::procedure(name, e))?;

        let result = handle
            .client
            .batch_execute(&build_void_procedure_sql(name))
            .await;
        Self::disconnect(handle).await;

        result.map_err(|e| SinkError::procedure(name, e))
    }
}

/// Bind parameters for one chunk, five per record in column order.
fn chunk_params(chunk: &[Record]) -> Vec<&(dyn ToSql + Sync)> {
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(chunk.len() * 5);
    for record in chunk {
        params.push(&record.date);
        params.push(&record.latin_text);
        params.push(&record.local_text);
        params.push(&record.even_value);
        params.push(&record.decimal_value);
    }
    params
}

/// Convert a result row into named numeric values.
fn row_to_procedure_row(row: &Row) -> Result<ProcedureRow, String> {
    let mut out = ProcedureRow::new();

    for (idx, column) in row.columns().iter().enumerate() {
        let value = match *column.type_() {
            Type::INT2 => row
                .try_get::<_, Option<i16>>(idx)
                .map(|v| v.map(|v| ProcedureValue::Int(v.into()))),
            Type::INT4 => row
                .try_get::<_, Option<i32>>(idx)
                .map(|v| v.map(|v| ProcedureValue::Int(v.into()))),
            Type::INT8 => row
                .try_get::<_, Option<i64>>(idx)
                .map(|v| v.map(ProcedureValue::Int)),
            Type::FLOAT4 => row
                .try_get::<_, Option<f32>>(idx)
                .map(|v| v.map(|v| ProcedureValue::Float(v.into()))),
            Type::FLOAT8 => row
                .try_get::<_, Option<f64>>(idx)
                .map(|v| v.map(ProcedureValue::Float)),
            Type::NUMERIC => row
                .try_get::<_, Option<Decimal>>(idx)
                .map(|v| v.map(ProcedureValue::Decimal)),
            ref other => {
                return Err(format!(
                    "column '{}' has non-numeric type {}",
                    column.name(),
                    other
                ))
            }
        }
        .map_err(|e| format!("column '{}': {}", column.name(), e))?;

        out = out.with(column.name(), value.unwrap_or(ProcedureValue::Null));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_chunk_params_order() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let records = vec![
            Record::new(date, "a", "б", 2, 1.5),
            Record::new(date, "c", "д", 4, 2.5),
        ];
        assert_eq!(chunk_params(&records).len(), 10);
    }

    #[test]
    fn test_from_args_requires_connection_string() {
        let args = PostgreSQLSinkArgs {
            postgresql_connection_string: None,
            postgresql_table: "t".to_string(),
        };
        assert!(PostgreSQLSink::from_args(&args).is_none());

        let args = PostgreSQLSinkArgs {
            postgresql_connection_string: Some("host=localhost".to_string()),
            postgresql_table: "public.t".to_string(),
        };
        let sink = PostgreSQLSink::from_args(&args).unwrap();
        assert_eq!(sink.table(), "public.t");
    }

    #[tokio::test]
    async fn test_open_fails_on_bad_connection_string() {
        let sink = PostgreSQLSink::new("this is not a connection string", "t");
        assert!(matches!(sink.open().await, Err(SinkError::Connect(_))));
    }
}
