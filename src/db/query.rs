//! Ad-hoc statement execution.
//!
//! The statement is executed exactly as given; any kind the credentials
//! permit may run. Rows come back as JSON objects keyed by column name.

use serde::Serialize;
use serde_json::{Map, Value};
use tokio_postgres::types::Type;
use tokio_postgres::Row;

use crate::config::Config;

use super::{connect, DbError};

#[derive(Debug, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
    pub row_count: usize,
}

/// Open one connection, run one statement, fetch all rows. The connection is
/// dropped on every exit path.
pub async fn run_query(config: &Config, sql: &str) -> Result<QueryOutput, DbError> {
    let client = connect(config).await?;

    let stmt = client
        .prepare(sql)
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;
    let rows = client
        .query(&stmt, &[])
        .await
        .map_err(|e| DbError::Query(e.to_string()))?;

    let columns: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_owned())
        .collect();

    let mut result_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut object = Map::with_capacity(columns.len());
        for (i, col) in stmt.columns().iter().enumerate() {
            object.insert(col.name().to_owned(), pg_value_to_json(row, i, col.type_()));
        }
        result_rows.push(object);
    }

    let row_count = result_rows.len();

    Ok(QueryOutput {
        columns,
        rows: result_rows,
        row_count,
    })
}

fn pg_value_to_json(row: &Row, idx: usize, pg_type: &Type) -> Value {
    // Extract by declared type, falling back to the text representation.
    match *pg_type {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(idx)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Number(v.into()))
            .unwrap_or(Value::Null),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Number(v.into()))
            .unwrap_or(Value::Null),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Number(v.into()))
            .unwrap_or(Value::Null),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .and_then(|v| serde_json::Number::from_f64(v as f64))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(idx)
            .ok()
            .flatten()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<Value>>(idx)
            .ok()
            .flatten()
            .unwrap_or(Value::Null),
        Type::TIMESTAMP => row
            .try_get::<_, Option<chrono::NaiveDateTime>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_rfc3339()))
            .unwrap_or(Value::Null),
        Type::DATE => row
            .try_get::<_, Option<chrono::NaiveDate>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        Type::UUID => row
            .try_get::<_, Option<uuid::Uuid>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<_, Option<String>>(idx)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
