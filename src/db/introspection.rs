//! Schema introspection and the prompt-facing renderings of the result.
//!
//! A snapshot is built fresh on every request and reflects the database's
//! structure at snapshot time; nothing is cached.

use serde::Serialize;
use tokio_postgres::Client;

use crate::config::Config;

use super::{connect, DbError};

/// Structure of the connected database: every user table with its columns in
/// ordinal order.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaSnapshot {
    pub tables: Vec<TableSchema>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl SchemaSnapshot {
    /// Verbose rendering used inside SQL-generation prompts: a header line
    /// per table and one annotated line per column.
    pub fn to_prompt_block(&self) -> String {
        let mut out = String::new();
        for table in &self.tables {
            out.push_str(&format!("Table: {}\n", table.name));
            for col in &table.columns {
                out.push_str(&format!("- {} ({})", col.name, col.data_type));
                if col.primary_key {
                    out.push_str(" [PRIMARY KEY]");
                }
                if !col.nullable {
                    out.push_str(" [NOT NULL]");
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Compact one-line-per-table rendering: `name(col1, col2, ...)`.
    pub fn to_compact(&self) -> String {
        self.tables
            .iter()
            .map(|table| {
                let cols: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
                format!("{}({})", table.name, cols.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build a fresh [`SchemaSnapshot`]: list the tables in the `public` schema,
/// then describe each table's columns.
pub async fn fetch_schema(config: &Config) -> Result<SchemaSnapshot, DbError> {
    let client = connect(config).await?;

    let table_rows = client
        .query(
            "SELECT table_name
             FROM information_schema.tables
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
             ORDER BY table_name",
            &[],
        )
        .await
        .map_err(|e| DbError::Unavailable(e.to_string()))?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        let name: String = row.get(0);
        let columns = fetch_columns(&client, &name).await?;
        tables.push(TableSchema { name, columns });
    }

    Ok(SchemaSnapshot { tables })
}

async fn fetch_columns(client: &Client, table: &str) -> Result<Vec<ColumnSchema>, DbError> {
    let rows = client
        .query(
            "SELECT
                c.column_name,
                c.data_type,
                c.is_nullable = 'YES' as is_nullable,
                COALESCE(pk.is_pk, false) as is_primary_key
             FROM information_schema.columns c
             LEFT JOIN (
                SELECT kcu.column_name, true as is_pk
                FROM information_schema.table_constraints tc
                JOIN information_schema.key_column_usage kcu
                    ON tc.constraint_name = kcu.constraint_name
                    AND tc.table_schema = kcu.table_schema
                WHERE tc.constraint_type = 'PRIMARY KEY'
                    AND tc.table_schema = 'public'
                    AND tc.table_name = $1
             ) pk ON pk.column_name = c.column_name
             WHERE c.table_schema = 'public' AND c.table_name = $1
             ORDER BY c.ordinal_position",
            &[&table],
        )
        .await
        .map_err(|e| DbError::Unavailable(e.to_string()))?;

    Ok(rows
        .iter()
        .map(|row| ColumnSchema {
            name: row.get(0),
            data_type: row.get(1),
            nullable: row.get(2),
            primary_key: row.get(3),
        })
        .collect())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn users_snapshot() -> SchemaSnapshot {
        SchemaSnapshot {
            tables: vec![TableSchema {
                name: "users".into(),
                columns: vec![
                    ColumnSchema {
                        name: "id".into(),
                        data_type: "integer".into(),
                        nullable: false,
                        primary_key: true,
                    },
                    ColumnSchema {
                        name: "name".into(),
                        data_type: "text".into(),
                        nullable: true,
                        primary_key: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn prompt_block_annotates_keys_and_nullability() {
        let block = users_snapshot().to_prompt_block();
        assert!(block.contains("Table: users\n"));
        assert!(block.contains("- id (integer) [PRIMARY KEY] [NOT NULL]\n"));
        assert!(block.contains("- name (text)\n"));
    }

    #[test]
    fn compact_rendering_is_one_line_per_table() {
        assert_eq!(users_snapshot().to_compact(), "users(id, name)");
    }

    #[test]
    fn compact_rendering_joins_tables_with_newlines() {
        let mut snapshot = users_snapshot();
        snapshot.tables.push(TableSchema {
            name: "orders".into(),
            columns: vec![ColumnSchema {
                name: "id".into(),
                data_type: "integer".into(),
                nullable: false,
                primary_key: true,
            }],
        });
        assert_eq!(snapshot.to_compact(), "users(id, name)\norders(id)");
    }
}
