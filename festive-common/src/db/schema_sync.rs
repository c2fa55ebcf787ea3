//! Automatic schema synchronization
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS`, which leaves an
//! older table untouched. Each store declares the columns it expects and
//! `SchemaSync::sync_table` adds whatever is missing via `ALTER TABLE`.
//! Type and constraint changes are out of reach for `ADD COLUMN` and are only
//! reported.

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Expected schema for one table
pub trait TableSchema {
    fn table_name() -> &'static str;

    fn expected_columns() -> Vec<ColumnDefinition>;
}

pub struct SchemaSync;

impl SchemaSync {
    /// Names of the columns currently present in `table_name`
    pub async fn existing_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<String>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;
        Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
    }

    /// Add every expected column missing from the table
    ///
    /// Returns the names of the columns that were added.
    pub async fn sync_table<T: TableSchema>(pool: &SqlitePool) -> Result<Vec<String>> {
        let table_name = T::table_name();
        let existing = Self::existing_columns(pool, table_name).await?;

        if existing.is_empty() {
            warn!(
                "Table '{}' does not exist - should be created before schema sync",
                table_name
            );
            return Ok(Vec::new());
        }

        let mut added = Vec::new();
        for column in T::expected_columns() {
            if existing.iter().any(|name| name == &column.name) {
                continue;
            }
            Self::add_column(pool, table_name, &column).await?;
            added.push(column.name);
        }

        if added.is_empty() {
            debug!("Schema up to date for '{}'", table_name);
        }

        Ok(added)
    }

    async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table, column.name, column.sql_type
        );

        if column.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{} via ALTER TABLE; adding it without the constraint",
                table, column.name
            );
        }

        // SQLite only accepts NOT NULL on an added column when it has a default
        match (&column.default_value, column.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {}", default)),
            (None, true) => warn!(
                "Cannot add NOT NULL column {}.{} without DEFAULT; column will be nullable",
                table, column.name
            ),
            (None, false) => {}
        }

        info!("Adding column: {}.{} ({})", table, column.name, column.sql_type);

        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => Ok(()),
            // Another connection got there first
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
