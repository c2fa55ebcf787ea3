//! Event persistence
//!
//! Performers are stored as one comma-joined TEXT column and split back on
//! read; model validation keeps commas out of performer names.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;
use tracing::info;

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::models::{Event, PERFORMER_DELIMITER};
use crate::{Error, Result};

const SELECT_EVENT: &str = r#"
    SELECT id, title, date, location, performers, description, created_at, updated_at
    FROM events
"#;

/// Events table schema
pub struct EventsTableSchema;

impl TableSchema for EventsTableSchema {
    fn table_name() -> &'static str {
        "events"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "TEXT").primary_key(),
            ColumnDefinition::new("title", "TEXT").not_null(),
            ColumnDefinition::new("date", "TEXT").not_null(),
            ColumnDefinition::new("location", "TEXT").not_null(),
            ColumnDefinition::new("performers", "TEXT"),
            ColumnDefinition::new("description", "TEXT"),
            // Audit stamps, absent from early versions of the table
            ColumnDefinition::new("created_at", "TEXT"),
            ColumnDefinition::new("updated_at", "TEXT"),
        ]
    }
}

/// Store for event records
pub struct EventStore {
    pool: SqlitePool,
    initialized: OnceCell<()>,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            initialized: OnceCell::new(),
        }
    }

    /// Create the table and sync its columns; no-op after the first success
    pub async fn init(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS events (
                        id TEXT PRIMARY KEY,
                        title TEXT NOT NULL,
                        date TEXT NOT NULL,
                        location TEXT NOT NULL,
                        performers TEXT,
                        description TEXT,
                        created_at TEXT,
                        updated_at TEXT
                    )
                    "#,
                )
                .execute(&self.pool)
                .await?;

                let added = SchemaSync::sync_table::<EventsTableSchema>(&self.pool).await?;
                if !added.is_empty() {
                    info!("Events table upgraded with columns: {}", added.join(", "));
                }
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    /// Insert a new event
    ///
    /// A primary key violation surfaces as `Error::Conflict`, so two racing
    /// creates with the same identifier cannot both succeed.
    pub async fn insert(&self, event: &Event) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, title, date, location, performers, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.date)
        .bind(&event.location)
        .bind(join_performers(&event.performers))
        .bind(&event.description)
        .bind(&event.created_at)
        .bind(&event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("Event already exists: {}", event.id))
            }
            other => Error::Database(other),
        })?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Event>> {
        let sql = format!("{} WHERE id = ?", SELECT_EVENT);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| event_from_row(&row)))
    }

    /// Every event, in insertion order
    pub async fn list(&self) -> Result<Vec<Event>> {
        let sql = format!("{} ORDER BY rowid", SELECT_EVENT);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(event_from_row).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Overwrite the mutable fields of an existing event
    ///
    /// `created_at` is never touched. Returns false when no row has `event.id`.
    pub async fn update(&self, event: &Event) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, date = ?, location = ?, performers = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.title)
        .bind(&event.date)
        .bind(&event.location)
        .bind(join_performers(&event.performers))
        .bind(&event.description)
        .bind(&event.updated_at)
        .bind(&event.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the number of rows removed
    pub async fn delete(&self, id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn join_performers(performers: &[String]) -> String {
    performers
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(PERFORMER_DELIMITER.to_string().as_str())
}

fn split_performers(stored: Option<String>) -> Vec<String> {
    stored
        .map(|text| {
            text.split(PERFORMER_DELIMITER)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn event_from_row(row: &SqliteRow) -> Event {
    Event {
        id: row.get("id"),
        title: row.get("title"),
        date: row.get("date"),
        location: row.get("location"),
        performers: split_performers(row.get("performers")),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
