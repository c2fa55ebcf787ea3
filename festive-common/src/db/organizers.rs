//! Organizer persistence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::models::Organizer;
use crate::{Error, Result};

const SELECT_ORGANIZER: &str = r#"
    SELECT organizer_id, name, company, region, experience, managed_events, cultural_events, events_2025
    FROM organizers
"#;

/// Organizers table schema
pub struct OrganizersTableSchema;

impl TableSchema for OrganizersTableSchema {
    fn table_name() -> &'static str {
        "organizers"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("organizer_id", "TEXT").primary_key(),
            ColumnDefinition::new("name", "TEXT").not_null(),
            ColumnDefinition::new("company", "TEXT").not_null(),
            ColumnDefinition::new("region", "TEXT").not_null(),
            ColumnDefinition::new("experience", "INTEGER").default("0"),
            ColumnDefinition::new("managed_events", "INTEGER").default("0"),
            ColumnDefinition::new("cultural_events", "INTEGER").default("0"),
            ColumnDefinition::new("events_2025", "INTEGER").default("0"),
        ]
    }
}

/// Store for organizer records
pub struct OrganizerStore {
    pool: SqlitePool,
    initialized: OnceCell<()>,
}

impl OrganizerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            initialized: OnceCell::new(),
        }
    }

    pub async fn init(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS organizers (
                        organizer_id TEXT PRIMARY KEY,
                        name TEXT NOT NULL,
                        company TEXT NOT NULL,
                        region TEXT NOT NULL,
                        experience INTEGER DEFAULT 0,
                        managed_events INTEGER DEFAULT 0,
                        cultural_events INTEGER DEFAULT 0,
                        events_2025 INTEGER DEFAULT 0
                    )
                    "#,
                )
                .execute(&self.pool)
                .await?;

                SchemaSync::sync_table::<OrganizersTableSchema>(&self.pool).await?;
                Ok::<(), Error>(())
            })
            .await?;
        Ok(())
    }

    pub async fn insert(&self, organizer: &Organizer) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO organizers
                (organizer_id, name, company, region, experience, managed_events, cultural_events, events_2025)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&organizer.organizer_id)
        .bind(&organizer.name)
        .bind(&organizer.company)
        .bind(&organizer.region)
        .bind(i64::from(organizer.experience))
        .bind(i64::from(organizer.managed_events))
        .bind(i64::from(organizer.cultural_events))
        .bind(i64::from(organizer.events_2025))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => Error::Conflict(
                format!("Organizer with this ID already exists: {}", organizer.organizer_id),
            ),
            other => Error::Database(other),
        })?;

        Ok(())
    }

    pub async fn get(&self, organizer_id: &str) -> Result<Option<Organizer>> {
        let sql = format!("{} WHERE organizer_id = ?", SELECT_ORGANIZER);
        let row = sqlx::query(&sql)
            .bind(organizer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| organizer_from_row(&row)).transpose()
    }

    /// Every organizer, in insertion order
    pub async fn list(&self) -> Result<Vec<Organizer>> {
        let sql = format!("{} ORDER BY rowid", SELECT_ORGANIZER);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(organizer_from_row).collect()
    }

    pub async fn update(&self, organizer: &Organizer) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE organizers
            SET name = ?, company = ?, region = ?, experience = ?,
                managed_events = ?, cultural_events = ?, events_2025 = ?
            WHERE organizer_id = ?
            "#,
        )
        .bind(&organizer.name)
        .bind(&organizer.company)
        .bind(&organizer.region)
        .bind(i64::from(organizer.experience))
        .bind(i64::from(organizer.managed_events))
        .bind(i64::from(organizer.cultural_events))
        .bind(i64::from(organizer.events_2025))
        .bind(&organizer.organizer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, organizer_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM organizers WHERE organizer_id = ?")
            .bind(organizer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Counts are stored as INTEGER; NULL (rows written outside the service) reads as zero
fn count_column(row: &SqliteRow, column: &str) -> Result<u32> {
    let value: Option<i64> = row.get(column);
    let value = value.unwrap_or(0);
    u32::try_from(value).map_err(|_| {
        Error::Internal(format!("Column {} holds out-of-range count {}", column, value))
    })
}

fn organizer_from_row(row: &SqliteRow) -> Result<Organizer> {
    Ok(Organizer {
        organizer_id: row.get("organizer_id"),
        name: row.get("name"),
        company: row.get("company"),
        region: row.get("region"),
        experience: count_column(row, "experience")?,
        managed_events: count_column(row, "managed_events")?,
        cultural_events: count_column(row, "cultural_events")?,
        events_2025: count_column(row, "events_2025")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_in_memory;
    use crate::models::OrganizerDraft;

    async fn store() -> OrganizerStore {
        let store = OrganizerStore::new(init_in_memory().await.unwrap());
        store.init().await.unwrap();
        store
    }

    fn organizer(id: &str) -> Organizer {
        let mut draft = OrganizerDraft::new("Asha Rao", "Utsav Events", "West");
        draft.managed_events = 12;
        draft.cultural_events = 4;
        draft.events_2025 = 7;
        draft.into_organizer(id.to_string())
    }

    #[tokio::test]
    async fn test_insert_get_round_trip() {
        let store = store().await;
        let original = organizer("o1");
        store.insert(&original).await.unwrap();
        assert_eq!(store.get("o1").await.unwrap(), Some(original));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let store = store().await;
        store.insert(&organizer("o1")).await.unwrap();
        let err = store.insert(&organizer("o1")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_null_counts_read_as_zero() {
        let store = store().await;
        sqlx::query(
            "INSERT INTO organizers (organizer_id, name, company, region, managed_events) \
             VALUES ('raw', 'Raw', 'Co', 'North', NULL)",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let raw = store.get("raw").await.unwrap().unwrap();
        assert_eq!(raw.managed_events, 0);
        assert_eq!(raw.experience, 0);
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let store = store().await;
        assert!(!store.update(&organizer("ghost")).await.unwrap());
        assert_eq!(store.delete("ghost").await.unwrap(), 0);
    }
}
