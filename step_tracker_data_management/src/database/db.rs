use std::{path::Path, str::FromStr};

use const_format::concatcp;
use sqlx::{query_as, sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Executor, Pool, Sqlite, SqlitePool};
use step_tracker_lib::step_record::{NewStepRecord, StepRecord};

use crate::DataManagerError;

use super::constants::*;

#[derive(Clone)]
pub struct StepDatabase {
    pool: Pool<Sqlite>,
}

impl StepDatabase {
    pub async fn connect(path: &Path) -> Result<Self, DataManagerError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await
            .map_err(|err| DataManagerError::Database(format!("Failed to connect to database {path:?}: {err}")))?;

        Ok(Self { pool })
    }

    /// Private database living as long as this handle. Limited to one connection, as every
    /// in-memory connection would otherwise see its own empty database.
    pub async fn connect_in_memory() -> Result<Self, DataManagerError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|err| DataManagerError::Database(format!("Invalid in-memory options: {err}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options).await
            .map_err(|err| DataManagerError::Database(format!("Failed to open in-memory database: {err}")))?;

        Ok(Self { pool })
    }

    /// Idempotent, never touches existing rows.
    pub async fn init(&self) -> Result<(), DataManagerError> {
        self.pool.execute(concatcp!("
            CREATE TABLE IF NOT EXISTS ", STEPS_TABLE_NAME, "(",
                ID,    " INTEGER PRIMARY KEY AUTOINCREMENT,",
                MONTH, " TEXT,",
                DAY,   " TEXT,",
                STEPS, " TEXT
            )")).await
            .map_err(|err| DataManagerError::Database(format!("Failed to create steps table: {err}")))
            .map(|_| ())
    }

    pub async fn insert_step_record(&self, record: NewStepRecord) -> Result<StepRecord, DataManagerError> {
        let id = query_as::<_, (i64,)>(concatcp!("
            INSERT INTO ", STEPS_TABLE_NAME, "(",
            ID, ", ", MONTH, ", ", DAY, ", ", STEPS, ")
            VALUES (NULL, ?1, ?2, ?3) RETURNING ", ID))
                .bind(record.month.to_string())
                .bind(record.day.to_string())
                .bind(record.steps.to_string())
                .fetch_one(&self.pool).await
                .map_err(|err| DataManagerError::Database(format!("Failed to insert step record: {err}")))
                .map(|row| row.0)?;

        Ok(record.with_id(id))
    }

    /// In storage order
    pub async fn get_step_records(&self) -> Result<Vec<StepRecord>, DataManagerError> {
        query_as::<_, StepRecord>(concatcp!("SELECT * FROM ", STEPS_TABLE_NAME))
            .fetch_all(&self.pool).await
            .map_err(|err| DataManagerError::Database(format!("Failed to get step records: {err}")))
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use sqlx::{query, Row};

    use super::*;

    #[tokio::test]
    async fn init_twice_keeps_rows() {
        let db = StepDatabase::connect_in_memory().await.unwrap();
        db.init().await.unwrap();
        db.insert_step_record(NewStepRecord::new(6, 15, 1300)).await.unwrap();
        db.init().await.unwrap();

        let tables = query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .bind(STEPS_TABLE_NAME)
            .fetch_all(db.pool()).await.unwrap();
        assert_eq!(tables.len(), 1);

        let columns: Vec<String> = query(concatcp!("PRAGMA table_info(", STEPS_TABLE_NAME, ")"))
            .fetch_all(db.pool()).await.unwrap()
            .into_iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();
        assert_eq!(columns, vec![ID, MONTH, DAY, STEPS]);

        assert_eq!(db.get_step_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn round_trips_text_columns() {
        let db = StepDatabase::connect_in_memory().await.unwrap();
        db.init().await.unwrap();

        let first = db.insert_step_record(NewStepRecord::new(6, 15, 1300)).await.unwrap();
        let second = db.insert_step_record(NewStepRecord::new(6, 15, 1300)).await.unwrap();
        assert_ne!(first.id, second.id);

        let stored: String = query(concatcp!("SELECT ", STEPS, " FROM ", STEPS_TABLE_NAME, " WHERE ", ID, " = ?1"))
            .bind(first.id)
            .fetch_one(db.pool()).await.unwrap()
            .get(0);
        assert_eq!(stored, "1300");

        let records = db.get_step_records().await.unwrap();
        assert_eq!(records, vec![first, second]);
        assert_eq!(records[0].steps, 1300);
    }

    #[tokio::test]
    async fn malformed_rows_coerce_to_zero() {
        let db = StepDatabase::connect_in_memory().await.unwrap();
        db.init().await.unwrap();

        query(concatcp!("INSERT INTO ", STEPS_TABLE_NAME, "(", MONTH, ", ", DAY, ", ", STEPS, ") VALUES ('june', NULL, '12.7')"))
            .execute(db.pool()).await.unwrap();

        query(concatcp!("INSERT INTO ", STEPS_TABLE_NAME, "(", MONTH, ", ", DAY, ", ", STEPS, ") VALUES ('4294967302', '15', '1300.9')"))
            .execute(db.pool()).await.unwrap();
        query(concatcp!("INSERT INTO ", STEPS_TABLE_NAME, "(", MONTH, ", ", DAY, ", ", STEPS, ") VALUES (6, 15, 1300)"))
            .execute(db.pool()).await.unwrap();

        let records = db.get_step_records().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!((records[0].month, records[0].day, records[0].steps), (0, 0, 12));
        assert_eq!((records[1].month, records[1].day, records[1].steps), (0, 15, 1300));
        assert_eq!((records[2].month, records[2].day, records[2].steps), (6, 15, 1300));
    }

    #[tokio::test]
    async fn reading_without_schema_fails() {
        let db = StepDatabase::connect_in_memory().await.unwrap();
        assert!(matches!(db.get_step_records().await, Err(DataManagerError::Database(_))));
    }
}
