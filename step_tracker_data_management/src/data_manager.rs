use std::path::{Path, PathBuf};

use step_tracker_lib::step_record::{NewStepRecord, StepRecord};

use crate::{database::db::StepDatabase, DataManagerError, DATABASE_PATH, DATA_DIR};

#[derive(Clone)]
pub struct DataManager {
    pub(crate) database: StepDatabase,
}

/// The public interface for the step history.
///
/// Read and write failures are logged and degrade to "nothing happened": an empty list or no
/// new record. Nothing here is fatal to the caller.
impl DataManager {
    /// Opens the database under the project's data directory.
    pub async fn start() -> Result<Self, DataManagerError> {
        let root: PathBuf = project_root::get_project_root()
            .map_err(|err| DataManagerError::Io(format!("Failed to locate project root: {err}")))?;

        let data_dir = root.join(DATA_DIR);
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)
                .map_err(|_| DataManagerError::Io(format!("Failed to create data directory: {:?}", data_dir)))?;
        }

        Self::open(&root.join(DATABASE_PATH)).await
    }

    pub async fn open(path: &Path) -> Result<Self, DataManagerError> {
        let database = StepDatabase::connect(path).await?;
        tracing::debug!("Opened step database at {:?}", path);
        Ok(DataManager { database })
    }

    pub async fn in_memory() -> Result<Self, DataManagerError> {
        let database = StepDatabase::connect_in_memory().await?;
        Ok(DataManager { database })
    }

    /// Creates the steps table if absent. Returns whether it succeeded.
    pub async fn ensure_schema(&self) -> bool {
        match self.database.init().await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Failed to ensure schema: {err}");
                false
            }
        }
    }

    pub async fn list_all(&self) -> Vec<StepRecord> {
        match self.database.get_step_records().await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!("Failed to list step records: {err}");
                Vec::new()
            }
        }
    }

    pub async fn append(&self, record: NewStepRecord) -> Option<StepRecord> {
        match self.database.insert_step_record(record).await {
            Ok(record) => {
                tracing::info!("Recorded {} steps for {}", record.steps, record.date_label());
                Some(record)
            }
            Err(err) => {
                tracing::error!("Failed to append step record: {err}");
                None
            }
        }
    }
}

#[tokio::test]
async fn history_round_trip() {
    let data_manager = DataManager::in_memory().await.unwrap();
    assert!(data_manager.ensure_schema().await);

    let appended = data_manager.append(NewStepRecord::new(6, 15, 1300)).await.unwrap();

    let records = data_manager.list_all().await;
    assert_eq!(records, vec![appended.clone()]);
    assert_eq!(appended.steps, 1300);
    assert_eq!((appended.month, appended.day), (6, 15));
}

#[tokio::test]
async fn failures_degrade_to_nothing() {
    // No schema, so both reads and writes fail
    let data_manager = DataManager::in_memory().await.unwrap();

    assert!(data_manager.list_all().await.is_empty());
    assert!(data_manager.append(NewStepRecord::new(1, 2, 3)).await.is_none());
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let data_manager = DataManager::in_memory().await.unwrap();
    assert!(data_manager.ensure_schema().await);
    data_manager.append(NewStepRecord::new(6, 15, 1300)).await.unwrap();
    assert!(data_manager.ensure_schema().await);

    assert_eq!(data_manager.list_all().await.len(), 1);
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!("step_tracker_reopen_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let first = DataManager::open(&path).await.unwrap();
    assert!(first.ensure_schema().await);
    first.append(NewStepRecord::new(3, 9, 420)).await.unwrap();
    drop(first);

    let second = DataManager::open(&path).await.unwrap();
    assert!(second.ensure_schema().await);
    let records = second.list_all().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].steps, 420);

    let _ = std::fs::remove_file(&path);
}
