use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use tributary_model::ProcessForm;

use crate::types::{AuditEntry, ProcessRecord, ProcessState, TaskRecord};
use crate::{ProcessStore, StoreError};

/// SQLite-based store implementation.
pub struct SqliteStore {
  pool: SqlitePool,
}

#[derive(FromRow)]
struct ProcessRow {
  process_id: String,
  process_name: String,
  state: ProcessState,
  form: Json<ProcessForm>,
  history: Json<Vec<AuditEntry>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<ProcessRow> for ProcessRecord {
  fn from(row: ProcessRow) -> Self {
    Self {
      process_id: row.process_id,
      process_name: row.process_name,
      state: row.state,
      form: row.form.0,
      history: row.history.0,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if needed) the database at `url` and run migrations.
  pub async fn connect(url: &str) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// A private in-memory database, mostly for tests.
  pub async fn in_memory() -> Result<Self, StoreError> {
    // Every connection to `:memory:` is a separate database, so pin the pool to one.
    let pool = SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
      .connect("sqlite::memory:")
      .await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations")
      .run(&self.pool)
      .await
      .map_err(sqlx::Error::from)?;
    Ok(())
  }
}

fn map_insert_error(err: sqlx::Error, id: &str) -> StoreError {
  match &err {
    sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists(id.to_string()),
    _ => StoreError::Database(err),
  }
}

#[async_trait]
impl ProcessStore for SqliteStore {
  async fn create_process(
    &self,
    process: &ProcessRecord,
    tasks: &[TaskRecord],
  ) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      r#"
            INSERT INTO processes (process_id, process_name, state, form, history, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
    )
    .bind(&process.process_id)
    .bind(&process.process_name)
    .bind(process.state)
    .bind(Json(&process.form))
    .bind(Json(&process.history))
    .bind(process.created_at)
    .bind(process.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_insert_error(e, &process.process_id))?;

    for task in tasks {
      sqlx::query(
        r#"
            INSERT INTO process_tasks (task_id, process_id, task_name, status, created_at, completed_at, error)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
      )
      .bind(&task.task_id)
      .bind(&task.process_id)
      .bind(&task.task_name)
      .bind(task.status)
      .bind(task.created_at)
      .bind(task.completed_at)
      .bind(&task.error)
      .execute(&mut *tx)
      .await
      .map_err(|e| map_insert_error(e, &task.task_id))?;
    }

    tx.commit().await?;
    Ok(())
  }

  async fn get_process(&self, process_id: &str) -> Result<ProcessRecord, StoreError> {
    let row: Option<ProcessRow> = sqlx::query_as(
      r#"
            SELECT process_id, process_name, state, form, history, created_at, updated_at
            FROM processes
            WHERE process_id = ?
            "#,
    )
    .bind(process_id)
    .fetch_optional(&self.pool)
    .await?;

    row
      .map(ProcessRecord::from)
      .ok_or_else(|| StoreError::NotFound(process_id.to_string()))
  }

  async fn update_process(&self, process: &ProcessRecord) -> Result<(), StoreError> {
    let result = sqlx::query(
      r#"
            UPDATE processes
            SET state = ?, form = ?, history = ?, updated_at = ?
            WHERE process_id = ?
            "#,
    )
    .bind(process.state)
    .bind(Json(&process.form))
    .bind(Json(&process.history))
    .bind(process.updated_at)
    .bind(&process.process_id)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      return Err(StoreError::NotFound(process.process_id.clone()));
    }
    Ok(())
  }

  async fn list_processes(&self, process_name: &str) -> Result<Vec<ProcessRecord>, StoreError> {
    let rows: Vec<ProcessRow> = sqlx::query_as(
      r#"
            SELECT process_id, process_name, state, form, history, created_at, updated_at
            FROM processes
            WHERE process_name = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
    )
    .bind(process_name)
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(ProcessRecord::from).collect())
  }

  async fn list_tasks(&self, process_id: &str) -> Result<Vec<TaskRecord>, StoreError> {
    let tasks = sqlx::query_as(
      r#"
            SELECT task_id, process_id, task_name, status, created_at, completed_at, error
            FROM process_tasks
            WHERE process_id = ?
            ORDER BY rowid ASC
            "#,
    )
    .bind(process_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(tasks)
  }
}
