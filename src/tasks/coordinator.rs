//! Mutation transaction coordinator.
//!
//! Each mutation — add, edit, delete — is one SQLite transaction.
//! Classification resolution, the task write, and the history append all run
//! on that transaction's connection, so any failure (validation, dangling
//! reference, busy database) rolls the whole operation back; callers never
//! observe a partial apply. SQLite transactions are serializable, which is
//! the only concurrency control this module relies on.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::model::{AddTaskRequest, EditTaskRequest};
use super::{classification, history, store, TaskError};

#[derive(Clone)]
pub struct MutationCoordinator {
    pool: SqlitePool,
}

impl MutationCoordinator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate and insert a new task; returns the assigned task id.
    ///
    /// A non-blank `new_classification` is resolved-or-created inside the
    /// transaction, so two concurrent adds naming the same new classification
    /// both succeed and share one classification row.
    pub async fn add_task(&self, req: &AddTaskRequest) -> Result<i64, TaskError> {
        let fields = req.fields()?;
        let mut tx = self.pool.begin().await?;
        let classification_id = resolve_classification(
            &mut tx,
            req.new_classification.as_deref(),
            req.classification_id,
        )
        .await?;
        let task_id = store::insert(&mut tx, &fields, classification_id).await?;
        tx.commit().await?;
        info!(task_id, name = %fields.name, "task created");
        Ok(task_id)
    }

    /// Apply a full-replace edit to an existing task.
    ///
    /// Appends the history snapshot of the values being applied *before*
    /// updating the task row, in the same transaction: the snapshot and the
    /// update commit together or not at all. The snapshot deliberately
    /// records the post-edit values — history logs what became true at each
    /// edit, not what was overwritten.
    pub async fn edit_task(&self, task_id: i64, req: &EditTaskRequest) -> Result<(), TaskError> {
        let mut tx = self.pool.begin().await?;
        if store::get_tx(&mut tx, task_id).await?.is_none() {
            // Dropping the transaction rolls it back; nothing was written.
            return Err(TaskError::NotFound(task_id));
        }
        let fields = req.fields()?;
        let classification_id = resolve_classification(
            &mut tx,
            req.new_classification.as_deref(),
            req.classification_id,
        )
        .await?;
        let timestamp = Utc::now().to_rfc3339();
        history::append(&mut tx, task_id, &fields, classification_id, &timestamp).await?;
        store::update(&mut tx, task_id, &fields, classification_id).await?;
        tx.commit().await?;
        info!(task_id, "task edited");
        Ok(())
    }

    /// Delete a task and, via cascade, all of its history rows.
    /// Returns `NotFound` when the task does not exist.
    pub async fn delete_task(&self, task_id: i64) -> Result<(), TaskError> {
        let mut tx = self.pool.begin().await?;
        let affected = store::delete(&mut tx, task_id).await?;
        if affected == 0 {
            return Err(TaskError::NotFound(task_id));
        }
        tx.commit().await?;
        info!(task_id, "task deleted");
        Ok(())
    }
}

/// Decide the classification id for a mutation, on the mutation's own
/// transaction connection.
///
/// A non-blank `new_name` wins and goes through the registry upsert. An
/// explicit `existing` id is checked against the classifications table and
/// rejected as a `Reference` error when dangling. Neither means no
/// classification.
async fn resolve_classification(
    conn: &mut SqliteConnection,
    new_name: Option<&str>,
    existing: Option<i64>,
) -> Result<Option<i64>, TaskError> {
    if let Some(name) = new_name {
        let name = name.trim();
        if !name.is_empty() {
            return Ok(Some(classification::resolve_or_create(conn, name).await?));
        }
    }
    match existing {
        Some(id) => {
            if !store::classification_exists(conn, id).await? {
                return Err(TaskError::Reference(id));
            }
            Ok(Some(id))
        }
        None => Ok(None),
    }
}
