//! Task store — current-state task rows.
//!
//! Write helpers take `&mut SqliteConnection` so they always run on the
//! coordinator's transaction; reads go straight to the pool.

use sqlx::{SqliteConnection, SqlitePool};

use super::model::{TaskFields, TaskRow};
use super::TaskError;

/// True if `classification_id` names an existing classification row.
pub async fn classification_exists(
    conn: &mut SqliteConnection,
    classification_id: i64,
) -> Result<bool, TaskError> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT classification_id FROM classifications WHERE classification_id = ?",
    )
    .bind(classification_id)
    .fetch_optional(conn)
    .await?;
    Ok(found.is_some())
}

/// Insert a new task row; returns the assigned task id.
pub async fn insert(
    conn: &mut SqliteConnection,
    fields: &TaskFields,
    classification_id: Option<i64>,
) -> Result<i64, TaskError> {
    let result = sqlx::query(
        "INSERT INTO tasks (name, due_date, priority, status, classification_id)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&fields.name)
    .bind(fields.due_date.to_string())
    .bind(&fields.priority)
    .bind(&fields.status)
    .bind(classification_id)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Fetch one task inside a transaction (existence check before writes).
pub async fn get_tx(
    conn: &mut SqliteConnection,
    task_id: i64,
) -> Result<Option<TaskRow>, TaskError> {
    Ok(sqlx::query_as("SELECT * FROM tasks WHERE task_id = ?")
        .bind(task_id)
        .fetch_optional(conn)
        .await?)
}

/// Fetch one task through the pool.
pub async fn get(pool: &SqlitePool, task_id: i64) -> Result<Option<TaskRow>, TaskError> {
    Ok(sqlx::query_as("SELECT * FROM tasks WHERE task_id = ?")
        .bind(task_id)
        .fetch_optional(pool)
        .await?)
}

/// Full replace of a task's mutable attributes. Returns rows affected
/// (0 when the task does not exist).
pub async fn update(
    conn: &mut SqliteConnection,
    task_id: i64,
    fields: &TaskFields,
    classification_id: Option<i64>,
) -> Result<u64, TaskError> {
    let result = sqlx::query(
        "UPDATE tasks
         SET name = ?, due_date = ?, priority = ?, status = ?, classification_id = ?
         WHERE task_id = ?",
    )
    .bind(&fields.name)
    .bind(fields.due_date.to_string())
    .bind(&fields.priority)
    .bind(&fields.status)
    .bind(classification_id)
    .bind(task_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a task; history rows go with it via ON DELETE CASCADE.
/// Returns rows affected (0 when the task does not exist).
pub async fn delete(conn: &mut SqliteConnection, task_id: i64) -> Result<u64, TaskError> {
    let result = sqlx::query("DELETE FROM tasks WHERE task_id = ?")
        .bind(task_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// All tasks, soonest due date first. Filtering happens in-process
/// (`crate::stats::apply_filters`) over this listing.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TaskRow>, TaskError> {
    super::with_timeout(async {
        Ok(
            sqlx::query_as("SELECT * FROM tasks ORDER BY due_date, task_id")
                .fetch_all(pool)
                .await?,
        )
    })
    .await
}
