//! History log — append-only ledger of per-edit task snapshots.

use sqlx::{SqliteConnection, SqlitePool};

use super::model::{HistoryRow, TaskFields};
use super::TaskError;

/// Append one snapshot for `task_id`. Pure insert; runs on the caller's
/// transaction so the snapshot and the task update it precedes commit or
/// roll back together.
pub async fn append(
    conn: &mut SqliteConnection,
    task_id: i64,
    fields: &TaskFields,
    classification_id: Option<i64>,
    timestamp: &str,
) -> Result<i64, TaskError> {
    let result = sqlx::query(
        "INSERT INTO task_history (task_id, name, due_date, priority, status, classification_id, timestamp)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(task_id)
    .bind(&fields.name)
    .bind(fields.due_date.to_string())
    .bind(&fields.priority)
    .bind(&fields.status)
    .bind(classification_id)
    .bind(timestamp)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// All snapshots for one task, newest first.
pub async fn list_for_task(
    pool: &SqlitePool,
    task_id: i64,
) -> Result<Vec<HistoryRow>, TaskError> {
    super::with_timeout(async {
        Ok(sqlx::query_as(
            "SELECT * FROM task_history WHERE task_id = ? ORDER BY timestamp DESC, history_id DESC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?)
    })
    .await
}
