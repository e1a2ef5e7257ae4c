//! Classification registry — maps a classification name to a stable id.

use sqlx::{SqliteConnection, SqlitePool};

use super::model::ClassificationRow;
use super::TaskError;

/// Return the id of the classification named `name`, creating it if absent.
///
/// Runs on the caller's transaction connection so the lookup-or-create is
/// part of the surrounding mutation. The `ON CONFLICT ... DO UPDATE` arm
/// re-affirms the existing row's own name purely so `RETURNING` yields its
/// id — two concurrent callers with the same name converge on one row and
/// one id, and neither sees a uniqueness error.
///
/// `name` must already be trimmed and non-empty; callers with a blank name
/// pass an explicit id (or none) instead of calling here.
pub async fn resolve_or_create(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<i64, TaskError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO classifications (name) VALUES (?)
         ON CONFLICT(name) DO UPDATE SET name = excluded.name
         RETURNING classification_id",
    )
    .bind(name)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// All classifications, ordered by name. Read-only; used by filter/picker UIs.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ClassificationRow>, TaskError> {
    super::with_timeout(async {
        Ok(
            sqlx::query_as("SELECT * FROM classifications ORDER BY name")
                .fetch_all(pool)
                .await?,
        )
    })
    .await
}
