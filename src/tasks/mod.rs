pub mod classification;
pub mod coordinator;
pub mod history;
pub mod model;
pub mod store;

pub use coordinator::MutationCoordinator;
pub use model::{AddTaskRequest, ClassificationRow, EditTaskRequest, HistoryRow, TaskRow};

/// Errors surfaced by task mutations and lookups.
///
/// Every variant maps to a distinct caller contract: `Validation` and
/// `Reference` mean the request was bad, `NotFound` means the target row is
/// absent, `Conflict` means the whole operation rolled back under contention
/// and may be retried verbatim, `Storage` means the database itself failed.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("classification not found: {0}")]
    Reference(i64),
    #[error("task not found: {0}")]
    NotFound(i64),
    #[error("transaction conflict, safe to retry: {0}")]
    Conflict(String),
    #[error("database query timed out after {}s", .0.as_secs())]
    Timeout(std::time::Duration),
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

/// Execute a future with the standard query timeout.
/// Returns `TaskError::Timeout` if the operation takes longer than
/// [`crate::storage::QUERY_TIMEOUT`].
pub(crate) async fn with_timeout<T>(
    fut: impl std::future::Future<Output = Result<T, TaskError>>,
) -> Result<T, TaskError> {
    let limit = crate::storage::QUERY_TIMEOUT;
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(TaskError::Timeout(limit)),
    }
}

impl TaskError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for TaskError {
    fn from(e: sqlx::Error) -> Self {
        // SQLITE_BUSY (5) / SQLITE_LOCKED (6) mean the transaction lost a
        // serialization race — retryable, not a storage fault.
        if let sqlx::Error::Database(ref db) = e {
            let code = db.code();
            let code = code.as_deref().unwrap_or("");
            if code == "5" || code == "6" || db.message().contains("database is locked") {
                return Self::Conflict(db.message().to_string());
            }
        }
        Self::Storage(e)
    }
}
