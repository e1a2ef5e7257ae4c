use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TaskError;

/// Recognized priorities, highest first.
pub const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

/// Recognized statuses.
pub const STATUSES: [&str; 3] = ["Pending", "In Progress", "Completed"];

/// Ordinal rank of a priority: High=1, Medium=2, Low=3.
/// Returns `None` for values outside the recognized set.
pub fn priority_rank(priority: &str) -> Option<u32> {
    match priority {
        "High" => Some(1),
        "Medium" => Some(2),
        "Low" => Some(3),
        _ => None,
    }
}

// ─── Row types ────────────────────────────────────────────────────────────────

/// Current state of one task.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TaskRow {
    pub task_id: i64,
    pub name: String,
    /// Normalized `YYYY-MM-DD`.
    pub due_date: String,
    pub priority: String,
    pub status: String,
    pub classification_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub classification_id: i64,
    pub name: String,
}

/// Immutable snapshot of a task's values captured at one edit event.
///
/// Snapshots record the values *applied by* the edit (what became true), not
/// the values it overwrote. Rows are never updated; they are only deleted by
/// cascade when the owning task is deleted.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct HistoryRow {
    pub history_id: i64,
    pub task_id: i64,
    pub name: String,
    pub due_date: String,
    pub priority: String,
    pub status: String,
    pub classification_id: Option<i64>,
    /// Event time, RFC 3339 UTC.
    pub timestamp: String,
}

// ─── Mutation requests ────────────────────────────────────────────────────────

/// Input for `MutationCoordinator::add_task`.
///
/// `new_classification`, when non-empty after trimming, wins over
/// `classification_id`: the name is resolved-or-created inside the add
/// transaction. Otherwise `classification_id` (or none) is used as given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddTaskRequest {
    pub name: String,
    pub due_date: String,
    pub priority: String,
    pub status: String,
    #[serde(default)]
    pub classification_id: Option<i64>,
    #[serde(default)]
    pub new_classification: Option<String>,
}

/// Input for `MutationCoordinator::edit_task`. Full replace of the mutable
/// attributes; classification resolution works as in [`AddTaskRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditTaskRequest {
    pub name: String,
    pub due_date: String,
    pub priority: String,
    pub status: String,
    #[serde(default)]
    pub classification_id: Option<i64>,
    #[serde(default)]
    pub new_classification: Option<String>,
}

/// Parsed and validated mutable task fields, shared by add and edit.
#[derive(Debug, Clone)]
pub struct TaskFields {
    pub name: String,
    pub due_date: NaiveDate,
    pub priority: String,
    pub status: String,
}

impl TaskFields {
    /// Validate raw field values: name non-empty after trimming, due date a
    /// real `YYYY-MM-DD` calendar date, priority and status in their allowed
    /// sets. First offending field wins.
    pub fn parse(
        name: &str,
        due_date: &str,
        priority: &str,
        status: &str,
    ) -> Result<Self, TaskError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TaskError::validation("name", "must not be empty"));
        }
        let due_date = NaiveDate::parse_from_str(due_date, "%Y-%m-%d").map_err(|_| {
            TaskError::validation("due_date", format!("not a YYYY-MM-DD date: {due_date:?}"))
        })?;
        if !PRIORITIES.contains(&priority) {
            return Err(TaskError::validation(
                "priority",
                format!("expected one of {PRIORITIES:?}, got {priority:?}"),
            ));
        }
        if !STATUSES.contains(&status) {
            return Err(TaskError::validation(
                "status",
                format!("expected one of {STATUSES:?}, got {status:?}"),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            due_date,
            priority: priority.to_string(),
            status: status.to_string(),
        })
    }
}

impl AddTaskRequest {
    pub fn fields(&self) -> Result<TaskFields, TaskError> {
        TaskFields::parse(&self.name, &self.due_date, &self.priority, &self.status)
    }
}

impl EditTaskRequest {
    pub fn fields(&self) -> Result<TaskFields, TaskError> {
        TaskFields::parse(&self.name, &self.due_date, &self.priority, &self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_fields() {
        let f = TaskFields::parse("Ship report", "2026-09-15", "High", "Pending").unwrap();
        assert_eq!(f.name, "Ship report");
        assert_eq!(f.due_date.to_string(), "2026-09-15");
    }

    #[test]
    fn parse_trims_name() {
        let f = TaskFields::parse("  padded  ", "2026-01-01", "Low", "Completed").unwrap();
        assert_eq!(f.name, "padded");
    }

    #[test]
    fn parse_rejects_empty_name() {
        let err = TaskFields::parse("   ", "2026-01-01", "Low", "Pending").unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "name", .. }));
    }

    #[test]
    fn parse_rejects_bad_date() {
        for bad in ["2026-13-01", "2026-02-30", "15/09/2026", "soon"] {
            let err = TaskFields::parse("t", bad, "Low", "Pending").unwrap_err();
            assert!(
                matches!(err, TaskError::Validation { field: "due_date", .. }),
                "{bad} should fail date validation"
            );
        }
    }

    #[test]
    fn parse_rejects_unknown_priority_and_status() {
        let err = TaskFields::parse("t", "2026-01-01", "Urgent", "Pending").unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "priority", .. }));
        let err = TaskFields::parse("t", "2026-01-01", "Low", "Done").unwrap_err();
        assert!(matches!(err, TaskError::Validation { field: "status", .. }));
    }

    #[test]
    fn priority_rank_maps_recognized_values_only() {
        assert_eq!(priority_rank("High"), Some(1));
        assert_eq!(priority_rank("Medium"), Some(2));
        assert_eq!(priority_rank("Low"), Some(3));
        assert_eq!(priority_rank("Urgent"), None);
    }
}
