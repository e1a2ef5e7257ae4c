//! Aggregation & filter engine. Stateless, read-only: filters and derives
//! display statistics over task listings fetched from the store.

use serde::{Deserialize, Deserializer, Serialize};

use crate::tasks::model::{priority_rank, TaskRow};

/// Optional filter predicates, AND-combined. Field names match the query
/// string parameters of the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilters {
    /// Case-insensitive substring match on the task name.
    pub filter_name: Option<String>,
    /// Exact match on the `YYYY-MM-DD` due date.
    pub filter_due_date: Option<String>,
    pub filter_priority: Option<String>,
    pub filter_status: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub filter_classification_id: Option<i64>,
}

/// Query strings submit every form field, filled or not, so an untouched id
/// picker arrives as `filter_classification_id=`. Treat blank as absent
/// rather than failing integer deserialization.
fn empty_as_none<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Apply every supplied filter to `tasks`. An absent filter constrains
/// nothing; blank strings are treated as absent (an empty form field).
pub fn apply_filters(mut tasks: Vec<TaskRow>, filters: &TaskFilters) -> Vec<TaskRow> {
    if let Some(name) = filters.filter_name.as_deref().filter(|s| !s.is_empty()) {
        let needle = name.to_lowercase();
        tasks.retain(|t| t.name.to_lowercase().contains(&needle));
    }
    if let Some(due) = filters.filter_due_date.as_deref().filter(|s| !s.is_empty()) {
        tasks.retain(|t| t.due_date == due);
    }
    if let Some(priority) = filters.filter_priority.as_deref().filter(|s| !s.is_empty()) {
        tasks.retain(|t| t.priority == priority);
    }
    if let Some(status) = filters.filter_status.as_deref().filter(|s| !s.is_empty()) {
        tasks.retain(|t| t.status == status);
    }
    if let Some(id) = filters.filter_classification_id {
        tasks.retain(|t| t.classification_id == Some(id));
    }
    tasks
}

/// Display statistics over one task listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub count: usize,
    pub completed_count: usize,
    /// completed_count / count × 100; 0 when there are no tasks.
    pub completion_rate_pct: f64,
    /// Mean ordinal priority (High=1, Medium=2, Low=3).
    ///
    /// The denominator is the *total* task count: a task whose priority is
    /// outside the recognized set contributes nothing to the sum but still
    /// counts toward the mean, dragging it down. That is the specified
    /// behavior, kept as-is.
    pub average_priority: f64,
}

pub fn compute_stats(tasks: &[TaskRow]) -> TaskStats {
    let count = tasks.len();
    let completed_count = tasks.iter().filter(|t| t.status == "Completed").count();
    let completion_rate_pct = if count > 0 {
        completed_count as f64 / count as f64 * 100.0
    } else {
        0.0
    };
    let priority_sum: u32 = tasks
        .iter()
        .filter_map(|t| priority_rank(&t.priority))
        .sum();
    let average_priority = if count > 0 {
        f64::from(priority_sum) / count as f64
    } else {
        0.0
    };
    TaskStats {
        count,
        completed_count,
        completion_rate_pct,
        average_priority,
    }
}
