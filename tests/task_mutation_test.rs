//! Integration tests for the mutation transaction coordinator.
//! Every test runs against a real SQLite database in a temp directory.

use std::time::Duration;

use taskd::storage::Storage;
use taskd::tasks::{
    classification, history, store, AddTaskRequest, EditTaskRequest, MutationCoordinator,
    TaskError,
};

async fn setup() -> (MutationCoordinator, Storage) {
    let data_dir = tempfile::tempdir().unwrap().keep();
    let storage = Storage::new(&data_dir).await.unwrap();
    let coordinator = MutationCoordinator::new(storage.pool());
    (coordinator, storage)
}

#[tokio::test]
async fn test_storage_opens_with_slow_query_logging() {
    let data_dir = tempfile::tempdir().unwrap().keep();
    let storage = Storage::new_with_slow_query(&data_dir, 100).await.unwrap();
    let coordinator = MutationCoordinator::new(storage.pool());

    let task_id = coordinator.add_task(&add_request("logged")).await.unwrap();
    let task = store::get(&storage.pool(), task_id).await.unwrap().unwrap();
    assert_eq!(task.name, "logged");
}

fn add_request(name: &str) -> AddTaskRequest {
    AddTaskRequest {
        name: name.to_string(),
        due_date: "2026-09-15".to_string(),
        priority: "High".to_string(),
        status: "Pending".to_string(),
        classification_id: None,
        new_classification: None,
    }
}

fn edit_request(name: &str, status: &str) -> EditTaskRequest {
    EditTaskRequest {
        name: name.to_string(),
        due_date: "2026-09-20".to_string(),
        priority: "Medium".to_string(),
        status: status.to_string(),
        classification_id: None,
        new_classification: None,
    }
}

// ── Add ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_task_round_trips_through_listing() {
    let (coordinator, storage) = setup().await;

    let mut req = add_request("Ship quarterly report");
    req.new_classification = Some("Work".to_string());
    let task_id = coordinator.add_task(&req).await.unwrap();

    let tasks = store::list_all(&storage.pool()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    let task = &tasks[0];
    assert_eq!(task.task_id, task_id);
    assert_eq!(task.name, "Ship quarterly report");
    assert_eq!(task.due_date, "2026-09-15");
    assert_eq!(task.priority, "High");
    assert_eq!(task.status, "Pending");
    assert!(task.classification_id.is_some());

    let classifications = classification::list_all(&storage.pool()).await.unwrap();
    assert_eq!(classifications.len(), 1);
    assert_eq!(classifications[0].name, "Work");
    assert_eq!(
        Some(classifications[0].classification_id),
        task.classification_id
    );
}

#[tokio::test]
async fn test_add_task_rejects_malformed_input() {
    let (coordinator, storage) = setup().await;

    let mut bad_date = add_request("t");
    bad_date.due_date = "not-a-date".to_string();
    assert!(matches!(
        coordinator.add_task(&bad_date).await.unwrap_err(),
        TaskError::Validation { field: "due_date", .. }
    ));

    let mut bad_priority = add_request("t");
    bad_priority.priority = "Critical".to_string();
    assert!(matches!(
        coordinator.add_task(&bad_priority).await.unwrap_err(),
        TaskError::Validation { field: "priority", .. }
    ));

    let empty_name = add_request("   ");
    assert!(matches!(
        coordinator.add_task(&empty_name).await.unwrap_err(),
        TaskError::Validation { field: "name", .. }
    ));

    // Nothing committed from any of the failed adds.
    assert!(store::list_all(&storage.pool()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_task_rejects_dangling_classification_id() {
    let (coordinator, storage) = setup().await;

    let mut req = add_request("t");
    req.classification_id = Some(999);
    assert!(matches!(
        coordinator.add_task(&req).await.unwrap_err(),
        TaskError::Reference(999)
    ));
    assert!(store::list_all(&storage.pool()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_new_classification_falls_back_to_explicit_id() {
    let (coordinator, storage) = setup().await;

    let mut seed = add_request("seed");
    seed.new_classification = Some("Errands".to_string());
    let seed_id = coordinator.add_task(&seed).await.unwrap();
    let seed_task = store::get(&storage.pool(), seed_id).await.unwrap().unwrap();
    let cls_id = seed_task.classification_id.unwrap();

    // Whitespace-only new name must not create a classification; the
    // explicit id is used instead.
    let mut req = add_request("second");
    req.new_classification = Some("   ".to_string());
    req.classification_id = Some(cls_id);
    let id = coordinator.add_task(&req).await.unwrap();

    let task = store::get(&storage.pool(), id).await.unwrap().unwrap();
    assert_eq!(task.classification_id, Some(cls_id));
    let classifications = classification::list_all(&storage.pool()).await.unwrap();
    assert_eq!(classifications.len(), 1);
}

// ── Classification convergence ───────────────────────────────────────────────

async fn add_until_ok(coordinator: &MutationCoordinator, req: &AddTaskRequest) -> i64 {
    loop {
        match coordinator.add_task(req).await {
            Ok(id) => return id,
            // Lost a serialization race — the documented retry contract.
            Err(TaskError::Conflict(_)) => tokio::time::sleep(Duration::from_millis(5)).await,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[tokio::test]
async fn test_concurrent_adds_converge_on_one_classification() {
    let (coordinator, storage) = setup().await;

    let mut a = add_request("first");
    a.new_classification = Some("Urgent".to_string());
    let mut b = add_request("second");
    b.new_classification = Some("Urgent".to_string());

    let c2 = coordinator.clone();
    let (id_a, id_b) = tokio::join!(
        add_until_ok(&coordinator, &a),
        add_until_ok(&c2, &b),
    );

    let classifications = classification::list_all(&storage.pool()).await.unwrap();
    assert_eq!(classifications.len(), 1, "one 'Urgent' row, not two");
    assert_eq!(classifications[0].name, "Urgent");
    let cls_id = classifications[0].classification_id;

    let task_a = store::get(&storage.pool(), id_a).await.unwrap().unwrap();
    let task_b = store::get(&storage.pool(), id_b).await.unwrap().unwrap();
    assert_eq!(task_a.classification_id, Some(cls_id));
    assert_eq!(task_b.classification_id, Some(cls_id));
}

#[tokio::test]
async fn test_repeated_classification_name_reuses_the_row() {
    let (coordinator, storage) = setup().await;

    let mut a = add_request("first");
    a.new_classification = Some("Home".to_string());
    let mut b = add_request("second");
    b.new_classification = Some("Home".to_string());
    coordinator.add_task(&a).await.unwrap();
    coordinator.add_task(&b).await.unwrap();

    let classifications = classification::list_all(&storage.pool()).await.unwrap();
    assert_eq!(classifications.len(), 1);
}

// ── Edit & history ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_each_edit_appends_one_snapshot_newest_first() {
    let (coordinator, storage) = setup().await;
    let task_id = coordinator.add_task(&add_request("draft")).await.unwrap();

    coordinator
        .edit_task(task_id, &edit_request("draft v2", "In Progress"))
        .await
        .unwrap();
    // Distinct timestamps for the ordering assertion.
    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator
        .edit_task(task_id, &edit_request("draft v3", "Completed"))
        .await
        .unwrap();

    let entries = history::list_for_task(&storage.pool(), task_id).await.unwrap();
    assert_eq!(entries.len(), 2, "one snapshot per successful edit");

    // Newest first; each snapshot holds the values that edit applied.
    assert_eq!(entries[0].name, "draft v3");
    assert_eq!(entries[0].status, "Completed");
    assert_eq!(entries[1].name, "draft v2");
    assert_eq!(entries[1].status, "In Progress");
    assert!(entries[0].timestamp >= entries[1].timestamp);

    // The task row holds the latest applied state.
    let task = store::get(&storage.pool(), task_id).await.unwrap().unwrap();
    assert_eq!(task.name, "draft v3");
    assert_eq!(task.status, "Completed");
    assert_eq!(task.priority, "Medium");
    assert_eq!(task.due_date, "2026-09-20");
}

#[tokio::test]
async fn test_edit_missing_task_changes_nothing() {
    let (coordinator, storage) = setup().await;
    let task_id = coordinator.add_task(&add_request("keeper")).await.unwrap();

    let err = coordinator
        .edit_task(task_id + 100, &edit_request("ghost", "Pending"))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::NotFound(_)));

    let tasks = store::list_all(&storage.pool()).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "keeper");
    let entries = history::list_for_task(&storage.pool(), task_id).await.unwrap();
    assert!(entries.is_empty(), "no snapshot without a successful edit");
}

#[tokio::test]
async fn test_failed_edit_rolls_back_history_append() {
    let (coordinator, storage) = setup().await;
    let task_id = coordinator.add_task(&add_request("stable")).await.unwrap();

    // Dangling classification fails the edit after validation would have
    // passed; the history append and the update must both roll back.
    let mut req = edit_request("stable v2", "Completed");
    req.classification_id = Some(42);
    let err = coordinator.edit_task(task_id, &req).await.unwrap_err();
    assert!(matches!(err, TaskError::Reference(42)));

    let task = store::get(&storage.pool(), task_id).await.unwrap().unwrap();
    assert_eq!(task.name, "stable", "update rolled back");
    let entries = history::list_for_task(&storage.pool(), task_id).await.unwrap();
    assert!(entries.is_empty(), "snapshot rolled back with the update");
}

#[tokio::test]
async fn test_edit_can_create_a_new_classification() {
    let (coordinator, storage) = setup().await;
    let task_id = coordinator.add_task(&add_request("untagged")).await.unwrap();

    let mut req = edit_request("tagged", "Pending");
    req.new_classification = Some("Late".to_string());
    coordinator.edit_task(task_id, &req).await.unwrap();

    let task = store::get(&storage.pool(), task_id).await.unwrap().unwrap();
    let classifications = classification::list_all(&storage.pool()).await.unwrap();
    assert_eq!(classifications.len(), 1);
    assert_eq!(classifications[0].name, "Late");
    assert_eq!(
        task.classification_id,
        Some(classifications[0].classification_id)
    );
    // The snapshot carries the resolved classification too.
    let entries = history::list_for_task(&storage.pool(), task_id).await.unwrap();
    assert_eq!(entries[0].classification_id, task.classification_id);
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_cascades_history() {
    let (coordinator, storage) = setup().await;
    let task_id = coordinator.add_task(&add_request("doomed")).await.unwrap();
    coordinator
        .edit_task(task_id, &edit_request("doomed v2", "In Progress"))
        .await
        .unwrap();
    assert_eq!(
        history::list_for_task(&storage.pool(), task_id)
            .await
            .unwrap()
            .len(),
        1
    );

    coordinator.delete_task(task_id).await.unwrap();

    assert!(store::get(&storage.pool(), task_id).await.unwrap().is_none());
    assert!(
        history::list_for_task(&storage.pool(), task_id)
            .await
            .unwrap()
            .is_empty(),
        "history rows cascade with the task"
    );
}

#[tokio::test]
async fn test_delete_missing_task_is_not_found() {
    let (coordinator, _storage) = setup().await;
    assert!(matches!(
        coordinator.delete_task(12345).await.unwrap_err(),
        TaskError::NotFound(12345)
    ));
}
