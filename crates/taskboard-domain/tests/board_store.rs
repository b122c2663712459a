mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use support::{FakeApi, DOING, DONE, TODO};
use taskboard_core::{LogLevel, TaskboardError};
use taskboard_domain::{
    BoardStore, ColumnId, CompletionFilter, Identity, StoreOptions, SyncOutcome, TaskFilters,
    TaskId, TaskUpdate,
};

fn options() -> StoreOptions {
    StoreOptions {
        identity: Some(Identity {
            user_id: "u-bob".into(),
            email: Some("bob@example.com".into()),
        }),
        ..StoreOptions::default()
    }
}

async fn open(api: &Arc<FakeApi>) -> BoardStore {
    let store = BoardStore::new(api.clone(), options());
    store.load_project(1).await.unwrap();
    store
}

fn ids(store: &BoardStore, column: ColumnId) -> Vec<TaskId> {
    store.tasks(column).iter().map(|t| t.id).collect()
}

fn assert_matches_server(store: &BoardStore, api: &FakeApi) {
    for column in [TODO, DOING, DONE] {
        assert_eq!(ids(store, column), api.server_column(column), "column {}", column);
    }
    store.snapshot().verify().unwrap();
}

#[tokio::test]
async fn test_load_project_orders_columns_and_tasks() {
    let api = FakeApi::seeded();
    let store = open(&api).await;

    let names: Vec<String> = store.columns().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["To do", "Doing", "Done"]);
    assert_eq!(ids(&store, TODO), vec![1, 2, 3]);
    assert_eq!(ids(&store, DOING), vec![4]);
    assert!(ids(&store, DONE).is_empty());
}

#[tokio::test]
async fn test_move_is_visible_before_the_server_answers() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.gate("update_task");

    let (outcome, ()) = tokio::join!(store.move_task_to(1, DOING, 0), async {
        api.wait_for("update_task", 1).await;
        assert_eq!(ids(&store, TODO), vec![2, 3]);
        assert_eq!(ids(&store, DOING), vec![1, 4]);
        assert_eq!(api.server_column(DOING), vec![4]);
        api.release("update_task", 10);
    });

    assert_eq!(outcome.unwrap(), SyncOutcome::Confirmed);
    assert_matches_server(&store, &api);
    assert_eq!(api.call_count("update_task"), 4);
}

#[tokio::test]
async fn test_move_persists_sibling_orders() {
    let api = FakeApi::seeded();
    let store = open(&api).await;

    let outcome = store.move_task_to(3, TODO, 0).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Confirmed);
    assert_eq!(ids(&store, TODO), vec![3, 1, 2]);
    let orders: Vec<i32> = store.tasks(TODO).iter().map(|t| t.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_matches_server(&store, &api);
}

#[tokio::test]
async fn test_rejected_move_rolls_back_to_server_state() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.fail_next("update_task", 1);

    let outcome = store.move_task_to(2, DONE, 0).await.unwrap();

    assert_eq!(outcome, SyncOutcome::Resynced);
    assert_eq!(ids(&store, TODO), vec![1, 2, 3]);
    assert!(ids(&store, DONE).is_empty());
    assert_eq!(api.call_count("list_tasks"), 3 + 2);
    assert!(store
        .logs()
        .iter()
        .any(|e| e.level == LogLevel::Warn && e.message.contains("Move of task 2")));
}

#[tokio::test]
async fn test_stale_resync_is_dropped_and_settled_later() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.fail_next("update_task", 1);
    api.gate("list_tasks");

    let (first, second) = tokio::join!(store.move_task_to(1, DOING, 0), async {
        api.wait_for("list_tasks", 3 + 2).await;
        let second = store.move_task_to(2, DONE, 0).await;
        api.release("list_tasks", 2);
        second
    });

    assert_eq!(first.unwrap(), SyncOutcome::Stale);
    assert_eq!(second.unwrap(), SyncOutcome::Confirmed);
    // The second move survived the late response.
    assert_eq!(ids(&store, DONE), vec![2]);
    assert_eq!(ids(&store, DOING), vec![4]);
    assert_eq!(store.snapshot().pending_resync(&[TODO, DOING]), vec![TODO]);

    // The next edit on the column re-reads it.
    api.release("list_tasks", 10);
    let update = TaskUpdate {
        title: Some("Order stickers".into()),
        ..TaskUpdate::default()
    };
    assert_eq!(
        store.update_task(3, update).await.unwrap(),
        SyncOutcome::Confirmed
    );
    assert!(store.snapshot().pending_resync(&[TODO]).is_empty());
    assert_matches_server(&store, &api);
    assert_eq!(store.task(3).unwrap().title, "Order stickers");
}

#[tokio::test]
async fn test_moving_the_same_task_twice_ends_at_the_last_target() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.gate("update_task");

    let (first, second) = tokio::join!(store.move_task_to(1, DOING, 0), async {
        api.wait_for("update_task", 1).await;
        let (second, ()) = tokio::join!(store.move_task_to(1, DONE, 0), async {
            api.wait_for("update_task", 2).await;
            // Let the first move's write of task 1 land before the second's.
            api.release("update_task", 1);
            api.wait_for("update_task", 3).await;
            api.release("update_task", 20);
        });
        second
    });

    assert_eq!(first.unwrap(), SyncOutcome::Confirmed);
    assert_eq!(second.unwrap(), SyncOutcome::Confirmed);
    assert_eq!(ids(&store, DONE), vec![1]);
    assert_eq!(api.server_task(1).unwrap().column, DONE);
}

#[tokio::test]
async fn test_sibling_write_skips_a_task_moved_again() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.gate("update_task");

    let (first, second) = tokio::join!(store.move_task_to(1, DOING, 0), async {
        api.wait_for("update_task", 1).await;
        // Task 3 is a pending sibling write of the first move.
        let (second, ()) = tokio::join!(store.move_task_to(3, DONE, 0), async {
            api.wait_for("update_task", 2).await;
            api.release("update_task", 20);
        });
        second
    });

    assert_eq!(first.unwrap(), SyncOutcome::Confirmed);
    assert_eq!(second.unwrap(), SyncOutcome::Confirmed);
    assert_eq!(ids(&store, TODO), vec![2]);
    assert_eq!(ids(&store, DONE), vec![3]);
    assert_eq!(api.server_task(3).unwrap().column, DONE);
    assert_matches_server(&store, &api);
    assert_eq!(api.call_count("update_task"), 4);
}

#[tokio::test]
async fn test_sibling_write_carries_a_concurrent_edit() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.gate("update_task");

    let (moved, edited) = tokio::join!(store.move_task_to(1, DOING, 0), async {
        api.wait_for("update_task", 1).await;
        let update = TaskUpdate {
            title: Some("Order stickers".into()),
            ..TaskUpdate::default()
        };
        let (edited, ()) = tokio::join!(store.update_task(3, update), async {
            api.wait_for("update_task", 2).await;
            api.release("update_task", 20);
        });
        edited
    });

    assert_eq!(moved.unwrap(), SyncOutcome::Confirmed);
    assert_eq!(edited.unwrap(), SyncOutcome::Confirmed);
    assert_eq!(store.task(3).unwrap().title, "Order stickers");
    assert_eq!(api.server_task(3).unwrap().title, "Order stickers");
    assert_matches_server(&store, &api);
}

#[tokio::test]
async fn test_refresh_during_a_move_does_not_undo_it() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.gate("update_task");

    let (moved, refreshed) = tokio::join!(store.move_task_to(1, DOING, 0), async {
        api.wait_for("update_task", 1).await;
        // The server still lists task 1 under To do.
        let refreshed = store.refresh_column(TODO).await;
        assert_eq!(ids(&store, TODO), vec![2, 3]);
        assert_eq!(ids(&store, DOING), vec![1, 4]);
        api.release("update_task", 10);
        refreshed
    });

    assert_eq!(refreshed.unwrap(), SyncOutcome::Stale);
    assert_eq!(moved.unwrap(), SyncOutcome::Confirmed);
    // The move re-read the column once its writes were through.
    assert!(store.snapshot().pending_resync(&[TODO]).is_empty());
    assert_eq!(api.server_task(1).unwrap().column, DOING);
    assert_matches_server(&store, &api);
}

#[tokio::test]
async fn test_signed_out_errors_are_returned() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.sign_out();

    let err = store.move_task_to(1, DOING, 0).await.unwrap_err();
    assert!(matches!(err, TaskboardError::Unauthenticated));

    let err = store.add_task(TODO, "New", "").await.unwrap_err();
    assert!(matches!(err, TaskboardError::Unauthenticated));
}

#[tokio::test]
async fn test_invalid_input_sends_no_request() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    let before = api.calls().len();

    assert!(matches!(
        store.add_task(TODO, "  ", "").await,
        Err(TaskboardError::Validation(_))
    ));
    assert!(matches!(
        store.add_column("").await,
        Err(TaskboardError::Validation(_))
    ));
    assert!(matches!(
        store.move_task_to(1, DOING, 5).await,
        Err(TaskboardError::Validation(_))
    ));
    assert!(matches!(
        store.delete_task(404).await,
        Err(TaskboardError::NotFound(_))
    ));

    assert_eq!(api.calls().len(), before);
    assert_eq!(ids(&store, TODO), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_add_task_records_creator_and_confirms() {
    let api = FakeApi::seeded();
    let store = open(&api).await;

    let (task, outcome) = store
        .add_task(DONE, "Send invites", "by Friday")
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Confirmed);
    assert!(task.id > 0);
    assert_eq!(task.order, 0);
    assert_eq!(task.creator.as_deref(), Some("u-bob"));
    assert_eq!(task.creator_email.as_deref(), Some("bob@example.com"));
    assert_eq!(ids(&store, DONE), vec![task.id]);
}

#[tokio::test]
async fn test_failed_create_removes_the_placeholder() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.fail_next("create_task", 1);

    let (placeholder, outcome) = store.add_task(TODO, "Doomed", "").await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Failed(_)));
    assert!(placeholder.is_provisional());
    assert_eq!(ids(&store, TODO), vec![1, 2, 3]);
    assert_eq!(store.logs().len(), 1);
}

#[tokio::test]
async fn test_unconfirmed_task_cannot_be_moved() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.gate("create_task");

    let (added, moved) = tokio::join!(store.add_task(TODO, "Pending", ""), async {
        api.wait_for("create_task", 1).await;
        let placeholder = *ids(&store, TODO).last().unwrap();
        let moved = store.move_task_to(placeholder, DOING, 0).await;
        api.release("create_task", 1);
        moved
    });

    assert!(matches!(moved, Err(TaskboardError::Validation(_))));
    let (task, outcome) = added.unwrap();
    assert_eq!(outcome, SyncOutcome::Confirmed);
    assert_eq!(ids(&store, TODO), vec![1, 2, 3, task.id]);
}

#[tokio::test]
async fn test_completion_is_attributed_to_the_signed_in_user() {
    let api = FakeApi::seeded();
    let store = open(&api).await;

    let done = TaskUpdate {
        completed: Some(true),
        ..TaskUpdate::default()
    };
    assert_eq!(
        store.update_task(4, done).await.unwrap(),
        SyncOutcome::Confirmed
    );

    let stored = api.server_task(4).unwrap();
    assert!(stored.completed);
    assert_eq!(stored.completed_by.as_deref(), Some("bob@example.com"));

    let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
    let metrics = store.member_metrics(today);
    let bob = metrics.iter().find(|m| m.email == "bob@example.com").unwrap();
    assert_eq!(bob.completed, 1);
    let ann = metrics.iter().find(|m| m.email == "ann@example.com").unwrap();
    assert_eq!(ann.created, 4);
}

#[tokio::test]
async fn test_failed_edits_keep_local_state() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    api.fail_next("delete_task", 1);
    api.fail_next("update_column", 1);

    let outcome = store.delete_task(2).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Failed(_)));
    assert_eq!(ids(&store, TODO), vec![1, 3]);
    assert_eq!(api.server_column(TODO), vec![1, 2, 3]);

    let outcome = store.rename_column(DOING, "In progress").await.unwrap();
    assert!(matches!(outcome, SyncOutcome::Failed(_)));
    assert_eq!(store.snapshot().column(DOING).unwrap().name, "In progress");

    assert_eq!(store.logs().len(), 2);
}

#[tokio::test]
async fn test_column_lifecycle() {
    let api = FakeApi::seeded();
    let store = open(&api).await;

    let (column, outcome) = store.add_column("Blocked").await.unwrap();
    assert_eq!(outcome, SyncOutcome::Confirmed);
    assert_eq!(column.order, 3);
    assert_eq!(store.columns().last().unwrap().id, column.id);

    let (task, _) = store.add_task(column.id, "Wait on vendor", "").await.unwrap();
    assert_eq!(ids(&store, column.id), vec![task.id]);

    assert_eq!(
        store.delete_column(column.id).await.unwrap(),
        SyncOutcome::Confirmed
    );
    assert!(store.task(task.id).is_none());
    assert_eq!(api.server_columns().len(), 3);
    assert!(api.server_task(task.id).is_none());
}

#[tokio::test]
async fn test_filtering_never_changes_the_board() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    store
        .update_task(
            2,
            TaskUpdate {
                completed: Some(true),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
    let filters = TaskFilters {
        completion: CompletionFilter::Incomplete,
        query: Some("r".into()),
        ..TaskFilters::default()
    };
    let visible: Vec<TaskId> = store
        .filtered_tasks(TODO, &filters, today)
        .iter()
        .map(|t| t.id)
        .collect();

    assert_eq!(visible, vec![1, 3]);
    assert_eq!(ids(&store, TODO), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_refresh_column_picks_up_remote_changes() {
    let api = FakeApi::seeded();
    let store = open(&api).await;
    let other = BoardStore::new(api.clone(), StoreOptions::default());
    other.load_project(1).await.unwrap();
    other.move_task_to(4, TODO, 0).await.unwrap();

    assert_eq!(ids(&store, TODO), vec![1, 2, 3]);
    assert_eq!(
        store.refresh_column(TODO).await.unwrap(),
        SyncOutcome::Resynced
    );
    assert_eq!(ids(&store, TODO), vec![4, 1, 2, 3]);
    // Refreshing one column also drops the copy held by the other.
    assert!(ids(&store, DOING).is_empty());
}
