//! Integration tests for in-memory storage.
//!
//! These tests verify the storage backend end to end through the
//! `TaskStorage` trait: task creation, dependency validation, cycle
//! rejection, status propagation and concurrent access.

use std::collections::HashSet;

use rstest::rstest;
use taskdag::domain::{NewTask, TaskFilter, TaskId, TaskStatus};
use taskdag::error::Error;
use taskdag::storage::in_memory::{new_in_memory_storage, InMemoryStorage};
use taskdag::storage::TaskStorage;

async fn create(storage: &mut dyn TaskStorage, title: &str, deps: &[&TaskId]) -> TaskId {
    let new_task = NewTask {
        title: title.to_string(),
        depends_on: deps.iter().map(|id| (*id).clone()).collect(),
    };
    storage.create(new_task).await.unwrap().id
}

async fn status(storage: &dyn TaskStorage, id: &TaskId) -> TaskStatus {
    storage.get(id).await.unwrap().unwrap().status
}

/// Three tasks where `a -> b -> c` (a depends on b, b depends on c).
async fn chain(storage: &mut dyn TaskStorage) -> (TaskId, TaskId, TaskId) {
    let c = create(storage, "C", &[]).await;
    let b = create(storage, "B", &[&c]).await;
    let a = create(storage, "A", &[&b]).await;
    (a, b, c)
}

// ========== Creation ==========

#[tokio::test]
async fn test_create_task_starts_pending() {
    let mut storage = new_in_memory_storage("test".to_string());

    let id = create(storage.as_mut(), "Write docs", &[]).await;
    let task = storage.get(&id).await.unwrap().unwrap();

    assert_eq!(task.title, "Write docs");
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(id.as_str().starts_with("test-"));
}

#[tokio::test]
async fn test_create_with_missing_dependency_creates_nothing() {
    let mut storage = new_in_memory_storage("test".to_string());

    let result = storage
        .create(NewTask {
            title: "Orphan".to_string(),
            depends_on: vec![TaskId::new("test-zzzz")],
        })
        .await;

    assert!(matches!(result, Err(Error::TaskNotFound(ref id)) if id.as_str() == "test-zzzz"));
    assert!(storage.snapshot().await.unwrap().tasks.is_empty());
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let mut storage = new_in_memory_storage("test".to_string());
    let (_, _, c) = chain(storage.as_mut()).await;
    storage.change_status(&c, TaskStatus::Blocked).await.unwrap();

    let blocked = storage
        .list(&TaskFilter {
            status: Some(TaskStatus::Blocked),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(blocked.len(), 3);

    let limited = storage
        .list(&TaskFilter {
            status: None,
            limit: Some(2),
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

// ========== Dependency Validation ==========

#[tokio::test]
async fn test_self_dependency_rejected() {
    let mut storage = new_in_memory_storage("test".to_string());
    let x = create(storage.as_mut(), "X", &[]).await;

    let result = storage.add_dependency(&x, &x).await;

    assert!(matches!(result, Err(Error::SelfDependency(_))));
    assert!(storage.dependencies(&x).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_closing_cycle_rejected_and_graph_unchanged() {
    let mut storage = new_in_memory_storage("test".to_string());
    let (a, b, c) = chain(storage.as_mut()).await;
    let before = storage.snapshot().await.unwrap();

    let result = storage.add_dependency(&c, &a).await;

    assert!(matches!(result, Err(Error::CycleDetected { .. })));
    assert_eq!(storage.snapshot().await.unwrap(), before);
    assert_eq!(storage.dependencies(&a).await.unwrap(), vec![b]);
}

#[tokio::test]
async fn test_non_cycle_edge_accepted() {
    let mut storage = new_in_memory_storage("test".to_string());
    let b = create(storage.as_mut(), "B", &[]).await;
    let a = create(storage.as_mut(), "A", &[&b]).await;
    let c = create(storage.as_mut(), "C", &[]).await;

    storage.add_dependency(&c, &a).await.unwrap();

    let snapshot = storage.snapshot().await.unwrap();
    let edges: HashSet<(TaskId, TaskId)> = snapshot
        .edges
        .into_iter()
        .map(|edge| (edge.task, edge.depends_on))
        .collect();
    assert_eq!(edges, HashSet::from([(a.clone(), b), (c, a)]));
}

#[tokio::test]
async fn test_duplicate_edge_rejected() {
    let mut storage = new_in_memory_storage("test".to_string());
    let b = create(storage.as_mut(), "B", &[]).await;
    let a = create(storage.as_mut(), "A", &[&b]).await;

    let result = storage.add_dependency(&a, &b).await;

    assert!(matches!(result, Err(Error::DuplicateEdge { .. })));
}

#[tokio::test]
async fn test_unknown_task_checked_before_self_dependency() {
    let mut storage = new_in_memory_storage("test".to_string());
    let ghost = TaskId::new("test-zzzz");

    let result = storage.add_dependency(&ghost, &ghost).await;

    assert!(matches!(result, Err(Error::TaskNotFound(_))));
}

#[tokio::test]
async fn test_would_create_cycle_and_path() {
    let mut storage = new_in_memory_storage("test".to_string());
    let (a, b, c) = chain(storage.as_mut()).await;

    assert!(storage.would_create_cycle(&c, &a).await.unwrap());
    assert!(!storage.would_create_cycle(&a, &c).await.unwrap());
    assert_eq!(
        storage.find_path(&a, &c).await.unwrap(),
        Some(vec![a.clone(), b, c.clone()])
    );
    assert_eq!(storage.find_path(&c, &a).await.unwrap(), None);
}

// ========== Status Propagation ==========

#[rstest]
#[case::blocked_wins(TaskStatus::Completed, TaskStatus::Blocked, TaskStatus::Blocked)]
#[case::all_completed(TaskStatus::Completed, TaskStatus::Completed, TaskStatus::InProgress)]
#[case::some_pending(TaskStatus::Completed, TaskStatus::Pending, TaskStatus::Pending)]
#[tokio::test]
async fn test_two_prerequisites(
    #[case] first: TaskStatus,
    #[case] second: TaskStatus,
    #[case] expected: TaskStatus,
) {
    let mut storage = new_in_memory_storage("test".to_string());
    let p1 = create(storage.as_mut(), "P1", &[]).await;
    let p2 = create(storage.as_mut(), "P2", &[]).await;
    let task = create(storage.as_mut(), "T", &[&p1, &p2]).await;

    storage.change_status(&p1, first).await.unwrap();
    storage.change_status(&p2, second).await.unwrap();

    assert_eq!(status(storage.as_ref(), &task).await, expected);
}

#[tokio::test]
async fn test_transitive_cascade() {
    let mut storage = new_in_memory_storage("test".to_string());
    let (a, b, c) = chain(storage.as_mut()).await;

    storage.change_status(&c, TaskStatus::Completed).await.unwrap();

    assert_eq!(status(storage.as_ref(), &b).await, TaskStatus::InProgress);
    assert_eq!(status(storage.as_ref(), &a).await, TaskStatus::Pending);
}

#[tokio::test]
async fn test_direct_change_is_not_in_cascade() {
    let mut storage = new_in_memory_storage("test".to_string());
    let (a, b, c) = chain(storage.as_mut()).await;

    let outcome = storage.change_status(&c, TaskStatus::Blocked).await.unwrap();

    assert_eq!(outcome.change.task, c);
    assert_eq!(outcome.change.from, TaskStatus::Pending);
    let moved: Vec<&TaskId> = outcome.cascade.iter().map(|change| &change.task).collect();
    assert_eq!(moved, vec![&b, &a]);
}

#[tokio::test]
async fn test_repeated_status_change_cascades_nothing() {
    let mut storage = new_in_memory_storage("test".to_string());
    let (_, _, c) = chain(storage.as_mut()).await;

    storage.change_status(&c, TaskStatus::Blocked).await.unwrap();
    let again = storage.change_status(&c, TaskStatus::Blocked).await.unwrap();

    assert_eq!(again.change.from, TaskStatus::Blocked);
    assert!(again.cascade.is_empty());
}

#[tokio::test]
async fn test_recompute_after_adding_edge() {
    let mut storage = new_in_memory_storage("test".to_string());
    let prereq = create(storage.as_mut(), "Prereq", &[]).await;
    let task = create(storage.as_mut(), "Task", &[]).await;
    storage.change_status(&prereq, TaskStatus::Completed).await.unwrap();

    storage.add_dependency(&task, &prereq).await.unwrap();
    assert_eq!(status(storage.as_ref(), &task).await, TaskStatus::Pending);

    let changes = storage.recompute(&task).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].to, TaskStatus::InProgress);
    assert!(storage.recompute(&task).await.unwrap().is_empty());
}

// ========== Concurrency ==========

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ring_rejects_exactly_one_edge() {
    const RING: usize = 8;

    let mut storage = InMemoryStorage::new("test".to_string());
    let mut ids = Vec::with_capacity(RING);
    for i in 0..RING {
        ids.push(create(&mut storage, &format!("Ring {i}"), &[]).await);
    }

    let mut handles = Vec::with_capacity(RING);
    for i in 0..RING {
        let mut storage = storage.clone();
        let task = ids[i].clone();
        let depends_on = ids[(i + 1) % RING].clone();
        handles.push(tokio::spawn(async move {
            storage.add_dependency(&task, &depends_on).await
        }));
    }

    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => {}
            Err(Error::CycleDetected { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // Any RING - 1 edges of the ring form a path; the last one closes it
    assert_eq!(rejected, 1);
    assert_eq!(storage.snapshot().await.unwrap().edges.len(), RING - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_status_changes_leave_consistent_graph() {
    let mut storage = InMemoryStorage::new("test".to_string());
    let root = create(&mut storage, "Root", &[]).await;
    let mut leaves = Vec::new();
    for i in 0..16 {
        leaves.push(create(&mut storage, &format!("Leaf {i}"), &[&root]).await);
    }

    let mut handles = Vec::new();
    for status in [TaskStatus::Blocked, TaskStatus::Completed, TaskStatus::InProgress] {
        let mut storage = storage.clone();
        let root = root.clone();
        handles.push(tokio::spawn(async move {
            storage.change_status(&root, status).await
        }));
    }
    let mut applied = Vec::new();
    for handle in handles {
        applied.push(handle.await.unwrap().unwrap().change);
    }

    // Each reported `from` is the status left by the change that ran just
    // before it, so the changes chain from the initial status
    let mut current = TaskStatus::Pending;
    while let Some(pos) = applied.iter().position(|change| change.from == current) {
        current = applied.remove(pos).to;
    }
    assert!(applied.is_empty(), "unchained changes: {applied:?}");
    assert_eq!(status(&storage, &root).await, current);

    // Whichever change ran last, every leaf agrees with it
    let expected = match status(&storage, &root).await {
        TaskStatus::Blocked => TaskStatus::Blocked,
        TaskStatus::Completed => TaskStatus::InProgress,
        _ => TaskStatus::Pending,
    };
    for leaf in &leaves {
        assert_eq!(status(&storage, leaf).await, expected);
    }
}
