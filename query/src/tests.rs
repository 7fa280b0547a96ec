/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use connector::memory::{MemoryStore, Operation};
use connector::{ApiError, NewProject, NewTask};
use entity::{AuthUser, TaskStatus};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;

fn create_hooks() -> (Arc<MemoryStore>, Hooks) {
    let user = AuthUser {
        id: Uuid::new_v4(),
        email: Some("ada@example.com".to_string()),
    };
    let store = Arc::new(MemoryStore::signed_in(user));
    let hooks = Hooks::new(Api::new(store.clone()));

    (store, hooks)
}

fn drain(rx: &mut Receiver<Notification>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        notifications.push(notification);
    }
    notifications
}

async fn seed_project(hooks: &Hooks, name: &str) -> Project {
    hooks
        .projects
        .create(NewProject {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
}

async fn seed_task(hooks: &Hooks, project_id: Uuid, title: &str) -> Task {
    hooks
        .tasks
        .create(NewTask {
            title: title.to_string(),
            project_id,
            status: TaskStatus::Pending,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_list_is_served_from_cache_while_fresh() {
    let (store, hooks) = create_hooks();
    seed_project(&hooks, "Website").await;
    store.clear_calls();

    let first = hooks.projects.list().await.unwrap();
    let second = hooks.projects.list().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.call_count(Operation::SelectProjects), 1);
    assert_eq!(
        hooks.client.projects().status(QueryKey::projects()),
        QueryStatus::Fresh
    );
}

#[tokio::test]
async fn test_create_invalidates_and_notifies() {
    let (_store, hooks) = create_hooks();
    let mut rx = hooks.client.subscribe();

    assert!(hooks.projects.list().await.unwrap().is_empty());
    let created = seed_project(&hooks, "Website").await;

    assert_eq!(
        hooks.client.projects().status(QueryKey::projects()),
        QueryStatus::Stale
    );
    let projects = hooks.projects.list().await.unwrap();
    assert_eq!(projects, vec![created]);

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, Level::Success);
    assert_eq!(notifications[0].message, "Project created successfully");
    assert_eq!(hooks.projects.creating().state(), MutationState::Success);
}

#[tokio::test]
async fn test_status_update_refetch_changes_only_target() {
    let (_store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    let first = seed_task(&hooks, project.id, "Write copy").await;
    let second = seed_task(&hooks, project.id, "Pick fonts").await;

    let before = hooks.tasks.list_for_project(project.id).await.unwrap();
    assert!(before.iter().all(|t| t.status == TaskStatus::Pending));

    hooks
        .tasks
        .update_status(first.id, TaskStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(
        hooks.client.tasks().status(QueryKey::tasks_of(project.id)),
        QueryStatus::Stale
    );

    let after = hooks.tasks.list_for_project(project.id).await.unwrap();
    assert_eq!(after.len(), 2);
    for task in after {
        if task.id == first.id {
            assert_eq!(task.status, TaskStatus::InProgress);
        } else {
            assert_eq!(task.id, second.id);
            assert_eq!(task.status, TaskStatus::Pending);
        }
    }
}

#[tokio::test]
async fn test_task_lists_are_keyed_by_project() {
    let (_store, hooks) = create_hooks();
    let website = seed_project(&hooks, "Website").await;
    let launch = seed_project(&hooks, "Launch").await;
    seed_task(&hooks, website.id, "Write copy").await;
    seed_task(&hooks, launch.id, "Book venue").await;

    let website_tasks = hooks.tasks.list_for_project(website.id).await.unwrap();
    let launch_tasks = hooks.tasks.list_for_project(launch.id).await.unwrap();
    let all_tasks = hooks.tasks.list().await.unwrap();

    assert_eq!(website_tasks.len(), 1);
    assert_eq!(website_tasks[0].title, "Write copy");
    assert_eq!(launch_tasks.len(), 1);
    assert_eq!(launch_tasks[0].title, "Book venue");
    assert_eq!(all_tasks.len(), 2);
    assert_eq!(hooks.client.tasks().keys().len(), 3);
}

#[tokio::test]
async fn test_failed_mutation_leaves_cache_untouched() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    let task = seed_task(&hooks, project.id, "Write copy").await;
    let cached = hooks.tasks.list().await.unwrap();
    let entry = hooks.client.tasks().entry(QueryKey::tasks()).unwrap();

    let mut rx = hooks.client.subscribe();
    store.fail(Operation::UpdateTasks, "permission denied for table tasks");
    let result = hooks.tasks.update_status(task.id, TaskStatus::Completed).await;

    assert!(matches!(result, Err(ApiError::Store(_))));
    assert_eq!(
        hooks.client.tasks().status(QueryKey::tasks()),
        QueryStatus::Fresh
    );
    let after = hooks.client.tasks().entry(QueryKey::tasks()).unwrap();
    assert_eq!(after.data, Some(cached));
    assert_eq!(after.updated_at, entry.updated_at);

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, Level::Error);
    assert_eq!(notifications[0].message, "Failed to update task");
    assert_eq!(
        notifications[0].detail.as_deref(),
        Some("permission denied for table tasks")
    );
    assert_eq!(
        hooks.tasks.updating_status().state(),
        MutationState::Failure("permission denied for table tasks".to_string())
    );
}

#[tokio::test]
async fn test_blank_title_fails_without_request() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    let mut rx = hooks.client.subscribe();
    store.clear_calls();

    let result = hooks
        .tasks
        .create(NewTask {
            title: "   ".to_string(),
            project_id: project.id,
            status: TaskStatus::Pending,
        })
        .await;

    assert!(matches!(result, Err(ApiError::Validation(_))));
    assert!(store.calls().is_empty());

    let notifications = drain(&mut rx);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "Failed to create task");
}

#[tokio::test]
async fn test_blank_title_edit_is_not_submitted() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    let task = seed_task(&hooks, project.id, "Write copy").await;
    let mut view = TableView::<Task>::new();
    store.clear_calls();

    view.begin_edit(&task);
    if let Some(draft) = view.draft_mut() {
        draft.title = " ".to_string();
    }
    let session = view.finish_edit().unwrap();

    assert!(!hooks.tasks.save_edit(session).await.unwrap());
    assert!(view.editing().is_none());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_project_edit_submits_draft() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    let mut view = TableView::<Project>::new();

    view.begin_edit(&project);
    if let Some(draft) = view.draft_mut() {
        draft.name = "Landing page".to_string();
        draft.description = "  Q3 relaunch ".to_string();
    }
    let session = view.finish_edit().unwrap();
    hooks.projects.save_edit(session).await.unwrap();

    let stored = store.projects();
    assert_eq!(stored[0].name, "Landing page");
    assert_eq!(stored[0].description.as_deref(), Some("Q3 relaunch"));
}

#[tokio::test]
async fn test_project_delete_invalidates_task_lists() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    seed_task(&hooks, project.id, "Write copy").await;
    hooks.projects.list().await.unwrap();
    hooks.tasks.list().await.unwrap();

    hooks.projects.delete(project.id).await.unwrap();

    assert_eq!(
        hooks.client.projects().status(QueryKey::projects()),
        QueryStatus::Stale
    );
    assert_eq!(
        hooks.client.tasks().status(QueryKey::tasks()),
        QueryStatus::Stale
    );
    assert!(hooks.tasks.list().await.unwrap().is_empty());
    assert!(store.projects().is_empty());
}

#[tokio::test]
async fn test_aborted_cascade_keeps_cache() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    seed_task(&hooks, project.id, "Write copy").await;
    hooks.projects.list().await.unwrap();
    hooks.tasks.list().await.unwrap();

    store.fail(Operation::DeleteTasks, "timeout");
    let result = hooks.projects.delete(project.id).await;

    assert!(matches!(result, Err(ApiError::CascadeAborted { .. })));
    assert_eq!(
        hooks.client.projects().status(QueryKey::projects()),
        QueryStatus::Fresh
    );
    assert_eq!(
        hooks.client.tasks().status(QueryKey::tasks()),
        QueryStatus::Fresh
    );
    assert_eq!(store.projects().len(), 1);
}

#[tokio::test]
async fn test_orphaned_project_invalidates_tasks_only() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    seed_task(&hooks, project.id, "Write copy").await;
    hooks.projects.list().await.unwrap();
    hooks.tasks.list().await.unwrap();

    store.fail(Operation::DeleteProjects, "permission denied");
    let result = hooks.projects.delete(project.id).await;

    assert!(matches!(result, Err(ApiError::OrphanCleanupNeeded { .. })));
    assert_eq!(
        hooks.client.projects().status(QueryKey::projects()),
        QueryStatus::Fresh
    );
    assert_eq!(
        hooks.client.tasks().status(QueryKey::tasks()),
        QueryStatus::Stale
    );
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn test_list_failure_is_recorded() {
    let (store, hooks) = create_hooks();
    store.sign_out();

    let result = hooks.projects.list().await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
    assert_eq!(
        hooks.client.projects().status(QueryKey::projects()),
        QueryStatus::Failed
    );

    let entry = hooks.client.projects().entry(QueryKey::projects()).unwrap();
    assert_eq!(entry.error.as_deref(), Some("User not authenticated"));
    assert!(entry.data.is_none());
}

#[tokio::test]
async fn test_get_prefers_fresh_cache() {
    let (store, hooks) = create_hooks();
    let project = seed_project(&hooks, "Website").await;
    hooks.projects.list().await.unwrap();
    store.clear_calls();

    let found = hooks.projects.get(project.id).await.unwrap();
    assert_eq!(found, project);
    assert!(store.calls().is_empty());

    let missing = hooks.projects.get(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(ApiError::NotFound("Project"))));
}
