/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Keeps local views consistent with the remote store.
//!
//! Reads go through a [`QueryCache`] keyed by entity type and parent id.
//! Writes run as [`Mutation`]s. A successful mutation invalidates every list
//! of the entity types it touched and emits a success [`Notification`]. A
//! failed one emits a failure notification and leaves the cache alone.

pub mod cache;
pub mod mutation;
pub mod notify;
pub mod projects;
pub mod tasks;
pub mod view;

#[cfg(test)]
mod tests;

pub use cache::{CacheEntry, EntityKind, QueryCache, QueryKey, QueryStatus};
pub use mutation::{Mutation, MutationState};
pub use notify::{Level, Notification, Notifier};
pub use projects::Projects;
pub use tasks::Tasks;
pub use view::{EditSession, EmptyState, ProjectDraft, SortDirection, TableRow, TableView, TaskDraft};

use chrono::Duration;
use connector::{Api, ApiResult, UserApi};
use entity::{Project, Task};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

pub struct QueryClient {
    projects: QueryCache<Vec<Project>>,
    tasks: QueryCache<Vec<Task>>,
    notifier: Notifier,
}

/// Notification texts of one mutation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Outcome {
    pub success: &'static str,
    pub failure: &'static str,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    /// Data stays fresh until a mutation invalidates it.
    pub fn new() -> Self {
        Self::with_stale_time(None)
    }

    /// Data also turns stale once it is older than `stale_time`.
    pub fn with_stale_time(stale_time: Option<Duration>) -> Self {
        Self {
            projects: QueryCache::new(stale_time),
            tasks: QueryCache::new(stale_time),
            notifier: Notifier::default(),
        }
    }

    pub fn projects(&self) -> &QueryCache<Vec<Project>> {
        &self.projects
    }

    pub fn tasks(&self) -> &QueryCache<Vec<Task>> {
        &self.tasks
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Marks every cached list of `entity` stale. Returns how many lists were hit.
    pub fn invalidate(&self, entity: EntityKind) -> usize {
        match entity {
            EntityKind::Projects => self.projects.invalidate(entity),
            EntityKind::Tasks => self.tasks.invalidate(entity),
        }
    }

    pub(crate) async fn mutate<T, Fut>(
        &self,
        mutation: &Mutation,
        target: Option<Uuid>,
        invalidates: &[EntityKind],
        outcome: Outcome,
        fut: Fut,
    ) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let result = mutation.run(target, fut).await;

        match &result {
            Ok(_) => {
                for entity in invalidates {
                    self.invalidate(*entity);
                }
                self.notifier.success(outcome.success);
            }
            Err(e) => self.notifier.error(outcome.failure, e.to_string()),
        }

        result
    }
}

/// Everything a front end needs: cached queries, mutations and notifications.
pub struct Hooks {
    pub client: Arc<QueryClient>,
    pub projects: Projects,
    pub tasks: Tasks,
    pub users: UserApi,
}

impl Hooks {
    pub fn new(api: Api) -> Self {
        Self::with_client(api, Arc::new(QueryClient::new()))
    }

    pub fn with_client(api: Api, client: Arc<QueryClient>) -> Self {
        Self {
            projects: Projects::new(Arc::clone(&client), api.projects),
            tasks: Tasks::new(Arc::clone(&client), api.tasks),
            users: api.users,
            client,
        }
    }
}
