/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! In-process [`RemoteStore`] with the same constraints as the hosted schema.
//!
//! Every call is recorded, and any operation can be told to fail, which
//! makes it the store of choice for exercising error paths.

use crate::store::*;
use crate::*;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use entity::{AuthUser, Project, Task, UserProfile};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentUser,
    SelectProjects,
    InsertProject,
    UpdateProjects,
    DeleteProjects,
    SelectTasks,
    InsertTask,
    UpdateTasks,
    DeleteTasks,
    FindUser,
}

impl Operation {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Operation::InsertProject
                | Operation::UpdateProjects
                | Operation::DeleteProjects
                | Operation::InsertTask
                | Operation::UpdateTasks
                | Operation::DeleteTasks
        )
    }
}

#[derive(Default)]
struct State {
    user: Option<AuthUser>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    users: Vec<UserProfile>,
    failures: HashMap<Operation, String>,
    calls: Vec<Operation>,
    last_created: Option<DateTime<Utc>>,
}

impl State {
    fn owned_projects(&self, owner: Uuid) -> Vec<Uuid> {
        self.projects
            .iter()
            .filter(|p| p.user_id == owner)
            .map(|p| p.id)
            .collect()
    }

    /// Strictly increasing creation timestamps, so "newest first" is total.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

fn foreign_key_violation(table: &str) -> StoreError {
    StoreError::Remote {
        status: 409,
        message: format!(
            "insert or update on table \"{}\" violates foreign key constraint",
            table
        ),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: AuthUser) -> Self {
        let store = Self::default();
        store.sign_in(user);
        store
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call and applies an injected failure, if any.
    fn enter(&self, operation: Operation) -> Result<MutexGuard<'_, State>, StoreError> {
        let mut state = self.lock();
        state.calls.push(operation);

        if let Some(message) = state.failures.get(&operation) {
            tracing::debug!(?operation, "injected store failure");
            return Err(StoreError::Remote {
                status: 500,
                message: message.clone(),
            });
        }

        Ok(state)
    }

    pub fn sign_in(&self, user: AuthUser) {
        self.lock().user = Some(user);
    }

    pub fn sign_out(&self) {
        self.lock().user = None;
    }

    /// Makes every following `operation` fail with `message` until [`Self::recover`].
    pub fn fail(&self, operation: Operation, message: impl Into<String>) {
        self.lock().failures.insert(operation, message.into());
    }

    pub fn recover(&self, operation: Operation) {
        self.lock().failures.remove(&operation);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    pub fn writes(&self) -> usize {
        self.lock().calls.iter().filter(|call| call.is_write()).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn add_user(&self, email: &str) -> UserProfile {
        let mut state = self.lock();
        let user = UserProfile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: state.next_timestamp(),
        };
        state.users.push(user.clone());
        user
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError> {
        Ok(self.enter(Operation::CurrentUser)?.user.clone())
    }

    async fn select_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let state = self.enter(Operation::SelectProjects)?;
        let rows: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        Ok(newest_first(rows, |p| p.created_at))
    }

    async fn insert_project(&self, row: ProjectRow) -> Result<Project, StoreError> {
        let mut state = self.enter(Operation::InsertProject)?;
        let project = Project {
            id: Uuid::new_v4(),
            name: row.name,
            description: row.description,
            user_id: row.user_id,
            created_at: state.next_timestamp(),
        };
        state.projects.push(project.clone());

        Ok(project)
    }

    async fn update_projects(
        &self,
        filter: ProjectFilter,
        changes: ProjectChanges,
    ) -> Result<(), StoreError> {
        let mut state = self.enter(Operation::UpdateProjects)?;

        for project in state.projects.iter_mut().filter(|p| filter.matches(p)) {
            project.name = changes.name.clone();
            project.description = changes.description.clone();
        }

        Ok(())
    }

    async fn delete_projects(&self, filter: ProjectFilter) -> Result<(), StoreError> {
        let mut state = self.enter(Operation::DeleteProjects)?;

        let doomed: Vec<Uuid> = state
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.id)
            .collect();

        if state.tasks.iter().any(|t| doomed.contains(&t.project_id)) {
            return Err(StoreError::Remote {
                status: 409,
                message: "update or delete on table \"projects\" violates foreign key constraint \"fk-tasks-project_id\" on table \"tasks\"".to_string(),
            });
        }

        state.projects.retain(|p| !doomed.contains(&p.id));

        Ok(())
    }

    async fn select_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        let state = self.enter(Operation::SelectTasks)?;
        let owned = state.owned_projects(filter.owner());
        let rows: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| filter.matches(t, &owned))
            .cloned()
            .collect();

        Ok(newest_first(rows, |t| t.created_at))
    }

    async fn insert_task(&self, row: TaskRow) -> Result<Task, StoreError> {
        let mut state = self.enter(Operation::InsertTask)?;

        if !state.projects.iter().any(|p| p.id == row.project_id) {
            return Err(foreign_key_violation("tasks"));
        }

        let task = Task {
            id: Uuid::new_v4(),
            title: row.title,
            status: row.status,
            project_id: row.project_id,
            created_at: state.next_timestamp(),
        };
        state.tasks.push(task.clone());

        Ok(task)
    }

    async fn update_tasks(
        &self,
        filter: TaskFilter,
        changes: TaskChanges,
    ) -> Result<(), StoreError> {
        let mut state = self.enter(Operation::UpdateTasks)?;
        let owned = state.owned_projects(filter.owner());

        for task in state.tasks.iter_mut().filter(|t| filter.matches(t, &owned)) {
            match &changes {
                TaskChanges::Title(title) => task.title = title.clone(),
                TaskChanges::Status(status) => task.status = *status,
            }
        }

        Ok(())
    }

    async fn delete_tasks(&self, filter: TaskFilter) -> Result<(), StoreError> {
        let mut state = self.enter(Operation::DeleteTasks)?;
        let owned = state.owned_projects(filter.owner());
        state.tasks.retain(|t| !filter.matches(t, &owned));

        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let state = self.enter(Operation::FindUser)?;

        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}
