/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::StoreError;
use async_trait::async_trait;
use entity::{AuthUser, Project, Task, TaskStatus, UserProfile};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFilter {
    /// Every project of the user.
    Owner(Uuid),
    /// One project, matched only while `owner` owns it.
    OwnedBy { id: Uuid, owner: Uuid },
}

impl ProjectFilter {
    /// Equality filters, all of which must hold.
    pub fn columns(&self) -> Vec<(&'static str, Uuid)> {
        match *self {
            ProjectFilter::Owner(owner) => vec![("user_id", owner)],
            ProjectFilter::OwnedBy { id, owner } => vec![("id", id), ("user_id", owner)],
        }
    }

    pub fn matches(&self, project: &Project) -> bool {
        match *self {
            ProjectFilter::Owner(owner) => project.user_id == owner,
            ProjectFilter::OwnedBy { id, owner } => project.id == id && project.user_id == owner,
        }
    }
}

/// Task filters never reach past the projects of their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    Owner(Uuid),
    Project { project_id: Uuid, owner: Uuid },
    Id { id: Uuid, owner: Uuid },
}

impl TaskFilter {
    pub fn owner(&self) -> Uuid {
        match *self {
            TaskFilter::Owner(owner)
            | TaskFilter::Project { owner, .. }
            | TaskFilter::Id { owner, .. } => owner,
        }
    }

    /// Equality filter applied inside the owner scope, `None` for [`TaskFilter::Owner`].
    pub fn column(&self) -> Option<(&'static str, Uuid)> {
        match *self {
            TaskFilter::Owner(_) => None,
            TaskFilter::Project { project_id, .. } => Some(("project_id", project_id)),
            TaskFilter::Id { id, .. } => Some(("id", id)),
        }
    }

    /// `owned_projects` holds the ids of every project of [`Self::owner`].
    pub fn matches(&self, task: &Task, owned_projects: &[Uuid]) -> bool {
        if !owned_projects.contains(&task.project_id) {
            return false;
        }

        match *self {
            TaskFilter::Owner(_) => true,
            TaskFilter::Project { project_id, .. } => task.project_id == project_id,
            TaskFilter::Id { id, .. } => task.id == id,
        }
    }
}

/// Payload of a project insert. Id and timestamp are generated by the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub name: String,
    pub description: Option<String>,
    pub user_id: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectChanges {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub title: String,
    pub status: TaskStatus,
    pub project_id: Uuid,
}

/// Single-column task patch, serialized as `{"title": ..}` or `{"status": ..}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskChanges {
    Title(String),
    Status(TaskStatus),
}

/// Table-level contract with the hosted store.
///
/// Selects return rows newest first. Updates and deletes that match no row
/// succeed silently, the same as the hosted REST interface.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// The user behind the current session, `None` without a valid session.
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError>;

    async fn select_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError>;
    async fn insert_project(&self, row: ProjectRow) -> Result<Project, StoreError>;
    async fn update_projects(
        &self,
        filter: ProjectFilter,
        changes: ProjectChanges,
    ) -> Result<(), StoreError>;
    async fn delete_projects(&self, filter: ProjectFilter) -> Result<(), StoreError>;

    async fn select_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError>;
    async fn insert_task(&self, row: TaskRow) -> Result<Task, StoreError>;
    async fn update_tasks(&self, filter: TaskFilter, changes: TaskChanges)
    -> Result<(), StoreError>;
    async fn delete_tasks(&self, filter: TaskFilter) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError>;
}
