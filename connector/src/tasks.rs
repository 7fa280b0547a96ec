/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::input::check_task_title;
use crate::store::{ProjectFilter, TaskChanges, TaskFilter, TaskRow};
use crate::*;
use entity::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub project_id: Uuid,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Clone)]
pub struct TaskApi {
    store: Arc<dyn RemoteStore>,
}

fn require_id(task_id: Uuid) -> ApiResult<Uuid> {
    if task_id.is_nil() {
        return Err(ApiError::MissingId("Task"));
    }

    Ok(task_id)
}

impl TaskApi {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Tasks across every project of the signed in user, newest first.
    pub async fn get_all(&self) -> ApiResult<Vec<Task>> {
        let user = require_user(self.store.as_ref()).await?;

        Ok(self.store.select_tasks(TaskFilter::Owner(user.id)).await?)
    }

    pub async fn get_by_project(&self, project_id: Uuid) -> ApiResult<Vec<Task>> {
        if project_id.is_nil() {
            return Err(ApiError::MissingId("Project"));
        }

        let owner = require_user(self.store.as_ref()).await?.id;

        Ok(self
            .store
            .select_tasks(TaskFilter::Project { project_id, owner })
            .await?)
    }

    pub async fn create(&self, task: NewTask) -> ApiResult<Task> {
        let title = check_task_title(&task.title).map_err(ApiError::Validation)?;

        if task.project_id.is_nil() {
            return Err(ApiError::MissingId("Project"));
        }

        let owner = require_user(self.store.as_ref()).await?.id;
        let owned = self
            .store
            .select_projects(ProjectFilter::OwnedBy {
                id: task.project_id,
                owner,
            })
            .await?;

        if owned.is_empty() {
            return Err(ApiError::NotFound("Project"));
        }

        let task = self
            .store
            .insert_task(TaskRow {
                title,
                status: task.status,
                project_id: task.project_id,
            })
            .await?;

        tracing::info!(task_id = %task.id, project_id = %task.project_id, "task created");
        Ok(task)
    }

    pub async fn update_title(&self, task_id: Uuid, title: &str) -> ApiResult<()> {
        let task_id = require_id(task_id)?;
        let title = check_task_title(title).map_err(ApiError::Validation)?;
        let owner = require_user(self.store.as_ref()).await?.id;

        self.store
            .update_tasks(TaskFilter::Id { id: task_id, owner }, TaskChanges::Title(title))
            .await?;

        Ok(())
    }

    pub async fn update_status(&self, task_id: Uuid, status: TaskStatus) -> ApiResult<()> {
        let task_id = require_id(task_id)?;
        let owner = require_user(self.store.as_ref()).await?.id;

        self.store
            .update_tasks(TaskFilter::Id { id: task_id, owner }, TaskChanges::Status(status))
            .await?;

        Ok(())
    }

    pub async fn delete(&self, task_id: Uuid) -> ApiResult<()> {
        let task_id = require_id(task_id)?;
        let owner = require_user(self.store.as_ref()).await?.id;

        self.store
            .delete_tasks(TaskFilter::Id { id: task_id, owner })
            .await?;

        Ok(())
    }
}
