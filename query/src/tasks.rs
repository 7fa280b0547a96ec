/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::view::{EditSession, TaskDraft};
use crate::*;
use connector::{NewTask, TaskApi};
use entity::TaskStatus;
use std::sync::Arc;
use tracing::debug;

const CREATED: Outcome = Outcome {
    success: "Task created successfully",
    failure: "Failed to create task",
};

const UPDATED: Outcome = Outcome {
    success: "Task updated successfully",
    failure: "Failed to update task",
};

const DELETED: Outcome = Outcome {
    success: "Task deleted successfully",
    failure: "Failed to delete task",
};

pub struct Tasks {
    client: Arc<QueryClient>,
    api: TaskApi,
    create: Mutation,
    update_title: Mutation,
    update_status: Mutation,
    delete: Mutation,
}

impl Tasks {
    pub fn new(client: Arc<QueryClient>, api: TaskApi) -> Self {
        Self {
            client,
            api,
            create: Mutation::new("create task"),
            update_title: Mutation::new("update task title"),
            update_status: Mutation::new("update task status"),
            delete: Mutation::new("delete task"),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Task>> {
        self.client
            .tasks()
            .fetch(QueryKey::tasks(), || self.api.get_all())
            .await
    }

    pub async fn list_for_project(&self, project_id: Uuid) -> ApiResult<Vec<Task>> {
        self.client
            .tasks()
            .fetch(QueryKey::tasks_of(project_id), || {
                self.api.get_by_project(project_id)
            })
            .await
    }

    pub async fn create(&self, task: NewTask) -> ApiResult<Task> {
        let project_id = task.project_id;
        self.client
            .mutate(
                &self.create,
                Some(project_id),
                &[EntityKind::Tasks],
                CREATED,
                self.api.create(task),
            )
            .await
    }

    pub async fn update_title(&self, task_id: Uuid, title: &str) -> ApiResult<()> {
        self.client
            .mutate(
                &self.update_title,
                Some(task_id),
                &[EntityKind::Tasks],
                UPDATED,
                self.api.update_title(task_id, title),
            )
            .await
    }

    pub async fn update_status(&self, task_id: Uuid, status: TaskStatus) -> ApiResult<()> {
        self.client
            .mutate(
                &self.update_status,
                Some(task_id),
                &[EntityKind::Tasks],
                UPDATED,
                self.api.update_status(task_id, status),
            )
            .await
    }

    /// Submits a draft taken from [`crate::TableView::finish_edit`]. A blank
    /// title is dropped without a request; returns whether anything was sent.
    pub async fn save_edit(&self, session: EditSession<TaskDraft>) -> ApiResult<bool> {
        if session.draft.title.trim().is_empty() {
            debug!(task_id = %session.id, "blank title, edit discarded");
            return Ok(false);
        }

        self.update_title(session.id, &session.draft.title).await?;
        Ok(true)
    }

    pub async fn delete(&self, task_id: Uuid) -> ApiResult<()> {
        self.client
            .mutate(
                &self.delete,
                Some(task_id),
                &[EntityKind::Tasks],
                DELETED,
                self.api.delete(task_id),
            )
            .await
    }

    pub fn creating(&self) -> &Mutation {
        &self.create
    }

    pub fn updating_title(&self) -> &Mutation {
        &self.update_title
    }

    pub fn updating_status(&self) -> &Mutation {
        &self.update_status
    }

    pub fn deleting(&self) -> &Mutation {
        &self.delete
    }

    pub fn is_pending(&self, task_id: Uuid) -> bool {
        [&self.update_title, &self.update_status, &self.delete]
            .iter()
            .any(|mutation| mutation.is_pending_for(task_id))
    }
}
