/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::input::{check_project_name, normalize_description};
use crate::store::{ProjectChanges, ProjectFilter, ProjectRow, TaskFilter};
use crate::*;
use entity::Project;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct ProjectApi {
    store: Arc<dyn RemoteStore>,
}

impl ProjectApi {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Projects of the signed in user, newest first.
    pub async fn get_all(&self) -> ApiResult<Vec<Project>> {
        let user = require_user(self.store.as_ref()).await?;

        Ok(self
            .store
            .select_projects(ProjectFilter::Owner(user.id))
            .await?)
    }

    pub async fn create(&self, project: NewProject) -> ApiResult<Project> {
        let name = check_project_name(&project.name).map_err(ApiError::Validation)?;
        let description = normalize_description(project.description.as_deref());

        let user = require_user(self.store.as_ref()).await?;

        let project = self
            .store
            .insert_project(ProjectRow {
                name,
                description,
                user_id: user.id,
            })
            .await?;

        tracing::info!(project_id = %project.id, "project created");
        Ok(project)
    }

    pub async fn get_by_id(&self, project_id: Uuid) -> ApiResult<Project> {
        if project_id.is_nil() {
            return Err(ApiError::MissingId("Project"));
        }

        let user = require_user(self.store.as_ref()).await?;

        self.store
            .select_projects(ProjectFilter::OwnedBy {
                id: project_id,
                owner: user.id,
            })
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound("Project"))
    }

    pub async fn update(&self, project_id: Uuid, project: ProjectUpdate) -> ApiResult<()> {
        if project_id.is_nil() {
            return Err(ApiError::MissingId("Project"));
        }

        let name = check_project_name(&project.name).map_err(ApiError::Validation)?;
        let description = normalize_description(project.description.as_deref());
        let user = require_user(self.store.as_ref()).await?;

        self.store
            .update_projects(
                ProjectFilter::OwnedBy {
                    id: project_id,
                    owner: user.id,
                },
                ProjectChanges { name, description },
            )
            .await?;

        Ok(())
    }

    /// Deletes the tasks of the project, then the project.
    ///
    /// The two deletes are not atomic. If the task delete fails the project
    /// delete is never sent and the project stays as it was. If the project
    /// delete fails afterwards the project is left without tasks and
    /// [`ApiError::OrphanCleanupNeeded`] is returned. Retrying the delete
    /// completes the cleanup. A project of another user matches nothing in
    /// either phase.
    pub async fn delete(&self, project_id: Uuid) -> ApiResult<()> {
        if project_id.is_nil() {
            return Err(ApiError::MissingId("Project"));
        }

        let owner = require_user(self.store.as_ref()).await?.id;

        if let Err(source) = self
            .store
            .delete_tasks(TaskFilter::Project { project_id, owner })
            .await
        {
            tracing::error!(%project_id, error = %source, "task delete failed, keeping project");
            return Err(ApiError::CascadeAborted { project_id, source });
        }

        if let Err(source) = self
            .store
            .delete_projects(ProjectFilter::OwnedBy {
                id: project_id,
                owner,
            })
            .await
        {
            tracing::error!(%project_id, error = %source, "project delete failed after its tasks were removed");
            return Err(ApiError::OrphanCleanupNeeded { project_id, source });
        }

        tracing::info!(%project_id, "project deleted");
        Ok(())
    }
}
