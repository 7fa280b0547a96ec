/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::view::{EditSession, ProjectDraft};
use crate::*;
use connector::{ApiError, NewProject, ProjectApi, ProjectUpdate};
use std::sync::Arc;
use tracing::warn;

const CREATED: Outcome = Outcome {
    success: "Project created successfully",
    failure: "Failed to create project",
};

const UPDATED: Outcome = Outcome {
    success: "Project updated successfully",
    failure: "Failed to update project",
};

const DELETED: Outcome = Outcome {
    success: "Project deleted successfully",
    failure: "Failed to delete project",
};

pub struct Projects {
    client: Arc<QueryClient>,
    api: ProjectApi,
    create: Mutation,
    update: Mutation,
    delete: Mutation,
}

impl Projects {
    pub fn new(client: Arc<QueryClient>, api: ProjectApi) -> Self {
        Self {
            client,
            api,
            create: Mutation::new("create project"),
            update: Mutation::new("update project"),
            delete: Mutation::new("delete project"),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Project>> {
        self.client
            .projects()
            .fetch(QueryKey::projects(), || self.api.get_all())
            .await
    }

    /// Looks the project up in the cached list first.
    pub async fn get(&self, project_id: Uuid) -> ApiResult<Project> {
        let key = QueryKey::projects();
        if self.client.projects().status(key) == QueryStatus::Fresh {
            let cached = self
                .client
                .projects()
                .get(key)
                .and_then(|projects| projects.into_iter().find(|p| p.id == project_id));
            if let Some(project) = cached {
                return Ok(project);
            }
        }

        self.api.get_by_id(project_id).await
    }

    pub async fn create(&self, project: NewProject) -> ApiResult<Project> {
        self.client
            .mutate(
                &self.create,
                None,
                &[EntityKind::Projects],
                CREATED,
                self.api.create(project),
            )
            .await
    }

    pub async fn update(&self, project_id: Uuid, project: ProjectUpdate) -> ApiResult<()> {
        self.client
            .mutate(
                &self.update,
                Some(project_id),
                &[EntityKind::Projects],
                UPDATED,
                self.api.update(project_id, project),
            )
            .await
    }

    /// Submits a draft taken from [`crate::TableView::finish_edit`].
    pub async fn save_edit(&self, session: EditSession<ProjectDraft>) -> ApiResult<()> {
        let update = ProjectUpdate {
            name: session.draft.name,
            description: Some(session.draft.description),
        };

        self.update(session.id, update).await
    }

    pub async fn delete(&self, project_id: Uuid) -> ApiResult<()> {
        let result = self
            .client
            .mutate(
                &self.delete,
                Some(project_id),
                &[EntityKind::Projects, EntityKind::Tasks],
                DELETED,
                self.api.delete(project_id),
            )
            .await;

        // The tasks are already gone remotely, so cached task lists are wrong.
        if let Err(ApiError::OrphanCleanupNeeded { .. }) = &result {
            warn!(%project_id, "project kept after its tasks were deleted");
            self.client.invalidate(EntityKind::Tasks);
        }

        result
    }

    pub fn creating(&self) -> &Mutation {
        &self.create
    }

    pub fn updating(&self) -> &Mutation {
        &self.update
    }

    pub fn deleting(&self) -> &Mutation {
        &self.delete
    }

    pub fn is_pending(&self, project_id: Uuid) -> bool {
        self.update.is_pending_for(project_id) || self.delete.is_pending_for(project_id)
    }
}
