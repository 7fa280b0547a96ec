/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! [`RemoteStore`] over the hosted REST interface (PostgREST + auth service).

use crate::store::*;
use crate::*;
use async_trait::async_trait;
use entity::{AuthUser, Project, Task, UserProfile};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

const PROJECTS: &str = "projects";
const TASKS: &str = "tasks";
const USERS: &str = "users";

pub struct RestStore {
    config: RequestConfig,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: RequestConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    fn table(&self, table: &str, request_type: RequestType) -> reqwest::RequestBuilder {
        get_client(
            &self.client,
            &self.config,
            &format!("rest/v1/{}", table),
            request_type,
        )
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Params,
    ) -> Result<Vec<T>, StoreError> {
        let mut params = vec![("select", "*".to_string())];
        params.extend(filters);

        if table != USERS {
            params.push(("order", "created_at.desc".to_string()));
        }

        let res = self
            .table(table, RequestType::GET)
            .query(&params)
            .send()
            .await?;

        parse_response(res).await
    }

    async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, StoreError> {
        let res = self
            .table(table, RequestType::POST)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let rows: Vec<T> = parse_response(res).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed(format!("insert into {} returned no row", table)))
    }

    async fn update<B: Serialize>(
        &self,
        table: &str,
        filters: Params,
        changes: &B,
    ) -> Result<(), StoreError> {
        let res = self
            .table(table, RequestType::PATCH)
            .query(&filters)
            .header("Prefer", "return=minimal")
            .json(changes)
            .send()
            .await?;

        check_response(res).await
    }

    async fn delete(&self, table: &str, filters: Params) -> Result<(), StoreError> {
        let res = self
            .table(table, RequestType::DELETE)
            .query(&filters)
            .send()
            .await?;

        check_response(res).await
    }

    async fn owned_project_ids(&self, owner: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let res = self
            .table(PROJECTS, RequestType::GET)
            .query(&[("select", "id".to_string()), ("user_id", format!("eq.{}", owner))])
            .send()
            .await?;

        let rows: Vec<ProjectId> = parse_response(res).await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    /// Filters confining a task request to the projects of its owner.
    /// `None` when the owner has no projects, so nothing can match.
    async fn task_filters(&self, filter: TaskFilter) -> Result<Option<Params>, StoreError> {
        let owned = self.owned_project_ids(filter.owner()).await?;
        if owned.is_empty() {
            return Ok(None);
        }

        let ids: Vec<String> = owned.iter().map(Uuid::to_string).collect();
        let mut params = vec![("project_id", format!("in.({})", ids.join(",")))];
        params.extend(eq_params(filter.column()));

        Ok(Some(params))
    }
}

type Params = Vec<(&'static str, String)>;

#[derive(Deserialize)]
struct ProjectId {
    id: Uuid,
}

fn eq_params(columns: impl IntoIterator<Item = (&'static str, Uuid)>) -> Params {
    columns
        .into_iter()
        .map(|(column, value)| (column, format!("eq.{}", value)))
        .collect()
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError> {
        if self.config.token.as_deref().is_none_or(str::is_empty) {
            return Ok(None);
        }

        let res = get_client(&self.client, &self.config, "auth/v1/user", RequestType::GET)
            .send()
            .await?;

        if matches!(
            res.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            tracing::debug!("session rejected by auth service");
            return Ok(None);
        }

        parse_response(res).await.map(Some)
    }

    async fn select_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        self.select(PROJECTS, eq_params(filter.columns())).await
    }

    async fn insert_project(&self, row: ProjectRow) -> Result<Project, StoreError> {
        self.insert(PROJECTS, &row).await
    }

    async fn update_projects(
        &self,
        filter: ProjectFilter,
        changes: ProjectChanges,
    ) -> Result<(), StoreError> {
        self.update(PROJECTS, eq_params(filter.columns()), &changes)
            .await
    }

    async fn delete_projects(&self, filter: ProjectFilter) -> Result<(), StoreError> {
        self.delete(PROJECTS, eq_params(filter.columns())).await
    }

    async fn select_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        match self.task_filters(filter).await? {
            Some(filters) => self.select(TASKS, filters).await,
            None => Ok(Vec::new()),
        }
    }

    async fn insert_task(&self, row: TaskRow) -> Result<Task, StoreError> {
        self.insert(TASKS, &row).await
    }

    async fn update_tasks(
        &self,
        filter: TaskFilter,
        changes: TaskChanges,
    ) -> Result<(), StoreError> {
        match self.task_filters(filter).await? {
            Some(filters) => self.update(TASKS, filters, &changes).await,
            None => Ok(()),
        }
    }

    async fn delete_tasks(&self, filter: TaskFilter) -> Result<(), StoreError> {
        match self.task_filters(filter).await? {
            Some(filters) => self.delete(TASKS, filters).await,
            None => Ok(()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let mut users: Vec<UserProfile> =
            self.select(USERS, vec![("email", format!("eq.{}", email))]).await?;

        if users.len() > 1 {
            return Err(StoreError::Malformed(format!(
                "{} users share the email {}",
                users.len(),
                email
            )));
        }

        Ok(users.pop())
    }
}
