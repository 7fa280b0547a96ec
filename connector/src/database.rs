/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! [`RemoteStore`] over a direct Postgres connection.
//!
//! There is no auth service in front of the database, so the session user is
//! fixed when the store is built.

use crate::store::*;
use crate::*;
use async_trait::async_trait;
use chrono::Utc;
use entity::*;
use migration::{Migrator, MigratorTrait};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};
use uuid::Uuid;

pub struct DatabaseStore {
    db: DatabaseConnection,
    user: Option<AuthUser>,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection, user: Option<AuthUser>) -> Self {
        Self { db, user }
    }

    pub async fn connect(database_url: &str, user: Option<AuthUser>) -> Result<Self, StoreError> {
        tracing::debug!("connecting to database");
        let db = Database::connect(database_url).await?;

        Ok(Self::new(db, user))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        Migrator::up(&self.db, None).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }
}

fn project_condition(filter: ProjectFilter) -> Condition {
    match filter {
        ProjectFilter::Owner(owner) => Condition::all().add(CProject::UserId.eq(owner)),
        ProjectFilter::OwnedBy { id, owner } => Condition::all()
            .add(CProject::Id.eq(id))
            .add(CProject::UserId.eq(owner)),
    }
}

/// `SELECT id FROM projects WHERE user_id = owner`
fn owned_projects(owner: Uuid) -> SelectStatement {
    EProject::find()
        .select_only()
        .column(CProject::Id)
        .filter(CProject::UserId.eq(owner))
        .into_query()
}

fn task_condition(filter: TaskFilter) -> Condition {
    let scoped =
        Condition::all().add(CTask::ProjectId.in_subquery(owned_projects(filter.owner())));

    match filter {
        TaskFilter::Owner(_) => scoped,
        TaskFilter::Project { project_id, .. } => scoped.add(CTask::ProjectId.eq(project_id)),
        TaskFilter::Id { id, .. } => scoped.add(CTask::Id.eq(id)),
    }
}

#[async_trait]
impl RemoteStore for DatabaseStore {
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError> {
        Ok(self.user.clone())
    }

    async fn select_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        Ok(EProject::find()
            .filter(project_condition(filter))
            .order_by_desc(CProject::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn insert_project(&self, row: ProjectRow) -> Result<Project, StoreError> {
        let project = AProject {
            id: Set(Uuid::new_v4()),
            name: Set(row.name),
            description: Set(row.description),
            user_id: Set(row.user_id),
            created_at: Set(Utc::now()),
        };

        Ok(project.insert(&self.db).await?)
    }

    async fn update_projects(
        &self,
        filter: ProjectFilter,
        changes: ProjectChanges,
    ) -> Result<(), StoreError> {
        EProject::update_many()
            .col_expr(CProject::Name, Expr::value(changes.name))
            .col_expr(CProject::Description, Expr::value(changes.description))
            .filter(project_condition(filter))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn delete_projects(&self, filter: ProjectFilter) -> Result<(), StoreError> {
        EProject::delete_many()
            .filter(project_condition(filter))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn select_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, StoreError> {
        Ok(ETask::find()
            .filter(task_condition(filter))
            .order_by_desc(CTask::CreatedAt)
            .all(&self.db)
            .await?)
    }

    async fn insert_task(&self, row: TaskRow) -> Result<Task, StoreError> {
        let task = ATask {
            id: Set(Uuid::new_v4()),
            title: Set(row.title),
            status: Set(row.status),
            project_id: Set(row.project_id),
            created_at: Set(Utc::now()),
        };

        Ok(task.insert(&self.db).await?)
    }

    async fn update_tasks(
        &self,
        filter: TaskFilter,
        changes: TaskChanges,
    ) -> Result<(), StoreError> {
        let update = match changes {
            TaskChanges::Title(title) => ETask::update_many().col_expr(CTask::Title, Expr::value(title)),
            TaskChanges::Status(status) => {
                ETask::update_many().col_expr(CTask::Status, Expr::value(status.as_str()))
            }
        };

        update.filter(task_condition(filter)).exec(&self.db).await?;

        Ok(())
    }

    async fn delete_tasks(&self, filter: TaskFilter) -> Result<(), StoreError> {
        ETask::delete_many()
            .filter(task_condition(filter))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(EUser::find()
            .filter(CUser::Email.eq(email))
            .one(&self.db)
            .await?)
    }
}
