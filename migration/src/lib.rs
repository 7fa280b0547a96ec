/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_table_users;
mod m20261019_000002_create_table_projects;
mod m20261019_000003_create_table_tasks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_table_users::Migration),
            Box::new(m20261019_000002_create_table_projects::Migration),
            Box::new(m20261019_000003_create_table_tasks::Migration),
        ]
    }
}
