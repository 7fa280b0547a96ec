/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod project;
pub mod task;
pub mod user;

pub use task::TaskStatus;
pub use user::AuthUser;

pub type EProject = project::Entity;
pub type ETask = task::Entity;
pub type EUser = user::Entity;

pub type MProject = project::Model;
pub type MTask = task::Model;
pub type MUser = user::Model;

pub type AProject = project::ActiveModel;
pub type ATask = task::ActiveModel;

pub type CProject = project::Column;
pub type CTask = task::Column;
pub type CUser = user::Column;

/// A project as returned by every layer above the store.
pub type Project = project::Model;
/// A task as returned by every layer above the store.
pub type Task = task::Model;
/// A row of the public `users` table.
pub type UserProfile = user::Model;
