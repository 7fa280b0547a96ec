/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a [`crate::RemoteStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The store answered and refused. The message is the store's own.
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Validation(String),
    #[error("{0} ID is required")]
    MissingId(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Deleting the tasks failed, so the project delete was never sent.
    #[error("Failed to delete tasks of project {project_id}, project kept: {source}")]
    CascadeAborted {
        project_id: Uuid,
        #[source]
        source: StoreError,
    },
    /// The tasks are gone but the project row is still there.
    #[error("Tasks of project {project_id} were deleted but the project was not, orphan cleanup needed: {source}")]
    OrphanCleanupNeeded {
        project_id: Uuid,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// True when the operation failed before anything was written to the store.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthenticated | ApiError::Validation(_) | ApiError::MissingId(_)
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
