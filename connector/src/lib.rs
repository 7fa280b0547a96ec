/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Client side of the hosted project store.
//!
//! The [`RemoteStore`] trait is the table-level contract with the backend.
//! [`ProjectApi`], [`TaskApi`] and [`UserApi`] map domain operations onto it,
//! validate input before anything leaves the process and turn store failures
//! into [`ApiError`]s.

pub mod auth;
pub mod database;
pub mod error;
pub mod input;
pub mod memory;
pub mod projects;
pub mod rest;
pub mod store;
pub mod tasks;
pub mod users;

pub use error::{ApiError, ApiResult, StoreError};
pub use projects::{NewProject, ProjectApi, ProjectUpdate};
pub use store::RemoteStore;
pub use tasks::{NewTask, TaskApi};
pub use users::UserApi;

use entity::AuthUser;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub server_url: String,
    pub api_key: String,
    pub token: Option<String>,
}

pub type RequestType = reqwest::Method;

/// All API clients over one store.
#[derive(Clone)]
pub struct Api {
    pub projects: ProjectApi,
    pub tasks: TaskApi,
    pub users: UserApi,
}

impl Api {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            projects: ProjectApi::new(Arc::clone(&store)),
            tasks: TaskApi::new(Arc::clone(&store)),
            users: UserApi::new(store),
        }
    }
}

/// The session user every scoped operation runs as.
pub(crate) async fn require_user(store: &dyn RemoteStore) -> ApiResult<AuthUser> {
    match store.current_user().await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!("operation attempted without a session");
            Err(ApiError::Unauthenticated)
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

fn get_client(
    client: &reqwest::Client,
    config: &RequestConfig,
    endpoint: &str,
    request_type: RequestType,
) -> reqwest::RequestBuilder {
    let url = format!("{}/{}", config.server_url.trim_end_matches('/'), endpoint);
    tracing::debug!(method = %request_type, %url, "remote request");

    let bearer = config.token.as_deref().unwrap_or(&config.api_key);

    client
        .request(request_type, url)
        .header("apikey", &config.api_key)
        .header("Authorization", format!("Bearer {}", bearer))
        .header("Content-Type", "application/json")
}

async fn read_body(res: reqwest::Response) -> Result<Vec<u8>, StoreError> {
    let status = res.status();
    let bytes = res.bytes().await?;

    if status.is_success() {
        return Ok(bytes.to_vec());
    }

    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| String::from_utf8_lossy(&bytes).trim().to_string());

    tracing::warn!(status = status.as_u16(), %message, "remote store rejected request");

    Err(StoreError::Remote {
        status: status.as_u16(),
        message,
    })
}

async fn parse_response<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, StoreError> {
    let bytes = read_body(res).await?;
    serde_json::from_slice::<T>(&bytes).map_err(|e| StoreError::Malformed(e.to_string()))
}

async fn check_response(res: reqwest::Response) -> Result<(), StoreError> {
    read_body(res).await.map(|_| ())
}

pub async fn health(config: &RequestConfig) -> Result<(), StoreError> {
    let client = reqwest::Client::new();
    let res = get_client(&client, config, "auth/v1/health", RequestType::GET)
        .send()
        .await?;

    check_response(res).await
}
