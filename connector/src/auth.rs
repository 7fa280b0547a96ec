/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::*;
use entity::AuthUser;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// Outcome of a registration. Depending on the auth service settings the
/// account is usable right away or waits for email confirmation.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SignUp {
    SignedIn(Session),
    ConfirmationRequired(AuthUser),
}

pub async fn sign_in(
    config: &RequestConfig,
    email: String,
    password: String,
) -> Result<Session, StoreError> {
    let req = CredentialsRequest { email, password };

    let client = reqwest::Client::new();
    let res = get_client(
        &client,
        config,
        "auth/v1/token?grant_type=password",
        RequestType::POST,
    )
    .json(&req)
    .send()
    .await?;

    parse_response(res).await
}

pub async fn sign_up(
    config: &RequestConfig,
    email: String,
    password: String,
) -> Result<SignUp, StoreError> {
    let req = CredentialsRequest { email, password };

    let client = reqwest::Client::new();
    let res = get_client(&client, config, "auth/v1/signup", RequestType::POST)
        .json(&req)
        .send()
        .await?;

    parse_response(res).await
}

/// Revokes the session of `config.token`. Without a token there is nothing to revoke.
pub async fn sign_out(config: &RequestConfig) -> Result<(), StoreError> {
    if config.token.is_none() {
        return Ok(());
    }

    let client = reqwest::Client::new();
    let res = get_client(&client, config, "auth/v1/logout", RequestType::POST)
        .send()
        .await?;

    check_response(res).await
}
