/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::input::check_email;
use crate::*;
use entity::UserProfile;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserApi {
    store: Arc<dyn RemoteStore>,
}

impl UserApi {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn get_by_email(&self, email: &str) -> ApiResult<Option<UserProfile>> {
        let email = check_email(email).map_err(ApiError::Validation)?;

        Ok(self.store.find_user_by_email(&email).await?)
    }
}
