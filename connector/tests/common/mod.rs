/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use connector::Api;
use connector::memory::MemoryStore;
use entity::AuthUser;
use std::sync::Arc;
use uuid::Uuid;

pub fn create_test_user() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: Some("ada@example.com".to_string()),
    }
}

pub fn create_signed_in_api() -> (Arc<MemoryStore>, Api, AuthUser) {
    let user = create_test_user();
    let store = Arc::new(MemoryStore::signed_in(user.clone()));
    let api = Api::new(store.clone());

    (store, api, user)
}
