/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use connector::ApiResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Success,
    Failure(String),
}

#[derive(Default)]
struct Inner {
    last: MutationState,
    in_flight: usize,
    targets: HashMap<Uuid, usize>,
}

/// One kind of write, e.g. "update task status". Tracks how many calls are
/// in flight and which entity ids they target.
pub struct Mutation {
    name: &'static str,
    inner: Mutex<Inner>,
}

// Releases the pending marks even if the mutation future is dropped.
struct PendingGuard<'a> {
    mutation: &'a Mutation,
    target: Option<Uuid>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.mutation.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);

        if let Some(id) = self.target {
            if let Some(count) = inner.targets.get_mut(&id) {
                *count -= 1;
                if *count == 0 {
                    inner.targets.remove(&id);
                }
            }
        }
    }
}

impl Mutation {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `Pending` while any call is in flight, otherwise the outcome of the
    /// last call to settle.
    pub fn state(&self) -> MutationState {
        let inner = self.lock();
        if inner.in_flight > 0 {
            MutationState::Pending
        } else {
            inner.last.clone()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn is_pending_for(&self, id: Uuid) -> bool {
        self.lock().targets.contains_key(&id)
    }

    pub fn pending_ids(&self) -> Vec<Uuid> {
        self.lock().targets.keys().copied().collect()
    }

    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.last = MutationState::Idle;
    }

    pub async fn run<T, Fut>(&self, target: Option<Uuid>, fut: Fut) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        {
            let mut inner = self.lock();
            inner.in_flight += 1;
            if let Some(id) = target {
                *inner.targets.entry(id).or_insert(0) += 1;
            }
        }

        debug!(mutation = self.name, ?target, "mutation pending");
        let guard = PendingGuard {
            mutation: self,
            target,
        };

        let result = fut.await;
        drop(guard);

        let state = match &result {
            Ok(_) => MutationState::Success,
            Err(e) => MutationState::Failure(e.to_string()),
        };

        debug!(mutation = self.name, ?target, ?state, "mutation settled");
        self.lock().last = state;
        result
    }
}
