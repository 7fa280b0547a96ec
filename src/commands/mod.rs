/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod base;
pub mod project;
pub mod task;

use anyhow::{Result, anyhow};
use connector::ApiResult;
use query::{Level, Notification};
use tokio::sync::broadcast::Receiver;

/// Prints the success notifications of a mutation. A failure is returned
/// as the error, worded like its notification.
pub(crate) fn report<T>(rx: &mut Receiver<Notification>, result: ApiResult<T>) -> Result<T> {
    let mut failure = None;

    while let Ok(notification) = rx.try_recv() {
        match notification.level {
            Level::Success => println!("{}", notification),
            Level::Error => failure = Some(notification),
        }
    }

    result.map_err(|e| match failure {
        Some(notification) => anyhow!("{}", notification),
        None => e.into(),
    })
}
