/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::broadcast;
use tracing::{info, warn};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// Short-lived message about the outcome of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.message, detail),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn success(&self, message: &str) {
        info!(text = message, "notification");
        self.send(Notification {
            level: Level::Success,
            message: message.to_string(),
            detail: None,
            at: Utc::now(),
        });
    }

    pub fn error(&self, message: &str, detail: String) {
        warn!(text = message, %detail, "notification");
        self.send(Notification {
            level: Level::Error,
            message: message.to_string(),
            detail: Some(detail),
            at: Utc::now(),
        });
    }

    fn send(&self, notification: Notification) {
        // Nobody listening is fine.
        let _ = self.sender.send(notification);
    }
}
