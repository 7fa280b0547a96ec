/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for entity enums

use entity::*;
use std::str::FromStr;

#[test]
fn test_task_status_from_str() {
    assert_eq!(TaskStatus::from_str("pending").unwrap(), TaskStatus::Pending);
    assert_eq!(
        TaskStatus::from_str("in_progress").unwrap(),
        TaskStatus::InProgress
    );
    assert_eq!(
        TaskStatus::from_str("In Progress").unwrap(),
        TaskStatus::InProgress
    );
    assert_eq!(
        TaskStatus::from_str("completed").unwrap(),
        TaskStatus::Completed
    );

    let err = TaskStatus::from_str("done").unwrap_err();
    assert_eq!(err, "Unknown task status: done");
}

#[test]
fn test_task_status_display() {
    for status in TaskStatus::ALL {
        assert_eq!(TaskStatus::from_str(&status.to_string()).unwrap(), status);
    }

    assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    assert_eq!(TaskStatus::InProgress.label(), "in progress");
    assert_eq!(TaskStatus::default(), TaskStatus::Pending);
}

#[test]
fn test_task_status_wire_format() {
    let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
    assert_eq!(json, "\"in_progress\"");

    let status: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
    assert_eq!(status, TaskStatus::Completed);

    assert!(serde_json::from_str::<TaskStatus>("\"archived\"").is_err());
}
