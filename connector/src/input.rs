/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub fn check_project_name(s: &str) -> Result<String, String> {
    let name = s.trim();

    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    Ok(name.to_string())
}

pub fn check_task_title(s: &str) -> Result<String, String> {
    let title = s.trim();

    if title.is_empty() {
        return Err("Title is required".to_string());
    }

    Ok(title.to_string())
}

/// Blank descriptions are stored as `NULL`.
pub fn normalize_description(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

pub fn check_email(s: &str) -> Result<String, String> {
    let email = s.trim();

    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_string())
        }
        _ => Err(format!("`{}` is not a valid email address", email)),
    }
}
