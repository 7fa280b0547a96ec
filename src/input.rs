/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::config::*;
use anyhow::{Context as _, Result, anyhow, bail};
use connector::database::DatabaseStore;
use connector::rest::RestStore;
use connector::{Api, RemoteStore, RequestConfig};
use entity::AuthUser;
use query::Hooks;
use rpassword::read_password;
use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

fn read_line(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut inp = String::new();
    io::stdin()
        .read_line(&mut inp)
        .with_context(|| format!("Failed to read {}.", prompt))?;

    Ok(inp.trim().to_string())
}

pub fn ask_for_input(prompt: &str) -> Result<String> {
    let inp = read_line(prompt)?;

    if inp.is_empty() {
        bail!("{} cannot be empty.", prompt);
    }

    Ok(inp)
}

pub fn ask_for_optional_input(prompt: &str) -> Result<Option<String>> {
    let inp = read_line(&format!("{} (optional)", prompt))?;
    Ok(Some(inp).filter(|s| !s.is_empty()))
}

pub fn ask_for_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let inp = read_password().context("Failed to read password.")?;

    if inp.is_empty() {
        bail!("Password cannot be empty.");
    }

    Ok(inp)
}

pub fn confirm(prompt: &str) -> Result<bool> {
    let answer = read_line(&format!("{} [y/N]", prompt))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

pub fn get_request_config(config: &Config) -> Result<RequestConfig> {
    let server_url = config.get(&ConfigKey::Server).cloned().ok_or_else(|| {
        anyhow!("Server URL not set. Use `taskdeck config server <url>` to set it.")
    })?;

    let api_key = config.get(&ConfigKey::ApiKey).cloned().ok_or_else(|| {
        anyhow!("API key not set. Use `taskdeck config apikey <key>` to set it.")
    })?;

    Ok(RequestConfig {
        server_url,
        api_key,
        token: config.get(&ConfigKey::AuthToken).cloned(),
    })
}

fn session_user(config: &Config) -> Result<Option<AuthUser>> {
    config
        .get(&ConfigKey::UserId)
        .map(|id| {
            let id = Uuid::parse_str(id).context("Stored user id is not a valid UUID")?;
            Ok(AuthUser { id, email: None })
        })
        .transpose()
}

/// Direct database access when `databaseurl` is set, the hosted REST API otherwise.
pub async fn open_store(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    if let Some(database_url) = config.get(&ConfigKey::DatabaseUrl) {
        let store = DatabaseStore::connect(database_url, session_user(config)?).await?;
        return Ok(Arc::new(store));
    }

    Ok(Arc::new(RestStore::new(get_request_config(config)?)))
}

pub fn is_logged_in(config: &Config) -> bool {
    if config.contains_key(&ConfigKey::DatabaseUrl) {
        config.contains_key(&ConfigKey::UserId)
    } else {
        config.contains_key(&ConfigKey::AuthToken)
    }
}

pub fn require_login(config: &Config) -> Result<()> {
    if !is_logged_in(config) {
        bail!("Not logged in. Use `taskdeck login` to log in.");
    }

    Ok(())
}

/// Everything a project or task command works with.
pub struct Session {
    pub config_file: ConfigFile,
    pub config: Config,
    pub hooks: Hooks,
}

pub async fn open_session(config_file: &ConfigFile) -> Result<Session> {
    let config = config_file.load()?;
    require_login(&config)?;

    let store = open_store(&config).await?;
    Ok(Session {
        config_file: config_file.clone(),
        config,
        hooks: Hooks::new(Api::new(store)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(entries: &[(ConfigKey, &str)]) -> Config {
        entries
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect()
    }

    #[test]
    fn test_request_config() {
        let rest = config(&[
            (ConfigKey::Server, "https://db.example.com"),
            (ConfigKey::ApiKey, "anon"),
        ]);
        let request = get_request_config(&rest).unwrap();
        assert_eq!(request.server_url, "https://db.example.com");
        assert_eq!(request.api_key, "anon");
        assert_eq!(request.token, None);

        let missing_key = config(&[(ConfigKey::Server, "https://db.example.com")]);
        assert!(get_request_config(&missing_key).is_err());
    }

    #[test]
    fn test_login_state() {
        assert!(require_login(&Config::new()).is_err());
        assert!(is_logged_in(&config(&[(ConfigKey::AuthToken, "t")])));

        let database = config(&[(ConfigKey::DatabaseUrl, "postgres://localhost/taskdeck")]);
        assert!(!is_logged_in(&database));

        let user_id = Uuid::new_v4().to_string();
        let database = config(&[
            (ConfigKey::DatabaseUrl, "postgres://localhost/taskdeck"),
            (ConfigKey::UserId, user_id.as_str()),
        ]);
        assert!(is_logged_in(&database));
        assert_eq!(session_user(&database).unwrap().unwrap().id.to_string(), user_id);
    }
}
