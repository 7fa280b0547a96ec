/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::*;
use crate::config::*;
use crate::input::*;
use anyhow::{Context as _, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use connector::auth::{self, SignUp};
use connector::database::DatabaseStore;
use connector::input::check_email;
use connector::{UserApi, health};
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "Taskdeck", display_name = "Taskdeck", bin_name = "taskdeck", author = "Wavelens", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<MainCommands>,
    #[arg(long, value_enum)]
    generate_completions: Option<Shell>,
    #[arg(long, global = true, env = "TASKDECK_LOG_LEVEL", default_value = "warn")]
    log_level: String,
    /// Use this configuration file instead of the default one.
    #[arg(long, global = true, env = "TASKDECK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum MainCommands {
    /// Show or set a configuration value.
    Config { key: String, value: Option<String> },
    Status,
    Register {
        #[arg(short, long)]
        email: Option<String>,
    },
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    Logout,
    Info,
    /// Apply the schema to the database configured as `databaseurl`.
    Migrate,
    Project {
        #[command(subcommand)]
        cmd: project::Commands,
    },
    Task {
        #[command(subcommand)]
        cmd: task::Commands,
    },
    User {
        #[command(subcommand)]
        cmd: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    Find { email: String },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completions {
        let mut app = Cli::command();
        let bin_name = app.get_name().to_string();
        generate(shell, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    init_logging(&cli.log_level);

    let config_file = match cli.config {
        Some(path) => ConfigFile::at(path),
        None => ConfigFile::default_location()?,
    };

    let Some(cmd) = cli.cmd else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match cmd {
        MainCommands::Config { key, value } => handle_config(&config_file, &key, value),
        MainCommands::Status => handle_status(&config_file).await,
        MainCommands::Register { email } => handle_register(&config_file, email).await,
        MainCommands::Login { email } => handle_login(&config_file, email).await,
        MainCommands::Logout => handle_logout(&config_file).await,
        MainCommands::Info => handle_info(&config_file).await,
        MainCommands::Migrate => handle_migrate(&config_file).await,
        MainCommands::Project { cmd } => project::handle(&config_file, cmd).await,
        MainCommands::Task { cmd } => task::handle(&config_file, cmd).await,
        MainCommands::User { cmd } => match cmd {
            UserCommands::Find { email } => handle_user_find(&config_file, &email).await,
        },
    }
}

fn handle_config(config_file: &ConfigFile, key: &str, value: Option<String>) -> Result<()> {
    let key = ConfigKey::from_str(key)?;

    match value {
        Some(value) => {
            config_file.set(key, Some(value.clone()))?;
            println!("{} set to \"{}\"", key, value);
        }
        None => match config_file.get(key)? {
            Some(value) => println!("{}", value),
            None => println!("[unset]"),
        },
    }

    Ok(())
}

async fn handle_status(config_file: &ConfigFile) -> Result<()> {
    let config = config_file.load()?;

    if let Some(database_url) = config.get(&ConfigKey::DatabaseUrl) {
        DatabaseStore::connect(database_url, None)
            .await
            .map_err(|e| anyhow!("Database unreachable: {}", e))?;
        println!("Database reachable.");
    } else {
        health(&get_request_config(&config)?)
            .await
            .map_err(|e| anyhow!("Server unreachable: {}", e))?;
        println!("Server Online.");
    }

    if is_logged_in(&config) {
        println!("Logged in.");
    } else {
        println!("Not logged in. Use `taskdeck login` to log in.");
    }

    Ok(())
}

fn ensure_server(config_file: &ConfigFile) -> Result<Config> {
    let config = config_file.load()?;

    if config.contains_key(&ConfigKey::DatabaseUrl) {
        bail!("Accounts are managed by the hosted service. Set `taskdeck config userid <id>` for direct database access.");
    }

    if !config.contains_key(&ConfigKey::Server) {
        config_file.set(ConfigKey::Server, Some(ask_for_input("Server URL")?))?;
    }

    if !config.contains_key(&ConfigKey::ApiKey) {
        config_file.set(ConfigKey::ApiKey, Some(ask_for_input("API key")?))?;
    }

    Ok(config_file.load()?)
}

fn read_email(email: Option<String>) -> Result<String> {
    let email = match email {
        Some(email) => email,
        None => ask_for_input("Email")?,
    };

    check_email(&email).map_err(anyhow::Error::msg)
}

fn store_session(config_file: &ConfigFile, session: &auth::Session) -> Result<()> {
    config_file.set(ConfigKey::AuthToken, Some(session.access_token.clone()))?;
    config_file.set(ConfigKey::UserId, Some(session.user.id.to_string()))?;
    Ok(())
}

async fn handle_register(config_file: &ConfigFile, email: Option<String>) -> Result<()> {
    let config = ensure_server(config_file)?;
    let email = read_email(email)?;
    let password = ask_for_password()?;

    let res = auth::sign_up(&get_request_config(&config)?, email.clone(), password)
        .await
        .map_err(|e| anyhow!("Registration failed: {}", e))?;

    match res {
        SignUp::SignedIn(session) => {
            store_session(config_file, &session)?;
            println!("Registration successful. Logged in as {}.", email);
        }
        SignUp::ConfirmationRequired(_) => {
            println!("Registration successful. Confirm your email address, then log in.");
        }
    }

    Ok(())
}

async fn handle_login(config_file: &ConfigFile, email: Option<String>) -> Result<()> {
    let config = ensure_server(config_file)?;
    let email = read_email(email)?;
    let password = ask_for_password()?;

    let session = auth::sign_in(&get_request_config(&config)?, email.clone(), password)
        .await
        .map_err(|e| anyhow!("Login failed: {}", e))?;

    store_session(config_file, &session)?;
    println!("Logged in as {}.", session.user.email.as_deref().unwrap_or(&email));
    Ok(())
}

async fn handle_logout(config_file: &ConfigFile) -> Result<()> {
    let config = config_file.load()?;

    if !config.contains_key(&ConfigKey::DatabaseUrl) {
        if let Ok(request) = get_request_config(&config) {
            if let Err(e) = auth::sign_out(&request).await {
                tracing::warn!(error = %e, "failed to revoke session");
            }
        }
    }

    config_file.unset(&[
        ConfigKey::AuthToken,
        ConfigKey::UserId,
        ConfigKey::SelectedProject,
    ])?;
    println!("Logged out.");
    Ok(())
}

async fn handle_info(config_file: &ConfigFile) -> Result<()> {
    let config = config_file.load()?;
    require_login(&config)?;

    let user = open_store(&config)
        .await?
        .current_user()
        .await?
        .context("Session expired. Use `taskdeck login` to log in again.")?;

    println!("User ID: {}", user.id);
    println!("Email: {}", user.email.as_deref().unwrap_or("-"));
    if let Some(project) = config.get(&ConfigKey::SelectedProject) {
        println!("Selected Project: {}", project);
    }

    Ok(())
}

async fn handle_migrate(config_file: &ConfigFile) -> Result<()> {
    let config = config_file.load()?;
    let database_url = config.get(&ConfigKey::DatabaseUrl).context(
        "Database URL not set. Use `taskdeck config databaseurl <url>` to set it.",
    )?;

    DatabaseStore::connect(database_url, None)
        .await?
        .migrate()
        .await?;
    println!("Migrations applied.");
    Ok(())
}

async fn handle_user_find(config_file: &ConfigFile, email: &str) -> Result<()> {
    let config = config_file.load()?;
    require_login(&config)?;

    let users = UserApi::new(open_store(&config).await?);
    match users.get_by_email(email).await? {
        Some(user) => {
            println!("User ID: {}", user.id);
            println!("Email: {}", user.email);
            println!("Created At: {}", user.created_at);
        }
        None => bail!("No user with email {}", email),
    }

    Ok(())
}
