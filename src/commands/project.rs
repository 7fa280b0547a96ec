/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::*;
use crate::config::*;
use crate::input::*;
use anyhow::{Result, bail};
use clap::Subcommand;
use connector::NewProject;
use entity::{Project, TaskStatus};
use query::{EmptyState, Hooks, TableView};
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Sort by name in descending order.
        #[arg(long)]
        desc: bool,
    },
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
    },
    /// Show a project and its tasks. Defaults to the selected project.
    Show { project: Option<String> },
    Select { project: String },
    Edit {
        project: Option<String>,
        #[arg(short, long)]
        new_name: Option<String>,
        #[arg(short = 'c', long)]
        description: Option<String>,
    },
    Delete {
        project: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
}

/// Finds a project by id or by name, falling back to the selected one.
pub(crate) async fn resolve(
    hooks: &Hooks,
    config: &Config,
    project: Option<String>,
) -> Result<Project> {
    let project = match project.or_else(|| config.get(&ConfigKey::SelectedProject).cloned()) {
        Some(project) => project,
        None => bail!(
            "No project selected. Use `taskdeck project select <project>` or name one."
        ),
    };

    if let Ok(id) = Uuid::parse_str(&project) {
        return Ok(hooks.projects.get(id).await?);
    }

    let mut matches = hooks
        .projects
        .list()
        .await?
        .into_iter()
        .filter(|p| p.name.eq_ignore_ascii_case(&project));

    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found),
        (None, _) => bail!("Project {} not found.", project),
        (Some(_), Some(_)) => bail!("Project name {} is ambiguous, use its ID.", project),
    }
}

pub async fn handle(config_file: &ConfigFile, cmd: Commands) -> Result<()> {
    let session = open_session(config_file).await?;
    let hooks = &session.hooks;
    let mut rx = hooks.client.subscribe();

    match cmd {
        Commands::List { search, desc } => {
            let projects = hooks.projects.list().await?;
            let selected = session.config.get(&ConfigKey::SelectedProject);

            let mut view = TableView::<Project>::new();
            view.search = search.unwrap_or_default();
            if desc {
                view.toggle_sort();
            }

            match view.empty_state(&projects) {
                Some(EmptyState::NoRows) => {
                    println!("No projects found. Create your first project to get started.")
                }
                Some(EmptyState::NoMatches) => println!("No projects match your search."),
                None => {
                    for project in view.apply(&projects) {
                        let marker = if selected == Some(&project.id.to_string()) {
                            "*"
                        } else {
                            " "
                        };
                        println!(
                            "{} {}  {:<24}  {}",
                            marker,
                            project.id,
                            project.name,
                            project.description.as_deref().unwrap_or("-")
                        );
                    }
                }
            }
        }

        Commands::Create { name, description } => {
            let name = match name {
                Some(name) => name,
                None => ask_for_input("Name")?,
            };
            let description = match description {
                Some(description) => Some(description),
                None => ask_for_optional_input("Description")?,
            };

            let result = hooks
                .projects
                .create(NewProject { name, description })
                .await;
            let project = report(&mut rx, result)?;
            println!("Project ID: {}", project.id);
        }

        Commands::Show { project } => {
            let project = resolve(hooks, &session.config, project).await?;
            let tasks = hooks.tasks.list_for_project(project.id).await?;

            println!("===== Project =====");
            println!("ID: {}", project.id);
            println!("Name: {}", project.name);
            println!(
                "Description: {}",
                project.description.as_deref().unwrap_or("-")
            );
            println!("Created At: {}", project.created_at);
            println!();

            println!("===== Tasks =====");
            if tasks.is_empty() {
                println!("No tasks found. Create your first task to get started.");
            }

            for status in TaskStatus::ALL {
                let count = tasks.iter().filter(|t| t.status == status).count();
                println!("{}: {}", status.label(), count);
            }
        }

        Commands::Select { project } => {
            let project = resolve(hooks, &session.config, Some(project)).await?;
            config_file.set(ConfigKey::SelectedProject, Some(project.id.to_string()))?;
            println!("Project {} selected.", project.name);
        }

        Commands::Edit {
            project,
            new_name,
            description,
        } => {
            let project = resolve(hooks, &session.config, project).await?;
            let mut view = TableView::<Project>::new();
            view.begin_edit(&project);

            if let Some(draft) = view.draft_mut() {
                if new_name.is_none() && description.is_none() {
                    draft.name = ask_for_input("Name")?;
                    draft.description =
                        ask_for_optional_input("Description")?.unwrap_or_default();
                }

                if let Some(new_name) = new_name {
                    draft.name = new_name;
                }

                if let Some(description) = description {
                    draft.description = description;
                }
            }

            if let Some(edit) = view.finish_edit() {
                let result = hooks.projects.save_edit(edit).await;
                report(&mut rx, result)?;
            }
        }

        Commands::Delete { project, yes } => {
            let project = resolve(hooks, &session.config, project).await?;

            if !yes
                && !confirm(&format!(
                    "Delete project {} and all of its tasks?",
                    project.name
                ))?
            {
                println!("Aborted.");
                return Ok(());
            }

            let result = hooks.projects.delete(project.id).await;
            report(&mut rx, result)?;

            if session.config.get(&ConfigKey::SelectedProject) == Some(&project.id.to_string()) {
                config_file.set(ConfigKey::SelectedProject, None)?;
            }
        }
    }

    Ok(())
}
