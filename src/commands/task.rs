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
use connector::NewTask;
use entity::{Task, TaskStatus};
use query::{EmptyState, Hooks, TableView};
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum Commands {
    List {
        /// Project ID or name. Defaults to the selected project.
        #[arg(short, long)]
        project: Option<String>,
        /// List the tasks of every project.
        #[arg(short, long, conflicts_with = "project")]
        all: bool,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Sort by title in descending order.
        #[arg(long)]
        desc: bool,
    },
    Create {
        title: Option<String>,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(long, default_value_t = TaskStatus::Pending)]
        status: TaskStatus,
    },
    /// Change the title of a task.
    Edit {
        task: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        project: Option<String>,
    },
    Status {
        task: String,
        status: TaskStatus,
        #[arg(short, long)]
        project: Option<String>,
    },
    Delete {
        task: String,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        yes: bool,
    },
}

/// Tasks in scope: the given or selected project, or all tasks when none is selected.
async fn scoped_tasks(hooks: &Hooks, config: &Config, project: Option<String>) -> Result<Vec<Task>> {
    if project.is_none() && !config.contains_key(&ConfigKey::SelectedProject) {
        return Ok(hooks.tasks.list().await?);
    }

    let project = super::project::resolve(hooks, config, project).await?;
    Ok(hooks.tasks.list_for_project(project.id).await?)
}

/// Finds a task by id or by title.
async fn resolve(
    hooks: &Hooks,
    config: &Config,
    project: Option<String>,
    task: &str,
) -> Result<Task> {
    let tasks = scoped_tasks(hooks, config, project).await?;

    if let Ok(id) = Uuid::parse_str(task) {
        return match tasks.into_iter().find(|t| t.id == id) {
            Some(found) => Ok(found),
            None => bail!("Task {} not found.", task),
        };
    }

    let mut matches = tasks
        .into_iter()
        .filter(|t| t.title.eq_ignore_ascii_case(task));

    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found),
        (None, _) => bail!("Task {} not found.", task),
        (Some(_), Some(_)) => bail!("Task title {} is ambiguous, use its ID.", task),
    }
}

pub async fn handle(config_file: &ConfigFile, cmd: Commands) -> Result<()> {
    let session = open_session(config_file).await?;
    let hooks = &session.hooks;
    let config = &session.config;
    let mut rx = hooks.client.subscribe();

    match cmd {
        Commands::List {
            project,
            all,
            search,
            status,
            desc,
        } => {
            let tasks = if all {
                hooks.tasks.list().await?
            } else {
                scoped_tasks(hooks, config, project).await?
            };

            let mut view = TableView::<Task>::new();
            view.search = search.unwrap_or_default();
            view.status_filter = status;
            if desc {
                view.toggle_sort();
            }

            match view.empty_state(&tasks) {
                Some(EmptyState::NoRows) => {
                    println!("No tasks found. Create your first task to get started.")
                }
                Some(EmptyState::NoMatches) => println!("No tasks match your current filters."),
                None => {
                    for task in view.apply(&tasks) {
                        println!("{}  {:<11}  {}", task.id, task.status.label(), task.title);
                    }
                }
            }
        }

        Commands::Create {
            title,
            project,
            status,
        } => {
            let project = super::project::resolve(hooks, config, project).await?;
            let title = match title {
                Some(title) => title,
                None => ask_for_input("Title")?,
            };

            let result = hooks
                .tasks
                .create(NewTask {
                    title,
                    project_id: project.id,
                    status,
                })
                .await;
            let task = report(&mut rx, result)?;
            println!("Task ID: {}", task.id);
        }

        Commands::Edit {
            task,
            title,
            project,
        } => {
            let task = resolve(hooks, config, project, &task).await?;
            let mut view = TableView::<Task>::new();
            view.begin_edit(&task);

            if let Some(draft) = view.draft_mut() {
                draft.title = match title {
                    Some(title) => title,
                    None => ask_for_input("Title")?,
                };
            }

            if let Some(edit) = view.finish_edit() {
                let result = hooks.tasks.save_edit(edit).await;
                if !report(&mut rx, result)? {
                    println!("Title is empty, task left unchanged.");
                }
            }
        }

        Commands::Status {
            task,
            status,
            project,
        } => {
            let task = resolve(hooks, config, project, &task).await?;
            let result = hooks.tasks.update_status(task.id, status).await;
            report(&mut rx, result)?;
        }

        Commands::Delete { task, project, yes } => {
            let task = resolve(hooks, config, project, &task).await?;

            if !yes && !confirm(&format!("Delete task {}?", task.title))? {
                println!("Aborted.");
                return Ok(());
            }

            let result = hooks.tasks.delete(task.id).await;
            report(&mut rx, result)?;
        }
    }

    Ok(())
}
