use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use taskia_rs::{
    normalize_analysis, ApiError, ClientConfig, HttpTaskApi, SubtaskPatch, TaskCoordinator,
    TaskFilter, TaskPrompt,
};

use crate::commands::{self, Command};
use crate::render;

pub struct Repl {
    config: ClientConfig,
    tasks: TaskCoordinator,
}

impl Repl {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let tasks = coordinator(&config)?;
        Ok(Self { config, tasks })
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        render::banner(&self.config);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            render::prompt();
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match commands::parse(&line) {
                Ok(Some(Command::Exit)) => break,
                Ok(Some(command)) => {
                    if let Err(err) = self.execute(command).await {
                        render::error(&err.to_string());
                    }
                }
                Ok(None) => {}
                Err(usage) => render::error(&usage),
            }
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<(), ApiError> {
        debug!(?command, "repl command");
        match command {
            Command::Tasks(filter) => self.list(filter).await?,
            Command::Show(id) => {
                self.tasks.ensure_loaded().await?;
                let task = match self.tasks.task(&id) {
                    Some(task) => task,
                    None => self.tasks.refresh_task(&id).await?,
                };
                render::task(&task);
            }
            Command::New(input) => {
                let task = self.tasks.create(TaskPrompt::from_input(&input)).await?;
                render::info(&format!("created {}", task.id));
                render::task(&task);
            }
            Command::Done(id) => {
                self.tasks.ensure_loaded().await?;
                let task = self.tasks.toggle_completed(&id).await?;
                render::info(&render::task_line(&task));
            }
            Command::Remove(id) => {
                self.tasks.delete_task(&id).await?;
                render::info(&format!("deleted {}", id));
            }
            Command::Analyze(id) => {
                let raw = self.tasks.analyze(&id).await?;
                render::analysis(&normalize_analysis(&raw));
            }
            Command::Subtasks(id) => {
                let task = self.tasks.generate_subtasks(&id).await?;
                render::task(&task);
            }
            Command::SubDone(subtask_id) => {
                self.tasks.ensure_loaded().await?;
                let done = self
                    .tasks
                    .tasks()
                    .iter()
                    .find_map(|task| task.subtask(&subtask_id).map(|sub| sub.completed))
                    .unwrap_or(false);
                self.tasks
                    .update_subtask(&subtask_id, SubtaskPatch::completion(!done))
                    .await?;
                render::info(&format!(
                    "subtask {} {}",
                    subtask_id,
                    if done { "reopened" } else { "done" }
                ));
            }
            Command::SubRemove(subtask_id) => {
                self.tasks.delete_subtask(&subtask_id).await?;
                render::info(&format!("deleted subtask {}", subtask_id));
            }
            Command::Summary => render::summary(&self.tasks.summarize().await?),
            Command::Reload => {
                let tasks = self.tasks.load().await?;
                render::tasks(&tasks, TaskFilter::All);
            }
            Command::Config => render::config(&self.config),
            Command::Base(None) => render::info(&format!("base: {}", self.config.base_url())),
            Command::Base(Some(url)) => match self.config.clone().with_api_url(&url) {
                Ok(config) => {
                    self.tasks = coordinator(&config)?;
                    self.config = config;
                    render::info("base url updated");
                }
                Err(err) => render::error(&err.to_string()),
            },
            Command::Help => render::help(),
            Command::Exit => {}
        }
        Ok(())
    }

    async fn list(&self, filter: TaskFilter) -> Result<(), ApiError> {
        let tasks = self.tasks.ensure_loaded().await?;
        render::tasks(&tasks, filter);
        Ok(())
    }
}

/// A fresh coordinator (and cache) for `config`.
fn coordinator(config: &ClientConfig) -> Result<TaskCoordinator, ApiError> {
    let api = HttpTaskApi::new(config)?;
    Ok(TaskCoordinator::new(Arc::new(api)))
}
