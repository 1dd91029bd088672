use std::io::{self, Write};

use taskia_rs::{Analysis, ClientConfig, Summary, Task, TaskFilter, TaskStatus};

const DESCRIPTION_WIDTH: usize = 120;

pub fn banner(cfg: &ClientConfig) {
    println!("taskia");
    println!("API: {}", cfg.base_url());
    println!("Type /help for commands, or just describe a task to create it.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                       Show commands");
    println!("  /exit | /quit               Exit");
    println!("  /tasks [all|pending|completed]  List tasks");
    println!("  /show <task-id>             Show one task with subtasks");
    println!("  /new <prompt>               Create a task with AI (plain lines do the same)");
    println!("  /done <task-id>             Toggle completion");
    println!("  /rm <task-id>               Delete a task");
    println!("  /analyze <task-id>          AI insights and suggestions");
    println!("  /subtasks <task-id>         Generate subtasks with AI");
    println!("  /sub-done <subtask-id>      Toggle a subtask");
    println!("  /sub-rm <subtask-id>        Delete a subtask");
    println!("  /summary                    AI summary of all tasks");
    println!("  /reload                     Refetch the task list");
    println!("  /config                     Show current config");
    println!("  /base [url]                 Show or change the API base URL");
}

pub fn tasks(all: &[Task], filter: TaskFilter) {
    let shown = filter.apply(all);
    let done = TaskFilter::Completed.apply(all).len();
    println!(
        "{} tasks ({} pending, {} completed) showing {}",
        all.len(),
        all.len() - done,
        done,
        filter_label(filter)
    );
    if shown.is_empty() {
        println!("no tasks");
        return;
    }
    for task in shown {
        println!("{}", task_line(task));
    }
}

pub fn task(task: &Task) {
    println!("{}", task_line(task));
    if let Some(description) = &task.description {
        println!("  {}", truncate(description, DESCRIPTION_WIDTH));
    }
    if !task.tags.is_empty() {
        println!("  tags: {}", task.tags.join(", "));
    }
    if let Some(due) = task.due_date {
        println!("  due: {}", due.format("%Y-%m-%d"));
    }
    for sub in &task.subtasks {
        let mark = if sub.completed { "x" } else { " " };
        println!("    [{}] {}  {}", mark, sub.id, sub.title);
    }
}

pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {}  {}  ({} · {})",
        status_mark(task.status),
        task.id,
        task.title,
        task.priority.as_str(),
        category_label(&task.category)
    );
    if !task.subtasks.is_empty() {
        line.push_str(&format!(
            "  {}/{}",
            task.completed_subtasks(),
            task.subtasks.len()
        ));
    }
    line
}

pub fn analysis(analysis: &Analysis) {
    println!("Insights:");
    println!("{}", analysis.insights);
    println!();
    println!("Suggestions:");
    println!("{}", analysis.suggestions);
}

pub fn summary(summary: &Summary) {
    if !summary.success {
        println!("(summary unavailable)");
    }
    println!("{}", summary.summary);
}

pub fn config(cfg: &ClientConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url());
    match cfg.timeout_secs {
        Some(secs) => println!("  timeout: {}s", secs),
        None => println!("  timeout: none"),
    }
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}

fn status_mark(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "x",
        TaskStatus::InProgress => "~",
        TaskStatus::Blocked => "!",
        TaskStatus::Pending => " ",
    }
}

fn filter_label(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "all",
        TaskFilter::Pending => "pending",
        TaskFilter::Completed => "completed",
    }
}

fn category_label(category: &str) -> &str {
    if category.trim().is_empty() {
        "uncategorized"
    } else {
        category
    }
}

/// Cuts at a char boundary and marks the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}
