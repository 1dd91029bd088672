use taskia_rs::TaskFilter;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Tasks(TaskFilter),
    Show(String),
    New(String),
    Done(String),
    Remove(String),
    Analyze(String),
    Subtasks(String),
    SubDone(String),
    SubRemove(String),
    Summary,
    Reload,
    Config,
    Base(Option<String>),
    Help,
    Exit,
}

/// Parses one input line. Blank lines yield `Ok(None)`; anything that is not
/// a slash command is a prompt for a new task.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(body) = line.strip_prefix('/') else {
        return Ok(Some(Command::New(line.to_string())));
    };
    let mut parts = body.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    let command = match cmd {
        "exit" | "quit" => Command::Exit,
        "help" => Command::Help,
        "tasks" | "ls" => match TaskFilter::parse(rest) {
            Some(filter) => Command::Tasks(filter),
            None => return Err("usage: /tasks [all|pending|completed]".to_string()),
        },
        "show" => Command::Show(required(rest, "/show <task-id>")?),
        "new" => Command::New(required(rest, "/new <prompt>")?),
        "done" => Command::Done(required(rest, "/done <task-id>")?),
        "rm" => Command::Remove(required(rest, "/rm <task-id>")?),
        "analyze" => Command::Analyze(required(rest, "/analyze <task-id>")?),
        "subtasks" => Command::Subtasks(required(rest, "/subtasks <task-id>")?),
        "sub-done" => Command::SubDone(required(rest, "/sub-done <subtask-id>")?),
        "sub-rm" => Command::SubRemove(required(rest, "/sub-rm <subtask-id>")?),
        "summary" => Command::Summary,
        "reload" => Command::Reload,
        "config" => Command::Config,
        "base" => Command::Base((!rest.is_empty()).then(|| rest.to_string())),
        _ => return Err("unknown command, type /help".to_string()),
    };
    Ok(Some(command))
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}
