use clap::{CommandFactory, Parser};
use rotor_cli::cli::{Cli, Command};
use rotor_core::config::{self, Config};
use rotor_core::error::AppError;
use rotor_core::model::{Task, TaskStatus};
use rotor_core::session::{self, NextTask};
use std::io::{self, BufRead};
use tabled::{Table, Tabled};

fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Running => "running",
        TaskStatus::Waiting => "waiting",
        TaskStatus::Done => "done",
    }
}

const BANNER: &str =
    "================================================================================";

fn print_next_plain(next: &NextTask) {
    println!("{BANNER}");
    println!("Project: {} ({})", next.project.name, next.project.id);
    if !next.project.context.is_empty() {
        println!("{}", next.project.context);
    }
    println!("{BANNER}");
    print_task_plain(&next.task);
}

fn print_task_plain(task: &Task) {
    println!(
        "[{}] {} ({})",
        status_label(task.status).to_uppercase(),
        task.title,
        task.id
    );
    if !task.context.is_empty() {
        println!("{}", task.context);
    }
    if let Some(reason) = task.waiting_reason.as_deref() {
        let until = task.snooze_until.as_deref().unwrap_or("-");
        println!("Waiting on: {reason} (snoozed until {until})");
    }
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "project_id": task.project_id,
        "title": task.title,
        "context": task.context,
        "status": task.status,
        "waiting_reason": task.waiting_reason,
        "snooze_until": task.snooze_until,
        "created_at": task.created_at,
        "status_changed_at": task.status_changed_at,
    })
}

fn next_json(next: &NextTask) -> serde_json::Value {
    serde_json::json!({
        "task": task_json(&next.task),
        "project": {
            "id": next.project.id,
            "name": next.project.name,
            "context": next.project.context,
        },
    })
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "task")]
    id: String,
    project: String,
    title: String,
    status: String,
    #[tabled(rename = "snoozed until")]
    snooze_until: String,
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_argument(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_argument("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

/// Expand a configured alias on the first token only.
fn expand_alias(args: Vec<String>, config: &Config) -> Result<Vec<String>, AppError> {
    let Some(first) = args.first() else {
        return Ok(args);
    };
    let Some(expansion) = config.aliases.get(first) else {
        return Ok(args);
    };

    let mut expanded = split_command_line(expansion)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    match cli.command {
        Command::Next => {
            let picked = session::next_task()?;
            match picked {
                Some(next) => {
                    if cli.json {
                        println!("{}", next_json(&next));
                    } else {
                        print_next_plain(&next);
                    }
                }
                None => {
                    // Not an error: the rotation is simply empty right now.
                    if cli.json {
                        println!("null");
                    } else {
                        println!("No task available");
                    }
                }
            }
        }
        Command::AddProject { name, context } => {
            let project = session::add_project(&name, context.as_deref().unwrap_or(""))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "id": project.id,
                        "name": project.name,
                        "context": project.context,
                    })
                );
            } else {
                println!("Added project: {} ({})", project.name, project.id);
            }
        }
        Command::AddTask {
            project,
            title,
            context,
            waiting,
            until,
        } => {
            let born_waiting = match (waiting.as_deref(), until.as_deref()) {
                (Some(reason), Some(until)) => Some((reason, until)),
                _ => None,
            };
            let task = session::add_task(
                &project,
                &title,
                context.as_deref().unwrap_or(""),
                born_waiting,
            )?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::Done { id } => {
            let task = session::complete_task(&id)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Completed task: {} ({})", task.title, task.id);
            }
        }
        Command::Snooze { id, reason, until } => {
            let until = until
                .or_else(|| config.default_snooze.clone())
                .ok_or_else(|| {
                    AppError::invalid_argument(
                        "snooze target is required (or set default_snooze in the config)",
                    )
                })?;
            let task = session::snooze_task(&id, &reason, &until)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                let until = task.snooze_until.as_deref().unwrap_or("-");
                println!("Snoozed task: {} ({}) until {}", task.title, task.id, until);
            }
        }
        Command::Wake { id, force } => {
            let task = session::wake_task(&id, force)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Woke task: {} ({})", task.title, task.id);
            }
        }
        Command::Reopen { id } => {
            let task = session::reopen_task(&id)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Reopened task: {} ({})", task.title, task.id);
            }
        }
        Command::Edit { id, title, context } => {
            let task = session::edit_task(&id, title.as_deref(), context.as_deref())?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Updated task: {} ({})", task.title, task.id);
            }
        }
        Command::EditProject { id, name, context } => {
            let project = session::edit_project(&id, name.as_deref(), context.as_deref())?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "id": project.id,
                        "name": project.name,
                        "context": project.context,
                    })
                );
            } else {
                println!("Updated project: {} ({})", project.name, project.id);
            }
        }
        Command::DeleteTask { id } => {
            let task = session::delete_task(&id)?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Deleted task: {} ({})", task.title, task.id);
            }
        }
        Command::DeleteProject { id, force } => {
            let project = session::delete_project(&id, force)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "id": project.id,
                        "name": project.name,
                    })
                );
            } else {
                println!("Deleted project: {} ({})", project.name, project.id);
            }
        }
        Command::List => {
            let board = session::load_board()?;
            if cli.json {
                let mut payload = Vec::with_capacity(board.projects.len());
                for project in &board.projects {
                    let tasks = board
                        .tasks_in(&project.id)?
                        .into_iter()
                        .map(task_json)
                        .collect::<Vec<_>>();
                    payload.push(serde_json::json!({
                        "id": project.id,
                        "name": project.name,
                        "context": project.context,
                        "tasks": tasks,
                    }));
                }
                println!("{}", serde_json::Value::Array(payload));
            } else {
                let mut rows = Vec::with_capacity(board.tasks.len());
                for project in &board.projects {
                    for task in board.tasks_in(&project.id)? {
                        rows.push(TaskRow {
                            id: task.id.clone(),
                            project: project.name.clone(),
                            title: task.title.clone(),
                            status: status_label(task.status).to_string(),
                            snooze_until: task
                                .snooze_until
                                .clone()
                                .unwrap_or_else(|| "-".to_string()),
                        });
                    }
                }
                if rows.is_empty() {
                    println!("No tasks");
                } else {
                    println!("{}", Table::new(rows));
                }
            }
        }
        Command::Show { id } => {
            let shown = session::show_task(&id)?;
            if cli.json {
                println!("{}", next_json(&shown));
            } else {
                print_next_plain(&shown);
            }
        }
    }

    Ok(())
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line).and_then(|args| expand_alias(args, config)) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("rotor".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, config) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = &loaded.error {
        eprintln!("WARNING: {}", err);
    }
    let config = loaded.config;

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&config) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &config) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
