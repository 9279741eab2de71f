use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use daybook_cli::cli::{Cli, Command, HistoryCommand, parse_config_override};
use daybook_core::ai::GeminiGenerator;
use daybook_core::config::{self, Config, Palette};
use daybook_core::error::AppError;
use daybook_core::model::{HistorySnapshot, Task, Transition};
use daybook_core::notify::celebrator_from_env;
use daybook_core::storage::FileStore;
use daybook_core::task_api::{Confirmation, RestoreOutcome, TodoApp};
use std::io::{self, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::format_description::well_known::Rfc3339;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "DAYBOOK_LOG";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
}

#[derive(Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Archived at")]
    archived_at: String,
    #[tabled(rename = "Tasks")]
    tasks: usize,
    #[tabled(rename = "Completed")]
    completed: usize,
}

/// Reads a yes/no answer from stdin. Anything but `y`/`yes` declines.
struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(0) | Err(_) => {
                println!();
                false
            }
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

fn timestamp_label(snapshot: &HistorySnapshot) -> Result<String, AppError> {
    snapshot
        .timestamp
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

fn print_tasks_plain(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let rows = tasks.iter().enumerate().map(|(index, task)| TaskRow {
        position: index + 1,
        id: task.id,
        done: if task.completed { "x" } else { "" },
        text: task.text.clone(),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn print_json(value: serde_json::Value) {
    println!("{value}");
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "text": task.text,
        "completed": task.completed,
    })
}

fn tasks_json(tasks: &[Task]) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(task_json).collect())
}

fn print_history_plain(snapshots: &[&HistorySnapshot]) -> Result<(), AppError> {
    if snapshots.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(snapshots.len());
    for (index, snapshot) in snapshots.iter().enumerate() {
        rows.push(SnapshotRow {
            index,
            archived_at: timestamp_label(snapshot)?,
            tasks: snapshot.tasks.len(),
            completed: snapshot.tasks.iter().filter(|task| task.completed).count(),
        });
    }
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
    Ok(())
}

fn snapshot_json(index: usize, snapshot: &HistorySnapshot) -> Result<serde_json::Value, AppError> {
    Ok(serde_json::json!({
        "index": index,
        "timestamp": timestamp_label(snapshot)?,
        "tasks": tasks_json(&snapshot.tasks),
    }))
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn is_display_request(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            match ch {
                '"' | '\\' => current.push(ch),
                'n' => current.push('\n'),
                other => {
                    current.push('\\');
                    current.push(other);
                }
            }
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn effective_config(base: &Config, raw_overrides: &[String]) -> Result<Config, AppError> {
    let mut overrides = Vec::with_capacity(raw_overrides.len());
    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        overrides.push(parsed);
    }
    Ok(config::merge_overrides(base, &overrides))
}

fn confirm_or_ask(yes: bool, question: &str) -> bool {
    yes || StdinConfirmation.confirm(question)
}

fn report_missing(json: bool, id: i64, palette: &Palette) {
    if json {
        print_json(serde_json::Value::Null);
    } else {
        println!("{}", palette.muted(&format!("No task with id {id}.")));
    }
}

fn run_command(cli: Cli, app: &mut TodoApp<FileStore>, base: &Config) -> Result<(), AppError> {
    let config = effective_config(base, &cli.config_override)?;
    let palette = config.theme.palette();
    app.set_archive_on_restore(config.archive_on_restore);

    match cli.command {
        Command::Add { text } => {
            let text = text.ok_or_else(|| AppError::invalid_input("text is required"))?;
            match app.add(&text)? {
                Some(task) if cli.json => print_json(task_json(&task)),
                Some(task) => {
                    println!("{} {} ({})", palette.accent("Added task:"), task.text, task.id)
                }
                None if cli.json => print_json(serde_json::Value::Null),
                None => println!("{}", palette.muted("Nothing added: task text is blank.")),
            }
        }
        Command::Toggle { id } => match app.toggle(id)? {
            Some((task, transition)) => {
                if transition == Transition::Completed
                    && let Err(err) = celebrator_from_env().celebrate(&task)
                {
                    warn!(error = %err, "celebration failed");
                }
                if cli.json {
                    print_json(task_json(&task));
                } else {
                    let verb = match transition {
                        Transition::Completed => "Completed task:",
                        Transition::Reopened => "Reopened task:",
                    };
                    println!("{} {} ({})", palette.accent(verb), task.text, task.id);
                }
            }
            None => report_missing(cli.json, id, &palette),
        },
        Command::Edit { id, text } => match app.edit(id, &text)? {
            Some(task) if cli.json => print_json(task_json(&task)),
            Some(task) => {
                println!("{} {} ({})", palette.accent("Updated task:"), task.text, task.id)
            }
            None => report_missing(cli.json, id, &palette),
        },
        Command::Delete { id } => match app.delete(id)? {
            Some(task) if cli.json => print_json(task_json(&task)),
            Some(task) => {
                println!("{} {} ({})", palette.accent("Deleted task:"), task.text, task.id)
            }
            None => report_missing(cli.json, id, &palette),
        },
        Command::List => {
            if cli.json {
                print_json(tasks_json(app.tasks()));
            } else {
                print_tasks_plain(app.tasks());
            }
        }
        Command::Clear { yes } => {
            if !confirm_or_ask(yes, "Clear all tasks and start a new day?") {
                println!("{}", palette.muted("Cancelled."));
                return Ok(());
            }
            let snapshot = app.clear_all()?;
            if cli.json {
                print_json(snapshot_json(0, &snapshot)?);
            } else {
                println!(
                    "{} {} task(s) archived at {}",
                    palette.accent("Cleared:"),
                    snapshot.tasks.len(),
                    timestamp_label(&snapshot)?
                );
            }
        }
        Command::History { history } => match history {
            HistoryCommand::List => {
                let snapshots = app.history().list();
                if cli.json {
                    let mut payload = Vec::with_capacity(snapshots.len());
                    for (index, snapshot) in snapshots.iter().enumerate() {
                        payload.push(snapshot_json(index, snapshot)?);
                    }
                    print_json(serde_json::Value::Array(payload));
                } else {
                    print_history_plain(&snapshots)?;
                }
            }
            HistoryCommand::Show { index } => {
                let snapshot = app.snapshot_at(index)?;
                if cli.json {
                    print_json(snapshot_json(index, snapshot)?);
                } else {
                    println!(
                        "{} {}",
                        palette.accent("Archived at"),
                        timestamp_label(snapshot)?
                    );
                    print_tasks_plain(&snapshot.tasks);
                }
            }
            HistoryCommand::Restore { index, yes } => {
                let outcome = if yes {
                    app.restore(index, &mut |_: &str| true)?
                } else {
                    app.restore(index, &mut StdinConfirmation)?
                };
                match outcome {
                    RestoreOutcome::Declined => {
                        println!("{}", palette.muted("Cancelled."));
                    }
                    RestoreOutcome::Restored { .. } if cli.json => {
                        print_json(tasks_json(app.tasks()));
                    }
                    RestoreOutcome::Restored {
                        tasks,
                        archived_discarded,
                    } => {
                        println!("{} {} task(s)", palette.accent("Restored:"), tasks);
                        if archived_discarded {
                            println!("{}", palette.muted("Previous tasks were archived."));
                        }
                    }
                }
            }
        },
        Command::Export { html } => {
            let rendered = if html {
                app.export_html()
            } else {
                app.export_plain()
            };
            if cli.json {
                print_json(serde_json::json!({
                    "format": if html { "html" } else { "text" },
                    "content": rendered,
                }));
            } else {
                println!("{rendered}");
            }
        }
        Command::Generate { prompt } => {
            let generator = GeminiGenerator::new(config.ai.clone())?;
            let added = app.generate_with(&prompt, &generator)?;
            if cli.json {
                print_json(tasks_json(&added));
            } else {
                println!(
                    "{} {} task(s)",
                    palette.accent("Generated:"),
                    added.len()
                );
                for task in &added {
                    println!("  {} ({})", task.text, task.id);
                }
            }
        }
    }

    Ok(())
}

fn run_interactive(app: &mut TodoApp<FileStore>, base: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();

    loop {
        input.clear();
        let bytes = stdin
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

        let args = match split_command_line(line) {
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
        argv.push("daybook".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_display_request(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, app, base) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_base_config() -> Config {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        warn!(error = %err, "using default configuration");
    }
    loaded.config
}

fn open_app() -> Result<TodoApp<FileStore>, AppError> {
    TodoApp::open(FileStore::open_default()?)
}

fn main() {
    init_tracing();

    let mut args = std::env::args_os();
    args.next();
    let interactive = args.next().is_none();

    let cli = if interactive {
        None
    } else {
        match Cli::try_parse() {
            Ok(cli) => Some(cli),
            Err(err) if is_display_request(&err) => {
                let _ = err.print();
                return;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                std::process::exit(1);
            }
        }
    };

    let base = load_base_config();
    let mut app = match open_app() {
        Ok(app) => app,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let result = match cli {
        Some(cli) => run_command(cli, &mut app, &base),
        None => run_interactive(&mut app, &base),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::split_command_line;

    #[test]
    fn split_command_line_handles_quotes() {
        let args = split_command_line("add \"Buy milk\" extra").unwrap();
        assert_eq!(args, ["add", "Buy milk", "extra"]);
    }

    #[test]
    fn split_command_line_keeps_empty_quoted_argument() {
        let args = split_command_line("edit 1 \"\"").unwrap();
        assert_eq!(args, ["edit", "1", ""]);
    }

    #[test]
    fn split_command_line_unescapes_newlines_and_quotes() {
        let args = split_command_line(r#"add "line one\nsay \"hi\"""#).unwrap();
        assert_eq!(args, ["add", "line one\nsay \"hi\""]);
    }

    #[test]
    fn split_command_line_rejects_unterminated_quote() {
        let err = split_command_line("add \"oops").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
