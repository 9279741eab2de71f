use clap::{Parser, Subcommand};
use daybook_core::config::{ConfigOverride, Theme, canonicalize_name};

#[derive(Parser, Debug)]
#[command(name = "daybook", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: daybook add "Buy milk"
    Add { text: Option<String> },
    /// Mark a task as done, or undo it
    ///
    /// Example: daybook toggle 1734567890123
    Toggle { id: i64 },
    /// Replace a task's text
    ///
    /// Example: daybook edit 1734567890123 "Buy oat milk"
    Edit { id: i64, text: String },
    /// Delete a task
    ///
    /// Example: daybook delete 1734567890123
    Delete { id: i64 },
    /// List the active tasks
    ///
    /// Example: daybook list
    List,
    /// Archive every task into history and start a new day
    ///
    /// Example: daybook clear --yes
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Inspect or restore archived lists
    ///
    /// Example: daybook history list
    History {
        #[command(subcommand)]
        history: HistoryCommand,
    },
    /// Print the active tasks as numbered text or HTML
    ///
    /// Example: daybook export --html
    Export {
        #[arg(long)]
        html: bool,
    },
    /// Generate tasks from a prompt with the configured AI model
    ///
    /// Example: daybook generate "get ready for a marathon"
    Generate { prompt: String },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List archived lists, newest first
    ///
    /// Example: daybook history list
    List,
    /// Show the tasks of one archived list
    ///
    /// Example: daybook history show 0
    Show { index: usize },
    /// Replace the active tasks with an archived list
    ///
    /// Example: daybook history restore 0 --yes
    Restore {
        index: usize,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Parse a raw `KEY=VALUE` override string into a typed override.
pub fn parse_config_override(raw: &str) -> Result<ConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field, Some(rest)))
        .unwrap_or((key_raw, None));

    let field = canonicalize_name(field);
    if field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    match (field.as_str(), remainder) {
        ("theme", None) => Ok(ConfigOverride::Theme(Theme::from_name(value))),
        ("archive_on_restore", None) => parse_bool(value).map(ConfigOverride::ArchiveOnRestore),
        ("theme" | "archive_on_restore", Some(_)) => {
            Err(format!("{field} override cannot have subfields"))
        }
        ("ai", Some(sub)) => parse_ai_override(&canonicalize_name(sub), value),
        ("ai", None) => Err("ai override requires a field name".to_string()),
        (other, _) => Err(format!("unknown config field '{other}'")),
    }
}

fn parse_ai_override(field: &str, value: &str) -> Result<ConfigOverride, String> {
    match field {
        "model" => non_empty(field, value).map(ConfigOverride::AiModel),
        "endpoint" => non_empty(field, value).map(ConfigOverride::AiEndpoint),
        "api_key_env" => non_empty(field, value).map(ConfigOverride::AiApiKeyEnv),
        "temperature" => parse_number(field, value).map(ConfigOverride::AiTemperature),
        "max_output_tokens" => parse_number(field, value).map(ConfigOverride::AiMaxOutputTokens),
        "top_p" => parse_number(field, value).map(ConfigOverride::AiTopP),
        "top_k" => parse_number(field, value).map(ConfigOverride::AiTopK),
        "" => Err("ai override requires a field name".to_string()),
        other => Err(format!("unknown config field 'ai.{other}'")),
    }
}

fn non_empty(field: &str, value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("ai.{field} cannot be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("ai.{field} must be a number, got '{value}'"))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("expected a boolean, got '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, HistoryCommand, parse_config_override};
    use clap::Parser;
    use daybook_core::config::{ConfigOverride, Theme};

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Dark Mode ").unwrap();
        assert_eq!(parsed, ConfigOverride::Theme(Theme::Noir));
    }

    #[test]
    fn parse_config_override_reads_ai_fields() {
        assert_eq!(
            parse_config_override("ai.model=gemini-2.0-flash").unwrap(),
            ConfigOverride::AiModel("gemini-2.0-flash".into())
        );
        assert_eq!(
            parse_config_override("AI.Top-K = 20").unwrap(),
            ConfigOverride::AiTopK(20)
        );
        assert_eq!(
            parse_config_override("ai.temperature=0.25").unwrap(),
            ConfigOverride::AiTemperature(0.25)
        );
    }

    #[test]
    fn parse_config_override_reads_booleans() {
        assert_eq!(
            parse_config_override("archive-on-restore=yes").unwrap(),
            ConfigOverride::ArchiveOnRestore(true)
        );
        let err = parse_config_override("archive_on_restore=maybe").unwrap_err();
        assert!(err.contains("expected a boolean"));
    }

    #[test]
    fn parse_config_override_rejects_bad_numbers() {
        let err = parse_config_override("ai.max_output_tokens=lots").unwrap_err();
        assert!(err.contains("must be a number"));
    }

    #[test]
    fn parse_config_override_rejects_unknown_fields() {
        assert!(
            parse_config_override("unknown.field=value")
                .unwrap_err()
                .contains("unknown config field")
        );
        assert!(
            parse_config_override("ai.colour=red")
                .unwrap_err()
                .contains("unknown config field 'ai.colour'")
        );
    }

    #[test]
    fn parse_config_override_rejects_missing_equals() {
        let err = parse_config_override("themenoir").unwrap_err();
        assert!(err.contains("KEY=VALUE"));
    }

    #[test]
    fn parse_config_override_rejects_theme_subfields() {
        let err = parse_config_override("theme.accent=red").unwrap_err();
        assert!(err.contains("cannot have subfields"));
    }

    #[test]
    fn cli_parses_history_restore() {
        let cli = Cli::try_parse_from(["daybook", "history", "restore", "2", "--yes", "--json"])
            .unwrap();

        assert!(cli.json);
        match cli.command {
            Command::History {
                history: HistoryCommand::Restore { index, yes },
            } => {
                assert_eq!(index, 2);
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["daybook", "toggle", "abc"]).is_err());
    }
}
