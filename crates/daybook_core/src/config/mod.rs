use crate::error::AppError;
use crate::storage::default_app_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "DAYBOOK_CONFIG_PATH";
const ANSI_RESET: &str = "\x1b[0m";

pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// ANSI colors for one theme. Empty codes leave text untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    accent: &'static str,
    muted: &'static str,
}

impl Palette {
    pub fn accent(&self, text: &str) -> String {
        paint(self.accent, text)
    }

    pub fn muted(&self, text: &str) -> String {
        paint(self.muted, text)
    }
}

fn paint(code: &str, text: &str) -> String {
    if code.is_empty() {
        text.to_string()
    } else {
        format!("{code}{text}{ANSI_RESET}")
    }
}

/// Output theme. Unknown names fall back to [`Theme::Plain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    Plain,
    Noir,
    Solarized,
}

impl Theme {
    pub fn from_name(raw: &str) -> Self {
        match canonicalize_name(raw).as_str() {
            "noir" | "dark" | "dark_mode" | "darkmode" => Theme::Noir,
            "solarized" => Theme::Solarized,
            _ => Theme::Plain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Plain => "plain",
            Theme::Noir => "noir",
            Theme::Solarized => "solarized",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Plain => Palette {
                accent: "",
                muted: "",
            },
            Theme::Noir => Palette {
                accent: "\x1b[38;5;208m",
                muted: "\x1b[38;5;245m",
            },
            Theme::Solarized => Palette {
                accent: "\x1b[38;5;37m",
                muted: "\x1b[38;5;101m",
            },
        }
    }
}

impl From<String> for Theme {
    fn from(raw: String) -> Self {
        Theme::from_name(&raw)
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.name().to_string()
    }
}

/// Lowercases `raw` and collapses every run of non-alphanumerics into a
/// single underscore, trimming underscores at both ends.
pub fn canonicalize_name(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub system_instruction: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_AI_MODEL.to_string(),
            endpoint: DEFAULT_AI_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: 0.5,
            max_output_tokens: 150,
            top_p: 0.9,
            top_k: 50,
            system_instruction: None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Theme,
    /// Archive the active list before a restore replaces it.
    #[serde(default)]
    pub archive_on_restore: bool,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOverride {
    Theme(Theme),
    ArchiveOnRestore(bool),
    AiModel(String),
    AiEndpoint(String),
    AiApiKeyEnv(String),
    AiTemperature(f32),
    AiMaxOutputTokens(u32),
    AiTopP(f32),
    AiTopK(u32),
}

pub fn config_path() -> Result<PathBuf, AppError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(default_app_dir()?.join(CONFIG_FILE_NAME)),
    }
}

pub fn load_config() -> Result<Config, AppError> {
    let path = config_path()?;
    load_config_from_path(&path)
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &[ConfigOverride]) -> Config {
    let mut merged = base.clone();
    for item in overrides {
        match item {
            ConfigOverride::Theme(theme) => merged.theme = *theme,
            ConfigOverride::ArchiveOnRestore(value) => merged.archive_on_restore = *value,
            ConfigOverride::AiModel(model) => merged.ai.model = model.clone(),
            ConfigOverride::AiEndpoint(endpoint) => merged.ai.endpoint = endpoint.clone(),
            ConfigOverride::AiApiKeyEnv(name) => merged.ai.api_key_env = name.clone(),
            ConfigOverride::AiTemperature(value) => merged.ai.temperature = *value,
            ConfigOverride::AiMaxOutputTokens(value) => merged.ai.max_output_tokens = *value,
            ConfigOverride::AiTopP(value) => merged.ai.top_p = *value,
            ConfigOverride::AiTopK(value) => merged.ai.top_k = *value,
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        AiConfig, Config, ConfigOverride, Theme, canonicalize_name, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides,
    };
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("daybook-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.unwrap().code(), "invalid_data");
    }

    #[test]
    fn load_config_reads_partial_ai_section() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "theme": "Dark Mode",
            "archive_on_restore": true,
            "ai": { "model": "gemini-2.0-flash", "max_output_tokens": 300 }
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme, Theme::Noir);
        assert!(loaded.archive_on_restore);
        assert_eq!(loaded.ai.model, "gemini-2.0-flash");
        assert_eq!(loaded.ai.max_output_tokens, 300);
        assert_eq!(loaded.ai.top_k, AiConfig::default().top_k);
        assert_eq!(loaded.ai.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn ai_defaults_match_generation_parameters() {
        let ai = AiConfig::default();
        assert_eq!(ai.model, "gemini-1.5-flash");
        assert_eq!(ai.temperature, 0.5);
        assert_eq!(ai.max_output_tokens, 150);
        assert_eq!(ai.top_p, 0.9);
        assert_eq!(ai.top_k, 50);
    }

    #[test]
    fn merge_overrides_applies_in_order_and_preserves_base() {
        let base = Config::default();
        let overrides = vec![
            ConfigOverride::Theme(Theme::Solarized),
            ConfigOverride::AiTemperature(0.2),
            ConfigOverride::AiTopK(10),
            ConfigOverride::AiTopK(20),
            ConfigOverride::ArchiveOnRestore(true),
        ];

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(base.theme, Theme::Plain);
        assert!(!base.archive_on_restore);
        assert_eq!(merged.theme, Theme::Solarized);
        assert_eq!(merged.ai.temperature, 0.2);
        assert_eq!(merged.ai.top_k, 20);
        assert!(merged.archive_on_restore);
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            theme: Theme::Noir,
            archive_on_restore: true,
            ..Config::default()
        };

        assert_eq!(merge_overrides(&base, &[]), base);
    }

    #[test]
    fn theme_names_map_to_variants() {
        assert_eq!(Theme::from_name("Dark-Mode"), Theme::Noir);
        assert_eq!(Theme::from_name(" SOLARIZED "), Theme::Solarized);
        assert_eq!(Theme::from_name("vanilla"), Theme::Plain);
        assert_eq!(Theme::from_name("oceanic"), Theme::Plain);
    }

    #[test]
    fn theme_serializes_as_its_name() {
        let config = Config {
            theme: Theme::Noir,
            ..Config::default()
        };
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["theme"], "noir");
    }

    #[test]
    fn canonicalize_name_collapses_separators() {
        assert_eq!(canonicalize_name(" AI..Top-K "), "ai_top_k");
        assert_eq!(canonicalize_name("--"), "");
    }

    #[test]
    fn palette_colors_only_when_themed() {
        assert_eq!(Theme::Plain.palette().accent("x"), "x");
        assert_eq!(Theme::Noir.palette().accent("x"), "\x1b[38;5;208mx\x1b[0m");
        assert_eq!(Theme::Noir.palette().muted("x"), "\x1b[38;5;245mx\x1b[0m");
    }
}
