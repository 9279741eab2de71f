use crate::ai::{TODO_LIST_INSTRUCTION, TaskGenerator, parse_generated_tasks};
use crate::config::AiConfig;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Calls the Gemini `generateContent` endpoint.
///
/// The API key is read from the environment variable named by
/// [`AiConfig::api_key_env`] on every call unless one was set explicitly.
pub struct GeminiGenerator {
    config: AiConfig,
    api_key: Option<String>,
    http_client: reqwest::blocking::Client,
}

impl GeminiGenerator {
    pub fn new(config: AiConfig) -> Result<Self, AppError> {
        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| AppError::collaborator(err.to_string()))?;

        Ok(Self::with_http_client(config, http_client))
    }

    fn with_http_client(config: AiConfig, http_client: reqwest::blocking::Client) -> Self {
        Self {
            config,
            api_key: None,
            http_client,
        }
    }

    pub fn with_api_key<K: Into<String>>(mut self, api_key: K) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn resolve_api_key(&self) -> Result<String, AppError> {
        if let Some(key) = self.api_key.as_ref()
            && !key.trim().is_empty()
        {
            return Ok(key.clone());
        }

        match std::env::var(&self.config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AppError::collaborator(format!(
                "missing API key: set {}",
                self.config.api_key_env
            ))),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        let instruction = self
            .config
            .system_instruction
            .as_deref()
            .unwrap_or(TODO_LIST_INSTRUCTION);

        GenerateRequest {
            system_instruction: Content {
                role: "system",
                parts: vec![Part { text: instruction }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
            },
        }
    }
}

impl TaskGenerator for GeminiGenerator {
    fn generate(&self, prompt: &str) -> Result<Vec<String>, AppError> {
        let api_key = self.resolve_api_key()?;
        let endpoint = self.endpoint();
        debug!(model = %self.config.model, "requesting task generation");

        let response = self
            .http_client
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|err| AppError::collaborator(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(AppError::collaborator(format!(
                "generation failed with status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .map_err(|err| AppError::collaborator(err.to_string()))?;
        let reply = reply_text(&payload);
        let tasks = parse_generated_tasks(&reply);
        if tasks.is_empty() {
            return Err(AppError::collaborator("model returned no tasks"));
        }

        Ok(tasks)
    }
}

fn reply_text(payload: &GenerateResponse) -> String {
    payload
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}
