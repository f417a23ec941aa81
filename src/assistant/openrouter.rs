//! OpenRouter chat-completions client.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assistant::texts::SYSTEM_PROMPT;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Attribution headers OpenRouter shows on its dashboards.
const REFERER: &str = "https://github.com/frncisc0";
const TITLE: &str = "Bot de ADS";

pub struct AiClient {
    api_key: String,
    api_url: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl AiClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            api_key,
            api_url,
            model,
            http: reqwest::Client::new(),
        }
    }

    /// Ask one question under the fixed system prompt and return the answer text.
    pub async fn ask(&self, question: &str) -> Result<String, AiError> {
        info!("🤖 Asking {} ({} chars)", self.model, question.chars().count());
        debug!("Question: \"{}\"", question.chars().take(50).collect::<String>());

        let request = ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage { role: "system", content: SYSTEM_PROMPT },
                ApiMessage { role: "user", content: question },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::Http(format!("failed to read response: {e}")))?;

        debug!("Completion response status: {status}");

        if !status.is_success() {
            return Err(AiError::Api(format!("{status}: {body}")));
        }

        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| AiError::Parse(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(AiError::Api(error.message));
        }

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AiError::Empty)?;

        info!("🤖 Answer received ({} chars)", answer.chars().count());
        Ok(answer)
    }
}

#[derive(Debug)]
pub enum AiError {
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::Http(e) => write!(f, "HTTP error: {e}"),
            AiError::Api(e) => write!(f, "API error: {e}"),
            AiError::Parse(e) => write!(f, "Parse error: {e}"),
            AiError::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for AiError {}
