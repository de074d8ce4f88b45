//! API-based suggestion generator for OpenAI-compatible and Anthropic
//! endpoints.

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use resume_types::{LlmSettings, Section, Suggestion};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{SuggesterError, SuggestionGenerator, SuggestionRequest};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Wire protocol of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Parse a provider name. Unknown names use the OpenAI protocol.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Provider::Anthropic,
            _ => Provider::OpenAi,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_BASE_URL,
            Provider::Anthropic => ANTHROPIC_BASE_URL,
        }
    }
}

/// Configuration for the API generator.
#[derive(Debug, Clone)]
pub struct ApiSuggesterConfig {
    pub provider: Provider,

    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    pub model: String,

    pub api_key: SecretString,

    /// Per-request timeout
    pub timeout: Duration,

    /// Maximum attempts per call
    pub max_retries: u32,
}

impl ApiSuggesterConfig {
    /// Config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: Provider::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    /// Config for the Anthropic API.
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: Provider::Anthropic,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }

    /// Config from loaded settings. The API key is required.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, SuggesterError> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SuggesterError::ConfigError("missing API key".to_string()))?;
        let provider = Provider::parse(&settings.provider);
        let base_url = settings
            .api_base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());

        Ok(Self {
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: SecretString::from(api_key.to_string()),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            max_retries: settings.max_retries.max(1),
        })
    }
}

/// Generator backed by a hosted model.
pub struct ApiSuggester {
    client: Client,
    config: ApiSuggesterConfig,
}

impl ApiSuggester {
    pub fn new(config: ApiSuggesterConfig) -> Result<Self, SuggesterError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SuggesterError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn build_prompt(request: &SuggestionRequest) -> String {
        let missing = if request.missing_skills.is_empty() {
            "(none detected)".to_string()
        } else {
            request.missing_skills.join(", ")
        };
        let critical = request.critical_gaps.join(", ");
        let present = request.present_skills.join(", ");

        format!(
            r#"You are an ATS expert. Produce concise, actionable personal suggestions focused ONLY on hard technical skills,
tools, frameworks, and specific deliverables that strengthen the resume for this job. Ignore soft skills like
communication, leadership, cross time zone collaboration, culture fit.

Job Title: {title}

Missing/underrepresented hard skills:
{missing}

Most critical gaps:
{critical}

Skills the resume already shows:
{present}

Resume (excerpt):
{resume}

Job description (excerpt):
{job}

Provide your response in JSON format:
{{
  "suggestions": [
    {{"kind": "add_bullet", "section": "Experience", "suggestedText": "...", "rationale": "..."}},
    {{"kind": "rewrite_bullet", "section": "Experience", "originalText": "...", "suggestedText": "...", "rationale": "..."}},
    {{"kind": "project_idea", "suggestedText": "...", "rationale": "..."}}
  ]
}}

Guidelines:
- Return 4-6 suggestions
- section is one of Summary, Experience, Projects, Skills, Training
- Never invent numbers or experience the resume does not show"#,
            title = request.job_title,
            resume = request.resume_excerpt,
            job = request.job_excerpt,
        )
    }

    /// Call the API with retry logic.
    async fn call_api(&self, prompt: &str) -> Result<String, SuggesterError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling suggestion API");

            match self.make_request(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "API call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    async fn make_request(&self, prompt: &str) -> Result<String, SuggesterError> {
        match self.config.provider {
            Provider::OpenAi => self.make_openai_request(prompt).await,
            Provider::Anthropic => self.make_anthropic_request(prompt).await,
        }
    }

    async fn make_openai_request(&self, prompt: &str) -> Result<String, SuggesterError> {
        #[derive(Serialize)]
        struct OpenAIRequest {
            model: String,
            messages: Vec<OpenAIMessage>,
            response_format: OpenAIResponseFormat,
        }

        #[derive(Serialize)]
        struct OpenAIMessage {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct OpenAIResponseFormat {
            #[serde(rename = "type")]
            format_type: String,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: OpenAIMessageResponse,
        }

        #[derive(Deserialize)]
        struct OpenAIMessageResponse {
            content: String,
        }

        let request = OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            response_format: OpenAIResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let response = check_status(response).await?;
        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| SuggesterError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| SuggesterError::ParseError("No choices in response".to_string()))
    }

    async fn make_anthropic_request(&self, prompt: &str) -> Result<String, SuggesterError> {
        #[derive(Serialize)]
        struct AnthropicRequest {
            model: String,
            max_tokens: u32,
            messages: Vec<AnthropicMessage>,
        }

        #[derive(Serialize)]
        struct AnthropicMessage {
            role: String,
            content: String,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            text: String,
        }

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: 1024,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let url = format!("{}/messages", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let response = check_status(response).await?;
        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| SuggesterError::ParseError(e.to_string()))?;

        body.content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| SuggesterError::ParseError("No content in response".to_string()))
    }
}

fn map_send_error(e: reqwest::Error) -> SuggesterError {
    if e.is_timeout() {
        SuggesterError::Timeout
    } else {
        SuggesterError::ApiError(e.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SuggesterError> {
    if response.status() == 429 {
        return Err(SuggesterError::RateLimitExceeded);
    }
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SuggesterError::ApiError(format!("HTTP {}: {}", status, body)));
    }
    Ok(response)
}

/// A suggestion as a model writes it: every field optional, common
/// synonyms accepted.
#[derive(Debug, Deserialize)]
struct RawSuggestion {
    #[serde(default, alias = "type")]
    kind: Option<String>,
    #[serde(default)]
    section: Option<String>,
    #[serde(default, alias = "suggestedText", alias = "text", alias = "suggestion")]
    suggested_text: Option<String>,
    #[serde(default, alias = "originalText")]
    original_text: Option<String>,
    #[serde(default, alias = "reason", alias = "why")]
    rationale: Option<String>,
}

impl RawSuggestion {
    /// Typed suggestion, or `None` when the item is unusable.
    fn into_suggestion(self) -> Option<Suggestion> {
        let text = self.suggested_text?.trim().to_string();
        if text.is_empty() {
            return None;
        }
        let rationale = self.rationale.unwrap_or_default();
        let section = self
            .section
            .as_deref()
            .and_then(Section::parse)
            .unwrap_or(Section::Experience);
        let kind = self.kind.unwrap_or_default().trim().to_lowercase();
        let original = self.original_text.filter(|o| !o.trim().is_empty());

        match (kind.as_str(), original) {
            ("project_idea" | "project", _) => Some(Suggestion::project(text, rationale)),
            ("rewrite_bullet" | "rewrite", Some(original)) => {
                Some(Suggestion::rewrite(section, original, text, rationale))
            }
            ("rewrite_bullet" | "rewrite", None) => None,
            _ => Some(Suggestion::add_bullet(section, text, rationale)),
        }
    }
}

/// Extract the JSON payload from text (handles markdown code blocks).
fn extract_json(text: &str) -> String {
    if let Some(start) = text.find("```json") {
        if let Some(end) = text[start + 7..].find("```") {
            return text[start + 7..start + 7 + end].trim().to_string();
        }
    }

    if let Some(start) = text.find("```") {
        if let Some(end) = text[start + 3..].find("```") {
            return text[start + 3..start + 3 + end].trim().to_string();
        }
    }

    let open = text.find(['{', '[']);
    let close = text.rfind(['}', ']']);
    if let (Some(start), Some(end)) = (open, close) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    text.to_string()
}

/// Parse a model response into suggestions.
///
/// Accepts a bare array or an object with a `suggestions` array. Items that
/// do not form a valid suggestion are dropped.
fn parse_suggestions(response: &str) -> Result<Vec<Suggestion>, SuggesterError> {
    let json = extract_json(response);
    let value: serde_json::Value = serde_json::from_str(&json)
        .map_err(|e| SuggesterError::ParseError(format!("Failed to parse suggestions JSON: {}", e)))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("suggestions") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(SuggesterError::ParseError(
                    "Expected a \"suggestions\" array".to_string(),
                ))
            }
        },
        _ => return Err(SuggesterError::ParseError("Expected a JSON array or object".to_string())),
    };

    let total = items.len();
    let suggestions: Vec<Suggestion> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawSuggestion>(item).ok())
        .filter_map(RawSuggestion::into_suggestion)
        .collect();
    if suggestions.len() < total {
        debug!(dropped = total - suggestions.len(), "Dropped malformed suggestions");
    }
    Ok(suggestions)
}

#[async_trait]
impl SuggestionGenerator for ApiSuggester {
    async fn generate(&self, request: &SuggestionRequest) -> Result<Vec<Suggestion>, SuggesterError> {
        let prompt = Self::build_prompt(request);
        let response = self.call_api(&prompt).await?;
        parse_suggestions(&response)
    }

    fn model_name(&self) -> String {
        self.config.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAYLOAD: &str = r#"{"suggestions": [
        {"kind": "add_bullet", "section": "Experience", "suggestedText": "Containerized the Flask API with Docker.", "rationale": "Job asks for Docker"},
        {"kind": "project_idea", "suggestedText": "Deploy a demo to Kubernetes.", "rationale": "Shows orchestration"},
        {"kind": "rewrite_bullet", "section": "Experience", "suggestedText": "No original text"},
        {"section": "Skills"}
    ]}"#;

    fn request() -> SuggestionRequest {
        SuggestionRequest {
            job_title: "Backend Engineer".to_string(),
            missing_skills: vec!["docker".to_string()],
            ..Default::default()
        }
    }

    fn config_for(server: &MockServer, provider: Provider) -> ApiSuggesterConfig {
        let mut config = match provider {
            Provider::OpenAi => ApiSuggesterConfig::openai("test-key", "gpt-4.1-mini"),
            Provider::Anthropic => ApiSuggesterConfig::anthropic("test-key", "claude-3-haiku-20240307"),
        };
        config.base_url = server.uri();
        config.max_retries = 1;
        config
    }

    #[test]
    fn test_extract_json_code_block() {
        let text = "Here you go:\n```json\n{\"suggestions\": []}\n```";
        assert_eq!(extract_json(text), "{\"suggestions\": []}");
    }

    #[test]
    fn test_extract_json_bare_array() {
        let text = "Sure! [{\"suggestedText\": \"x\"}] hope this helps";
        assert_eq!(extract_json(text), "[{\"suggestedText\": \"x\"}]");
    }

    #[test]
    fn test_parse_drops_malformed_items() {
        let suggestions = parse_suggestions(PAYLOAD).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].section(), Section::Experience);
        assert!(matches!(suggestions[1], Suggestion::ProjectIdea { .. }));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_suggestions("I cannot help with that."),
            Err(SuggesterError::ParseError(_))
        ));
    }

    #[test]
    fn test_prompt_mentions_signals() {
        let prompt = ApiSuggester::build_prompt(&request());
        assert!(prompt.contains("Job Title: Backend Engineer"));
        assert!(prompt.contains("docker"));
        assert!(prompt.contains("hard technical skills"));
    }

    #[test]
    fn test_config_from_settings() {
        let settings = LlmSettings {
            enabled: true,
            provider: "anthropic".to_string(),
            api_key: Some("k".to_string()),
            api_base_url: Some("http://localhost:9999/v1/".to_string()),
            ..Default::default()
        };
        let config = ApiSuggesterConfig::from_settings(&settings).unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.model, "gpt-4.1-mini");
    }

    #[tokio::test]
    async fn test_openai_request() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"content": PAYLOAD}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let suggester = ApiSuggester::new(config_for(&server, Provider::OpenAi)).unwrap();
        let suggestions = suggester.generate(&request()).await.unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggester.model_name(), "gpt-4.1-mini");
    }

    #[tokio::test]
    async fn test_anthropic_request() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "content": [{"type": "text", "text": PAYLOAD}]
        });
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let suggester = ApiSuggester::new(config_for(&server, Provider::Anthropic)).unwrap();
        let suggestions = suggester.generate(&request()).await.unwrap();
        assert_eq!(suggestions.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let suggester = ApiSuggester::new(config_for(&server, Provider::OpenAi)).unwrap();
        let result = suggester.generate(&request()).await;
        assert!(matches!(result, Err(SuggesterError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let suggester = ApiSuggester::new(config_for(&server, Provider::OpenAi)).unwrap();
        match suggester.generate(&request()).await {
            Err(SuggesterError::ApiError(msg)) => assert!(msg.contains("500")),
            other => panic!("expected ApiError, got {:?}", other.map(|s| s.len())),
        }
    }
}
