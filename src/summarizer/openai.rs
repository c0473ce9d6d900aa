use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::json;

use super::retry::{Backoff, is_retryable, retry_after};
use super::{Summarizer, SummaryFuture};
use crate::settings::SummarizerSettings;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";
const KEY_ENV: &str = "OPENAI_API_KEY";

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    key: String,
    model: String,
    base_url: String,
    max_words: usize,
}

impl OpenAiSummarizer {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url(),
            max_words: 60,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        if max_words > 0 {
            self.max_words = max_words;
        }
        self
    }

    pub fn from_settings(settings: &SummarizerSettings) -> Result<Self> {
        let key = settings
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("no API key found (checked settings and {})", KEY_ENV))?;
        Ok(Self::new(key)
            .with_model(settings.model.clone())
            .with_max_words(settings.max_words))
    }

    fn system_prompt(&self) -> String {
        format!(
            "You summarize restaurant menus for blind and low-vision readers. \
             Describe what kind of menu this is and its main sections in at most {} words. \
             Reply with the summary only.",
            self.max_words
        )
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, text: String) -> SummaryFuture {
        let summarizer = self.clone();
        Box::pin(async move { call_chat_completions(summarizer, text).await })
    }
}

fn base_url() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

async fn call_chat_completions(summarizer: OpenAiSummarizer, text: String) -> Result<String> {
    let client = reqwest::Client::new();
    let url = format!("{}/chat/completions", summarizer.base_url.trim_end_matches('/'));
    let body = json!({
        "model": summarizer.model,
        "messages": [
            {"role": "system", "content": summarizer.system_prompt()},
            {"role": "user", "content": text}
        ],
        "temperature": 0.2
    });

    let mut backoff = Backoff::new();
    loop {
        backoff.start_attempt();
        let response = client
            .post(&url)
            .bearer_auth(&summarizer.key)
            .json(&body)
            .send()
            .await
            .with_context(|| "failed to reach summarizer endpoint")?;

        let status = response.status();
        let hint = retry_after(response.headers());
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            return extract_summary(&text);
        }
        if is_retryable(status, &text) && backoff.can_retry() {
            backoff.wait(hint).await;
            continue;
        }
        return Err(anyhow!(
            "summarizer API error ({}): {}",
            status,
            extract_error(&text).unwrap_or(text)
        ));
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

fn extract_summary(body: &str) -> Result<String> {
    let payload: ChatResponse =
        serde_json::from_str(body).with_context(|| "failed to parse summarizer response JSON")?;
    let summary = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if summary.is_empty() {
        return Err(anyhow!("summarizer returned an empty summary"));
    }
    Ok(summary)
}

fn extract_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ApiError>,
    }

    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
        code: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    match (error.message, error.code) {
        (Some(message), Some(code)) => Some(format!("{} | code: {}", message, code)),
        (Some(message), None) => Some(message),
        (None, Some(code)) => Some(format!("code: {}", code)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_taken_from_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "  An Italian dinner menu.\n"}}
            ]
        }"#;
        assert_eq!(extract_summary(body).expect("summary"), "An Italian dinner menu.");
    }

    #[test]
    fn empty_content_is_an_error() {
        let body = r#"{"choices": [{"message": {"content": null}}]}"#;
        assert!(extract_summary(body).is_err());
        assert!(extract_summary(r#"{"choices": []}"#).is_err());
    }

    #[test]
    fn api_error_message_is_extracted() {
        let body = r#"{"error": {"message": "Incorrect API key", "code": "invalid_api_key"}}"#;
        assert_eq!(
            extract_error(body).as_deref(),
            Some("Incorrect API key | code: invalid_api_key")
        );
        assert_eq!(extract_error("not json"), None);
    }

    #[test]
    fn settings_key_takes_precedence() {
        let settings = SummarizerSettings {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o".to_string(),
            max_words: 25,
            ..SummarizerSettings::default()
        };
        let summarizer = OpenAiSummarizer::from_settings(&settings).expect("summarizer");
        assert_eq!(summarizer.key, "sk-test");
        assert_eq!(summarizer.model, "gpt-4o");
        assert!(summarizer.system_prompt().contains("at most 25 words"));
    }
}
