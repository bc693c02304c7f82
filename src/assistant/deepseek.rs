// src/assistant/deepseek.rs
// DeepSeek chat-completion client. Provider failures never surface to the
// caller; every failure mode degrades to a canned Chinese fallback answer.

use std::time::Duration;

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::DeepSeekConfig;

use super::prompt::ProviderMessage;
use super::types::TokenUsage;

/// Returned when the provider answered but without usable content.
pub const FALLBACK_EMPTY: &str = "抱歉，我暂时无法回答您的问题。请稍后再试。";
/// Returned when the response body could not be parsed.
pub const FALLBACK_PARSE: &str = "抱歉，处理响应时出现错误。请稍后再试。";
/// Returned on transport errors and non-2xx statuses.
pub const FALLBACK_UNAVAILABLE: &str = "抱歉，AI服务暂时不可用。请稍后再试。";

pub struct DeepSeekClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl DeepSeekClient {
    pub fn new(config: &DeepSeekConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Request a completion. On success returns the assistant's answer and
    /// records token usage; on any failure returns a fallback answer and
    /// leaves `usage` untouched.
    pub async fn chat(&self, messages: &[ProviderMessage], usage: &mut TokenUsage) -> String {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": false,
        });

        let response = match self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("DeepSeek request failed: {}", e);
                return FALLBACK_UNAVAILABLE.to_string();
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("DeepSeek returned {}: {}", status, detail);
            return FALLBACK_UNAVAILABLE.to_string();
        }

        let parsed: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("DeepSeek response parse failed: {}", e);
                return FALLBACK_PARSE.to_string();
            }
        };

        if let Some(u) = parsed.get("usage") {
            usage.prompt_tokens = u.get("prompt_tokens").and_then(Value::as_i64).unwrap_or(0);
            usage.completion_tokens = u
                .get("completion_tokens")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            usage.total_tokens = u.get("total_tokens").and_then(Value::as_i64).unwrap_or(0);
        }

        match parsed
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
        {
            Some(choice) => {
                let content = choice
                    .pointer("/message/content")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                debug!("DeepSeek completion: {} tokens total", usage.total_tokens);
                content.to_string()
            }
            None => {
                warn!("DeepSeek response had no choices");
                FALLBACK_EMPTY.to_string()
            }
        }
    }
}
