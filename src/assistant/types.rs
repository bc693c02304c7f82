// src/assistant/types.rs
// Wire types for the assistant API and persistence rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
            Self::System => "SYSTEM",
        }
    }

    /// Lowercase role string the completion provider expects.
    pub fn provider_role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Self::User),
            "ASSISTANT" => Some(Self::Assistant),
            "SYSTEM" => Some(Self::System),
            _ => None,
        }
    }
}

/// Where the student currently is in the platform. Every field is optional;
/// an absent or empty context simply produces a generic answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub module_id: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub assignment_id: Option<String>,
    /// Accepted for forward compatibility, currently unused.
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub video_timestamp: Option<f64>,
    #[serde(default)]
    pub page_number: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPreferences {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub detail_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub context: Option<ChatContext>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub preferences: Option<ChatPreferences>,
    /// Accepted but ignored; responses are always synchronous.
    #[serde(default)]
    pub stream: bool,
}

/// Token accounting reported by the completion provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// Pointer back into platform content the answer relates to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Next-step action proposed alongside the answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: String,
    pub answer: String,
    pub references: Vec<Reference>,
    pub suggestions: Vec<Suggestion>,
    pub usage: TokenUsage,
}

// === Persistence rows ===

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub title: String,
    pub message_count: i64,
    pub total_tokens: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content: String,
    pub message_order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    /// Manual row mapping; an unrecognized stored role is a data bug.
    pub fn from_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Self> {
        let role_str: String = row.try_get("role")?;
        let role = MessageRole::parse(&role_str)
            .ok_or_else(|| anyhow::anyhow!("unknown message role: {}", role_str))?;
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role,
            content: row.try_get("content")?,
            message_order: row.try_get("message_order")?,
            tokens: row.try_get("tokens")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConversationRequest {
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [MessageRole::User, MessageRole::Assistant, MessageRole::System] {
            assert_eq!(MessageRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(MessageRole::parse("robot"), None);
    }

    #[test]
    fn test_chat_request_deserializes_camel_case() {
        let json = r#"{
            "context": {"courseId": "c1", "videoTimestamp": 12.5},
            "messages": [{"role": "USER", "content": "你好"}]
        }"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.context.as_ref().unwrap().course_id.as_deref(), Some("c1"));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, MessageRole::User);
        assert!(!req.stream);
    }

    #[test]
    fn test_reference_serializes_type_field() {
        let r = Reference {
            kind: "module".to_string(),
            id: "m1".to_string(),
            title: "第1章: 绪论".to_string(),
            snippet: None,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["type"], "module");
        assert!(json.get("snippet").is_none());
    }
}
