// src/assistant/store.rs
// SQLite persistence for conversations and their messages.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::types::{ChatContext, ChatMessage, Conversation, ConversationMessage, TokenUsage};

/// Title fallback when a conversation opens without a user message.
const DEFAULT_TITLE: &str = "新对话";
const TITLE_MAX_CHARS: usize = 50;

pub struct ConversationStore {
    db: SqlitePool,
}

impl ConversationStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Persist one completed chat turn as a new conversation: the inbound
    /// messages in order, then the assistant's answer. Everything commits in
    /// a single transaction; a failure leaves no partial conversation behind.
    pub async fn create_and_append(
        &self,
        user_id: &str,
        ctx: Option<&ChatContext>,
        messages: &[ChatMessage],
        answer: &str,
        usage: &TokenUsage,
    ) -> Result<String> {
        let conversation_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let title = derive_title(messages);

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO ai_conversations \
             (id, user_id, course_id, module_id, title, message_count, total_tokens, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&conversation_id)
        .bind(user_id)
        .bind(ctx.and_then(|c| c.course_id.as_deref()))
        .bind(ctx.and_then(|c| c.module_id.as_deref()))
        .bind(&title)
        .bind((messages.len() + 1) as i64)
        .bind(usage.total_tokens)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut order: i64 = 0;
        for msg in messages {
            sqlx::query(
                "INSERT INTO ai_messages \
                 (id, conversation_id, role, content, message_order, tokens, created_at) \
                 VALUES (?, ?, ?, ?, ?, NULL, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&conversation_id)
            .bind(msg.role.as_str())
            .bind(&msg.content)
            .bind(order)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            order += 1;
        }

        sqlx::query(
            "INSERT INTO ai_messages \
             (id, conversation_id, role, content, message_order, tokens, created_at) \
             VALUES (?, ?, 'ASSISTANT', ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&conversation_id)
        .bind(answer)
        .bind(order)
        .bind(usage.total_tokens)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!("saved conversation {} ({} messages)", conversation_id, order + 1);
        Ok(conversation_id)
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, course_id, module_id, title, message_count, total_tokens, \
             created_at, updated_at \
             FROM ai_conversations WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(conversations)
    }

    pub async fn get(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, user_id, course_id, module_id, title, message_count, total_tokens, \
             created_at, updated_at \
             FROM ai_conversations WHERE id = ?",
        )
        .bind(conversation_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(conversation)
    }

    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<ConversationMessage>> {
        let rows = sqlx::query(
            "SELECT id, conversation_id, role, content, message_order, tokens, created_at \
             FROM ai_messages WHERE conversation_id = ? ORDER BY message_order ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(ConversationMessage::from_row).collect()
    }

    /// Rename a conversation. Returns the updated row, or None when the
    /// conversation does not exist or belongs to someone else.
    pub async fn retitle(
        &self,
        conversation_id: &str,
        user_id: &str,
        title: &str,
    ) -> Result<Option<Conversation>> {
        let result = sqlx::query(
            "UPDATE ai_conversations SET title = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(title)
        .bind(Utc::now())
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(conversation_id).await
    }

    /// Delete one conversation and its messages. Returns false when it does
    /// not exist or belongs to someone else.
    pub async fn delete_one(&self, conversation_id: &str, user_id: &str) -> Result<bool> {
        let mut tx = self.db.begin().await?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ai_conversations WHERE id = ? AND user_id = ?",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if owned == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM ai_messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM ai_conversations WHERE id = ?")
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Delete every conversation a user owns. Returns how many were removed.
    pub async fn clear_all(&self, user_id: &str) -> Result<i64> {
        let mut tx = self.db.begin().await?;

        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ai_conversations WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM ai_messages WHERE conversation_id IN \
             (SELECT id FROM ai_conversations WHERE user_id = ?)",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM ai_conversations WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(count)
    }
}

/// First user message, truncated to 50 characters.
fn derive_title(messages: &[ChatMessage]) -> String {
    use super::types::MessageRole;

    let Some(first_user) = messages.iter().find(|m| m.role == MessageRole::User) else {
        return DEFAULT_TITLE.to_string();
    };

    let truncated: String = first_user.content.chars().take(TITLE_MAX_CHARS).collect();
    if first_user.content.chars().count() > TITLE_MAX_CHARS {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
