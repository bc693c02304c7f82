// src/assistant/service.rs
// Orchestrates one chat turn: extract context, build the prompt, call the
// provider, derive advice, persist, respond.

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DeepSeekConfig;
use crate::domain::User;

use super::advice;
use super::deepseek::DeepSeekClient;
use super::extractor::ContextExtractor;
use super::prompt;
use super::store::ConversationStore;
use super::types::{ChatRequest, ChatResponse, TokenUsage};

pub struct AssistantService {
    pub extractor: ContextExtractor,
    pub client: DeepSeekClient,
    pub store: ConversationStore,
}

impl AssistantService {
    pub fn new(db: SqlitePool, config: &DeepSeekConfig) -> Result<Self> {
        Ok(Self {
            extractor: ContextExtractor::new(db.clone()),
            client: DeepSeekClient::new(config)?,
            store: ConversationStore::new(db),
        })
    }

    pub async fn chat(&self, user: &User, request: &ChatRequest) -> Result<ChatResponse> {
        let context = self.extractor.extract(user, request.context.as_ref()).await?;

        let provider_messages = prompt::build_messages(&request.messages, &context);
        let mut usage = TokenUsage::default();
        let answer = self.client.chat(&provider_messages, &mut usage).await;

        let references = advice::build_references(request.context.as_ref(), &context);
        let suggestions = advice::build_suggestions(&context);

        let conversation_id = self
            .store
            .create_and_append(
                &user.id,
                request.context.as_ref(),
                &request.messages,
                &answer,
                &usage,
            )
            .await?;

        info!(
            "chat turn for {}: conversation {}, {} tokens",
            user.id, conversation_id, usage.total_tokens
        );

        Ok(ChatResponse {
            conversation_id,
            answer,
            references,
            suggestions,
            usage,
        })
    }
}
