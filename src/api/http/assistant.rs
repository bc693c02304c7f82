// src/api/http/assistant.rs
// HTTP handlers for the AI learning assistant.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::auth::AuthUser;
use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::assistant::types::{
    ChatContext, ChatMessage, ChatRequest, ChatResponse, Conversation, ConversationMessage,
    MessageRole, UpdateConversationRequest,
};
use crate::state::AppState;

const TITLE_MAX_LEN: usize = 256;

// === Chat ===

pub async fn chat(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("messages must not be empty"));
    }

    let response = state
        .assistant
        .chat(&user, &request)
        .await
        .api_error("Chat failed")?;
    Ok(Json(response))
}

// === Conversation management ===

pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Conversation>>> {
    let conversations = state
        .assistant
        .store
        .list_for_user(&user.id)
        .await
        .api_error("Failed to list conversations")?;
    Ok(Json(conversations))
}

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    let conversation = state
        .assistant
        .store
        .get(&id)
        .await
        .api_error("Failed to load conversation")?
        .filter(|c| c.user_id == user.id)
        .ok_or_not_found("Conversation")?;
    Ok(Json(conversation))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ConversationMessage>>> {
    // Ownership check first so a foreign conversation reads as absent.
    state
        .assistant
        .store
        .get(&id)
        .await
        .api_error("Failed to load conversation")?
        .filter(|c| c.user_id == user.id)
        .ok_or_not_found("Conversation")?;

    let messages = state
        .assistant
        .store
        .list_messages(&id)
        .await
        .api_error("Failed to load messages")?;
    Ok(Json(messages))
}

pub async fn update_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateConversationRequest>,
) -> ApiResult<Json<Conversation>> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title must not be blank"));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ApiError::bad_request("title too long"));
    }

    let conversation = state
        .assistant
        .store
        .retitle(&id, &user.id, title)
        .await
        .api_error("Failed to update conversation")?
        .ok_or_not_found("Conversation")?;
    Ok(Json(conversation))
}

pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .assistant
        .store
        .delete_one(&id, &user.id)
        .await
        .api_error("Failed to delete conversation")?;
    if !deleted {
        return Err(ApiError::not_found("Conversation not found"));
    }
    Ok(Json(json!({ "deleted": true, "conversationId": id })))
}

pub async fn clear_conversations(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Value>> {
    let count = state
        .assistant
        .store
        .clear_all(&user.id)
        .await
        .api_error("Failed to clear conversations")?;
    Ok(Json(json!({ "deleted": true, "count": count })))
}

// === Canned shortcuts ===
// Each builds a fixed question and runs it through the normal chat flow.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutParams {
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub module_id: Option<String>,
}

fn shortcut_request(params: ShortcutParams, question: &str) -> ChatRequest {
    ChatRequest {
        context: Some(ChatContext {
            course_id: params.course_id,
            module_id: params.module_id,
            ..Default::default()
        }),
        messages: vec![ChatMessage {
            role: MessageRole::User,
            content: question.to_string(),
        }],
        preferences: None,
        stream: false,
    }
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<ShortcutParams>,
) -> ApiResult<Json<ChatResponse>> {
    let question = if params.module_id.is_some() {
        "请帮我总结当前章节的核心知识点"
    } else {
        "请帮我总结这门课程的核心知识点"
    };
    let request = shortcut_request(params, question);
    let response = state
        .assistant
        .chat(&user, &request)
        .await
        .api_error("Chat failed")?;
    Ok(Json(response))
}

pub async fn learning_path(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<ShortcutParams>,
) -> ApiResult<Json<ChatResponse>> {
    let request = shortcut_request(
        params,
        "根据我当前的学习进度和成绩表现，请为我推荐接下来的学习路径，并给出学习建议。",
    );
    let response = state
        .assistant
        .chat(&user, &request)
        .await
        .api_error("Chat failed")?;
    Ok(Json(response))
}

pub async fn review_reminder(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<ShortcutParams>,
) -> ApiResult<Json<ChatResponse>> {
    let request = shortcut_request(
        params,
        "请帮我检查即将到期的作业和需要复习的内容，并制定一个复习计划。",
    );
    let response = state
        .assistant
        .chat(&user, &request)
        .await
        .api_error("Chat failed")?;
    Ok(Json(response))
}
