// tests/assistant_flow.rs
// End-to-end assistant turns against an in-memory database and a local
// stand-in completion provider.


use chrono::{Duration, Utc};
use smartlearn_backend::assistant::deepseek::{FALLBACK_EMPTY, FALLBACK_PARSE, FALLBACK_UNAVAILABLE};
use smartlearn_backend::assistant::prompt::SYSTEM_PROMPT;
use smartlearn_backend::assistant::types::{ChatContext, ChatMessage, ChatRequest, MessageRole};
use smartlearn_backend::domain::User;

use test_helpers::*;

fn student(id: &str) -> User {
    User {
        id: id.to_string(),
        username: "张三".to_string(),
        email: None,
        role: "STUDENT".to_string(),
    }
}

fn user_message(content: &str) -> ChatMessage {
    ChatMessage {
        role: MessageRole::User,
        content: content.to_string(),
    }
}

fn plain_request(content: &str) -> ChatRequest {
    ChatRequest {
        context: None,
        messages: vec![user_message(content)],
        preferences: None,
        stream: false,
    }
}

#[tokio::test]
async fn generic_question_without_context() {
    let (base_url, last_request) =
        spawn_mock_provider(MockBehavior::Answer("二叉树是一种树形结构。".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;

    let response = state
        .assistant
        .chat(&student(&user_id), &plain_request("什么是二叉树?"))
        .await
        .unwrap();

    assert_eq!(response.answer, "二叉树是一种树形结构。");
    assert!(response.references.is_empty());
    assert!(response.suggestions.is_empty());
    assert_eq!(response.usage.total_tokens, 200);

    // No profile details and no context hints, so the system message is the
    // bare persona prompt.
    assert_eq!(captured_system_prompt(&last_request), SYSTEM_PROMPT);

    let conversations = state.assistant.store.list_for_user(&user_id).await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].title, "什么是二叉树?");
    assert_eq!(conversations[0].message_count, 2);
    assert_eq!(conversations[0].total_tokens, 200);
}

#[tokio::test]
async fn contextual_question_builds_prompt_references_and_suggestions() {
    let (base_url, last_request) =
        spawn_mock_provider(MockBehavior::Answer("好的，我来讲解。".to_string())).await;
    let state = create_test_app_state(&base_url).await;

    let teacher_id = seed_user(&state.db, "李老师", "TEACHER").await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;
    seed_profile(&state.db, &user_id, "计算机科学", "大二").await;

    let course_id = seed_course(&state.db, "数据结构", Some(&teacher_id)).await;
    let mut module_ids = Vec::new();
    for (i, title) in ["绪论", "线性表", "栈与队列", "树与二叉树", "图", "排序"]
        .iter()
        .enumerate()
    {
        module_ids.push(seed_module(&state.db, &course_id, title, (i + 1) as i64).await);
    }
    let current_module = &module_ids[3];
    let resource_id = seed_resource(&state.db, current_module, "二叉树遍历.mp4", "VIDEO").await;

    let future = Utc::now() + Duration::days(7);
    seed_assignment(&state.db, &course_id, "实验四", Some(future), true).await;
    let graded = seed_assignment(
        &state.db,
        &course_id,
        "实验三",
        Some(Utc::now() - Duration::days(7)),
        true,
    )
    .await;
    // unpublished upcoming assignment must not appear
    seed_assignment(&state.db, &course_id, "草稿作业", Some(future), false).await;
    seed_submission(&state.db, &graded, &user_id, "GRADED", Some(85.0)).await;

    let request = ChatRequest {
        context: Some(ChatContext {
            course_id: Some(course_id.clone()),
            module_id: Some(current_module.clone()),
            resource_id: Some(resource_id.clone()),
            assignment_id: None,
            ..Default::default()
        }),
        messages: vec![user_message("请讲讲二叉树的遍历")],
        preferences: None,
        stream: false,
    };

    let response = state
        .assistant
        .chat(&student(&user_id), &request)
        .await
        .unwrap();

    let prompt = captured_system_prompt(&last_request);
    assert!(prompt.starts_with(SYSTEM_PROMPT));
    assert!(prompt.contains("## 当前学习上下文"));
    assert!(prompt.contains("### 学生信息"));
    assert!(prompt.contains("- 专业: 计算机科学"));
    assert!(prompt.contains("- 课程名称: 数据结构"));
    assert!(prompt.contains("- 授课教师: 李老师"));
    assert!(prompt.contains("- 正在学习: 第4章 - 树与二叉树"));
    assert!(prompt.contains("- 当前资源: 二叉树遍历.mp4 (VIDEO)"));
    assert!(prompt.contains("- 第6章: 排序"));
    assert!(prompt.contains("### 待完成作业"));
    assert!(prompt.contains("- 实验四 (截止: "));
    assert!(!prompt.contains("草稿作业"));
    assert!(prompt.contains("- 平均分: 85.0"));
    assert!(!prompt.contains("### 学习进度"));

    let kinds: Vec<&str> = response.references.iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(kinds, vec!["module", "resource"]);
    assert_eq!(response.references[0].title, "第4章: 树与二叉树");

    let actions: Vec<&str> = response.suggestions.iter().map(|s| s.action.as_str()).collect();
    assert_eq!(actions, vec!["continue_learning", "complete_assignment"]);
    assert_eq!(response.suggestions[0].title, "继续学习: 图");
    assert_eq!(response.suggestions[1].title, "完成作业: 实验四");

    let conversations = state.assistant.store.list_for_user(&user_id).await.unwrap();
    assert_eq!(conversations[0].course_id.as_deref(), Some(course_id.as_str()));
    assert_eq!(conversations[0].module_id.as_deref(), Some(current_module.as_str()));
}

#[tokio::test]
async fn resource_hint_alone_yields_resource_reference() {
    let (base_url, last_request) =
        spawn_mock_provider(MockBehavior::Answer("回答".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;
    let course_id = seed_course(&state.db, "数据结构", None).await;
    let module_id = seed_module(&state.db, &course_id, "绪论", 1).await;
    let resource_id = seed_resource(&state.db, &module_id, "课件.pdf", "DOCUMENT").await;

    let request = ChatRequest {
        context: Some(ChatContext {
            resource_id: Some(resource_id.clone()),
            ..Default::default()
        }),
        messages: vec![user_message("这份课件讲了什么?")],
        preferences: None,
        stream: false,
    };

    let response = state
        .assistant
        .chat(&student(&user_id), &request)
        .await
        .unwrap();

    assert_eq!(response.references.len(), 1);
    assert_eq!(response.references[0].kind, "resource");
    assert_eq!(response.references[0].id, resource_id);
    assert_eq!(response.references[0].title, "课件.pdf");

    // Without a module hint there is no study-location section to carry the
    // resource line, but the lookup itself must not depend on the module.
    let prompt = captured_system_prompt(&last_request);
    assert!(!prompt.contains("### 当前学习位置"));
}

#[tokio::test]
async fn unknown_module_hint_is_ignored() {
    let (base_url, last_request) =
        spawn_mock_provider(MockBehavior::Answer("回答".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;
    let course_id = seed_course(&state.db, "数据结构", None).await;
    seed_module(&state.db, &course_id, "绪论", 1).await;

    let request = ChatRequest {
        context: Some(ChatContext {
            course_id: Some(course_id),
            module_id: Some("no-such-module".to_string()),
            ..Default::default()
        }),
        messages: vec![user_message("你好")],
        preferences: None,
        stream: false,
    };

    let response = state
        .assistant
        .chat(&student(&user_id), &request)
        .await
        .unwrap();

    let prompt = captured_system_prompt(&last_request);
    assert!(!prompt.contains("### 当前学习位置"));
    assert!(prompt.contains("### 课程章节结构"));
    assert!(response.references.is_empty());

    let conversations = state.assistant.store.list_for_user(&user_id).await.unwrap();
    assert_eq!(conversations.len(), 1);
}

#[tokio::test]
async fn low_average_adds_review_suggestion() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::Answer("好的。".to_string())).await;
    let state = create_test_app_state(&base_url).await;

    let user_id = seed_user(&state.db, "张三", "STUDENT").await;
    let course_id = seed_course(&state.db, "数据结构", None).await;
    let a1 = seed_assignment(&state.db, &course_id, "作业一", None, true).await;
    let a2 = seed_assignment(&state.db, &course_id, "作业二", None, true).await;
    seed_submission(&state.db, &a1, &user_id, "GRADED", Some(55.0)).await;
    seed_submission(&state.db, &a2, &user_id, "GRADED", Some(65.0)).await;

    let request = ChatRequest {
        context: Some(ChatContext {
            course_id: Some(course_id),
            ..Default::default()
        }),
        messages: vec![user_message("我该怎么提高成绩?")],
        preferences: None,
        stream: false,
    };

    let response = state
        .assistant
        .chat(&student(&user_id), &request)
        .await
        .unwrap();

    let review: Vec<_> = response
        .suggestions
        .iter()
        .filter(|s| s.action == "review_materials")
        .collect();
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].title, "建议复习: 您的平均分较低，建议回顾之前的章节内容");
}

#[tokio::test]
async fn provider_failure_falls_back_and_still_persists() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::Status(500)).await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;

    let response = state
        .assistant
        .chat(&student(&user_id), &plain_request("你好"))
        .await
        .unwrap();

    assert_eq!(response.answer, FALLBACK_UNAVAILABLE);
    assert_eq!(response.usage.total_tokens, 0);

    // The fallback turn is saved like any other.
    let conversations = state.assistant.store.list_for_user(&user_id).await.unwrap();
    assert_eq!(conversations.len(), 1);
    let messages = state
        .assistant
        .store
        .list_messages(&conversations[0].id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, FALLBACK_UNAVAILABLE);
}

#[tokio::test]
async fn malformed_provider_body_falls_back() {
    let (base_url, _) =
        spawn_mock_provider(MockBehavior::RawBody("{not json".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;

    let response = state
        .assistant
        .chat(&student(&user_id), &plain_request("你好"))
        .await
        .unwrap();
    assert_eq!(response.answer, FALLBACK_PARSE);
}

#[tokio::test]
async fn provider_body_without_choices_falls_back() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::RawBody(
        r#"{"usage": {"prompt_tokens": 10, "completion_tokens": 0, "total_tokens": 10}}"#
            .to_string(),
    ))
    .await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;

    let response = state
        .assistant
        .chat(&student(&user_id), &plain_request("你好"))
        .await
        .unwrap();
    assert_eq!(response.answer, FALLBACK_EMPTY);
    // usage is still recorded when the body carries it
    assert_eq!(response.usage.total_tokens, 10);
}

// === Store invariants ===

#[tokio::test]
async fn messages_are_contiguous_and_ordered() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::Answer("回答".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let user_id = seed_user(&state.db, "张三", "STUDENT").await;

    let request = ChatRequest {
        context: None,
        messages: vec![
            user_message("问题一"),
            ChatMessage {
                role: MessageRole::Assistant,
                content: "回答一".to_string(),
            },
            user_message("问题二"),
        ],
        preferences: None,
        stream: false,
    };
    let response = state
        .assistant
        .chat(&student(&user_id), &request)
        .await
        .unwrap();

    let messages = state
        .assistant
        .store
        .list_messages(&response.conversation_id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 4);
    for (i, msg) in messages.iter().enumerate() {
        assert_eq!(msg.message_order, i as i64);
    }
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[3].role, MessageRole::Assistant);
    assert_eq!(messages[3].content, "回答");
    assert_eq!(messages[3].tokens, Some(200));
    assert!(messages[0].tokens.is_none());

    let conversation = state
        .assistant
        .store
        .get(&response.conversation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(conversation.message_count, 4);
    assert_eq!(conversation.title, "问题一");
}

#[tokio::test]
async fn retitle_enforces_ownership() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::Answer("回答".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let owner = seed_user(&state.db, "张三", "STUDENT").await;
    let other = seed_user(&state.db, "李四", "STUDENT").await;

    let response = state
        .assistant
        .chat(&student(&owner), &plain_request("你好"))
        .await
        .unwrap();

    let stolen = state
        .assistant
        .store
        .retitle(&response.conversation_id, &other, "改名")
        .await
        .unwrap();
    assert!(stolen.is_none());

    let renamed = state
        .assistant
        .store
        .retitle(&response.conversation_id, &owner, "新标题")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.title, "新标题");
}

#[tokio::test]
async fn delete_enforces_ownership_and_removes_messages() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::Answer("回答".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let owner = seed_user(&state.db, "张三", "STUDENT").await;
    let other = seed_user(&state.db, "李四", "STUDENT").await;

    let response = state
        .assistant
        .chat(&student(&owner), &plain_request("你好"))
        .await
        .unwrap();

    assert!(!state
        .assistant
        .store
        .delete_one(&response.conversation_id, &other)
        .await
        .unwrap());
    assert!(state
        .assistant
        .store
        .get(&response.conversation_id)
        .await
        .unwrap()
        .is_some());

    assert!(state
        .assistant
        .store
        .delete_one(&response.conversation_id, &owner)
        .await
        .unwrap());
    assert!(state
        .assistant
        .store
        .get(&response.conversation_id)
        .await
        .unwrap()
        .is_none());
    assert!(state
        .assistant
        .store
        .list_messages(&response.conversation_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn clear_all_only_touches_own_conversations() {
    let (base_url, _) = spawn_mock_provider(MockBehavior::Answer("回答".to_string())).await;
    let state = create_test_app_state(&base_url).await;
    let owner = seed_user(&state.db, "张三", "STUDENT").await;
    let other = seed_user(&state.db, "李四", "STUDENT").await;

    for _ in 0..3 {
        state
            .assistant
            .chat(&student(&owner), &plain_request("你好"))
            .await
            .unwrap();
    }
    state
        .assistant
        .chat(&student(&other), &plain_request("你好"))
        .await
        .unwrap();

    let count = state.assistant.store.clear_all(&owner).await.unwrap();
    assert_eq!(count, 3);
    assert!(state.assistant.store.list_for_user(&owner).await.unwrap().is_empty());
    assert_eq!(state.assistant.store.list_for_user(&other).await.unwrap().len(), 1);
}
