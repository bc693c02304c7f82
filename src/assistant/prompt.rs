// src/assistant/prompt.rs
// Builds the provider message array: system prompt (persona plus optional
// context block) followed by the client-supplied history.

use serde::Serialize;

use super::context::LearningContext;
use super::types::ChatMessage;

/// Fixed assistant persona, prepended to every completion request. This text
/// is externally visible product behavior and must not be reworded.
pub const SYSTEM_PROMPT: &str = "你是智慧学习平台的AI学习助手，名叫\"小智\"。你的职责是帮助学生更好地学习课程内容。

## 你的核心能力

1. **智能答疑**：回答学生关于课程内容的问题，提供清晰、准确、易懂的解释
2. **知识点总结**：帮助学生总结和梳理学习内容的重点知识点
3. **学习路径推荐**：根据学生的学习进度和表现，推荐合适的下一步学习内容
4. **复习提醒**：提醒学生重要的作业截止日期，建议复习计划

## 回复规范

- 使用简洁友好的中文回答
- 对于专业概念，先给出简单解释，再深入说明
- 适当使用示例来帮助理解
- 如果问题超出课程范围，诚实说明并建议相关学习资源
- 鼓励学生思考，而不是直接给出作业答案
- 对于作业问题，提供思路和方法引导，不直接给完整答案

## 上下文使用

系统会提供学生当前的学习上下文信息，请结合这些信息给出个性化的回答：
- 学生正在学习的课程和章节
- 学生的学习进度和成绩情况
- 即将截止的作业
";

/// One message in the provider wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderMessage {
    pub role: &'static str,
    pub content: String,
}

/// Assemble the outbound message array. The system message carries the
/// context block only when the extractor produced one.
pub fn build_messages(messages: &[ChatMessage], context: &LearningContext) -> Vec<ProviderMessage> {
    let context_block = context.to_context_prompt();
    let system_content = if context_block.is_empty() {
        SYSTEM_PROMPT.to_string()
    } else {
        format!("{}\n\n{}", SYSTEM_PROMPT, context_block)
    };

    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(ProviderMessage {
        role: "system",
        content: system_content,
    });
    for msg in messages {
        out.push(ProviderMessage {
            role: msg.role.provider_role(),
            content: msg.content.clone(),
        });
    }
    out
}
