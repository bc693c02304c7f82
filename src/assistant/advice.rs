// src/assistant/advice.rs
// Derives references and next-step suggestions from the extracted context.
// Both are computed locally, never by the completion provider.

use super::context::LearningContext;
use super::types::{ChatContext, Reference, Suggestion};

/// Threshold below which a review suggestion is emitted.
const REVIEW_SCORE_THRESHOLD: f64 = 70.0;

/// Pointers into platform content for the current position. Order is fixed:
/// module, then resource, then assignment.
pub fn build_references(ctx: Option<&ChatContext>, context: &LearningContext) -> Vec<Reference> {
    let mut refs = Vec::new();
    let Some(ctx) = ctx else {
        return refs;
    };

    if let (Some(id), Some(title)) = (&ctx.module_id, &context.current_module_title) {
        let order = context.current_module_order.unwrap_or(0);
        refs.push(Reference {
            kind: "module".to_string(),
            id: id.clone(),
            title: format!("第{}章: {}", order, title),
            snippet: None,
        });
    }

    if let (Some(id), Some(name)) = (&ctx.resource_id, &context.current_resource_name) {
        refs.push(Reference {
            kind: "resource".to_string(),
            id: id.clone(),
            title: name.clone(),
            snippet: None,
        });
    }

    if let (Some(id), Some(title)) = (&ctx.assignment_id, &context.current_assignment_title) {
        refs.push(Reference {
            kind: "assignment".to_string(),
            id: id.clone(),
            title: title.clone(),
            snippet: None,
        });
    }

    refs
}

/// Next-step suggestions, at most one of each action kind.
pub fn build_suggestions(context: &LearningContext) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    // Next chapter, when the student is inside a course and not on the last one.
    if let (Some(current), Some(total)) = (context.current_module_order, context.total_modules) {
        if current < total {
            if let Some(next) = context.modules.iter().find(|m| m.order == current + 1) {
                suggestions.push(Suggestion {
                    action: "continue_learning".to_string(),
                    target: None,
                    title: format!("继续学习: {}", next.title),
                });
            }
        }
    }

    // Only the earliest-deadline assignment counts, and only while untouched.
    if let Some(first) = context.upcoming_assignments.first() {
        if first.status == "PENDING" {
            suggestions.push(Suggestion {
                action: "complete_assignment".to_string(),
                target: None,
                title: format!("完成作业: {}", first.title),
            });
        }
    }

    if let Some(avg) = context.average_score {
        if avg < REVIEW_SCORE_THRESHOLD {
            suggestions.push(Suggestion {
                action: "review_materials".to_string(),
                target: None,
                title: "建议复习: 您的平均分较低，建议回顾之前的章节内容".to_string(),
            });
        }
    }

    suggestions
}
