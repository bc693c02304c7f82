// src/assistant/extractor.rs
// Gathers a LearningContext from the platform tables for one chat turn.
// Missing rows never fail a chat; whatever cannot be resolved is left unset.

use std::collections::HashSet;

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::{self, User};

use super::context::{AssignmentInfo, LearningContext, ModuleInfo};
use super::types::ChatContext;

/// How many upcoming assignments the context block lists at most.
const MAX_UPCOMING: usize = 5;

pub struct ContextExtractor {
    db: SqlitePool,
}

impl ContextExtractor {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn extract(&self, user: &User, ctx: Option<&ChatContext>) -> Result<LearningContext> {
        let mut out = LearningContext {
            student_name: Some(user.username.clone()),
            ..Default::default()
        };

        if let Some(profile) = domain::find_student_profile(&self.db, &user.id).await? {
            out.major = profile.major;
            out.grade = profile.grade;
        }

        let course_id = ctx.and_then(|c| c.course_id.as_deref());

        if let Some(course_id) = course_id {
            self.load_course(&mut out, course_id).await?;
        }

        if let Some(module_id) = ctx.and_then(|c| c.module_id.as_deref()) {
            if let Some(module) = domain::find_module(&self.db, module_id).await? {
                out.current_module_title = Some(module.title);
                out.current_module_order = Some(module.display_order);
            }
        }

        if let Some(resource_id) = ctx.and_then(|c| c.resource_id.as_deref()) {
            if let Some(resource) = domain::find_resource(&self.db, resource_id).await? {
                out.current_resource_name = Some(resource.name);
                out.current_resource_type = Some(resource.resource_type);
            }
        }

        if let Some(assignment_id) = ctx.and_then(|c| c.assignment_id.as_deref()) {
            if let Some(assignment) = domain::find_assignment(&self.db, assignment_id).await? {
                out.current_assignment_title = Some(assignment.title);
                out.current_assignment_deadline = assignment.deadline;
                out.current_assignment_rubric = assignment.grading_rubric;
            }
        }

        if let Some(course_id) = course_id {
            self.load_upcoming(&mut out, course_id, &user.id).await?;
        }

        self.load_performance(&mut out, course_id, &user.id).await?;

        debug!(
            "context extracted for {}: {} modules, {} upcoming",
            user.id,
            out.modules.len(),
            out.upcoming_assignments.len()
        );
        Ok(out)
    }

    async fn load_course(&self, out: &mut LearningContext, course_id: &str) -> Result<()> {
        let Some(course) = domain::find_course(&self.db, course_id).await? else {
            return Ok(());
        };

        out.course_name = Some(course.name);
        out.semester = course.semester;
        out.credit = course.credit;
        if let Some(teacher_id) = &course.teacher_id {
            out.teacher_name = domain::find_user(&self.db, teacher_id)
                .await?
                .map(|t| t.username);
        }

        let modules = domain::modules_by_course(&self.db, course_id).await?;
        out.total_modules = Some(modules.len() as i64);
        for module in modules {
            let resource_names = domain::resources_by_module(&self.db, &module.id)
                .await?
                .into_iter()
                .map(|r| r.name)
                .collect();
            out.modules.push(ModuleInfo {
                title: module.title,
                order: module.display_order,
                resource_names,
            });
        }
        Ok(())
    }

    async fn load_upcoming(
        &self,
        out: &mut LearningContext,
        course_id: &str,
        student_id: &str,
    ) -> Result<()> {
        let now = Utc::now();
        let mut upcoming: Vec<_> = domain::assignments_by_course(&self.db, course_id)
            .await?
            .into_iter()
            .filter(|a| a.published && a.deadline.map(|d| d > now).unwrap_or(false))
            .collect();
        upcoming.sort_by_key(|a| a.deadline);

        for assignment in upcoming.into_iter().take(MAX_UPCOMING) {
            let submission =
                domain::latest_submission(&self.db, &assignment.id, student_id).await?;
            let (status, score) = match submission {
                Some(s) => (s.status, s.score),
                None => ("PENDING".to_string(), None),
            };
            out.upcoming_assignments.push(AssignmentInfo {
                title: assignment.title,
                kind: assignment.assignment_type,
                deadline: assignment.deadline,
                status,
                score,
            });
        }
        Ok(())
    }

    async fn load_performance(
        &self,
        out: &mut LearningContext,
        course_id: Option<&str>,
        student_id: &str,
    ) -> Result<()> {
        let mut submissions = domain::submissions_by_student(&self.db, student_id).await?;

        // Inside a course, only that course's assignments count.
        if let Some(course_id) = course_id {
            let course_assignments: HashSet<String> =
                domain::assignments_by_course(&self.db, course_id)
                    .await?
                    .into_iter()
                    .map(|a| a.id)
                    .collect();
            out.total_assignments = Some(course_assignments.len() as i64);
            submissions.retain(|s| course_assignments.contains(&s.assignment_id));
        }

        if submissions.is_empty() {
            return Ok(());
        }

        let graded: Vec<f64> = submissions
            .iter()
            .filter(|s| s.status == "GRADED")
            .filter_map(|s| s.score)
            .collect();
        if !graded.is_empty() {
            out.average_score = Some(graded.iter().sum::<f64>() / graded.len() as f64);
        }
        out.completed_assignments = Some(submissions.len() as i64);
        Ok(())
    }
}
