// src/domain/mod.rs
// Read-side view of the platform tables the assistant core consumes. The CRUD
// modules own writes to these tables; the assistant only ever queries them.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentProfile {
    pub id: String,
    pub user_id: String,
    pub major: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub semester: Option<String>,
    pub credit: Option<i64>,
    pub teacher_id: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseModule {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub display_order: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseResource {
    pub id: String,
    pub module_id: String,
    pub name: String,
    pub resource_type: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub assignment_type: String,
    pub deadline: Option<DateTime<Utc>>,
    pub published: bool,
    pub grading_rubric: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Submission {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub status: String,
    pub score: Option<f64>,
    pub submitted_at: DateTime<Utc>,
}

// === Finders ===

pub async fn find_user(db: &SqlitePool, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT id, username, email, role FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_student_profile(db: &SqlitePool, user_id: &str) -> Result<Option<StudentProfile>> {
    let profile = sqlx::query_as::<_, StudentProfile>(
        "SELECT id, user_id, major, grade FROM student_profiles WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

pub async fn find_course(db: &SqlitePool, id: &str) -> Result<Option<Course>> {
    let course = sqlx::query_as::<_, Course>(
        "SELECT id, name, semester, credit, teacher_id FROM courses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(course)
}

pub async fn find_module(db: &SqlitePool, id: &str) -> Result<Option<CourseModule>> {
    let module = sqlx::query_as::<_, CourseModule>(
        "SELECT id, course_id, title, display_order FROM course_modules WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(module)
}

pub async fn modules_by_course(db: &SqlitePool, course_id: &str) -> Result<Vec<CourseModule>> {
    let modules = sqlx::query_as::<_, CourseModule>(
        "SELECT id, course_id, title, display_order FROM course_modules \
         WHERE course_id = ? ORDER BY display_order ASC",
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;
    Ok(modules)
}

pub async fn find_resource(db: &SqlitePool, id: &str) -> Result<Option<CourseResource>> {
    let resource = sqlx::query_as::<_, CourseResource>(
        "SELECT id, module_id, name, resource_type FROM course_resources WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(resource)
}

pub async fn resources_by_module(db: &SqlitePool, module_id: &str) -> Result<Vec<CourseResource>> {
    let resources = sqlx::query_as::<_, CourseResource>(
        "SELECT id, module_id, name, resource_type FROM course_resources WHERE module_id = ?",
    )
    .bind(module_id)
    .fetch_all(db)
    .await?;
    Ok(resources)
}

pub async fn find_assignment(db: &SqlitePool, id: &str) -> Result<Option<Assignment>> {
    let assignment = sqlx::query_as::<_, Assignment>(
        "SELECT id, course_id, title, assignment_type, deadline, published, grading_rubric \
         FROM assignments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(assignment)
}

pub async fn assignments_by_course(db: &SqlitePool, course_id: &str) -> Result<Vec<Assignment>> {
    let assignments = sqlx::query_as::<_, Assignment>(
        "SELECT id, course_id, title, assignment_type, deadline, published, grading_rubric \
         FROM assignments WHERE course_id = ?",
    )
    .bind(course_id)
    .fetch_all(db)
    .await?;
    Ok(assignments)
}

pub async fn submissions_by_student(db: &SqlitePool, student_id: &str) -> Result<Vec<Submission>> {
    let submissions = sqlx::query_as::<_, Submission>(
        "SELECT id, assignment_id, student_id, status, score, submitted_at \
         FROM submissions WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_all(db)
    .await?;
    Ok(submissions)
}

/// Most recent submission a student made for an assignment, if any.
pub async fn latest_submission(
    db: &SqlitePool,
    assignment_id: &str,
    student_id: &str,
) -> Result<Option<Submission>> {
    let submission = sqlx::query_as::<_, Submission>(
        "SELECT id, assignment_id, student_id, status, score, submitted_at \
         FROM submissions WHERE assignment_id = ? AND student_id = ? \
         ORDER BY submitted_at DESC LIMIT 1",
    )
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(db)
    .await?;
    Ok(submission)
}
