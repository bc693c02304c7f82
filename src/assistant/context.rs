// src/assistant/context.rs
// Snapshot of a student's learning situation and its rendering as the
// markdown context block appended to the system prompt.

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone, Default)]
pub struct ModuleInfo {
    pub title: String,
    pub order: i64,
    pub resource_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AssignmentInfo {
    pub title: String,
    pub kind: String,
    pub deadline: Option<DateTime<Utc>>,
    /// Submission status for this student, "PENDING" when nothing submitted.
    pub status: String,
    pub score: Option<f64>,
}

/// Everything the extractor gathered for one chat turn. All fields optional;
/// whatever is present becomes a section of the context block.
#[derive(Debug, Clone, Default)]
pub struct LearningContext {
    pub student_name: Option<String>,
    pub major: Option<String>,
    pub grade: Option<String>,

    pub course_name: Option<String>,
    pub semester: Option<String>,
    pub credit: Option<i64>,
    pub teacher_name: Option<String>,

    pub current_module_title: Option<String>,
    pub current_module_order: Option<i64>,
    pub total_modules: Option<i64>,
    pub current_resource_name: Option<String>,
    pub current_resource_type: Option<String>,

    pub modules: Vec<ModuleInfo>,

    pub progress_percentage: Option<f64>,
    pub completed_modules: Option<i64>,

    pub current_assignment_title: Option<String>,
    pub current_assignment_deadline: Option<DateTime<Utc>>,
    pub current_assignment_rubric: Option<String>,

    pub upcoming_assignments: Vec<AssignmentInfo>,

    pub average_score: Option<f64>,
    pub completed_assignments: Option<i64>,
    pub total_assignments: Option<i64>,
}

fn fmt_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl LearningContext {
    /// Render the markdown context block. Returns an empty string when no
    /// section has data, in which case the system prompt carries no block.
    pub fn to_context_prompt(&self) -> String {
        let mut sections = Vec::new();

        // The student's name alone is not worth a section; only identity
        // details beyond the login add context.
        if self.major.is_some() || self.grade.is_some() {
            let mut s = String::from("### 学生信息\n");
            if let Some(name) = &self.student_name {
                s.push_str(&format!("- 姓名: {}\n", name));
            }
            if let Some(major) = &self.major {
                s.push_str(&format!("- 专业: {}\n", major));
            }
            if let Some(grade) = &self.grade {
                s.push_str(&format!("- 年级: {}\n", grade));
            }
            sections.push(s);
        }

        if self.course_name.is_some() {
            let mut s = String::from("### 课程信息\n");
            if let Some(name) = &self.course_name {
                s.push_str(&format!("- 课程名称: {}\n", name));
            }
            if let Some(semester) = &self.semester {
                s.push_str(&format!("- 学期: {}\n", semester));
            }
            if let Some(credit) = self.credit {
                s.push_str(&format!("- 学分: {}\n", credit));
            }
            if let Some(teacher) = &self.teacher_name {
                s.push_str(&format!("- 授课教师: {}\n", teacher));
            }
            sections.push(s);
        }

        if let Some(title) = &self.current_module_title {
            let mut s = String::from("### 当前学习位置\n");
            let order = self.current_module_order.unwrap_or(0);
            s.push_str(&format!("- 正在学习: 第{}章 - {}\n", order, title));
            if let Some(resource) = &self.current_resource_name {
                let kind = self.current_resource_type.as_deref().unwrap_or("资源");
                s.push_str(&format!("- 当前资源: {} ({})\n", resource, kind));
            }
            sections.push(s);
        }

        if !self.modules.is_empty() {
            let mut s = String::from("### 课程章节结构\n");
            for module in &self.modules {
                s.push_str(&format!("- 第{}章: {}\n", module.order, module.title));
                for resource in &module.resource_names {
                    s.push_str(&format!("  - {}\n", resource));
                }
            }
            sections.push(s);
        }

        if let Some(pct) = self.progress_percentage {
            let mut s = String::from("### 学习进度\n");
            s.push_str(&format!(
                "- 已完成章节: {}/{}\n",
                self.completed_modules.unwrap_or(0),
                self.total_modules.unwrap_or(0)
            ));
            s.push_str(&format!("- 总体进度: {:.1}%\n", pct));
            sections.push(s);
        }

        if let Some(title) = &self.current_assignment_title {
            let mut s = String::from("### 当前作业\n");
            s.push_str(&format!("- 标题: {}\n", title));
            if let Some(deadline) = &self.current_assignment_deadline {
                s.push_str(&format!("- 截止时间: {}\n", fmt_instant(deadline)));
            }
            if let Some(rubric) = &self.current_assignment_rubric {
                s.push_str(&format!("- 要求: {}\n", rubric));
            }
            sections.push(s);
        }

        if !self.upcoming_assignments.is_empty() {
            let mut s = String::from("### 待完成作业\n");
            for a in &self.upcoming_assignments {
                match &a.deadline {
                    Some(deadline) => s.push_str(&format!(
                        "- {} (截止: {})\n",
                        a.title,
                        fmt_instant(deadline)
                    )),
                    None => s.push_str(&format!("- {}\n", a.title)),
                }
            }
            sections.push(s);
        }

        if let Some(avg) = self.average_score {
            let mut s = String::from("### 成绩概览\n");
            s.push_str(&format!("- 平均分: {:.1}\n", avg));
            if let (Some(done), Some(total)) = (self.completed_assignments, self.total_assignments)
            {
                s.push_str(&format!("- 已完成作业: {}/{}\n", done, total));
            }
            sections.push(s);
        }

        if sections.is_empty() {
            return String::new();
        }

        let mut out = String::from("## 当前学习上下文\n\n");
        out.push_str(&sections.join("\n"));
        out
    }
}
