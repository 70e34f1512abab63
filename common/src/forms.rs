// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Form state for the create/edit dialogs.
//!
//! Each form keeps its raw field values as typed by the user plus the errors
//! of the last submit attempt. `submit` re-validates and only hands back an
//! API input when every field passes.

use chrono::{DateTime, NaiveDate, Utc};

use crate::validation::{self, FormErrors};
use crate::{
    CreateCommentInput, CreateOrganizationInput, CreateProjectInput, CreateTaskInput, FieldError,
    Project, ProjectStatus, Task, TaskStatus, UpdateProjectInput, UpdateTaskInput,
};

/// Parses a `YYYY-MM-DD` date input. An empty input means "no date".
fn parse_date_input(value: &str) -> Result<Option<NaiveDate>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee_email: String,
    /// `YYYY-MM-DD`, as produced by a date input.
    pub due_date: String,
    errors: FormErrors,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo,
            assignee_email: String::new(),
            due_date: String::new(),
            errors: FormErrors::new(),
        }
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled for editing an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            assignee_email: task.assignee_email.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .map(|d| d.date_naive().format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            errors: FormErrors::new(),
        }
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn apply_server_errors(&mut self, errors: &[FieldError]) {
        self.errors.extend_from_server(errors);
    }

    fn validated_due_date(&mut self) -> Option<Option<DateTime<Utc>>> {
        self.errors = validation::validate_task(&self.title, &self.assignee_email);
        let due_date = match parse_date_input(&self.due_date) {
            Ok(date) => date,
            Err(()) => {
                self.errors.insert("dueDate", validation::INVALID_DATE);
                None
            }
        };
        if !self.errors.is_empty() {
            return None;
        }
        // Midnight UTC of the picked day.
        Some(
            due_date
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc()),
        )
    }

    pub fn submit(&mut self, project_id: &str) -> Option<CreateTaskInput> {
        let due_date = self.validated_due_date()?;
        Some(CreateTaskInput {
            project_id: project_id.to_string(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            assignee_email: non_empty(&self.assignee_email),
            due_date,
        })
    }

    pub fn submit_update(&mut self) -> Option<UpdateTaskInput> {
        let due_date = self.validated_due_date()?;
        Some(UpdateTaskInput {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status),
            assignee_email: non_empty(&self.assignee_email),
            due_date,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub due_date: String,
    errors: FormErrors,
}

impl ProjectForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            status: project.status,
            due_date: project
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            errors: FormErrors::new(),
        }
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn apply_server_errors(&mut self, errors: &[FieldError]) {
        self.errors.extend_from_server(errors);
    }

    fn validated_due_date(&mut self) -> Option<Option<NaiveDate>> {
        self.errors = validation::validate_project(&self.name);
        let due_date = parse_date_input(&self.due_date).unwrap_or_else(|()| {
            self.errors.insert("dueDate", validation::INVALID_DATE);
            None
        });
        self.errors.is_empty().then_some(due_date)
    }

    pub fn submit(&mut self, organization_slug: &str) -> Option<CreateProjectInput> {
        let due_date = self.validated_due_date()?;
        Some(CreateProjectInput {
            organization_slug: organization_slug.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            due_date,
        })
    }

    pub fn submit_update(&mut self) -> Option<UpdateProjectInput> {
        let due_date = self.validated_due_date()?;
        Some(UpdateProjectInput {
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status),
            due_date,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub content: String,
    pub author_email: String,
    errors: FormErrors,
}

impl CommentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn apply_server_errors(&mut self, errors: &[FieldError]) {
        self.errors.extend_from_server(errors);
    }

    pub fn submit(&mut self, task_id: &str) -> Option<CreateCommentInput> {
        self.errors = validation::validate_comment(&self.content, &self.author_email);
        if !self.errors.is_empty() {
            return None;
        }
        Some(CreateCommentInput {
            task_id: task_id.to_string(),
            content: self.content.clone(),
            author_email: self.author_email.clone(),
        })
    }

    /// Called once a comment has been posted. The email is kept so the next
    /// comment can be written straight away.
    pub fn clear_content(&mut self) {
        self.content.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationForm {
    name: String,
    slug: String,
    pub contact_email: String,
    errors: FormErrors,
    /// First message of the last failed create attempt.
    pub form_error: Option<String>,
}

impl OrganizationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Typing a name regenerates the slug from it.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.slug = validation::normalize_slug(name);
    }

    pub fn set_slug(&mut self, slug: &str) {
        self.slug = slug.to_string();
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn submit(&mut self) -> Option<CreateOrganizationInput> {
        self.form_error = None;
        self.errors = validation::validate_organization(&self.name, &self.slug, &self.contact_email);
        if !self.errors.is_empty() {
            return None;
        }
        Some(CreateOrganizationInput {
            name: self.name.clone(),
            slug: validation::normalize_slug(&self.slug),
            contact_email: self.contact_email.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{COMMENT_REQUIRED, INVALID_EMAIL, TASK_TITLE_REQUIRED};

    #[test]
    fn test_task_form_flow_from_errors_to_valid_input() {
        let mut form = TaskForm::new();
        assert!(form.submit("p1").is_none());
        assert_eq!(form.errors().get("title"), Some(TASK_TITLE_REQUIRED));

        form.title = "Write docs".to_string();
        form.assignee_email = "not-an-email".to_string();
        assert!(form.submit("p1").is_none());
        assert_eq!(form.errors().get("assigneeEmail"), Some(INVALID_EMAIL));
        assert!(form.errors().get("title").is_none());

        form.assignee_email = "dev@example.com".to_string();
        form.due_date = "2025-07-04".to_string();
        let input = form.submit("p1").unwrap();

        assert!(form.errors().is_empty());
        assert_eq!(input.project_id, "p1");
        assert_eq!(input.title, "Write docs");
        assert_eq!(input.status, TaskStatus::Todo);
        assert_eq!(input.assignee_email.as_deref(), Some("dev@example.com"));
        assert_eq!(
            input.due_date.unwrap().to_rfc3339(),
            "2025-07-04T00:00:00+00:00"
        );
    }

    #[test]
    fn test_task_form_sends_empty_optionals_as_absent() {
        let mut form = TaskForm::new();
        form.title = "Write docs".to_string();

        let input = form.submit("p1").unwrap();

        assert!(input.assignee_email.is_none());
        assert!(input.due_date.is_none());
    }

    #[test]
    fn test_task_form_rejects_malformed_date() {
        let mut form = TaskForm::new();
        form.title = "Write docs".to_string();
        form.due_date = "04/07/2025".to_string();

        assert!(form.submit("p1").is_none());
        assert_eq!(form.errors().get("dueDate"), Some(validation::INVALID_DATE));
    }

    #[test]
    fn test_project_form_requires_name() {
        let mut form = ProjectForm::new();
        assert!(form.submit("demo-org").is_none());

        form.name = "Website".to_string();
        form.due_date = "2025-12-31".to_string();
        let input = form.submit("demo-org").unwrap();
        assert_eq!(input.organization_slug, "demo-org");
        assert_eq!(input.status, ProjectStatus::Active);
        assert_eq!(input.due_date, NaiveDate::from_ymd_opt(2025, 12, 31));
    }

    #[test]
    fn test_comment_form_keeps_email_after_clear() {
        let mut form = CommentForm::new();
        assert!(form.submit("t1").is_none());
        assert_eq!(form.errors().get("content"), Some(COMMENT_REQUIRED));

        form.content = "Looks good".to_string();
        form.author_email = "a@b.com".to_string();
        let input = form.submit("t1").unwrap();
        assert_eq!(input.content, "Looks good");

        form.clear_content();
        assert_eq!(form.content, "");
        assert_eq!(form.author_email, "a@b.com");
    }

    #[test]
    fn test_organization_form_derives_slug_from_name() {
        let mut form = OrganizationForm::new();
        form.set_name("Acme Corp");
        assert_eq!(form.slug(), "acme-corp");

        form.set_slug("Acme Labs");
        form.contact_email = "ops@acme.io".to_string();
        let input = form.submit().unwrap();
        assert_eq!(input.slug, "acme-labs");
        assert_eq!(input.name, "Acme Corp");
    }
}
