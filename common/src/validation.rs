// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Client-side form validation. Anything caught here is shown next to its
//! field and never reaches the network.

use std::collections::BTreeMap;

use crate::FieldError;

pub const TASK_TITLE_REQUIRED: &str = "Task title is required";
pub const PROJECT_NAME_REQUIRED: &str = "Project name is required";
pub const COMMENT_REQUIRED: &str = "Comment is required";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const ORGANIZATION_NAME_REQUIRED: &str = "Organization name is required";
pub const SLUG_REQUIRED: &str = "Slug is required";
pub const INVALID_DATE: &str = "Invalid date";

/// Error messages keyed by field name (the API's camelCase field names).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Adds errors reported by the server next to a mutation result.
    /// A later error for the same field replaces an earlier one.
    pub fn extend_from_server(&mut self, errors: &[FieldError]) {
        for error in errors {
            self.insert(&error.field, &error.message);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl From<&[FieldError]> for FormErrors {
    fn from(errors: &[FieldError]) -> Self {
        let mut form_errors = FormErrors::new();
        form_errors.extend_from_server(errors);
        form_errors
    }
}

/// The only shape check the dashboard makes on an email address.
pub fn looks_like_email(value: &str) -> bool {
    value.contains('@')
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Lowercases a slug and turns each run of whitespace into a single dash.
pub fn normalize_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut in_whitespace = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }
    slug
}

pub fn validate_task(title: &str, assignee_email: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    if is_blank(title) {
        errors.insert("title", TASK_TITLE_REQUIRED);
    }
    // The assignee is optional; only a filled-in value is checked.
    if !assignee_email.is_empty() && !looks_like_email(assignee_email) {
        errors.insert("assigneeEmail", INVALID_EMAIL);
    }
    errors
}

pub fn validate_comment(content: &str, author_email: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    if is_blank(content) {
        errors.insert("content", COMMENT_REQUIRED);
    }
    if is_blank(author_email) {
        errors.insert("authorEmail", EMAIL_REQUIRED);
    } else if !looks_like_email(author_email) {
        errors.insert("authorEmail", INVALID_EMAIL);
    }
    errors
}

pub fn validate_project(name: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    if is_blank(name) {
        errors.insert("name", PROJECT_NAME_REQUIRED);
    }
    errors
}

pub fn validate_organization(name: &str, slug: &str, contact_email: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    if is_blank(name) {
        errors.insert("name", ORGANIZATION_NAME_REQUIRED);
    }
    if is_blank(slug) {
        errors.insert("slug", SLUG_REQUIRED);
    }
    if is_blank(contact_email) {
        errors.insert("contactEmail", EMAIL_REQUIRED);
    } else if !looks_like_email(contact_email) {
        errors.insert("contactEmail", INVALID_EMAIL);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_title_is_required() {
        let errors = validate_task("   ", "");
        assert_eq!(errors.get("title"), Some(TASK_TITLE_REQUIRED));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_task_assignee_is_optional_but_checked_when_present() {
        assert!(validate_task("Write docs", "").is_empty());
        assert_eq!(
            validate_task("Write docs", "not-an-email").get("assigneeEmail"),
            Some(INVALID_EMAIL)
        );
        assert!(validate_task("Write docs", "dev@example.com").is_empty());
    }

    #[test]
    fn test_comment_requires_content_and_email() {
        let errors = validate_comment("", "");
        assert_eq!(errors.get("content"), Some(COMMENT_REQUIRED));
        assert_eq!(errors.get("authorEmail"), Some(EMAIL_REQUIRED));

        let errors = validate_comment("Looks good", "nope");
        assert_eq!(errors.get("authorEmail"), Some(INVALID_EMAIL));
        assert!(errors.get("content").is_none());
    }

    #[test]
    fn test_organization_rules() {
        let errors = validate_organization("", "", "");
        assert_eq!(errors.len(), 3);
        let errors = validate_organization("Acme", "acme", "acme.com");
        assert_eq!(errors.get("contactEmail"), Some(INVALID_EMAIL));
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Acme  Corp Labs"), "acme-corp-labs");
        assert_eq!(normalize_slug("demo-org"), "demo-org");
    }

    #[test]
    fn test_server_errors_merge_into_form_errors() {
        let mut errors = validate_project("");
        errors.extend_from_server(&[FieldError {
            field: "dueDate".to_string(),
            message: "Due date is in the past".to_string(),
        }]);

        assert_eq!(errors.get("name"), Some(PROJECT_NAME_REQUIRED));
        assert_eq!(errors.get("dueDate"), Some("Due date is in the past"));
    }
}
