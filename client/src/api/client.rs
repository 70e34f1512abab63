// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::Arc;

use common::{
    Comment, CreateCommentInput, CreateOrganizationInput, CreateProjectInput, CreateTaskInput,
    FieldError, Organization, Project, ProjectFilter, ProjectStatistics, Task, TaskFilter,
    UpdateProjectInput, UpdateTaskInput,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, error, info};

use super::documents;
use crate::error::ApiError;
use crate::org_store::OrganizationStore;

/// Header carrying the tenant on every HTTP request.
pub const ORGANIZATION_HEADER: &str = "X-Organization-Slug";

/// Result of a mutation that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome<T> {
    Ok(T),
    /// The server refused the input and said which fields were wrong.
    FieldErrors(Vec<FieldError>),
}

impl<T> MutationOutcome<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::FieldErrors(_) => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlMessage>,
}

#[derive(Deserialize)]
struct GraphQlMessage {
    message: String,
}

/// Query variables with unset optional arguments left out entirely.
fn filter_variables(mut base: Map<String, Value>, status: Option<&str>, search: Option<&str>) -> Value {
    if let Some(status) = status {
        base.insert("status".to_string(), json!(status));
    }
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        base.insert("search".to_string(), json!(search));
    }
    Value::Object(base)
}

fn decode<T: DeserializeOwned>(operation: &'static str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode { operation, source })
}

/// Splits a mutation payload (`{ <entity>: ..., errors: [...] }`) into the
/// entity or the field errors that came with it.
fn mutation_outcome<T: DeserializeOwned>(
    operation: &'static str,
    mut payload: Value,
    entity: &str,
) -> Result<MutationOutcome<T>, ApiError> {
    let errors: Vec<FieldError> = match payload.get_mut("errors").map(Value::take) {
        Some(Value::Null) | None => Vec::new(),
        Some(errors) => decode(operation, errors)?,
    };
    if !errors.is_empty() {
        return Ok(MutationOutcome::FieldErrors(errors));
    }
    match payload.get_mut(entity).map(Value::take) {
        Some(Value::Null) | None => Err(ApiError::MissingData { operation }),
        Some(value) => Ok(MutationOutcome::Ok(decode(operation, value)?)),
    }
}

/// Client for the remote GraphQL API.
///
/// Cheap to clone; clones share the connection pool and the organization
/// store that scopes every request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoint: String,
    organizations: Arc<OrganizationStore>,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>, organizations: Arc<OrganizationStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            organizations,
        }
    }

    pub fn organizations_store(&self) -> &Arc<OrganizationStore> {
        &self.organizations
    }

    /// Runs one operation and hands `data.<field>` to `parse`.
    ///
    /// This is the single place API failures are logged, decode failures
    /// included; none are retried.
    async fn execute<T>(
        &self,
        operation: &'static str,
        document: &str,
        variables: Value,
        field: &str,
        parse: impl FnOnce(Value) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let result = self
            .send(operation, document, variables, field)
            .await
            .and_then(parse);
        if let Err(e) = &result {
            error!("[{}] {}", operation, e);
        }
        result
    }

    async fn send(
        &self,
        operation: &'static str,
        document: &str,
        variables: Value,
        field: &str,
    ) -> Result<Value, ApiError> {
        let slug = self.organizations.current();
        debug!("Sending {} for organization '{}'", operation, slug);

        let response = self
            .http
            .post(&self.endpoint)
            .header(ORGANIZATION_HEADER, slug)
            .json(&GraphQlRequest {
                query: document,
                operation_name: operation,
                variables,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        let body: GraphQlResponse = response.json().await?;
        if !body.errors.is_empty() {
            return Err(ApiError::GraphQl {
                messages: body.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        body.data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .ok_or(ApiError::MissingData { operation })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        document: &str,
        variables: Value,
        field: &str,
    ) -> Result<T, ApiError> {
        self.execute(operation, document, variables, field, |value| {
            decode(operation, value)
        })
        .await
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        document: &str,
        variables: Value,
        field: &str,
        entity: &str,
    ) -> Result<MutationOutcome<T>, ApiError> {
        let outcome = self
            .execute(operation, document, variables, field, |payload| {
                mutation_outcome(operation, payload, entity)
            })
            .await?;
        match &outcome {
            MutationOutcome::Ok(_) => info!("{} succeeded.", operation),
            MutationOutcome::FieldErrors(errors) => {
                info!("{} rejected with {} field error(s).", operation, errors.len())
            }
        }
        Ok(outcome)
    }

    // --- Organizations ---

    pub async fn organizations(&self) -> Result<Vec<Organization>, ApiError> {
        self.query("GetOrganizations", documents::GET_ORGANIZATIONS, json!({}), "organizations")
            .await
    }

    pub async fn create_organization(
        &self,
        input: &CreateOrganizationInput,
    ) -> Result<MutationOutcome<Organization>, ApiError> {
        self.mutate(
            "CreateOrganization",
            documents::CREATE_ORGANIZATION,
            json!({ "input": input }),
            "createOrganization",
            "organization",
        )
        .await
    }

    // --- Projects ---

    pub async fn projects(
        &self,
        organization_slug: &str,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, ApiError> {
        let mut base = Map::new();
        base.insert("organizationSlug".to_string(), json!(organization_slug));
        let variables = filter_variables(
            base,
            filter.status.as_ref().map(|s| s.as_str()),
            filter.search.as_deref(),
        );
        self.query("GetProjects", documents::GET_PROJECTS, variables, "projects")
            .await
    }

    pub async fn project(&self, id: &str) -> Result<Option<Project>, ApiError> {
        self.query("GetProject", documents::GET_PROJECT, json!({ "id": id }), "project")
            .await
    }

    pub async fn project_statistics(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectStatistics>, ApiError> {
        self.query(
            "GetProjectStatistics",
            documents::GET_PROJECT_STATISTICS,
            json!({ "projectId": project_id }),
            "projectStatistics",
        )
        .await
    }

    pub async fn create_project(
        &self,
        input: &CreateProjectInput,
    ) -> Result<MutationOutcome<Project>, ApiError> {
        self.mutate(
            "CreateProject",
            documents::CREATE_PROJECT,
            json!({ "input": input }),
            "createProject",
            "project",
        )
        .await
    }

    pub async fn update_project(
        &self,
        id: &str,
        input: &UpdateProjectInput,
    ) -> Result<MutationOutcome<Project>, ApiError> {
        self.mutate(
            "UpdateProject",
            documents::UPDATE_PROJECT,
            json!({ "id": id, "input": input }),
            "updateProject",
            "project",
        )
        .await
    }

    pub async fn delete_project(&self, id: &str) -> Result<MutationOutcome<bool>, ApiError> {
        self.mutate(
            "DeleteProject",
            documents::DELETE_PROJECT,
            json!({ "id": id }),
            "deleteProject",
            "success",
        )
        .await
    }

    // --- Tasks ---

    pub async fn tasks(&self, project_id: &str, filter: &TaskFilter) -> Result<Vec<Task>, ApiError> {
        let mut base = Map::new();
        base.insert("projectId".to_string(), json!(project_id));
        let variables = filter_variables(
            base,
            filter.status.as_ref().map(|s| s.as_str()),
            filter.search.as_deref(),
        );
        self.query("GetTasks", documents::GET_TASKS, variables, "tasks")
            .await
    }

    /// A single task together with its comments.
    pub async fn task(&self, id: &str) -> Result<Option<Task>, ApiError> {
        self.query("GetTask", documents::GET_TASK, json!({ "id": id }), "task")
            .await
    }

    pub async fn create_task(
        &self,
        input: &CreateTaskInput,
    ) -> Result<MutationOutcome<Task>, ApiError> {
        self.mutate(
            "CreateTask",
            documents::CREATE_TASK,
            json!({ "input": input }),
            "createTask",
            "task",
        )
        .await
    }

    pub async fn update_task(
        &self,
        id: &str,
        input: &UpdateTaskInput,
    ) -> Result<MutationOutcome<Task>, ApiError> {
        self.mutate(
            "UpdateTask",
            documents::UPDATE_TASK,
            json!({ "id": id, "input": input }),
            "updateTask",
            "task",
        )
        .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<MutationOutcome<bool>, ApiError> {
        self.mutate(
            "DeleteTask",
            documents::DELETE_TASK,
            json!({ "id": id }),
            "deleteTask",
            "success",
        )
        .await
    }

    // --- Comments ---

    pub async fn comments(&self, task_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.query(
            "GetComments",
            documents::GET_COMMENTS,
            json!({ "taskId": task_id }),
            "comments",
        )
        .await
    }

    pub async fn create_comment(
        &self,
        input: &CreateCommentInput,
    ) -> Result<MutationOutcome<Comment>, ApiError> {
        self.mutate(
            "CreateComment",
            documents::CREATE_COMMENT,
            json!({ "input": input }),
            "createComment",
            "comment",
        )
        .await
    }
}
