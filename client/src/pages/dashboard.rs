// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::Utc;
use common::forms::ProjectForm;
use common::optimistic::Optimistic;
use common::{CreateProjectInput, Project, ProjectFilter};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::QueryState;
use crate::api::{ApiClient, MutationOutcome};
use crate::error::ApiError;

/// Id given to a project that exists only locally until the server confirms it.
pub const OPTIMISTIC_PROJECT_ID: &str = "temp-id";

fn optimistic_project(input: &CreateProjectInput) -> Project {
    Project {
        id: OPTIMISTIC_PROJECT_ID.to_string(),
        name: input.name.clone(),
        description: input.description.clone(),
        status: input.status,
        due_date: input.due_date,
        created_at: Utc::now(),
        task_count: 0,
        completed_tasks: 0,
    }
}

/// The project list of the current organization, plus the "new project" dialog.
pub struct Dashboard {
    api: ApiClient,
    organization: watch::Receiver<String>,
    organization_slug: String,
    filter: ProjectFilter,
    projects: QueryState<Vec<Project>>,
    created: Option<Optimistic<Project>>,
    modal_open: bool,
    /// Id of the project the dialog edits; `None` while creating.
    editing: Option<String>,
    form: ProjectForm,
    creating: bool,
}

impl Dashboard {
    /// Starts listening for organization switches straight away.
    pub fn new(api: ApiClient) -> Self {
        let mut organization = api.organizations_store().subscribe();
        let organization_slug = organization.borrow_and_update().clone();
        Self {
            api,
            organization,
            organization_slug,
            filter: ProjectFilter::default(),
            projects: QueryState::default(),
            created: None,
            modal_open: false,
            editing: None,
            form: ProjectForm::new(),
            creating: false,
        }
    }

    pub fn organization_slug(&self) -> &str {
        &self.organization_slug
    }

    pub fn state(&self) -> &QueryState<Vec<Project>> {
        &self.projects
    }

    /// Confirmed projects, followed by the one being created if the server
    /// has not answered yet.
    pub fn projects(&self) -> Vec<Project> {
        let mut projects = self.projects.data.clone().unwrap_or_default();
        if let Some(project) = self.created.as_ref().and_then(Optimistic::value) {
            if !projects.iter().any(|p| p.id == project.id) {
                projects.push(project.clone());
            }
        }
        projects
    }

    /// Set when the last create attempt could not reach the server.
    pub fn create_error(&self) -> Option<&str> {
        self.created.as_ref().and_then(Optimistic::error)
    }

    pub async fn load(&mut self) {
        debug!("Loading projects for organization '{}'", self.organization_slug);
        self.projects.start();
        let result = self.api.projects(&self.organization_slug, &self.filter).await;
        self.projects.finish(result);
    }

    pub async fn set_filter(&mut self, filter: ProjectFilter) {
        self.filter = filter;
        self.load().await;
    }

    /// Picks up a switch made since the last call, if any, and refetches.
    pub async fn sync_organization(&mut self) -> bool {
        if !self.organization.has_changed().unwrap_or(false) {
            return false;
        }
        self.adopt_organization().await;
        true
    }

    /// Waits for the next switch and refetches. Returns false once the
    /// store is gone.
    pub async fn next_organization_change(&mut self) -> bool {
        if self.organization.changed().await.is_err() {
            return false;
        }
        self.adopt_organization().await;
        true
    }

    async fn adopt_organization(&mut self) {
        self.organization_slug = self.organization.borrow_and_update().clone();
        info!("Dashboard switching to organization '{}'", self.organization_slug);
        self.load().await;
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn open_create_modal(&mut self) {
        if self.editing.take().is_some() {
            self.form = ProjectForm::new();
        }
        self.modal_open = true;
    }

    /// Opens the dialog pre-filled with `project`; submitting saves it.
    pub fn edit_project(&mut self, project: &Project) {
        self.editing = Some(project.id.clone());
        self.form = ProjectForm::from_project(project);
        self.modal_open = true;
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn close_create_modal(&mut self) {
        self.modal_open = false;
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn form(&self) -> &ProjectForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProjectForm {
        &mut self.form
    }

    /// Validates the form and, when it passes, shows the project as pending.
    /// The returned input is what to send; `finish_submit` takes the answer.
    pub fn begin_submit(&mut self) -> Option<CreateProjectInput> {
        let input = self.form.submit(&self.organization_slug)?;
        self.created = Some(Optimistic::pending(optimistic_project(&input)));
        self.creating = true;
        Some(input)
    }

    /// Settles the pending project. Returns true when it was created.
    pub async fn finish_submit(
        &mut self,
        result: Result<MutationOutcome<Project>, ApiError>,
    ) -> bool {
        self.creating = false;
        let pending = self.created.take();
        match result {
            Ok(MutationOutcome::Ok(project)) => {
                info!("Created project {} ({})", project.name, project.id);
                self.created = pending.map(|p| p.confirm(project));
                self.modal_open = false;
                self.form = ProjectForm::new();
                self.load().await;
                if self.projects.error.is_none() {
                    // The refetched list now carries the project itself.
                    self.created = None;
                }
                true
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                self.form.apply_server_errors(&errors);
                false
            }
            Err(e) => {
                warn!("Project creation failed: {}", e);
                self.created = pending.map(|p| p.fail(e.to_string()));
                false
            }
        }
    }

    async fn save_project(&mut self, id: String) -> bool {
        let Some(input) = self.form.submit_update() else {
            return false;
        };
        match self.api.update_project(&id, &input).await {
            Ok(MutationOutcome::Ok(project)) => {
                info!("Updated project {} ({})", project.name, project.id);
                self.editing = None;
                self.modal_open = false;
                self.form = ProjectForm::new();
                self.load().await;
                true
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                self.form.apply_server_errors(&errors);
                false
            }
            Err(e) => {
                self.projects.error = Some(e.to_string());
                false
            }
        }
    }

    pub async fn delete_project(&mut self, id: &str) -> bool {
        match self.api.delete_project(id).await {
            Ok(MutationOutcome::Ok(true)) => {
                info!("Deleted project {}", id);
                self.load().await;
                true
            }
            Ok(MutationOutcome::Ok(false)) => {
                warn!("Project {} was not deleted", id);
                self.projects.error = Some(format!("Project {} could not be deleted", id));
                false
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                self.projects.error = errors.first().map(|e| e.message.clone());
                false
            }
            Err(e) => {
                self.projects.error = Some(e.to_string());
                false
            }
        }
    }

    /// Submits the project dialog: saves the edited project, or creates a
    /// new one. Returns true when the server accepted it.
    pub async fn submit_project(&mut self) -> bool {
        if let Some(id) = self.editing.clone() {
            return self.save_project(id).await;
        }
        let Some(input) = self.begin_submit() else {
            return false;
        };
        let result = self.api.create_project(&input).await;
        self.finish_submit(result).await
    }
}
