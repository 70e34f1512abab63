// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::Organization;
use common::forms::OrganizationForm;
use tracing::{info, warn};

use super::QueryState;
use crate::api::{ApiClient, MutationOutcome};

/// Organization switcher with its inline "new organization" form.
pub struct Sidebar {
    api: ApiClient,
    organizations: QueryState<Vec<Organization>>,
    form_open: bool,
    form: OrganizationForm,
}

impl Sidebar {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            organizations: QueryState::default(),
            form_open: false,
            form: OrganizationForm::new(),
        }
    }

    pub fn organizations(&self) -> &QueryState<Vec<Organization>> {
        &self.organizations
    }

    pub fn current_slug(&self) -> String {
        self.api.organizations_store().current()
    }

    pub async fn load(&mut self) {
        self.organizations.start();
        let result = self.api.organizations().await;
        self.organizations.finish(result);
    }

    /// Makes `slug` the current organization for every view.
    pub fn select(&self, slug: &str) {
        self.api.organizations_store().set(slug);
    }

    pub fn is_form_open(&self) -> bool {
        self.form_open
    }

    pub fn toggle_form(&mut self) {
        self.form_open = !self.form_open;
        if !self.form_open {
            self.form.reset();
        }
    }

    pub fn form(&self) -> &OrganizationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut OrganizationForm {
        &mut self.form
    }

    /// Creates the organization and switches to it. A server refusal shows
    /// its first message above the form.
    pub async fn submit_organization(&mut self) -> bool {
        let Some(input) = self.form.submit() else {
            return false;
        };

        match self.api.create_organization(&input).await {
            Ok(MutationOutcome::Ok(organization)) => {
                info!("Created organization {}", organization.slug);
                self.select(&organization.slug);
                self.form_open = false;
                self.form.reset();
                self.load().await;
                true
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                self.form.form_error = errors.first().map(|e| e.message.clone());
                false
            }
            Err(e) => {
                warn!("Creating organization failed: {}", e);
                self.form.form_error = Some(e.to_string());
                false
            }
        }
    }
}
