// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Page-level view models. A renderer reads their state and calls their
//! methods in response to user events; they own no markup.
pub mod dashboard;
pub mod project_detail;
pub mod sidebar;

pub use dashboard::Dashboard;
pub use project_detail::ProjectDetail;
pub use sidebar::Sidebar;

use crate::error::ApiError;

/// State of one remote query as the views see it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub loading: bool,
    pub data: Option<T>,
    /// Shown in the view's error area. The previous data is kept.
    pub error: Option<String>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            data: None,
            error: None,
        }
    }
}

impl<T> QueryState<T> {
    pub fn start(&mut self) {
        self.loading = true;
    }

    pub fn finish(&mut self, result: Result<T, ApiError>) {
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}
