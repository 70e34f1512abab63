// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use common::board::{DragContext, LaneView, TaskBoard, lane_views};
use common::forms::{CommentForm, TaskForm};
use common::gesture::DEFAULT_ACTIVATION_DISTANCE;
use common::optimistic::Optimistic;
use common::{Comment, Project, ProjectStatistics, Task, TaskFilter, TaskStatus, TaskUpdate, UpdateTaskInput};
use tracing::{debug, info, warn};

use super::QueryState;
use crate::api::{ApiClient, MutationOutcome};
use crate::error::ApiError;

/// One project with its task board, the task dialog and the task detail view.
pub struct ProjectDetail {
    api: ApiClient,
    project_id: String,
    project: QueryState<Option<Project>>,
    statistics: QueryState<Option<ProjectStatistics>>,
    tasks: QueryState<Vec<Task>>,
    filter: TaskFilter,
    /// Status changes shown ahead of the server, keyed by task id.
    overrides: Vec<(String, Optimistic<TaskStatus>)>,
    /// Fetched tasks with the overrides laid over them.
    displayed: Vec<Task>,
    drag: DragContext,
    status_requests: Vec<(String, TaskStatus)>,
    opened: Vec<String>,
    task_modal_open: bool,
    editing: Option<String>,
    task_form: TaskForm,
    selected: Option<Task>,
    comments: QueryState<Vec<Comment>>,
    comment_form: CommentForm,
}

impl ProjectDetail {
    pub fn new(api: ApiClient, project_id: impl Into<String>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            project: QueryState::default(),
            statistics: QueryState::default(),
            tasks: QueryState::default(),
            filter: TaskFilter::default(),
            overrides: Vec::new(),
            displayed: Vec::new(),
            drag: DragContext::new(DEFAULT_ACTIVATION_DISTANCE),
            status_requests: Vec::new(),
            opened: Vec::new(),
            task_modal_open: false,
            editing: None,
            task_form: TaskForm::new(),
            selected: None,
            comments: QueryState::default(),
            comment_form: CommentForm::new(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project(&self) -> &QueryState<Option<Project>> {
        &self.project
    }

    pub fn statistics(&self) -> &QueryState<Option<ProjectStatistics>> {
        &self.statistics
    }

    pub fn task_state(&self) -> &QueryState<Vec<Task>> {
        &self.tasks
    }

    /// The tasks as the board shows them, pending status changes included.
    pub fn tasks(&self) -> &[Task] {
        &self.displayed
    }

    /// Loads the project and its tasks side by side.
    pub async fn load(&mut self) {
        debug!("Loading project {}", self.project_id);
        self.project.start();
        self.tasks.start();
        let (project, tasks) = tokio::join!(
            self.api.project(&self.project_id),
            self.api.tasks(&self.project_id, &self.filter)
        );
        self.project.finish(project);
        self.finish_tasks(tasks);
    }

    pub async fn load_statistics(&mut self) {
        self.statistics.start();
        let result = self.api.project_statistics(&self.project_id).await;
        self.statistics.finish(result);
    }

    pub async fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.refetch_tasks().await;
    }

    pub async fn refetch_tasks(&mut self) {
        self.tasks.start();
        let result = self.api.tasks(&self.project_id, &self.filter).await;
        self.finish_tasks(result);
    }

    fn finish_tasks(&mut self, result: Result<Vec<Task>, ApiError>) {
        if result.is_ok() {
            // The fresh list already holds every settled change.
            self.overrides.retain(|(_, status)| status.is_pending());
        }
        self.tasks.finish(result);
        self.refresh_displayed();
    }

    fn refresh_displayed(&mut self) {
        let fetched = self.tasks.data.as_deref().unwrap_or_default();
        self.displayed = fetched
            .iter()
            .map(|task| {
                let status = self
                    .overrides
                    .iter()
                    .find(|(id, _)| *id == task.id)
                    .and_then(|(_, status)| status.value().copied());
                Task {
                    status: status.unwrap_or(task.status),
                    ..task.clone()
                }
            })
            .collect();
    }

    // --- Board ---

    pub fn lanes(&self) -> Vec<LaneView<'_>> {
        lane_views(&self.displayed, &self.drag)
    }

    pub fn drag_mut(&mut self) -> &mut DragContext {
        &mut self.drag
    }

    /// A board over the displayed tasks. Status requests and card clicks it
    /// produces are queued; `flush_board` acts on them.
    pub fn board(
        &mut self,
    ) -> TaskBoard<'_, impl FnMut(&str, TaskStatus) + '_, impl FnMut(&Task) + '_> {
        let Self {
            displayed,
            drag,
            status_requests,
            opened,
            ..
        } = self;
        TaskBoard::new(
            displayed.as_slice(),
            drag,
            move |task_id: &str, status| status_requests.push((task_id.to_string(), status)),
            move |task: &Task| opened.push(task.id.clone()),
        )
    }

    /// Carries out what the board asked for since the last flush.
    pub async fn flush_board(&mut self) {
        for (task_id, status) in std::mem::take(&mut self.status_requests) {
            self.change_task_status(&task_id, status).await;
        }
        if let Some(task_id) = std::mem::take(&mut self.opened).pop() {
            if let Some(task) = self.displayed.iter().find(|t| t.id == task_id).cloned() {
                self.open_task(task).await;
            }
        }
    }

    /// Shows `status` on the task right away. Returns false when the task is
    /// not on the board.
    pub fn begin_status_change(&mut self, task_id: &str, status: TaskStatus) -> bool {
        if !self.displayed.iter().any(|t| t.id == task_id) {
            return false;
        }
        self.overrides.retain(|(id, _)| id != task_id);
        self.overrides
            .push((task_id.to_string(), Optimistic::pending(status)));
        self.refresh_displayed();
        true
    }

    /// Settles a status change started with `begin_status_change`.
    pub async fn finish_status_change(
        &mut self,
        task_id: &str,
        result: Result<MutationOutcome<Task>, ApiError>,
    ) -> bool {
        let position = self.overrides.iter().position(|(id, _)| id == task_id);
        let pending = position.map(|i| self.overrides.remove(i).1);

        match result {
            Ok(MutationOutcome::Ok(task)) => {
                info!("Task {} moved to {}", task.id, task.status);
                if let Some(pending) = pending {
                    self.overrides
                        .push((task_id.to_string(), pending.confirm(task.status)));
                }
                self.refetch_tasks().await;
                true
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                warn!("Status change for task {} refused: {:?}", task_id, errors);
                self.tasks.error = errors.first().map(|e| e.message.clone());
                self.refresh_displayed();
                false
            }
            Err(e) => {
                self.tasks.error = Some(e.to_string());
                self.refresh_displayed();
                false
            }
        }
    }

    pub async fn change_task_status(&mut self, task_id: &str, status: TaskStatus) -> bool {
        if !self.begin_status_change(task_id, status) {
            return false;
        }
        let result = self
            .api
            .update_task(task_id, &UpdateTaskInput::status(status))
            .await;
        self.finish_status_change(task_id, result).await
    }

    // --- Task dialog ---

    pub fn is_task_modal_open(&self) -> bool {
        self.task_modal_open
    }

    pub fn open_new_task(&mut self) {
        self.editing = None;
        self.task_form = TaskForm::new();
        self.task_modal_open = true;
    }

    pub fn edit_task(&mut self, task: &Task) {
        self.editing = Some(task.id.clone());
        self.task_form = TaskForm::from_task(task);
        self.task_modal_open = true;
    }

    pub fn close_task_modal(&mut self) {
        self.task_modal_open = false;
    }

    pub fn task_form(&self) -> &TaskForm {
        &self.task_form
    }

    pub fn task_form_mut(&mut self) -> &mut TaskForm {
        &mut self.task_form
    }

    /// Creates the task, or saves it when the dialog was opened for editing.
    /// Nothing is sent while the form has errors.
    pub async fn submit_task(&mut self) -> bool {
        let result = match self.editing.clone() {
            Some(id) => {
                let Some(input) = self.task_form.submit_update() else {
                    return false;
                };
                self.api.update_task(&id, &input).await
            }
            None => {
                let Some(input) = self.task_form.submit(&self.project_id) else {
                    return false;
                };
                self.api.create_task(&input).await
            }
        };

        match result {
            Ok(MutationOutcome::Ok(task)) => {
                info!("Saved task {} ({})", task.title, task.id);
                self.task_modal_open = false;
                self.editing = None;
                self.task_form = TaskForm::new();
                if self.selected.as_ref().is_some_and(|s| s.id == task.id) {
                    self.selected = Some(task);
                }
                self.refetch_tasks().await;
                true
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                self.task_form.apply_server_errors(&errors);
                false
            }
            Err(e) => {
                warn!("Saving task failed: {}", e);
                self.tasks.error = Some(e.to_string());
                false
            }
        }
    }

    pub async fn delete_task(&mut self, task_id: &str) -> bool {
        match self.api.delete_task(task_id).await {
            Ok(MutationOutcome::Ok(true)) => {
                if self.selected.as_ref().is_some_and(|s| s.id == task_id) {
                    self.close_task();
                }
                self.drag.layout_mut().remove_card(task_id);
                self.refetch_tasks().await;
                true
            }
            Ok(MutationOutcome::Ok(false)) => {
                warn!("Task {} was not deleted", task_id);
                self.tasks.error = Some(format!("Task {} could not be deleted", task_id));
                false
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                warn!("Deleting task {} refused: {:?}", task_id, errors);
                self.tasks.error = errors.first().map(|e| e.message.clone());
                false
            }
            Err(e) => {
                self.tasks.error = Some(e.to_string());
                false
            }
        }
    }

    // --- Task detail ---

    pub fn selected(&self) -> Option<&Task> {
        self.selected.as_ref()
    }

    pub fn comments(&self) -> &QueryState<Vec<Comment>> {
        &self.comments
    }

    pub fn comment_form(&self) -> &CommentForm {
        &self.comment_form
    }

    pub fn comment_form_mut(&mut self) -> &mut CommentForm {
        &mut self.comment_form
    }

    pub async fn open_task(&mut self, task: Task) {
        debug!("Opening task {}", task.id);
        self.comments = QueryState::default();
        self.comments.start();
        let result = self.api.comments(&task.id).await;
        self.selected = Some(task);
        self.comments.finish(result);
    }

    pub fn close_task(&mut self) {
        self.selected = None;
        self.comments = QueryState::default();
        self.comment_form = CommentForm::new();
    }

    /// Posts a comment on the open task. The content is cleared once the
    /// server accepted it; the author email stays.
    pub async fn submit_comment(&mut self) -> bool {
        let Some(task_id) = self.selected.as_ref().map(|t| t.id.clone()) else {
            return false;
        };
        let Some(input) = self.comment_form.submit(&task_id) else {
            return false;
        };

        match self.api.create_comment(&input).await {
            Ok(MutationOutcome::Ok(comment)) => {
                self.comment_form.clear_content();
                self.push_comment(comment);
                true
            }
            Ok(MutationOutcome::FieldErrors(errors)) => {
                self.comment_form.apply_server_errors(&errors);
                false
            }
            Err(e) => {
                self.comments.error = Some(e.to_string());
                false
            }
        }
    }

    fn push_comment(&mut self, comment: Comment) {
        let mut comments = self.comments.data.clone().unwrap_or_default();
        if comments.iter().any(|c| c.id == comment.id) {
            return;
        }
        comments.push(comment);
        self.comments.data = Some(comments);
    }

    // --- Live updates ---

    /// Merges a pushed task change. A task this page has never seen means
    /// the list is stale, so it is fetched again.
    pub async fn apply_task_update(&mut self, update: TaskUpdate) {
        let known = self
            .tasks
            .data
            .as_ref()
            .is_some_and(|tasks| tasks.iter().any(|t| t.id == update.id));
        if !known {
            debug!("Update for unknown task {}, refetching", update.id);
            self.refetch_tasks().await;
            return;
        }

        let tasks = self.tasks.data.as_deref().unwrap_or_default();
        let replaced = tasks
            .iter()
            .map(|t| if t.id == update.id { t.with_update(&update) } else { t.clone() })
            .collect();
        self.tasks.data = Some(replaced);
        if let Some(selected) = self.selected.as_ref().filter(|s| s.id == update.id) {
            self.selected = Some(selected.with_update(&update));
        }
        self.refresh_displayed();
    }

    /// Merges a pushed comment into the open task, ignoring other tasks.
    pub fn apply_comment(&mut self, task_id: &str, comment: Comment) {
        if self.selected.as_ref().is_some_and(|t| t.id == task_id) {
            self.push_comment(comment);
        }
    }
}
