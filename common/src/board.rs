// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! The task board: three status lanes, task cards, and the two ways a task
//! can change lane (a status button on the card, or a drag and drop).
//!
//! The board never owns or edits tasks. Both input paths end in the single
//! `on_status_change` callback supplied by the owner, who performs the
//! mutation and hands the board a fresh task list afterwards.

use chrono::{DateTime, Utc};

use crate::gesture::{Gesture, GestureRecognizer, Point};
use crate::{Task, TaskStatus};

/// Opacity of a card while it is being dragged.
pub const DRAGGING_OPACITY: f32 = 0.5;

/// Shown in a lane that has no tasks.
pub const EMPTY_LANE_PLACEHOLDER: &str = "No tasks";

/// The tasks of one status, in the order they appear in the source list.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Splits `tasks` into one lane per status, in board display order.
pub fn partition(tasks: &[Task]) -> [Lane<'_>; 3] {
    TaskStatus::ALL.map(|status| Lane {
        status,
        tasks: tasks.iter().filter(|task| task.status == status).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, delta: Point) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }
}

/// Something a dragged card can be released over.
///
/// Lanes and cards live in separate variants, so a task id can never be
/// mistaken for a lane name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DropTarget {
    Lane(TaskStatus),
    Card(String),
}

/// Measured positions of the lane drop areas and of every rendered card.
/// The renderer refreshes it whenever the board is laid out again.
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    lanes: Vec<(TaskStatus, Rect)>,
    cards: Vec<(String, Rect)>,
}

impl BoardLayout {
    pub fn set_lane(&mut self, status: TaskStatus, rect: Rect) {
        match self.lanes.iter_mut().find(|(s, _)| *s == status) {
            Some(entry) => entry.1 = rect,
            None => self.lanes.push((status, rect)),
        }
    }

    pub fn set_card(&mut self, task_id: &str, rect: Rect) {
        match self.cards.iter_mut().find(|(id, _)| id == task_id) {
            Some(entry) => entry.1 = rect,
            None => self.cards.push((task_id.to_string(), rect)),
        }
    }

    pub fn remove_card(&mut self, task_id: &str) {
        self.cards.retain(|(id, _)| id != task_id);
    }

    pub fn card(&self, task_id: &str) -> Option<Rect> {
        self.cards
            .iter()
            .find(|(id, _)| id == task_id)
            .map(|(_, rect)| *rect)
    }

    /// The drop target whose center is nearest to the center of `dragged`.
    /// The card being dragged is never its own target. Ties go to the
    /// target registered first, lanes before cards.
    pub fn closest_center(&self, dragged: Rect, active_id: &str) -> Option<DropTarget> {
        let center = dragged.center();
        let lanes = self
            .lanes
            .iter()
            .map(|(status, rect)| (DropTarget::Lane(*status), rect));
        let cards = self
            .cards
            .iter()
            .filter(|(id, _)| id != active_id)
            .map(|(id, rect)| (DropTarget::Card(id.clone()), rect));

        let mut best: Option<(DropTarget, f64)> = None;
        for (target, rect) in lanes.chain(cards) {
            let distance = center.distance_to(rect.center());
            if best.as_ref().is_none_or(|(_, d)| distance < *d) {
                best = Some((target, distance));
            }
        }
        best.map(|(target, _)| target)
    }
}

/// Transient drag-interaction state. It outlives a single render, so the
/// owner keeps it and lends it to each `TaskBoard` it builds.
#[derive(Debug, Clone, Default)]
pub struct DragContext {
    recognizer: GestureRecognizer<String>,
    layout: BoardLayout,
    over: Option<DropTarget>,
}

impl DragContext {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            recognizer: GestureRecognizer::new(activation_distance),
            ..Default::default()
        }
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut BoardLayout {
        &mut self.layout
    }

    pub fn dragging(&self) -> Option<&str> {
        self.recognizer.dragging().map(String::as_str)
    }

    pub fn over(&self) -> Option<&DropTarget> {
        self.over.as_ref()
    }

    fn resolve(&self, task_id: &str, delta: Point) -> Option<DropTarget> {
        let origin = self.layout.card(task_id)?;
        self.layout.closest_center(origin.translated(delta), task_id)
    }
}

/// A "move to" button on a card.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusButton {
    pub status: TaskStatus,
    pub label: &'static str,
    pub title: String,
    /// Set on the button matching the task's current status.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView<'a> {
    pub task: &'a Task,
    pub opacity: f32,
    pub is_dragging: bool,
    pub buttons: Vec<StatusButton>,
    pub assignee_name: Option<&'a str>,
    pub assignee_initial: Option<char>,
    pub due_date: Option<DateTime<Utc>>,
}

impl<'a> CardView<'a> {
    fn new(task: &'a Task, is_dragging: bool) -> Self {
        let buttons = TaskStatus::ALL
            .iter()
            .map(|status| StatusButton {
                status: *status,
                label: status.label(),
                title: format!("Move to {}", status.label()),
                active: task.status == *status,
            })
            .collect();
        let assignee = task.assignee_email.as_deref().filter(|e| !e.is_empty());

        Self {
            task,
            opacity: if is_dragging { DRAGGING_OPACITY } else { 1.0 },
            is_dragging,
            buttons,
            assignee_name: assignee.map(|email| email.split('@').next().unwrap_or(email)),
            assignee_initial: assignee
                .and_then(|email| email.chars().next())
                .and_then(|c| c.to_uppercase().next()),
            due_date: task.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaneView<'a> {
    pub status: TaskStatus,
    pub title: &'static str,
    pub cards: Vec<CardView<'a>>,
    /// Set while a dragged card hovers this lane's drop area.
    pub is_over: bool,
}

impl LaneView<'_> {
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.cards.is_empty().then_some(EMPTY_LANE_PLACEHOLDER)
    }
}

/// Renders the three lanes, reading (never changing) the drag state.
pub fn lane_views<'a>(tasks: &'a [Task], drag: &DragContext) -> Vec<LaneView<'a>> {
    let dragging = drag.dragging();
    partition(tasks)
        .into_iter()
        .map(|lane| LaneView {
            status: lane.status,
            title: lane.status.label(),
            is_over: drag.over == Some(DropTarget::Lane(lane.status)),
            cards: lane
                .tasks
                .into_iter()
                .map(|task| CardView::new(task, dragging == Some(task.id.as_str())))
                .collect(),
        })
        .collect()
}

/// One render of the board over a task list.
pub struct TaskBoard<'a, S, C>
where
    S: FnMut(&str, TaskStatus),
    C: FnMut(&Task),
{
    tasks: &'a [Task],
    drag: &'a mut DragContext,
    on_status_change: S,
    on_task_click: C,
}

impl<'a, S, C> TaskBoard<'a, S, C>
where
    S: FnMut(&str, TaskStatus),
    C: FnMut(&Task),
{
    pub fn new(tasks: &'a [Task], drag: &'a mut DragContext, on_status_change: S, on_task_click: C) -> Self {
        Self {
            tasks,
            drag,
            on_status_change,
            on_task_click,
        }
    }

    pub fn lanes(&self) -> Vec<LaneView<'a>> {
        lane_views(self.tasks, &*self.drag)
    }

    /// Asks the owner to move a task to `status`. Nothing happens when the
    /// task is unknown or already has that status.
    pub fn request_status_change(&mut self, task_id: &str, status: TaskStatus) {
        let Some(task) = self.tasks.iter().find(|t| t.id == task_id) else {
            return;
        };
        if task.status == status {
            return;
        }
        (self.on_status_change)(task_id, status);
    }

    pub fn pointer_down(&mut self, task_id: &str, at: Point) {
        self.drag.over = None;
        self.drag.recognizer.press(task_id.to_string(), at);
    }

    pub fn pointer_move(&mut self, at: Point) {
        self.drag.recognizer.move_to(at);
        let hovered = match (self.drag.recognizer.dragging(), self.drag.recognizer.drag_delta()) {
            (Some(task_id), Some(delta)) => self.drag.resolve(task_id, delta),
            _ => None,
        };
        self.drag.over = hovered;
    }

    pub fn pointer_up(&mut self, at: Point) {
        let gesture = self.drag.recognizer.release(at);
        self.drag.over = None;

        match gesture {
            Some(Gesture::Click(task_id)) => {
                if let Some(task) = self.tasks.iter().find(|t| t.id == task_id) {
                    (self.on_task_click)(task);
                }
            }
            Some(Gesture::Drop { target, delta }) => {
                if let Some(DropTarget::Lane(status)) = self.drag.resolve(&target, delta) {
                    self.request_status_change(&target, status);
                }
            }
            None => {}
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.drag.recognizer.cancel();
        self.drag.over = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            status,
            assignee_email: None,
            due_date: None,
            created_at: Utc::now(),
            comments: None,
        }
    }

    /// Three 280px wide lanes side by side, with each task stacked in its lane.
    fn layout_for(tasks: &[Task]) -> DragContext {
        let mut drag = DragContext::default();
        for (column, lane) in partition(tasks).iter().enumerate() {
            let x = column as f64 * 300.0;
            drag.layout_mut()
                .set_lane(lane.status, Rect::new(x, 0.0, 280.0, 600.0));
            for (row, task) in lane.tasks.iter().enumerate() {
                drag.layout_mut().set_card(
                    &task.id,
                    Rect::new(x + 10.0, 10.0 + row as f64 * 90.0, 260.0, 80.0),
                );
            }
        }
        drag
    }

    #[test]
    fn test_partition_places_every_task_in_its_status_lane_once() {
        let tasks = vec![
            task("1", TaskStatus::Done),
            task("2", TaskStatus::Todo),
            task("3", TaskStatus::InProgress),
            task("4", TaskStatus::Todo),
            task("5", TaskStatus::Done),
        ];

        let lanes = partition(&tasks);

        assert_eq!(
            lanes.iter().map(|l| l.status).collect::<Vec<_>>(),
            TaskStatus::ALL.to_vec()
        );
        for t in &tasks {
            let holding: Vec<_> = lanes
                .iter()
                .filter(|lane| lane.tasks.iter().any(|lt| lt.id == t.id))
                .collect();
            assert_eq!(holding.len(), 1);
            assert_eq!(holding[0].status, t.status);
        }
        // Source order is kept inside a lane.
        let todo_ids: Vec<_> = lanes[0].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(todo_ids, vec!["2", "4"]);
        let done_ids: Vec<_> = lanes[2].tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(done_ids, vec!["1", "5"]);
    }

    #[test]
    fn test_done_button_on_todo_task_fires_once() {
        let tasks = vec![task("t1", TaskStatus::Todo)];
        let mut drag = DragContext::default();
        let mut calls = Vec::new();

        let mut board = TaskBoard::new(
            &tasks,
            &mut drag,
            |id: &str, status| calls.push((id.to_string(), status)),
            |_: &Task| {},
        );
        board.request_status_change("t1", TaskStatus::Done);
        drop(board);

        assert_eq!(calls, vec![("t1".to_string(), TaskStatus::Done)]);
    }

    #[test]
    fn test_button_for_current_status_is_a_no_op() {
        let tasks = vec![task("t1", TaskStatus::InProgress)];
        let mut drag = DragContext::default();
        let mut calls = 0;

        let mut board = TaskBoard::new(&tasks, &mut drag, |_: &str, _| calls += 1, |_: &Task| {});
        board.request_status_change("t1", TaskStatus::InProgress);
        board.request_status_change("missing", TaskStatus::Done);
        drop(board);

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_drop_on_own_lane_never_fires() {
        let tasks = vec![task("t1", TaskStatus::InProgress)];
        let mut drag = layout_for(&tasks);
        let mut calls = 0;

        let mut board = TaskBoard::new(&tasks, &mut drag, |_: &str, _| calls += 1, |_: &Task| {});
        board.pointer_down("t1", Point::new(440.0, 50.0));
        board.pointer_move(Point::new(440.0, 250.0));
        board.pointer_up(Point::new(440.0, 300.0));
        drop(board);

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_drop_on_other_lane_fires_with_that_lane() {
        let tasks = vec![task("t1", TaskStatus::Todo)];
        let mut drag = layout_for(&tasks);
        let mut calls = Vec::new();
        let mut clicks = 0;

        let mut board = TaskBoard::new(
            &tasks,
            &mut drag,
            |id: &str, status| calls.push((id.to_string(), status)),
            |_: &Task| clicks += 1,
        );
        board.pointer_down("t1", Point::new(140.0, 50.0));
        board.pointer_move(Point::new(740.0, 300.0));
        board.pointer_up(Point::new(740.0, 300.0));
        drop(board);

        assert_eq!(calls, vec![("t1".to_string(), TaskStatus::Done)]);
        assert_eq!(clicks, 0);
    }

    #[test]
    fn test_press_and_release_opens_detail_without_status_change() {
        let tasks = vec![task("t1", TaskStatus::Todo)];
        let mut drag = layout_for(&tasks);
        let mut calls = 0;
        let mut opened = Vec::new();

        let mut board = TaskBoard::new(
            &tasks,
            &mut drag,
            |_: &str, _| calls += 1,
            |t: &Task| opened.push(t.id.clone()),
        );
        board.pointer_down("t1", Point::new(140.0, 50.0));
        board.pointer_move(Point::new(143.0, 54.0));
        board.pointer_up(Point::new(143.0, 54.0));
        drop(board);

        assert_eq!(calls, 0);
        assert_eq!(opened, vec!["t1".to_string()]);
    }

    #[test]
    fn test_drop_without_any_target_is_a_no_op() {
        let tasks = vec![task("t1", TaskStatus::Todo)];
        // Nothing measured yet.
        let mut drag = DragContext::default();
        let mut calls = 0;

        let mut board = TaskBoard::new(&tasks, &mut drag, |_: &str, _| calls += 1, |_: &Task| {});
        board.pointer_down("t1", Point::new(0.0, 0.0));
        board.pointer_move(Point::new(500.0, 0.0));
        board.pointer_up(Point::new(500.0, 0.0));
        drop(board);

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_drop_closest_to_a_card_is_a_no_op() {
        let tasks = vec![task("t1", TaskStatus::Todo), task("t2", TaskStatus::Done)];
        let mut drag = layout_for(&tasks);
        let mut calls = 0;

        let mut board = TaskBoard::new(&tasks, &mut drag, |_: &str, _| calls += 1, |_: &Task| {});
        // Move t1's card right on top of t2's card.
        board.pointer_down("t1", Point::new(140.0, 50.0));
        board.pointer_move(Point::new(740.0, 50.0));
        board.pointer_up(Point::new(740.0, 50.0));
        drop(board);

        assert_eq!(calls, 0);
    }

    #[test]
    fn test_dragging_dims_card_and_highlights_hovered_lane() {
        let tasks = vec![task("t1", TaskStatus::Todo), task("t2", TaskStatus::Todo)];
        let mut drag = layout_for(&tasks);

        let mut board = TaskBoard::new(&tasks, &mut drag, |_: &str, _| {}, |_: &Task| {});
        board.pointer_down("t1", Point::new(140.0, 50.0));
        board.pointer_move(Point::new(440.0, 300.0));
        let lanes = board.lanes();

        assert!(!lanes[0].is_over);
        assert!(lanes[1].is_over);
        assert!(!lanes[2].is_over);
        assert_eq!(lanes[0].cards[0].opacity, DRAGGING_OPACITY);
        assert_eq!(lanes[0].cards[1].opacity, 1.0);

        board.pointer_cancel();
        let lanes = board.lanes();
        assert!(lanes.iter().all(|l| !l.is_over));
        assert!(lanes[0].cards.iter().all(|c| c.opacity == 1.0));
    }

    #[test]
    fn test_card_view_details() {
        let mut t = task("t1", TaskStatus::InProgress);
        t.assignee_email = Some("jane.doe@example.com".to_string());
        let tasks = vec![t];
        let mut drag = DragContext::default();

        let board = TaskBoard::new(&tasks, &mut drag, |_: &str, _| {}, |_: &Task| {});
        let lanes = board.lanes();
        let card = &lanes[1].cards[0];

        assert_eq!(card.assignee_name, Some("jane.doe"));
        assert_eq!(card.assignee_initial, Some('J'));
        let active: Vec<_> = card.buttons.iter().filter(|b| b.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].status, TaskStatus::InProgress);
        assert_eq!(card.buttons[2].title, "Move to Done");
        assert_eq!(lanes[0].placeholder(), Some(EMPTY_LANE_PLACEHOLDER));
        assert_eq!(lanes[1].count(), 1);
    }

    #[test]
    fn test_assignee_initial_uppercases_non_ascii_letters() {
        let mut t = task("t1", TaskStatus::Todo);
        t.assignee_email = Some("élodie@example.com".to_string());
        let tasks = vec![t];
        let drag = DragContext::default();

        let lanes = lane_views(&tasks, &drag);
        let card = &lanes[0].cards[0];

        assert_eq!(card.assignee_initial, Some('É'));
        assert_eq!(card.assignee_name, Some("élodie"));
    }
}
