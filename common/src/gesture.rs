// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Pointer gesture recognition.
//!
//! A card listens for both clicks and drags on the same element. A press only
//! becomes a drag once the pointer has travelled further than the activation
//! distance from where it went down; anything shorter is a click.

/// Distance in pixels the pointer must exceed before a press becomes a drag.
pub const DEFAULT_ACTIVATION_DISTANCE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The offset that moves `origin` onto `self`.
    pub fn delta_from(&self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState<T> {
    Idle,
    Pressed { target: T, origin: Point },
    Dragging { target: T, origin: Point, current: Point },
}

/// What a finished gesture turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture<T> {
    Click(T),
    Drop { target: T, delta: Point },
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer<T> {
    activation_distance: f64,
    state: GestureState<T>,
}

impl<T: Clone> Default for GestureRecognizer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVATION_DISTANCE)
    }
}

impl<T: Clone> GestureRecognizer<T> {
    pub fn new(activation_distance: f64) -> Self {
        Self {
            activation_distance,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState<T> {
        &self.state
    }

    /// The target currently being dragged, if the threshold has been crossed.
    pub fn dragging(&self) -> Option<&T> {
        match &self.state {
            GestureState::Dragging { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Pointer offset since the press, only while dragging.
    pub fn drag_delta(&self) -> Option<Point> {
        match &self.state {
            GestureState::Dragging {
                origin, current, ..
            } => Some(current.delta_from(*origin)),
            _ => None,
        }
    }

    /// Starts a new gesture. Any gesture in flight is discarded.
    pub fn press(&mut self, target: T, at: Point) {
        self.state = GestureState::Pressed { target, origin: at };
    }

    /// Returns true when this move started the drag.
    pub fn move_to(&mut self, at: Point) -> bool {
        match &mut self.state {
            GestureState::Idle => false,
            GestureState::Pressed { target, origin } => {
                if at.distance_to(*origin) <= self.activation_distance {
                    return false;
                }
                let dragging = GestureState::Dragging {
                    target: target.clone(),
                    origin: *origin,
                    current: at,
                };
                self.state = dragging;
                true
            }
            GestureState::Dragging { current, .. } => {
                *current = at;
                false
            }
        }
    }

    pub fn release(&mut self, at: Point) -> Option<Gesture<T>> {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => None,
            GestureState::Pressed { target, origin } => {
                // A release can arrive without a preceding move event.
                if at.distance_to(origin) > self.activation_distance {
                    Some(Gesture::Drop {
                        target,
                        delta: at.delta_from(origin),
                    })
                } else {
                    Some(Gesture::Click(target))
                }
            }
            GestureState::Dragging { target, origin, .. } => Some(Gesture::Drop {
                target,
                delta: at.delta_from(origin),
            }),
        }
    }

    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}
