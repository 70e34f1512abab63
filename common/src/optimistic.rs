// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! A locally synthesized value shown before the server has confirmed it.

/// Two-phase value for an optimistic update.
///
/// A `Pending` value is replaced as a whole by `Confirmed` or `Failed` when
/// the request settles; nothing is edited in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Optimistic<T> {
    Pending(T),
    Confirmed(T),
    Failed { error: String },
}

impl<T> Optimistic<T> {
    pub fn pending(value: T) -> Self {
        Self::Pending(value)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The value to display: the guess while pending, the server's answer
    /// once confirmed, nothing after a failure.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Pending(value) | Self::Confirmed(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    pub fn confirm(self, value: T) -> Self {
        Self::Confirmed(value)
    }

    pub fn fail(self, error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}
