// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use thiserror::Error;

/// Failures talking to the remote API.
///
/// Field-level validation errors returned with a mutation are not errors;
/// they arrive as `MutationOutcome::FieldErrors`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API responded with status {status}")]
    Status { status: u16 },

    #[error("GraphQL error: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("Response for {operation} had no data")]
    MissingData { operation: &'static str },

    #[error("Failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Subscription connection error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Subscription protocol error: {0}")]
    Protocol(String),

    #[error("Subscription connection closed")]
    ConnectionClosed,
}
