// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Everything that talks to the remote API: GraphQL queries and mutations
//! over HTTP, and live subscriptions over a WebSocket.
pub mod client;
pub mod documents;
pub mod subscriptions;

pub use client::{ApiClient, MutationOutcome, ORGANIZATION_HEADER};
pub use subscriptions::{Subscription, SubscriptionClient};
