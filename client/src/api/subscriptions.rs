// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Live updates over the graphql-ws protocol.
//!
//! One WebSocket connection is shared by every subscription. A background
//! task owns the socket, routes `next` messages to the subscription they
//! belong to, and sends `complete` when a subscription is dropped.
use std::collections::HashMap;
use std::marker::PhantomData;

use common::{Comment, TaskUpdate};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::documents;
use crate::error::ApiError;

const SUBPROTOCOL: &str = "graphql-transport-ws";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type EventSender = mpsc::UnboundedSender<Result<Value, ApiError>>;

enum Command {
    Subscribe {
        id: String,
        payload: Value,
        events: EventSender,
    },
    Complete {
        id: String,
    },
}

#[derive(Deserialize, Debug)]
struct ServerMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    payload: Value,
}

fn text(value: Value) -> Message {
    Message::Text(value.to_string().into())
}

/// Handle to the shared subscription connection.
#[derive(Clone)]
pub struct SubscriptionClient {
    commands: mpsc::UnboundedSender<Command>,
}

impl SubscriptionClient {
    /// Opens the connection and completes the `connection_init` handshake.
    /// The organization slug travels as a connection parameter.
    pub async fn connect(url: &str, organization_slug: &str) -> Result<Self, ApiError> {
        let mut request = url.into_client_request()?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(SUBPROTOCOL));

        let (mut socket, _) = connect_async(request).await?;
        socket
            .send(text(json!({
                "type": "connection_init",
                "payload": { "organizationSlug": organization_slug },
            })))
            .await?;
        wait_for_ack(&mut socket).await?;
        info!("Subscription connection to {} acknowledged.", url);

        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(socket, receiver));
        Ok(Self { commands })
    }

    /// Task changes within one project.
    pub fn task_updated(&self, project_id: &str) -> Result<Subscription<TaskUpdate>, ApiError> {
        self.subscribe(
            "OnTaskUpdated",
            documents::TASK_UPDATED,
            json!({ "projectId": project_id }),
            "taskUpdated",
        )
    }

    /// Comments posted on one task.
    pub fn comment_added(&self, task_id: &str) -> Result<Subscription<Comment>, ApiError> {
        self.subscribe(
            "OnCommentAdded",
            documents::COMMENT_ADDED,
            json!({ "taskId": task_id }),
            "commentAdded",
        )
    }

    fn subscribe<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        document: &str,
        variables: Value,
        field: &'static str,
    ) -> Result<Subscription<T>, ApiError> {
        let id = Uuid::new_v4().to_string();
        let (events, receiver) = mpsc::unbounded_channel();
        self.commands
            .send(Command::Subscribe {
                id: id.clone(),
                payload: json!({
                    "query": document,
                    "operationName": operation,
                    "variables": variables,
                }),
                events,
            })
            .map_err(|_| ApiError::ConnectionClosed)?;
        debug!("Subscribed to {} as {}", operation, id);

        Ok(Subscription {
            id,
            operation,
            field,
            events: receiver,
            commands: self.commands.clone(),
            _item: PhantomData,
        })
    }
}

/// A live stream of `T`. Dropping it unsubscribes.
pub struct Subscription<T> {
    id: String,
    operation: &'static str,
    field: &'static str,
    events: mpsc::UnboundedReceiver<Result<Value, ApiError>>,
    commands: mpsc::UnboundedSender<Command>,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Subscription<T> {
    /// Waits for the next event. `None` once the server completed the
    /// subscription or the connection went away.
    pub async fn next(&mut self) -> Option<Result<T, ApiError>> {
        let event = self.events.recv().await?;
        Some(event.and_then(|mut payload| {
            let value = payload
                .pointer_mut(&format!("/data/{}", self.field))
                .map(Value::take)
                .ok_or(ApiError::MissingData {
                    operation: self.operation,
                })?;
            serde_json::from_value(value).map_err(|source| ApiError::Decode {
                operation: self.operation,
                source,
            })
        }))
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        // The connection may already be gone; nothing left to tell it then.
        let _ = self.commands.send(Command::Complete {
            id: self.id.clone(),
        });
    }
}

async fn wait_for_ack(socket: &mut Socket) -> Result<(), ApiError> {
    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(body) => {
                let message: ServerMessage = serde_json::from_str(body.as_str())
                    .map_err(|e| ApiError::Protocol(e.to_string()))?;
                match message.kind.as_str() {
                    "connection_ack" => return Ok(()),
                    "ping" => socket.send(text(json!({ "type": "pong" }))).await?,
                    other => {
                        return Err(ApiError::Protocol(format!(
                            "Expected connection_ack, got {}",
                            other
                        )));
                    }
                }
            }
            Message::Close(_) => return Err(ApiError::ConnectionClosed),
            _ => {}
        }
    }
    Err(ApiError::ConnectionClosed)
}

async fn run_connection(socket: Socket, mut commands: mpsc::UnboundedReceiver<Command>) {
    let (mut sink, mut stream) = socket.split();
    let mut routes: HashMap<String, EventSender> = HashMap::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Subscribe { id, payload, events }) => {
                    let message = text(json!({ "id": id, "type": "subscribe", "payload": payload }));
                    match sink.send(message).await {
                        Ok(()) => {
                            routes.insert(id, events);
                        }
                        Err(e) => {
                            let _ = events.send(Err(e.into()));
                        }
                    }
                }
                Some(Command::Complete { id }) => {
                    if routes.remove(&id).is_some() {
                        debug!("Completing subscription {}", id);
                        if let Err(e) = sink.send(text(json!({ "id": id, "type": "complete" }))).await {
                            warn!("Failed to complete subscription {}: {}", id, e);
                        }
                    }
                }
                None => {
                    // Every handle and subscription is gone.
                    let _ = sink.close().await;
                    break;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(body))) => {
                    let message: ServerMessage = match serde_json::from_str(body.as_str()) {
                        Ok(message) => message,
                        Err(e) => {
                            warn!("Ignoring malformed subscription message: {}", e);
                            continue;
                        }
                    };
                    if message.kind == "ping" {
                        if let Err(e) = sink.send(text(json!({ "type": "pong" }))).await {
                            warn!("Failed to answer ping: {}", e);
                        }
                        continue;
                    }
                    route(message, &mut routes);
                }
                Some(Ok(Message::Close(_))) | None => {
                    warn!("Subscription connection closed by the server.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("Subscription connection error: {}", e);
                    break;
                }
            },
        }
    }
    // Dropping the routes ends every open subscription stream.
}

fn route(message: ServerMessage, routes: &mut HashMap<String, EventSender>) {
    let Some(id) = message.id else {
        debug!("Ignoring '{}' message without id", message.kind);
        return;
    };
    match message.kind.as_str() {
        "next" => {
            if let Some(events) = routes.get(&id) {
                let _ = events.send(Ok(message.payload));
            }
        }
        "error" => {
            if let Some(events) = routes.remove(&id) {
                let messages = match message.payload {
                    Value::Array(errors) => errors
                        .iter()
                        .map(|e| e["message"].as_str().unwrap_or("unknown error").to_string())
                        .collect(),
                    other => vec![other.to_string()],
                };
                let _ = events.send(Err(ApiError::GraphQl { messages }));
            }
        }
        "complete" => {
            routes.remove(&id);
        }
        other => debug!("Ignoring '{}' message for {}", other, id),
    }
}
