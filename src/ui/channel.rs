//! Command/event channel over a live connection.

use std::collections::VecDeque;

use super::{ClientMessage, UiCommand};
use crate::error::PlaygroundError;
use crate::transport::Transport;
use crate::Result;

/// A named UI action raised by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub params: Vec<String>,
}

/// Server side of a client's UI.
///
/// Some operations are round trips (reading a field, reading the page URL).
/// Events that arrive while such a reply is pending are queued and handed
/// out by [`Ui::next_event`] in arrival order.
pub struct Ui<T> {
    transport: T,
    pending: VecDeque<Event>,
}

impl<T: Transport> Ui<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: VecDeque::new(),
        }
    }

    /// Give back the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    pub async fn send(&mut self, command: UiCommand) -> Result<()> {
        let json =
            serde_json::to_string(&command).map_err(|e| PlaygroundError::Protocol(e.to_string()))?;
        self.transport.send_text(json).await
    }

    pub async fn set_html(&mut self, target: &str, content: impl Into<String>) -> Result<()> {
        self.send(UiCommand::Html {
            target: target.to_string(),
            content: content.into(),
        })
        .await
    }

    pub async fn append_html(&mut self, target: &str, content: impl Into<String>) -> Result<()> {
        self.send(UiCommand::Append {
            target: target.to_string(),
            content: content.into(),
        })
        .await
    }

    pub async fn set_value(&mut self, target: &str, value: impl Into<String>) -> Result<()> {
        self.send(UiCommand::SetValue {
            target: target.to_string(),
            value: value.into(),
        })
        .await
    }

    pub async fn exec(&mut self, script: impl Into<String>) -> Result<()> {
        self.send(UiCommand::Exec {
            script: script.into(),
        })
        .await
    }

    pub async fn notice(&mut self, message: impl Into<String>) -> Result<()> {
        self.send(UiCommand::Notice {
            message: message.into(),
        })
        .await
    }

    /// Read the current value of a form field.
    pub async fn request_value(&mut self, target: &str) -> Result<String> {
        self.send(UiCommand::GetValue {
            target: target.to_string(),
        })
        .await?;

        loop {
            match self.recv_message().await? {
                Some(ClientMessage::Value { target: t, value }) if t == target => return Ok(value),
                Some(ClientMessage::Event { name, params }) => {
                    self.pending.push_back(Event { name, params })
                }
                Some(other) => tracing::debug!(?other, "Ignoring unexpected reply"),
                None => return Err(PlaygroundError::ConnectionClosed),
            }
        }
    }

    /// Read the URL of the client's page.
    pub async fn request_location(&mut self) -> Result<String> {
        self.send(UiCommand::GetLocation).await?;

        loop {
            match self.recv_message().await? {
                Some(ClientMessage::Location { href }) => return Ok(href),
                Some(ClientMessage::Event { name, params }) => {
                    self.pending.push_back(Event { name, params })
                }
                Some(other) => tracing::debug!(?other, "Ignoring unexpected reply"),
                None => return Err(PlaygroundError::ConnectionClosed),
            }
        }
    }

    /// Wait for the next UI event. `Ok(None)` once the client has gone.
    pub async fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        loop {
            match self.recv_message().await? {
                Some(ClientMessage::Event { name, params }) => {
                    return Ok(Some(Event { name, params }))
                }
                Some(other) => tracing::debug!(?other, "Ignoring stray reply"),
                None => return Ok(None),
            }
        }
    }

    /// Next well-formed client message; malformed frames are logged and skipped.
    async fn recv_message(&mut self) -> Result<Option<ClientMessage>> {
        loop {
            let Some(text) = self.transport.recv_text().await? else {
                return Ok(None);
            };
            match serde_json::from_str(&text) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => tracing::warn!("Ignoring malformed client frame: {}", e),
            }
        }
    }
}
