/// Control channel between the popup and the page
///
/// Messages are JSON objects tagged by `action`. The popup sends a
/// [`Command`] and the content script answers with an [`Ack`]. The background
/// script additionally understands the older [`BackgroundRequest`].
///
/// Two failure kinds stay distinct on the sender side: the transport could not
/// deliver the message at all ([`ChannelError::Unreachable`], usually "wrong
/// site"), or the page answered `{success: false, error}`.
use std::cell::Cell;

use futures::future::LocalBoxFuture;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "ANALYZE_REEL")]
    AnalyzeReel,
    #[serde(rename = "STOP_ANALYSIS")]
    StopAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Ack {
        Ack { success: true, error: None }
    }

    /// Only other senders produce these; the content script always succeeds
    #[cfg(test)]
    pub fn failed(error: impl Into<String>) -> Ack {
        Ack {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Request handled by the background script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum BackgroundRequest {
    #[serde(rename = "analyze_sentiment")]
    AnalyzeSentiment { comments: Vec<String> },
}

/// Decode an incoming content-script message; unknown actions yield `None`
pub fn parse_command(message: &serde_json::Value) -> Option<Command> {
    match serde_json::from_value(message.clone()) {
        Ok(command) => Some(command),
        Err(e) => {
            debug!("ignoring message {}: {}", message, e);
            None
        }
    }
}

/// Interpret the raw reply to a command. No reply at all counts as success.
pub fn parse_ack(reply: serde_json::Value) -> Result<Ack, ChannelError> {
    if reply.is_null() {
        return Ok(Ack::ok());
    }
    serde_json::from_value(reply).map_err(|e| ChannelError::BadResponse(e.to_string()))
}

/// Carries one message to the page and back
pub trait Transport {
    /// `Err` means the message could not be delivered
    fn deliver(&self, command: Command) -> LocalBoxFuture<'_, Result<serde_json::Value, String>>;
}

/// Sender side of the channel; at most one command in flight
pub struct ControlChannel<T: Transport> {
    transport: T,
    in_flight: Cell<bool>,
}

/// Clears the in-flight flag however the send ends, including cancellation
struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T: Transport> ControlChannel<T> {
    pub fn new(transport: T) -> Self {
        ControlChannel {
            transport,
            in_flight: Cell::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    pub async fn send(&self, command: Command) -> Result<Ack, ChannelError> {
        if self.in_flight.replace(true) {
            return Err(ChannelError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let reply = self.transport.deliver(command).await.map_err(|e| {
            warn!("{:?} not delivered: {}", command, e);
            ChannelError::Unreachable(e)
        })?;
        parse_ack(reply)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Success,
    Error,
}

/// One line of popup feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusLine {
    fn new(text: impl Into<String>, tone: StatusTone) -> StatusLine {
        StatusLine { text: text.into(), tone }
    }

    pub fn pending(command: Command) -> StatusLine {
        match command {
            Command::AnalyzeReel => StatusLine::new("Starting analysis...", StatusTone::Pending),
            Command::StopAnalysis => StatusLine::new("Stopping auto-analysis...", StatusTone::Pending),
        }
    }

    pub fn outcome(command: Command, result: &Result<Ack, ChannelError>) -> StatusLine {
        match (command, result) {
            (Command::AnalyzeReel, Ok(ack)) if ack.success => {
                StatusLine::new("Analysis started! Auto-updating on reel changes.", StatusTone::Success)
            }
            (Command::AnalyzeReel, Ok(ack)) => StatusLine::new(
                format!("Error: {}", ack.error.as_deref().unwrap_or("unknown error")),
                StatusTone::Error,
            ),
            (Command::AnalyzeReel, Err(ChannelError::Unreachable(_))) => {
                StatusLine::new("Error: Not on Instagram Reel", StatusTone::Error)
            }
            (Command::AnalyzeReel, Err(e)) => StatusLine::new(format!("Error: {}", e), StatusTone::Error),
            (Command::StopAnalysis, Ok(ack)) if ack.success => {
                StatusLine::new("Auto-analysis stopped", StatusTone::Pending)
            }
            (Command::StopAnalysis, _) => StatusLine::new("Error stopping analysis", StatusTone::Error),
        }
    }
}
