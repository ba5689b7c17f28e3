//! In-flight attendant messages.
//!
//! The scheduler only depends on the [`MessageSource`] trait. Two sources are
//! provided: a local table with a seeded random pick, and an HTTP client for a
//! remote message service speaking the same JSON shape.

mod http;
mod local;

pub use http::HttpMessageSource;
pub use local::{contextual_message, FlightContext, LocalMessageSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::FlightClass;

pub const FALLBACK_MESSAGE: &str = "Keep up the great work! Stay focused!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Encouragement,
    Motivation,
    Progress,
    Scenery,
    Status,
    Business,
    Contextual,
    #[serde(other)]
    Other,
}

/// Inputs for picking the next message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageRequest {
    pub progress: f64,
    pub flight_class: FlightClass,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendantMessage {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub flight_progress: f64,
}

impl AttendantMessage {
    /// Generic encouragement used whenever a source cannot answer.
    pub fn fallback(request: &MessageRequest) -> Self {
        Self {
            message: FALLBACK_MESSAGE.to_string(),
            kind: MessageKind::Encouragement,
            timestamp: request.at,
            flight_progress: request.progress,
        }
    }
}

#[derive(Error, Debug)]
pub enum MessageSourceError {
    #[error("Invalid message service URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Message service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Message service returned HTTP {0}")]
    Status(u16),

    #[error("Message service requires a multi-threaded tokio runtime")]
    NoRuntime,

    #[error("No message available")]
    Empty,
}

/// Capability the scheduler asks for message content.
pub trait MessageSource {
    /// # Errors
    /// Any error makes the scheduler show [`FALLBACK_MESSAGE`] instead.
    fn next_message(&mut self, request: &MessageRequest) -> Result<AttendantMessage, MessageSourceError>;
}

impl<S: MessageSource + ?Sized> MessageSource for Box<S> {
    fn next_message(&mut self, request: &MessageRequest) -> Result<AttendantMessage, MessageSourceError> {
        (**self).next_message(request)
    }
}
