//! The inbound `Request` tagged union and its concrete variants.
//!
//! Exactly one concrete variant is produced per decode. Variant payloads are
//! plain serde structs; the discriminator tag lives outside them and is
//! injected/stripped by the codec. The full catalogue of platform request
//! shapes is open-ended; consumers register additional tags that decode
//! into [`ExtensionRequest`].

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{tagged_object, CodecError};

/// Metadata carried by every platform request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestBase {
    #[serde(default)]
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// Sent when the user opens the skill without a specific intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    #[serde(flatten)]
    pub base: RequestBase,
}

/// Sent when the user's utterance resolves to an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    #[serde(flatten)]
    pub base: RequestBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_state: Option<String>,
    pub intent: Intent,
}

/// The resolved intent: name, confirmation state and filled slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<HashMap<String, Slot>>,
}

/// A single filled slot. Entity resolutions are kept raw; their record
/// types are outside this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Value>,
}

/// Sent when the session ends for any reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    #[serde(flatten)]
    pub base: RequestBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SessionEndedError>,
}

/// Error detail attached to a session-ended request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedError {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Physical playback-control button presses. The command is carried in the
/// dotted wire tag (`PlaybackController.<Command>CommandIssued`), not in the
/// payload, so it is skipped during payload (de)serialization and filled in
/// by the codec's sub-tag factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackControllerRequest {
    #[serde(flatten)]
    pub base: RequestBase,
    #[serde(skip)]
    pub command: PlaybackCommand,
}

/// The playback command encoded in the request's sub-tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackCommand {
    #[default]
    Play,
    Pause,
    Next,
    Previous,
}

impl PlaybackCommand {
    /// Parses the sub-tag portion of a `PlaybackController.*` wire tag.
    pub fn from_sub_tag(sub_tag: &str) -> Option<Self> {
        match sub_tag {
            "PlayCommandIssued" => Some(PlaybackCommand::Play),
            "PauseCommandIssued" => Some(PlaybackCommand::Pause),
            "NextCommandIssued" => Some(PlaybackCommand::Next),
            "PreviousCommandIssued" => Some(PlaybackCommand::Previous),
            _ => None,
        }
    }

    /// The sub-tag this command encodes to.
    pub fn sub_tag(&self) -> &'static str {
        match self {
            PlaybackCommand::Play => "PlayCommandIssued",
            PlaybackCommand::Pause => "PauseCommandIssued",
            PlaybackCommand::Next => "NextCommandIssued",
            PlaybackCommand::Previous => "PreviousCommandIssued",
        }
    }
}

/// A consumer-registered request shape the core does not model. Carries the
/// wire tag and the raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionRequest {
    pub tag: String,
    pub payload: Value,
}

impl ExtensionRequest {
    /// Best-effort request id extracted from the raw payload.
    pub fn request_id(&self) -> Option<&str> {
        self.payload.get("requestId").and_then(Value::as_str)
    }
}

/// The inbound request union, keyed on the wire by its `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Launch(LaunchRequest),
    Intent(IntentRequest),
    SessionEnded(SessionEndedRequest),
    PlaybackController(PlaybackControllerRequest),
    Extension(ExtensionRequest),
}

impl Request {
    /// The type token used to key handler registrations and the dispatch
    /// wrapper cache.
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Launch(_) => RequestKind::Launch,
            Request::Intent(_) => RequestKind::Intent,
            Request::SessionEnded(_) => RequestKind::SessionEnded,
            Request::PlaybackController(_) => RequestKind::PlaybackController,
            Request::Extension(ext) => RequestKind::Extension(ext.tag.clone()),
        }
    }

    /// The wire discriminator tag this request encodes to.
    pub fn tag(&self) -> String {
        match self {
            Request::Launch(_) => "LaunchRequest".to_string(),
            Request::Intent(_) => "IntentRequest".to_string(),
            Request::SessionEnded(_) => "SessionEndedRequest".to_string(),
            Request::PlaybackController(req) => {
                format!("PlaybackController.{}", req.command.sub_tag())
            }
            Request::Extension(ext) => ext.tag.clone(),
        }
    }

    /// The platform request id, when the payload carries one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Request::Launch(req) => Some(req.base.request_id.as_str()),
            Request::Intent(req) => Some(req.base.request_id.as_str()),
            Request::SessionEnded(req) => Some(req.base.request_id.as_str()),
            Request::PlaybackController(req) => Some(req.base.request_id.as_str()),
            Request::Extension(ext) => ext.request_id(),
        }
    }

    /// Serializes this request to its tagged wire object.
    pub fn to_value(&self, tag_field: &str) -> Result<Value, CodecError> {
        let tag = self.tag();
        match self {
            Request::Launch(req) => tagged_object(tag_field, &tag, req),
            Request::Intent(req) => tagged_object(tag_field, &tag, req),
            Request::SessionEnded(req) => tagged_object(tag_field, &tag, req),
            Request::PlaybackController(req) => tagged_object(tag_field, &tag, req),
            Request::Extension(ext) => {
                let mut value = ext.payload.clone();
                match value {
                    Value::Object(ref mut map) => {
                        map.insert(tag_field.to_string(), Value::String(tag));
                        Ok(value)
                    }
                    _ => Err(CodecError::malformed(
                        "extension request payload must be a JSON object",
                    )),
                }
            }
        }
    }
}

/// Cheap, hashable type token identifying a concrete request variant.
/// Extension requests are keyed by their wire tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Launch,
    Intent,
    SessionEnded,
    PlaybackController,
    Extension(String),
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Launch => write!(f, "LaunchRequest"),
            RequestKind::Intent => write!(f, "IntentRequest"),
            RequestKind::SessionEnded => write!(f, "SessionEndedRequest"),
            RequestKind::PlaybackController => write!(f, "PlaybackController"),
            RequestKind::Extension(tag) => write!(f, "{}", tag),
        }
    }
}
