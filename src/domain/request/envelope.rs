//! Inbound request envelope and its session/context sub-objects.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::Request;

/// Top-level inbound wire object: `{ version, session?, context, request }`.
///
/// Immutable once constructed; owned exclusively by the call that decoded it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub version: String,
    pub session: Option<Session>,
    pub context: Context,
    pub request: Request,
}

impl RequestEnvelope {
    /// Returns the application id asserted by the caller, preferring the
    /// session's application over the context's.
    pub fn application_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.application.application_id.as_str())
            .or_else(|| {
                self.context
                    .system
                    .as_ref()
                    .and_then(|sys| sys.application.as_ref())
                    .map(|app| app.application_id.as_str())
            })
    }

    /// Session attributes, if a session is present and carries any.
    pub fn session_attributes(&self) -> Option<&HashMap<String, Value>> {
        self.session.as_ref().and_then(|s| s.attributes.as_ref())
    }
}

/// The skill session accompanying a request, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "new", default)]
    pub is_new: bool,
    pub session_id: String,
    pub application: Application,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// The skill application identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

/// The platform user associated with the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Per-request device and system context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemContext>,
}

/// The `context.system` block: application, user and endpoint information.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

/// The device the request originated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_interfaces: Option<Value>,
}
