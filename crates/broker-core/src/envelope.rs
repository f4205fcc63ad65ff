//! Request and response envelopes
//!
//! The uniform wrapper exchanged with external callers. A request carries an
//! action discriminator plus one payload object per known action; only the
//! payload matching the action is read, the others stay zero-valued.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::action::{ActionKind, Payload};

/// Inbound request envelope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Action discriminator ("auth", "log", "mail")
    #[serde(default)]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auth: AuthPayload,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log: LogPayload,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail: MailPayload,
}

impl RequestEnvelope {
    /// Build an envelope for the given action with its payload populated
    pub fn new(payload: Payload) -> Self {
        let mut envelope = Self {
            action: payload.kind().as_str().to_string(),
            ..Self::default()
        };
        match payload {
            Payload::Auth(auth) => envelope.auth = auth,
            Payload::Log(log) => envelope.log = log,
            Payload::Mail(mail) => envelope.mail = mail,
        }
        envelope
    }

    /// Take the payload selected by `kind`, discarding the other variants
    pub fn into_payload(self, kind: ActionKind) -> Payload {
        match kind {
            ActionKind::Auth => Payload::Auth(self.auth),
            ActionKind::Log => Payload::Log(self.log),
            ActionKind::Mail => Payload::Mail(self.mail),
        }
    }
}

/// Credentials forwarded to the authentication service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPayload {
    pub email: String,
    pub password: String,
}

/// A single log entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPayload {
    pub name: String,
    pub data: String,
}

/// An outgoing email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailPayload {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub message: String,
}

/// Outbound response envelope
///
/// `error == false` may carry `data`; `error == true` never does and
/// `message` names the cause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Successful reply without data
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: None,
        }
    }

    /// Successful reply carrying data (JSON `null` is treated as absent)
    pub fn ok_with_data(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: data.filter(|v| !v.is_null()),
        }
    }

    /// Failed reply
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Decode JSON `null` as the type's zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
