//! Typed actions
//!
//! The closed set of actions the broker serves. The string discriminator is
//! parsed once into [`ActionKind`]; everything downstream matches on the enum.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::envelope::{AuthPayload, LogPayload, MailPayload};

/// Action discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Auth,
    Log,
    Mail,
}

impl ActionKind {
    /// All known actions
    pub const ALL: [ActionKind; 3] = [ActionKind::Auth, ActionKind::Log, ActionKind::Mail];

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Auth => "auth",
            ActionKind::Log => "log",
            ActionKind::Mail => "mail",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The action string is not one of the known values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unkown action")]
pub struct UnknownAction {
    pub action: String,
}

impl FromStr for ActionKind {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth" => Ok(ActionKind::Auth),
            "log" => Ok(ActionKind::Log),
            "mail" => Ok(ActionKind::Mail),
            other => Err(UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

/// The payload selected by an action
///
/// Serializes as the inner payload object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Auth(AuthPayload),
    Log(LogPayload),
    Mail(MailPayload),
}

impl Payload {
    pub fn kind(&self) -> ActionKind {
        match self {
            Payload::Auth(_) => ActionKind::Auth,
            Payload::Log(_) => ActionKind::Log,
            Payload::Mail(_) => ActionKind::Mail,
        }
    }
}
