use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque container identifier supplied by the runtime
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    /// Wrap a runtime-supplied identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in log lines (first 12 characters, like `docker ps`)
    #[must_use]
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A container reported as running when the engine starts
#[derive(Debug, Clone)]
pub struct RunningContainer {
    /// Container identifier
    pub id: ContainerId,

    /// All labels attached to the container
    pub labels: HashMap<String, String>,
}

/// A lifecycle event reported by the container runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEvent {
    /// Container the event refers to
    pub id: ContainerId,

    /// Raw action string (`start`, `die`, `exec_start: sh`, ...)
    pub action: String,
}

impl ContainerEvent {
    /// Create an event from an id and a raw action
    #[must_use]
    pub fn new(id: impl Into<ContainerId>, action: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
        }
    }

    /// Classify the action
    #[must_use]
    pub fn transition(&self) -> Transition {
        Transition::from_action(&self.action)
    }
}

/// What an event means for the rules a container declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The container is (again) running: its declared rules should exist
    Activate,
    /// The container stopped running: the rules it owns should go away
    Deactivate,
    /// Nothing to do
    Ignore,
}

impl Transition {
    /// Map a runtime action string onto a transition
    ///
    /// Docker reports a restart as `start` followed by `restart`, so a
    /// restarted container ends up deactivated and keeps no rules until its
    /// next `start` or `unpause`.
    #[must_use]
    pub fn from_action(action: &str) -> Self {
        match action {
            "start" | "unpause" => Self::Activate,
            "stop" | "kill" | "die" | "pause" | "restart" => Self::Deactivate,
            _ => Self::Ignore,
        }
    }
}
