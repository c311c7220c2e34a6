//! Command log and reproduction dumps.
//!
//! The log holds every command that executed successfully, in execution
//! order. Rejected commands never enter it. Replaying the log against a game
//! built from the same `GameConfig` reproduces the same state.

use serde::{Deserialize, Serialize};

use super::command::Command;
use crate::core::{GameConfig, PlayerId};
use crate::error::ErrorReport;

/// Monotonic id assigned when a command starts executing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(pub u64);

impl CommandId {
    /// Create a new command ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Command({})", self.0)
    }
}

/// A command that ran to completion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedCommand {
    pub id: CommandId,
    pub issuer: PlayerId,
    pub command: Command,
}

/// Ordered record of executed commands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLog {
    entries: Vec<LoggedCommand>,
}

impl CommandLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an executed command.
    pub fn push(&mut self, entry: LoggedCommand) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[LoggedCommand] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedCommand> {
        self.entries.iter()
    }
}

/// Everything needed to reproduce a fatal error: the initial config and
/// the commands up to and including the one that broke the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReproductionDump {
    pub config: GameConfig,
    pub commands: Vec<LoggedCommand>,
    pub error: ErrorReport,
}

impl ReproductionDump {
    /// Serialize for bug reports.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a dump.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
