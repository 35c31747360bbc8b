//! ci.build.command — Pending directive queued against a build.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::ci_build_commands;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = ci_build_commands)]
pub struct CiBuildCommand {
    /// Creation order; commands are always read back ascending.
    pub id: i64,
    pub author_phid: String,
    /// PHID of the build the command applies to.
    pub target_phid: String,
    pub command: String,
    pub create_date: Option<DateTime<Utc>>,
}

impl CiBuildCommand {
    pub fn kind(&self) -> Option<CommandKind> {
        self.command.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Restart,
    Pause,
    Resume,
    Abort,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Restart => "restart",
            CommandKind::Pause => "pause",
            CommandKind::Resume => "resume",
            CommandKind::Abort => "abort",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown build command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for CommandKind {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restart" => Ok(CommandKind::Restart),
            "pause" => Ok(CommandKind::Pause),
            "resume" => Ok(CommandKind::Resume),
            "abort" => Ok(CommandKind::Abort),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}
