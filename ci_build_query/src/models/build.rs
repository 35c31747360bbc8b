//! ci.build — One execution attempt against a buildable under a plan.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::ci_builds;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = ci_builds)]
pub struct CiBuild {
    pub id: i64,
    pub phid: String,
    pub buildable_phid: String,
    pub build_plan_phid: Option<String>,
    pub build_status: String,
    /// Bumped every time the build is restarted.
    pub build_generation: i32,
    pub create_date: Option<DateTime<Utc>>,
}

impl CiBuild {
    /// Parsed status, or `None` if the row holds a value this crate does not know.
    pub fn status(&self) -> Option<BuildStatus> {
        self.build_status.parse().ok()
    }
}

/// Lifecycle states a build can be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Inactive,
    Pending,
    Building,
    Passed,
    Failed,
    Aborted,
    Error,
    Paused,
    Deadlocked,
}

impl BuildStatus {
    pub const ALL: [BuildStatus; 9] = [
        BuildStatus::Inactive,
        BuildStatus::Pending,
        BuildStatus::Building,
        BuildStatus::Passed,
        BuildStatus::Failed,
        BuildStatus::Aborted,
        BuildStatus::Error,
        BuildStatus::Paused,
        BuildStatus::Deadlocked,
    ];

    /// Stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Inactive => "inactive",
            BuildStatus::Pending => "pending",
            BuildStatus::Building => "building",
            BuildStatus::Passed => "passed",
            BuildStatus::Failed => "failed",
            BuildStatus::Aborted => "aborted",
            BuildStatus::Error => "error",
            BuildStatus::Paused => "paused",
            BuildStatus::Deadlocked => "deadlocked",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown build status: {0}")]
pub struct UnknownBuildStatus(pub String);

impl FromStr for BuildStatus {
    type Err = UnknownBuildStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownBuildStatus(s.to_string()))
    }
}
