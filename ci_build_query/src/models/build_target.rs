//! ci.build.target — One unit of work produced within a build generation.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::ci_build_targets;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = ci_build_targets)]
pub struct CiBuildTarget {
    pub id: i64,
    pub phid: String,
    pub build_phid: String,
    /// Generation of the owning build this target was produced in.
    pub build_generation: i32,
    pub name: String,
    pub target_status: String,
    pub create_date: Option<DateTime<Utc>>,
}
