//! ci.buildable — The subject a build runs against (a commit or revision).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::ci_buildables;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = ci_buildables)]
pub struct CiBuildable {
    pub id: i64,
    pub phid: String,
    /// PHID of the commit or revision being built.
    pub object_phid: String,
    pub container_phid: Option<String>,
    pub is_manual: bool,
    pub view_policy: String,
    pub create_date: Option<DateTime<Utc>>,
}
