//! ci.build.plan — Reusable configuration describing what a build does.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::ci_build_plans;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = ci_build_plans)]
pub struct CiBuildPlan {
    pub id: i64,
    pub phid: String,
    pub name: String,
    pub plan_status: String,
    pub view_policy: String,
    pub create_date: Option<DateTime<Utc>>,
}

