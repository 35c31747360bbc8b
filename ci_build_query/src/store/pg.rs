//! PostgreSQL store backed by diesel-async and a deadpool connection pool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::config::QueryConfig;
use crate::criteria::{FilterClause, FilterExpr};
use crate::error::{QueryError, QueryResult};
use crate::models::build::CiBuild;
use crate::models::build_command::CiBuildCommand;
use crate::models::build_plan::CiBuildPlan;
use crate::models::build_target::CiBuildTarget;
use crate::models::buildable::CiBuildable;
use crate::models::phid::PhidKind;
use crate::policy::{PolicyObject, Viewer, VisibilityPolicy};
use crate::schema::{ci_build_commands, ci_build_plans, ci_build_targets, ci_buildables, ci_builds};
use crate::store::{BuildStore, CommandStore, ObjectResolver, TargetStore};

pub type PgPool = Pool<AsyncPgConnection>;

/// Build a connection pool from `DATABASE_URL` / `CI_QUERY_POOL_SIZE`.
pub fn build_pool(config: &QueryConfig) -> anyhow::Result<PgPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
    Pool::builder(manager)
        .max_size(config.pool_size)
        .build()
        .map_err(|e| anyhow::anyhow!("diesel pool: {e}"))
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    policy: Arc<dyn VisibilityPolicy>,
}

impl PgStore {
    pub fn new(pool: PgPool, policy: Arc<dyn VisibilityPolicy>) -> Self {
        Self { pool, policy }
    }

    async fn connection(&self) -> QueryResult<Object<AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| QueryError::Pool(e.to_string()))
    }

    fn visible(&self, viewer: &Viewer, object: &PolicyObject) -> bool {
        viewer.omnipotent || self.policy.can_view(viewer, object)
    }
}

/// `SELECT .. FROM ci_builds WHERE <clauses> ORDER BY id ASC LIMIT limit`.
fn builds_query(filter: &FilterExpr, limit: i64) -> ci_builds::BoxedQuery<'static, Pg> {
    let mut query = ci_builds::table.into_boxed::<Pg>();
    for clause in filter.clauses() {
        query = match clause {
            FilterClause::IdIn(ids) => query.filter(ci_builds::id.eq_any(ids.clone())),
            FilterClause::PhidIn(phids) => query.filter(ci_builds::phid.eq_any(phids.clone())),
            FilterClause::StatusIn(statuses) => {
                let values: Vec<String> =
                    statuses.iter().map(|s| s.as_str().to_string()).collect();
                query.filter(ci_builds::build_status.eq_any(values))
            }
            FilterClause::BuildablePhidIn(phids) => {
                query.filter(ci_builds::buildable_phid.eq_any(phids.clone()))
            }
            FilterClause::BuildPlanPhidIn(phids) => {
                query.filter(ci_builds::build_plan_phid.eq_any(phids.clone()))
            }
            FilterClause::IdAfter(after) => query.filter(ci_builds::id.gt(*after)),
        };
    }
    query.order(ci_builds::id.asc()).limit(limit)
}

fn commands_query(build_phids: &[String]) -> ci_build_commands::BoxedQuery<'static, Pg> {
    ci_build_commands::table
        .filter(ci_build_commands::target_phid.eq_any(build_phids.to_vec()))
        .order(ci_build_commands::id.asc())
        .into_boxed::<Pg>()
}

/// Most recent first; the hydrator reverses into chronological order.
fn targets_query(build_phids: &[String]) -> ci_build_targets::BoxedQuery<'static, Pg> {
    ci_build_targets::table
        .filter(ci_build_targets::build_phid.eq_any(build_phids.to_vec()))
        .order(ci_build_targets::id.desc())
        .into_boxed::<Pg>()
}

/// Split PHIDs into the buildables and plans that carry a view policy.
fn partition_policy_phids(phids: &[String]) -> (Vec<String>, Vec<String>) {
    let mut buildable_phids = Vec::new();
    let mut plan_phids = Vec::new();
    for phid in phids {
        match PhidKind::of(phid) {
            PhidKind::Buildable => buildable_phids.push(phid.clone()),
            PhidKind::BuildPlan => plan_phids.push(phid.clone()),
            PhidKind::Build | PhidKind::BuildTarget => {
                tracing::debug!(phid = %phid, "Skipping PHID without a view policy")
            }
            PhidKind::Unknown => tracing::debug!(phid = %phid, "Skipping unrecognised PHID"),
        }
    }
    (buildable_phids, plan_phids)
}

#[async_trait]
impl BuildStore for PgStore {
    async fn load_builds(&self, filter: &FilterExpr, limit: usize) -> QueryResult<Vec<CiBuild>> {
        let mut conn = self.connection().await?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let results = builds_query(filter, limit)
            .load::<CiBuild>(&mut conn)
            .await?;
        Ok(results)
    }
}

#[async_trait]
impl ObjectResolver for PgStore {
    async fn resolve(
        &self,
        viewer: &Viewer,
        phids: &[String],
    ) -> QueryResult<HashMap<String, PolicyObject>> {
        let (buildable_phids, plan_phids) = partition_policy_phids(phids);

        let mut objects = Vec::new();
        if !buildable_phids.is_empty() || !plan_phids.is_empty() {
            let mut conn = self.connection().await?;

            if !buildable_phids.is_empty() {
                let buildables = ci_buildables::table
                    .filter(ci_buildables::phid.eq_any(buildable_phids))
                    .select(CiBuildable::as_select())
                    .load::<CiBuildable>(&mut conn)
                    .await?;
                objects.extend(buildables.into_iter().map(PolicyObject::Buildable));
            }

            if !plan_phids.is_empty() {
                let plans = ci_build_plans::table
                    .filter(ci_build_plans::phid.eq_any(plan_phids))
                    .select(CiBuildPlan::as_select())
                    .load::<CiBuildPlan>(&mut conn)
                    .await?;
                objects.extend(plans.into_iter().map(PolicyObject::BuildPlan));
            }
        }

        Ok(objects
            .into_iter()
            .filter(|object| self.visible(viewer, object))
            .map(|object| (object.phid().to_string(), object))
            .collect())
    }
}

#[async_trait]
impl CommandStore for PgStore {
    async fn load_commands(&self, build_phids: &[String]) -> QueryResult<Vec<CiBuildCommand>> {
        if build_phids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        let results = commands_query(build_phids)
            .load::<CiBuildCommand>(&mut conn)
            .await?;
        Ok(results)
    }
}

#[async_trait]
impl TargetStore for PgStore {
    async fn load_targets(&self, build_phids: &[String]) -> QueryResult<Vec<CiBuildTarget>> {
        if build_phids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        let results = targets_query(build_phids)
            .load::<CiBuildTarget>(&mut conn)
            .await?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;

    use super::*;
    use crate::models::build::BuildStatus;

    fn sql<T: diesel::query_builder::QueryFragment<Pg>>(query: &T) -> String {
        debug_query::<Pg, _>(query).to_string()
    }

    #[test]
    fn unfiltered_builds_are_ordered_and_limited() {
        let sql = sql(&builds_query(&FilterExpr::all(), 21));
        assert!(!sql.contains("WHERE"), "{sql}");
        assert!(sql.contains(r#"ORDER BY "ci_builds"."id" ASC LIMIT $1"#), "{sql}");
        assert!(sql.ends_with("-- binds: [21]"), "{sql}");
    }

    #[test]
    fn every_clause_becomes_a_predicate() {
        let filter = FilterExpr::all()
            .and(FilterClause::IdIn(vec![1, 2]))
            .and(FilterClause::PhidIn(vec!["PHID-HMBD-1".to_string()]))
            .and(FilterClause::StatusIn(vec![BuildStatus::Passed]))
            .and(FilterClause::BuildablePhidIn(vec!["PHID-HMBB-1".to_string()]))
            .and(FilterClause::BuildPlanPhidIn(vec!["PHID-HMCP-1".to_string()]))
            .and(FilterClause::IdAfter(40));
        let sql = sql(&builds_query(&filter, 11));

        for column in ["id", "phid", "build_status", "buildable_phid", "build_plan_phid"] {
            let predicate = format!(r#""ci_builds"."{column}" = ANY($"#);
            assert!(sql.contains(&predicate), "missing {predicate} in {sql}");
        }
        assert!(sql.contains(r#""ci_builds"."id" > $"#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "ci_builds"."id" ASC LIMIT $"#), "{sql}");
        assert!(sql.contains(r#"["passed"]"#), "{sql}");
        assert!(sql.ends_with("40, 11]"), "{sql}");
    }

    #[test]
    fn commands_are_read_oldest_first() {
        let sql = sql(&commands_query(&["PHID-HMBD-1".to_string()]));
        assert!(sql.contains(r#""ci_build_commands"."target_phid" = ANY($1)"#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "ci_build_commands"."id" ASC"#), "{sql}");
    }

    #[test]
    fn only_policy_objects_are_resolved() {
        let phids: Vec<String> = [
            "PHID-HMBB-1",
            "PHID-HMBD-7",
            "PHID-HMCP-2",
            "PHID-HMBT-9",
            "PHID-USER-alice",
            "PHID-HMBB-3",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let (buildables, plans) = partition_policy_phids(&phids);
        assert_eq!(buildables, vec!["PHID-HMBB-1".to_string(), "PHID-HMBB-3".to_string()]);
        assert_eq!(plans, vec!["PHID-HMCP-2".to_string()]);
    }

    #[test]
    fn targets_are_read_newest_first() {
        let sql = sql(&targets_query(&["PHID-HMBD-1".to_string()]));
        assert!(sql.contains(r#""ci_build_targets"."build_phid" = ANY($1)"#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "ci_build_targets"."id" DESC"#), "{sql}");
    }
}
