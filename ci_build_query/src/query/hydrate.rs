//! Relation hydration for builds that survived visibility filtering.
//!
//! Plans, commands and targets are independent batch reads, so they run
//! concurrently. Each reads once for the whole page.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::QueryResult;
use crate::models::build::CiBuild;
use crate::models::build_command::CiBuildCommand;
use crate::models::build_plan::CiBuildPlan;
use crate::models::build_target::CiBuildTarget;
use crate::models::buildable::CiBuildable;
use crate::policy::Viewer;
use crate::query::generation::retain_current_generation;
use crate::query::visibility::VisibleBuild;
use crate::query::{distinct_phids, QuerySources};
use crate::store::{CommandStore, ObjectResolver, TargetStore};

/// A build with every requested relation attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HydratedBuild {
    pub build: CiBuild,
    pub buildable: CiBuildable,
    /// `None` when the build has no plan or the plan was deleted.
    pub build_plan: Option<CiBuildPlan>,
    /// Pending commands in creation order.
    pub unprocessed_commands: Vec<CiBuildCommand>,
    /// Current-generation targets, oldest first. `None` unless targets were
    /// requested.
    pub build_targets: Option<Vec<CiBuildTarget>>,
}

impl HydratedBuild {
    pub fn id(&self) -> i64 {
        self.build.id
    }

    pub fn phid(&self) -> &str {
        &self.build.phid
    }

    /// Attached targets; empty when none were requested.
    pub fn targets(&self) -> &[CiBuildTarget] {
        self.build_targets.as_deref().unwrap_or_default()
    }
}

pub async fn hydrate(
    sources: QuerySources<'_>,
    viewer: &Viewer,
    page: Vec<VisibleBuild>,
    need_build_targets: bool,
) -> QueryResult<Vec<HydratedBuild>> {
    if page.is_empty() {
        return Ok(Vec::new());
    }

    let build_phids: Vec<String> = page.iter().map(|v| v.build.phid.clone()).collect();

    let (plans, mut commands, mut targets) = tokio::try_join!(
        load_plans(sources.objects, viewer, &page),
        load_commands(sources.commands, &build_phids),
        load_targets(sources.targets, &build_phids, need_build_targets),
    )?;

    let mut stale = 0;
    let hydrated: Vec<HydratedBuild> = page
        .into_iter()
        .map(|VisibleBuild { build, buildable }| {
            let build_plan = build
                .build_plan_phid
                .as_ref()
                .and_then(|phid| plans.get(phid).cloned());
            let unprocessed_commands = commands.remove(&build.phid).unwrap_or_default();
            let build_targets = targets.as_mut().map(|groups| {
                let group = groups.remove(&build.phid).unwrap_or_default();
                let (kept, dropped) = retain_current_generation(&build, group);
                stale += dropped;
                kept
            });

            HydratedBuild {
                build,
                buildable,
                build_plan,
                unprocessed_commands,
                build_targets,
            }
        })
        .collect();

    if stale > 0 {
        tracing::debug!(stale, "Dropped targets from superseded build generations");
    }
    crate::metrics::stale_targets_dropped(stale);

    Ok(hydrated)
}

async fn load_plans(
    resolver: &dyn ObjectResolver,
    viewer: &Viewer,
    page: &[VisibleBuild],
) -> QueryResult<HashMap<String, CiBuildPlan>> {
    let phids = distinct_phids(page.iter().filter_map(|v| v.build.build_plan_phid.as_deref()));
    if phids.is_empty() {
        return Ok(HashMap::new());
    }

    let plans = resolver
        .resolve(viewer, &phids)
        .await?
        .into_iter()
        .filter_map(|(phid, object)| object.into_build_plan().map(|plan| (phid, plan)))
        .collect();
    Ok(plans)
}

async fn load_commands(
    store: &dyn CommandStore,
    build_phids: &[String],
) -> QueryResult<HashMap<String, Vec<CiBuildCommand>>> {
    let commands = store.load_commands(build_phids).await?;
    Ok(group_by_key(commands, |command| &command.target_phid))
}

async fn load_targets(
    store: &dyn TargetStore,
    build_phids: &[String],
    need_build_targets: bool,
) -> QueryResult<Option<HashMap<String, Vec<CiBuildTarget>>>> {
    if !need_build_targets {
        return Ok(None);
    }

    let mut targets = store.load_targets(build_phids).await?;
    // Stores return most recent first; callers read targets chronologically.
    targets.reverse();
    Ok(Some(group_by_key(targets, |target| &target.build_phid)))
}

/// Group `items` by owner key, keeping each group's relative order.
pub fn group_by_key<T, F>(items: Vec<T>, key: F) -> HashMap<String, Vec<T>>
where
    F: Fn(&T) -> &String,
{
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item).clone()).or_default().push(item);
    }
    groups
}
