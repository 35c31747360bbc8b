//! In-memory store implementing every collaborator trait.
//!
//! Used by tests and by hosts that keep builds in process. Filter
//! expressions are evaluated with [`FilterExpr::matches`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::criteria::FilterExpr;
use crate::error::QueryResult;
use crate::models::build::CiBuild;
use crate::models::build_command::CiBuildCommand;
use crate::models::build_plan::CiBuildPlan;
use crate::models::build_target::CiBuildTarget;
use crate::models::buildable::CiBuildable;
use crate::policy::{AllowAll, PolicyObject, Viewer, VisibilityPolicy};
use crate::store::{BuildStore, CommandStore, ObjectResolver, TargetStore};

/// Number of batch reads served, per collaborator.
#[derive(Debug, Default)]
pub struct CallCounts {
    pub builds: AtomicUsize,
    pub objects: AtomicUsize,
    pub commands: AtomicUsize,
    pub targets: AtomicUsize,
}

pub struct MemoryStore {
    builds: RwLock<BTreeMap<i64, CiBuild>>,
    objects: RwLock<HashMap<String, PolicyObject>>,
    commands: RwLock<BTreeMap<i64, CiBuildCommand>>,
    targets: RwLock<BTreeMap<i64, CiBuildTarget>>,
    policy: Arc<dyn VisibilityPolicy>,
    calls: CallCounts,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_policy(Arc::new(AllowAll))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: Arc<dyn VisibilityPolicy>) -> Self {
        Self {
            builds: RwLock::default(),
            objects: RwLock::default(),
            commands: RwLock::default(),
            targets: RwLock::default(),
            policy,
            calls: CallCounts::default(),
        }
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    pub async fn insert_build(&self, build: CiBuild) {
        self.builds.write().await.insert(build.id, build);
    }

    pub async fn insert_buildable(&self, buildable: CiBuildable) {
        self.objects
            .write()
            .await
            .insert(buildable.phid.clone(), PolicyObject::Buildable(buildable));
    }

    pub async fn insert_build_plan(&self, plan: CiBuildPlan) {
        self.objects
            .write()
            .await
            .insert(plan.phid.clone(), PolicyObject::BuildPlan(plan));
    }

    /// Remove a plan, leaving builds that reference it dangling.
    pub async fn delete_build_plan(&self, phid: &str) {
        self.objects.write().await.remove(phid);
    }

    pub async fn insert_command(&self, command: CiBuildCommand) {
        self.commands.write().await.insert(command.id, command);
    }

    pub async fn insert_target(&self, target: CiBuildTarget) {
        self.targets.write().await.insert(target.id, target);
    }
}

#[async_trait]
impl BuildStore for MemoryStore {
    async fn load_builds(&self, filter: &FilterExpr, limit: usize) -> QueryResult<Vec<CiBuild>> {
        self.calls.builds.fetch_add(1, Ordering::Relaxed);
        let builds = self.builds.read().await;
        Ok(builds
            .values()
            .filter(|build| filter.matches(build))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ObjectResolver for MemoryStore {
    async fn resolve(
        &self,
        viewer: &Viewer,
        phids: &[String],
    ) -> QueryResult<HashMap<String, PolicyObject>> {
        self.calls.objects.fetch_add(1, Ordering::Relaxed);
        let objects = self.objects.read().await;
        Ok(phids
            .iter()
            .filter_map(|phid| objects.get(phid))
            .filter(|object| viewer.omnipotent || self.policy.can_view(viewer, object))
            .map(|object| (object.phid().to_string(), object.clone()))
            .collect())
    }
}

#[async_trait]
impl CommandStore for MemoryStore {
    async fn load_commands(&self, build_phids: &[String]) -> QueryResult<Vec<CiBuildCommand>> {
        self.calls.commands.fetch_add(1, Ordering::Relaxed);
        let commands = self.commands.read().await;
        Ok(commands
            .values()
            .filter(|command| build_phids.contains(&command.target_phid))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TargetStore for MemoryStore {
    async fn load_targets(&self, build_phids: &[String]) -> QueryResult<Vec<CiBuildTarget>> {
        self.calls.targets.fetch_add(1, Ordering::Relaxed);
        let targets = self.targets.read().await;
        Ok(targets
            .values()
            .rev()
            .filter(|target| build_phids.contains(&target.build_phid))
            .cloned()
            .collect())
    }
}
