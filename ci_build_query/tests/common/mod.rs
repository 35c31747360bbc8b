//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ci_build_query::models::phid::{make_phid, BUILDABLE_TYPE, BUILD_PLAN_TYPE, BUILD_TARGET_TYPE, BUILD_TYPE};
use ci_build_query::{
    BuildStatus, CiBuild, CiBuildCommand, CiBuildPlan, CiBuildTarget, CiBuildable, MemoryStore,
    PolicyObject, Viewer,
};

pub const ALICE: &str = "PHID-USER-alice";

pub fn build_phid(id: i64) -> String {
    make_phid(BUILD_TYPE, id)
}

pub fn buildable_phid(name: &str) -> String {
    make_phid(BUILDABLE_TYPE, name)
}

pub fn plan_phid(name: &str) -> String {
    make_phid(BUILD_PLAN_TYPE, name)
}

pub fn build(id: i64, buildable: &str, plan: Option<&str>, generation: i32) -> CiBuild {
    CiBuild {
        id,
        phid: build_phid(id),
        buildable_phid: buildable_phid(buildable),
        build_plan_phid: plan.map(plan_phid),
        build_status: BuildStatus::Building.as_str().to_string(),
        build_generation: generation,
        create_date: None,
    }
}

pub fn with_status(mut build: CiBuild, status: BuildStatus) -> CiBuild {
    build.build_status = status.as_str().to_string();
    build
}

/// A buildable whose `view_policy` is either `public` or a user PHID.
pub fn buildable(id: i64, name: &str, view_policy: &str) -> CiBuildable {
    CiBuildable {
        id,
        phid: buildable_phid(name),
        object_phid: format!("PHID-CMIT-{name}"),
        container_phid: None,
        is_manual: false,
        view_policy: view_policy.to_string(),
        create_date: None,
    }
}

pub fn plan(id: i64, name: &str) -> CiBuildPlan {
    CiBuildPlan {
        id,
        phid: plan_phid(name),
        name: format!("Plan {name}"),
        plan_status: "active".to_string(),
        view_policy: "public".to_string(),
        create_date: None,
    }
}

pub fn command(id: i64, build_id: i64, command: &str) -> CiBuildCommand {
    CiBuildCommand {
        id,
        author_phid: ALICE.to_string(),
        target_phid: build_phid(build_id),
        command: command.to_string(),
        create_date: None,
    }
}

pub fn target(id: i64, build_id: i64, generation: i32) -> CiBuildTarget {
    CiBuildTarget {
        id,
        phid: make_phid(BUILD_TARGET_TYPE, id),
        build_phid: build_phid(build_id),
        build_generation: generation,
        name: format!("T{id}"),
        target_status: "passed".to_string(),
        create_date: None,
    }
}

/// `public` objects are visible to everyone; otherwise the policy names the
/// only user PHID allowed to see the object.
pub fn owner_policy(viewer: &Viewer, object: &PolicyObject) -> bool {
    let policy = object.view_policy();
    policy == "public" || viewer.user_phid.as_deref() == Some(policy)
}

pub fn store() -> MemoryStore {
    MemoryStore::with_policy(Arc::new(owner_policy))
}
