//! Viewer identity and the policy seam used by object resolution.
//!
//! Rule evaluation lives with the host application. This crate only asks
//! "may this viewer see this object" through [`VisibilityPolicy`], and
//! resolvers drop anything that answers no.

use serde::{Deserialize, Serialize};

use crate::models::build_plan::CiBuildPlan;
use crate::models::buildable::CiBuildable;

/// Application that owns the policy namespace of build queries.
pub const BUILD_QUERY_APPLICATION: &str = "harbormaster";

/// The identity on whose behalf a query runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewer {
    pub user_phid: Option<String>,
    /// Bypasses policy checks (daemons, migrations).
    pub omnipotent: bool,
}

impl Viewer {
    pub fn user(phid: impl Into<String>) -> Self {
        Self {
            user_phid: Some(phid.into()),
            omnipotent: false,
        }
    }

    /// A logged-out viewer.
    pub fn public() -> Self {
        Self {
            user_phid: None,
            omnipotent: false,
        }
    }

    pub fn omnipotent() -> Self {
        Self {
            user_phid: None,
            omnipotent: true,
        }
    }
}

/// Any object a PHID can resolve to through an [`ObjectResolver`].
///
/// [`ObjectResolver`]: crate::store::ObjectResolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolicyObject {
    Buildable(CiBuildable),
    BuildPlan(CiBuildPlan),
}

impl PolicyObject {
    pub fn phid(&self) -> &str {
        match self {
            PolicyObject::Buildable(b) => &b.phid,
            PolicyObject::BuildPlan(p) => &p.phid,
        }
    }

    pub fn view_policy(&self) -> &str {
        match self {
            PolicyObject::Buildable(b) => &b.view_policy,
            PolicyObject::BuildPlan(p) => &p.view_policy,
        }
    }

    pub fn into_buildable(self) -> Option<CiBuildable> {
        match self {
            PolicyObject::Buildable(b) => Some(b),
            PolicyObject::BuildPlan(_) => None,
        }
    }

    pub fn into_build_plan(self) -> Option<CiBuildPlan> {
        match self {
            PolicyObject::BuildPlan(p) => Some(p),
            PolicyObject::Buildable(_) => None,
        }
    }
}

pub trait VisibilityPolicy: Send + Sync {
    fn can_view(&self, viewer: &Viewer, object: &PolicyObject) -> bool;
}

impl<F> VisibilityPolicy for F
where
    F: Fn(&Viewer, &PolicyObject) -> bool + Send + Sync,
{
    fn can_view(&self, viewer: &Viewer, object: &PolicyObject) -> bool {
        self(viewer, object)
    }
}

/// Every viewer sees every object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl VisibilityPolicy for AllowAll {
    fn can_view(&self, _viewer: &Viewer, _object: &PolicyObject) -> bool {
        true
    }
}

/// Queries whose results are checked against an application's policies.
pub trait PolicyAwareQuery {
    /// The owning application; fixed per query type.
    const APPLICATION: &'static str;

    fn viewer(&self) -> &Viewer;
}
