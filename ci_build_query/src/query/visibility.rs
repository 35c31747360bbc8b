//! Viewer-scoped visibility filtering.
//!
//! A build is only as visible as its buildable. Builds whose buildable the
//! resolver does not return are removed from the page as if they did not
//! exist.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::QueryResult;
use crate::models::build::CiBuild;
use crate::models::buildable::CiBuildable;
use crate::policy::Viewer;
use crate::query::distinct_phids;
use crate::store::ObjectResolver;

/// A build that passed visibility filtering, with its buildable attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleBuild {
    pub build: CiBuild,
    pub buildable: CiBuildable,
}

/// Resolve every buildable on the page in one call and drop builds whose
/// buildable is missing or hidden from `viewer`.
pub async fn filter_visible(
    resolver: &dyn ObjectResolver,
    viewer: &Viewer,
    page: Vec<CiBuild>,
) -> QueryResult<Vec<VisibleBuild>> {
    let phids = distinct_phids(page.iter().map(|build| build.buildable_phid.as_str()));

    let buildables = if phids.is_empty() {
        HashMap::new()
    } else {
        resolver
            .resolve(viewer, &phids)
            .await?
            .into_iter()
            .filter_map(|(phid, object)| object.into_buildable().map(|b| (phid, b)))
            .collect()
    };

    Ok(attach_buildables(page, &buildables))
}

/// Pair each build with its resolved buildable, dropping the ones without.
pub fn attach_buildables(
    page: Vec<CiBuild>,
    buildables: &HashMap<String, CiBuildable>,
) -> Vec<VisibleBuild> {
    let total = page.len();
    let visible: Vec<VisibleBuild> = page
        .into_iter()
        .filter_map(|build| {
            let buildable = buildables.get(&build.buildable_phid)?.clone();
            Some(VisibleBuild { build, buildable })
        })
        .collect();

    let hidden = total - visible.len();
    if hidden > 0 {
        tracing::debug!(hidden, total, "Dropped builds with missing or hidden buildables");
    }
    crate::metrics::builds_hidden(hidden);

    visible
}
