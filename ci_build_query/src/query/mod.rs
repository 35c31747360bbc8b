//! The build query: criteria → page load → visibility → hydration.
//!
//! ```ignore
//! let page = BuildQuery::new(viewer, QuerySources::from_store(&store))
//!     .with_buildable_phids(["PHID-HMBB-1"])
//!     .need_build_targets(true)
//!     .with_limit(20)
//!     .execute()
//!     .await?;
//! ```

pub mod generation;
pub mod hydrate;
pub mod visibility;

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use crate::config::QueryConfig;
use crate::criteria::{BuildCriteria, EmptyListSemantics};
use crate::cursor::PageCursor;
use crate::error::QueryResult;
use crate::models::build::{BuildStatus, CiBuild};
use crate::policy::{PolicyAwareQuery, Viewer, BUILD_QUERY_APPLICATION};
use crate::store::{BuildStore, CommandStore, ObjectResolver, TargetStore};

pub use hydrate::HydratedBuild;
pub use visibility::VisibleBuild;

/// The collaborators one query execution reads through.
#[derive(Clone, Copy)]
pub struct QuerySources<'a> {
    pub builds: &'a dyn BuildStore,
    pub objects: &'a dyn ObjectResolver,
    pub commands: &'a dyn CommandStore,
    pub targets: &'a dyn TargetStore,
}

impl<'a> QuerySources<'a> {
    /// Use one store for every collaborator.
    pub fn from_store<S>(store: &'a S) -> Self
    where
        S: BuildStore + ObjectResolver + CommandStore + TargetStore,
    {
        Self {
            builds: store,
            objects: store,
            commands: store,
            targets: store,
        }
    }
}

/// One page of hydrated builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPage {
    pub builds: Vec<HydratedBuild>,
    /// Token for the next page; `None` once the results are exhausted.
    pub next_cursor: Option<String>,
}

impl BuildPage {
    pub fn empty() -> Self {
        Self {
            builds: Vec::new(),
            next_cursor: None,
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.builds.iter().map(HydratedBuild::id).collect()
    }
}

pub struct BuildQuery<'a> {
    viewer: Viewer,
    sources: QuerySources<'a>,
    criteria: BuildCriteria,
    need_build_targets: bool,
    cursor: Option<String>,
    page_size: usize,
    max_page_size: usize,
    empty_lists: EmptyListSemantics,
}

impl<'a> BuildQuery<'a> {
    pub fn new(viewer: Viewer, sources: QuerySources<'a>) -> Self {
        Self::with_config(viewer, sources, &QueryConfig::default())
    }

    pub fn with_config(viewer: Viewer, sources: QuerySources<'a>, config: &QueryConfig) -> Self {
        Self {
            viewer,
            sources,
            criteria: BuildCriteria::default(),
            need_build_targets: false,
            cursor: None,
            page_size: config.clamp_page_size(config.default_page_size),
            max_page_size: config.max_page_size,
            empty_lists: config.empty_lists,
        }
    }

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.criteria.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_phids<S: Into<String>>(mut self, phids: impl IntoIterator<Item = S>) -> Self {
        self.criteria.phids = Some(phids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_build_statuses(mut self, statuses: impl IntoIterator<Item = BuildStatus>) -> Self {
        self.criteria.build_statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn with_buildable_phids<S: Into<String>>(
        mut self,
        phids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.criteria.buildable_phids = Some(phids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_build_plan_phids<S: Into<String>>(
        mut self,
        phids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.criteria.build_plan_phids = Some(phids.into_iter().map(Into::into).collect());
        self
    }

    /// Opt in to loading current-generation build targets.
    pub fn need_build_targets(mut self, need: bool) -> Self {
        self.need_build_targets = need;
        self
    }

    /// Resume after the page that returned `token` as its `next_cursor`.
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.cursor = Some(token.into());
        self
    }

    /// Page size, clamped to the configured maximum.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.page_size = limit.clamp(1, self.max_page_size.max(1));
        self
    }

    pub fn criteria(&self) -> &BuildCriteria {
        &self.criteria
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub async fn execute(&self) -> QueryResult<BuildPage> {
        let started = Instant::now();
        let result = self.load().await;

        crate::metrics::query_duration(started.elapsed().as_millis() as u64);
        match &result {
            Ok(page) => {
                crate::metrics::query_executed("ok");
                crate::metrics::page_returned(page.builds.len());
                tracing::info!(
                    returned = page.builds.len(),
                    has_more = page.next_cursor.is_some(),
                    "Build query executed"
                );
            }
            Err(e) => {
                crate::metrics::query_executed("error");
                tracing::warn!(error = %e, "Build query failed");
            }
        }

        result
    }

    async fn load(&self) -> QueryResult<BuildPage> {
        let cursor = self.cursor.as_deref().map(PageCursor::decode).transpose()?;
        let filter = self.criteria.to_filter(cursor.as_ref(), self.empty_lists);

        if filter.is_unsatisfiable() {
            tracing::debug!("Build query has an empty filter list; skipping load");
            return Ok(BuildPage::empty());
        }

        let raw = self
            .sources
            .builds
            .load_builds(&filter, self.page_size.saturating_add(1))
            .await?;
        let (raw, next_cursor) = split_page(raw, self.page_size);
        tracing::debug!(loaded = raw.len(), "Loaded raw build page");

        let visible = visibility::filter_visible(self.sources.objects, &self.viewer, raw).await?;
        let builds =
            hydrate::hydrate(self.sources, &self.viewer, visible, self.need_build_targets).await?;

        Ok(BuildPage {
            builds,
            next_cursor,
        })
    }
}

impl PolicyAwareQuery for BuildQuery<'_> {
    const APPLICATION: &'static str = BUILD_QUERY_APPLICATION;

    fn viewer(&self) -> &Viewer {
        &self.viewer
    }
}

/// Trim the look-ahead row and derive the continuation cursor.
///
/// The cursor points past the last *loaded* build, visible or not, so hidden
/// builds are never rescanned by the next page.
fn split_page(mut raw: Vec<CiBuild>, page_size: usize) -> (Vec<CiBuild>, Option<String>) {
    if raw.len() <= page_size {
        return (raw, None);
    }
    raw.truncate(page_size);
    let next_cursor = raw.last().map(|build| PageCursor::after(build.id).encode());
    (raw, next_cursor)
}

/// Distinct, non-empty PHIDs in a stable order.
pub(crate) fn distinct_phids<'p>(phids: impl IntoIterator<Item = &'p str>) -> Vec<String> {
    phids
        .into_iter()
        .filter(|phid| !phid.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
