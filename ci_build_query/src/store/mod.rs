//! Collaborator interfaces the query pipeline reads through.
//!
//! Each trait is one batch read. Implementations must not retry; any error
//! aborts the query and is returned to the caller unchanged.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::criteria::FilterExpr;
use crate::error::QueryResult;
use crate::models::build::CiBuild;
use crate::models::build_command::CiBuildCommand;
use crate::models::build_target::CiBuildTarget;
use crate::policy::{PolicyObject, Viewer};

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Builds matching `filter`, id ascending, at most `limit` rows.
    async fn load_builds(&self, filter: &FilterExpr, limit: usize) -> QueryResult<Vec<CiBuild>>;
}

#[async_trait]
pub trait ObjectResolver: Send + Sync {
    /// Resolve PHIDs of any kind for `viewer`, keyed by PHID.
    ///
    /// PHIDs that do not exist or that the viewer may not see are omitted.
    async fn resolve(
        &self,
        viewer: &Viewer,
        phids: &[String],
    ) -> QueryResult<HashMap<String, PolicyObject>>;
}

#[async_trait]
pub trait CommandStore: Send + Sync {
    /// Commands targeting any of `build_phids`, in creation order.
    async fn load_commands(&self, build_phids: &[String]) -> QueryResult<Vec<CiBuildCommand>>;
}

#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Targets owned by any of `build_phids`, most recent first.
    async fn load_targets(&self, build_phids: &[String]) -> QueryResult<Vec<CiBuildTarget>>;
}
