//! Centrix CI build query engine.
//!
//! Loads cursor-paged builds together with their buildable, build plan,
//! pending commands and (on request) current-generation build targets.
//! Builds whose buildable the viewer cannot see are left out of the page.

pub mod config;
pub mod criteria;
pub mod cursor;
pub mod error;
pub mod metrics;
pub mod migration;
pub mod models;
pub mod policy;
pub mod query;
pub mod schema;
pub mod store;
pub mod telemetry;

pub use config::QueryConfig;
pub use criteria::{BuildCriteria, EmptyListSemantics, FilterClause, FilterExpr};
pub use cursor::PageCursor;
pub use error::{QueryError, QueryResult};
pub use models::build::{BuildStatus, CiBuild};
pub use models::build_command::{CiBuildCommand, CommandKind};
pub use models::build_plan::CiBuildPlan;
pub use models::build_target::CiBuildTarget;
pub use models::buildable::CiBuildable;
pub use policy::{AllowAll, PolicyAwareQuery, PolicyObject, Viewer, VisibilityPolicy};
pub use query::{BuildPage, BuildQuery, HydratedBuild, QuerySources};
pub use store::{BuildStore, CommandStore, MemoryStore, ObjectResolver, PgStore, TargetStore};
