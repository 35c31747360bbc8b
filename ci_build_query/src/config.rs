//! Query engine configuration, loaded from environment variables.

use crate::criteria::EmptyListSemantics;

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_MAX_PAGE_SIZE: usize = 1000;
const DEFAULT_POOL_SIZE: usize = 5;

#[derive(Clone, Debug)]
pub struct QueryConfig {
    /// Page size used when the caller does not set one.
    pub default_page_size: usize,
    /// Caller page sizes are clamped to this.
    pub max_page_size: usize,
    /// How an explicitly empty filter list is interpreted.
    pub empty_lists: EmptyListSemantics,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum pooled connections.
    pub pool_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            empty_lists: EmptyListSemantics::MatchNothing,
            database_url: "postgres://ci:ci@localhost:5432/ci".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl QueryConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset or invalid values fall back
    /// to the defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |key: &str| parse_value::<usize>(key, get(key)).filter(|n| *n > 0);

        let max_page_size = positive("CI_QUERY_MAX_PAGE_SIZE").unwrap_or(defaults.max_page_size);
        let default_page_size = positive("CI_QUERY_PAGE_SIZE")
            .unwrap_or(defaults.default_page_size)
            .min(max_page_size);
        let empty_lists = match get("CI_QUERY_EMPTY_LIST").as_deref() {
            None | Some("match_nothing") => EmptyListSemantics::MatchNothing,
            Some("ignore") => EmptyListSemantics::Ignore,
            Some(other) => {
                tracing::warn!(value = other, "Unknown CI_QUERY_EMPTY_LIST -- using match_nothing");
                EmptyListSemantics::MatchNothing
            }
        };
        let database_url = get("DATABASE_URL").unwrap_or_else(|| {
            tracing::warn!("DATABASE_URL not set -- using local default");
            defaults.database_url.clone()
        });
        let pool_size = positive("CI_QUERY_POOL_SIZE").unwrap_or(defaults.pool_size);

        Self {
            default_page_size,
            max_page_size,
            empty_lists,
            database_url,
            pool_size,
        }
    }

    /// Clamp a requested page size into `1..=max_page_size`.
    pub fn clamp_page_size(&self, requested: usize) -> usize {
        requested.clamp(1, self.max_page_size.max(1))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid value -- using default");
            None
        }
    }
}
