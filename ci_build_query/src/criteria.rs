//! Build filter criteria and the backend-agnostic filter expression they
//! compile to.
//!
//! A [`FilterExpr`] is a conjunction of [`FilterClause`]s. Each clause is an
//! OR over its value list, so the whole expression reads as
//! `(id IN ..) AND (phid IN ..) AND .. AND (id > cursor)`.

use serde::{Deserialize, Serialize};

use crate::cursor::PageCursor;
use crate::models::build::{BuildStatus, CiBuild};

/// What an explicitly empty value list means for a dimension.
///
/// `None` on a dimension always means "no filter"; this only decides how
/// `Some(vec![])` is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyListSemantics {
    /// `Some(vec![])` matches no builds.
    #[default]
    MatchNothing,
    /// `Some(vec![])` is treated like `None`.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterClause {
    IdIn(Vec<i64>),
    PhidIn(Vec<String>),
    StatusIn(Vec<BuildStatus>),
    BuildablePhidIn(Vec<String>),
    BuildPlanPhidIn(Vec<String>),
    /// Cursor continuation: `id > after`.
    IdAfter(i64),
}

impl FilterClause {
    pub fn matches(&self, build: &CiBuild) -> bool {
        match self {
            FilterClause::IdIn(ids) => ids.contains(&build.id),
            FilterClause::PhidIn(phids) => phids.contains(&build.phid),
            FilterClause::StatusIn(statuses) => statuses
                .iter()
                .any(|status| status.as_str() == build.build_status),
            FilterClause::BuildablePhidIn(phids) => phids.contains(&build.buildable_phid),
            // SQL `NULL IN (..)` is never true.
            FilterClause::BuildPlanPhidIn(phids) => build
                .build_plan_phid
                .as_ref()
                .is_some_and(|plan| phids.contains(plan)),
            FilterClause::IdAfter(after) => build.id > *after,
        }
    }

    /// An IN-clause with no values can never match.
    pub fn is_empty_set(&self) -> bool {
        match self {
            FilterClause::IdIn(v) => v.is_empty(),
            FilterClause::PhidIn(v) => v.is_empty(),
            FilterClause::StatusIn(v) => v.is_empty(),
            FilterClause::BuildablePhidIn(v) => v.is_empty(),
            FilterClause::BuildPlanPhidIn(v) => v.is_empty(),
            FilterClause::IdAfter(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpr {
    clauses: Vec<FilterClause>,
}

impl FilterExpr {
    /// The expression that matches every build.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn matches(&self, build: &CiBuild) -> bool {
        self.clauses.iter().all(|clause| clause.matches(build))
    }

    /// True when some clause rules out every build, so the backend need not
    /// be consulted.
    pub fn is_unsatisfiable(&self) -> bool {
        self.clauses.iter().any(FilterClause::is_empty_set)
    }
}

/// Optional filter dimensions. Unset dimensions do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCriteria {
    pub ids: Option<Vec<i64>>,
    pub phids: Option<Vec<String>>,
    pub build_statuses: Option<Vec<BuildStatus>>,
    pub buildable_phids: Option<Vec<String>>,
    pub build_plan_phids: Option<Vec<String>>,
}

impl BuildCriteria {
    pub fn to_filter(&self, cursor: Option<&PageCursor>, empty: EmptyListSemantics) -> FilterExpr {
        let mut expr = FilterExpr::all();

        if let Some(ids) = dimension(&self.ids, empty) {
            expr = expr.and(FilterClause::IdIn(ids.to_vec()));
        }
        if let Some(phids) = dimension(&self.phids, empty) {
            expr = expr.and(FilterClause::PhidIn(phids.to_vec()));
        }
        if let Some(statuses) = dimension(&self.build_statuses, empty) {
            expr = expr.and(FilterClause::StatusIn(statuses.to_vec()));
        }
        if let Some(phids) = dimension(&self.buildable_phids, empty) {
            expr = expr.and(FilterClause::BuildablePhidIn(phids.to_vec()));
        }
        if let Some(phids) = dimension(&self.build_plan_phids, empty) {
            expr = expr.and(FilterClause::BuildPlanPhidIn(phids.to_vec()));
        }
        if let Some(cursor) = cursor {
            expr = expr.and(FilterClause::IdAfter(cursor.after_id()));
        }

        expr
    }
}

fn dimension<T>(values: &Option<Vec<T>>, empty: EmptyListSemantics) -> Option<&[T]> {
    match values.as_deref() {
        Some([]) if empty == EmptyListSemantics::Ignore => None,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn build(id: i64, status: BuildStatus, buildable: &str, plan: Option<&str>) -> CiBuild {
        CiBuild {
            id,
            phid: format!("PHID-HMBD-{id}"),
            buildable_phid: buildable.to_string(),
            build_plan_phid: plan.map(str::to_string),
            build_status: status.as_str().to_string(),
            build_generation: 1,
            create_date: None,
        }
    }

    #[test]
    fn unset_criteria_only_carry_the_cursor() {
        let criteria = BuildCriteria::default();
        assert_eq!(
            criteria.to_filter(None, EmptyListSemantics::MatchNothing),
            FilterExpr::all()
        );
        assert_eq!(
            criteria
                .to_filter(Some(&PageCursor::after(9)), EmptyListSemantics::MatchNothing)
                .clauses(),
            &[FilterClause::IdAfter(9)]
        );
    }

    #[test]
    fn clauses_follow_dimension_order() {
        let criteria = BuildCriteria {
            ids: Some(vec![1, 2]),
            build_statuses: Some(vec![BuildStatus::Passed]),
            build_plan_phids: Some(vec!["PHID-HMCP-1".into()]),
            ..Default::default()
        };
        let expr = criteria.to_filter(Some(&PageCursor::after(1)), EmptyListSemantics::MatchNothing);
        assert_eq!(
            expr.clauses(),
            &[
                FilterClause::IdIn(vec![1, 2]),
                FilterClause::StatusIn(vec![BuildStatus::Passed]),
                FilterClause::BuildPlanPhidIn(vec!["PHID-HMCP-1".into()]),
                FilterClause::IdAfter(1),
            ]
        );
    }

    #[test]
    fn empty_list_matches_nothing_by_default() {
        let criteria = BuildCriteria {
            buildable_phids: Some(vec![]),
            ..Default::default()
        };
        let expr = criteria.to_filter(None, EmptyListSemantics::default());
        assert!(expr.is_unsatisfiable());
        assert!(!expr.matches(&build(1, BuildStatus::Passed, "PHID-HMBB-1", None)));
    }

    #[test]
    fn empty_list_can_be_ignored() {
        let criteria = BuildCriteria {
            buildable_phids: Some(vec![]),
            ..Default::default()
        };
        let expr = criteria.to_filter(None, EmptyListSemantics::Ignore);
        assert_eq!(expr, FilterExpr::all());
        assert!(expr.matches(&build(1, BuildStatus::Passed, "PHID-HMBB-1", None)));
    }

    #[test]
    fn null_plan_never_matches_plan_filter() {
        let clause = FilterClause::BuildPlanPhidIn(vec!["PHID-HMCP-1".into()]);
        assert!(!clause.matches(&build(1, BuildStatus::Passed, "PHID-HMBB-1", None)));
        assert!(clause.matches(&build(1, BuildStatus::Passed, "PHID-HMBB-1", Some("PHID-HMCP-1"))));
    }

    fn arb_status() -> impl Strategy<Value = BuildStatus> {
        prop::sample::select(BuildStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn filter_is_and_across_dimensions_or_within(
            id in 1i64..40,
            status in arb_status(),
            buildable in 0u8..4,
            ids in prop::option::of(prop::collection::vec(1i64..40, 0..6)),
            statuses in prop::option::of(prop::collection::vec(arb_status(), 0..4)),
            buildables in prop::option::of(prop::collection::vec(0u8..4, 0..3)),
            after in prop::option::of(0i64..40),
        ) {
            let buildable_phid = format!("PHID-HMBB-{buildable}");
            let candidate = build(id, status, &buildable_phid, None);
            let criteria = BuildCriteria {
                ids: ids.clone(),
                build_statuses: statuses.clone(),
                buildable_phids: buildables
                    .as_ref()
                    .map(|v| v.iter().map(|b| format!("PHID-HMBB-{b}")).collect()),
                ..Default::default()
            };
            let cursor = after.map(PageCursor::after);
            let expr = criteria.to_filter(cursor.as_ref(), EmptyListSemantics::MatchNothing);

            let expected = ids.as_ref().map_or(true, |v| v.contains(&id))
                && statuses.as_ref().map_or(true, |v| v.contains(&status))
                && buildables.as_ref().map_or(true, |v| v.contains(&buildable))
                && after.map_or(true, |a| id > a);

            prop_assert_eq!(expr.matches(&candidate), expected);
            if expr.is_unsatisfiable() {
                prop_assert!(!expr.matches(&candidate));
            }
        }
    }
}
