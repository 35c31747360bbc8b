//! PHID helpers.
//!
//! Every object is addressed by a PHID of the form `PHID-<TYPE>-<suffix>`.
//! The type segment says which table the object lives in, which lets one
//! resolution call accept identifiers of several kinds at once.

pub const BUILD_TYPE: &str = "HMBD";
pub const BUILDABLE_TYPE: &str = "HMBB";
pub const BUILD_PLAN_TYPE: &str = "HMCP";
pub const BUILD_TARGET_TYPE: &str = "HMBT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhidKind {
    Build,
    Buildable,
    BuildPlan,
    BuildTarget,
    Unknown,
}

impl PhidKind {
    pub fn of(phid: &str) -> Self {
        let mut parts = phid.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("PHID"), Some(kind), Some(rest)) if !rest.is_empty() => match kind {
                BUILD_TYPE => PhidKind::Build,
                BUILDABLE_TYPE => PhidKind::Buildable,
                BUILD_PLAN_TYPE => PhidKind::BuildPlan,
                BUILD_TARGET_TYPE => PhidKind::BuildTarget,
                _ => PhidKind::Unknown,
            },
            _ => PhidKind::Unknown,
        }
    }
}

/// Compose a PHID for the given type segment.
pub fn make_phid(type_code: &str, suffix: impl std::fmt::Display) -> String {
    format!("PHID-{type_code}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_read_from_type_segment() {
        assert_eq!(PhidKind::of("PHID-HMBD-abc"), PhidKind::Build);
        assert_eq!(PhidKind::of("PHID-HMBB-abc"), PhidKind::Buildable);
        assert_eq!(PhidKind::of("PHID-HMCP-abc"), PhidKind::BuildPlan);
        assert_eq!(PhidKind::of("PHID-HMBT-abc"), PhidKind::BuildTarget);
        assert_eq!(PhidKind::of("PHID-USER-abc"), PhidKind::Unknown);
    }

    #[test]
    fn malformed_phids_are_unknown() {
        assert_eq!(PhidKind::of(""), PhidKind::Unknown);
        assert_eq!(PhidKind::of("PHID-HMBB"), PhidKind::Unknown);
        assert_eq!(PhidKind::of("PHID-HMBB-"), PhidKind::Unknown);
        assert_eq!(PhidKind::of("HMBB-1"), PhidKind::Unknown);
    }

    #[test]
    fn make_phid_round_trips_kind() {
        let phid = make_phid(BUILDABLE_TYPE, 42);
        assert_eq!(phid, "PHID-HMBB-42");
        assert_eq!(PhidKind::of(&phid), PhidKind::Buildable);
    }
}
