//! Stale-generation filtering for build targets.
//!
//! Restarting a build bumps its generation. Targets produced by earlier
//! generations stay in storage but must never be shown against the build.

use crate::models::build::CiBuild;
use crate::models::build_target::CiBuildTarget;

pub fn is_current_generation(build: &CiBuild, target: &CiBuildTarget) -> bool {
    target.build_generation == build.build_generation
}

/// Predicate form of [`is_current_generation`] bound to one build.
pub fn current_generation(build: &CiBuild) -> impl Fn(&CiBuildTarget) -> bool + '_ {
    move |target: &CiBuildTarget| is_current_generation(build, target)
}

/// Keep only `build`'s current-generation targets, preserving order.
///
/// Returns the kept targets and how many were dropped.
pub fn retain_current_generation(
    build: &CiBuild,
    targets: Vec<CiBuildTarget>,
) -> (Vec<CiBuildTarget>, usize) {
    let total = targets.len();
    let kept: Vec<CiBuildTarget> = targets
        .into_iter()
        .filter(current_generation(build))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}
