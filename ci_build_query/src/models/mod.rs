//! Read models for builds and the entities hydrated onto them.

pub mod build;
pub mod build_command;
pub mod build_plan;
pub mod build_target;
pub mod buildable;
pub mod phid;
