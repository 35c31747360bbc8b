//! Diesel table definitions for the build query engine.
//!
//! Tables: ci_buildables, ci_build_plans, ci_builds, ci_build_commands,
//! ci_build_targets. Cross-table references use PHIDs, not ids.

diesel::table! {
    ci_buildables (id) {
        id -> Int8,
        phid -> Varchar,
        object_phid -> Varchar,
        container_phid -> Nullable<Varchar>,
        is_manual -> Bool,
        view_policy -> Varchar,
        create_date -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    ci_build_plans (id) {
        id -> Int8,
        phid -> Varchar,
        name -> Varchar,
        plan_status -> Varchar,
        view_policy -> Varchar,
        create_date -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    ci_builds (id) {
        id -> Int8,
        phid -> Varchar,
        buildable_phid -> Varchar,
        build_plan_phid -> Nullable<Varchar>,
        build_status -> Varchar,
        build_generation -> Int4,
        create_date -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    ci_build_commands (id) {
        id -> Int8,
        author_phid -> Varchar,
        target_phid -> Varchar,
        command -> Varchar,
        create_date -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    ci_build_targets (id) {
        id -> Int8,
        phid -> Varchar,
        build_phid -> Varchar,
        build_generation -> Int4,
        name -> Varchar,
        target_status -> Varchar,
        create_date -> Nullable<Timestamptz>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    ci_buildables,
    ci_build_plans,
    ci_builds,
    ci_build_commands,
    ci_build_targets,
);
