//! Schema migration for the tables the query engine reads.

use diesel_async::{AsyncPgConnection, SimpleAsyncConnection};

/// SQL migration for build query tables.
///
/// Builds reference buildables and plans by PHID. A plan may be deleted
/// while builds still point at it, so there is no foreign key on
/// `build_plan_phid`.
pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS ci_buildables (
    id              BIGSERIAL PRIMARY KEY,
    phid            VARCHAR(64) NOT NULL UNIQUE,
    object_phid     VARCHAR(64) NOT NULL,
    container_phid  VARCHAR(64),
    is_manual       BOOLEAN NOT NULL DEFAULT FALSE,
    view_policy     VARCHAR(64) NOT NULL DEFAULT 'users',
    create_date     TIMESTAMPTZ DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_ci_buildables_object ON ci_buildables (object_phid);

CREATE TABLE IF NOT EXISTS ci_build_plans (
    id              BIGSERIAL PRIMARY KEY,
    phid            VARCHAR(64) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    plan_status     VARCHAR(32) NOT NULL DEFAULT 'active',
    view_policy     VARCHAR(64) NOT NULL DEFAULT 'users',
    create_date     TIMESTAMPTZ DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS ci_builds (
    id               BIGSERIAL PRIMARY KEY,
    phid             VARCHAR(64) NOT NULL UNIQUE,
    buildable_phid   VARCHAR(64) NOT NULL,
    build_plan_phid  VARCHAR(64),
    build_status     VARCHAR(32) NOT NULL DEFAULT 'inactive',
    build_generation INTEGER NOT NULL DEFAULT 0,
    create_date      TIMESTAMPTZ DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_ci_builds_buildable ON ci_builds (buildable_phid);
CREATE INDEX IF NOT EXISTS idx_ci_builds_plan ON ci_builds (build_plan_phid);
CREATE INDEX IF NOT EXISTS idx_ci_builds_status ON ci_builds (build_status);

CREATE TABLE IF NOT EXISTS ci_build_commands (
    id              BIGSERIAL PRIMARY KEY,
    author_phid     VARCHAR(64) NOT NULL,
    target_phid     VARCHAR(64) NOT NULL,
    command         VARCHAR(32) NOT NULL,
    create_date     TIMESTAMPTZ DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_ci_build_commands_target ON ci_build_commands (target_phid);

CREATE TABLE IF NOT EXISTS ci_build_targets (
    id               BIGSERIAL PRIMARY KEY,
    phid             VARCHAR(64) NOT NULL UNIQUE,
    build_phid       VARCHAR(64) NOT NULL,
    build_generation INTEGER NOT NULL,
    name             VARCHAR(255) NOT NULL,
    target_status    VARCHAR(32) NOT NULL DEFAULT 'pending',
    create_date      TIMESTAMPTZ DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_ci_build_targets_build ON ci_build_targets (build_phid, build_generation);
"#;

/// Run the build query migration.
pub async fn run_migration(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    conn.batch_execute(MIGRATION_SQL)
        .await
        .map_err(|e| anyhow::anyhow!("build query migration failed: {e}"))?;
    tracing::info!("Build query migration completed");
    Ok(())
}
