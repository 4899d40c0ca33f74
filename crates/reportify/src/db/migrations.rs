//! Schema migrations.
//!
//! Applied versions are recorded in a `_migrations` table; pending ones run
//! in order on every open. Column additions are checked against
//! `pragma_table_info` first so a hand-patched file can still be opened.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
    kind: MigrationKind,
}

enum MigrationKind {
    Standard,
    /// ALTER TABLE ADD COLUMN, skipped when the column is already there.
    AddColumn {
        table: &'static str,
        column: &'static str,
    },
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_accounts_table",
        sql: include_str!("sql/001_create_accounts.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 2,
        description: "create_supervisors_table",
        sql: include_str!("sql/002_create_supervisors.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 3,
        description: "create_students_table",
        sql: include_str!("sql/003_create_students.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 4,
        description: "create_daily_reports_tables",
        sql: include_str!("sql/004_create_daily_reports.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 5,
        description: "create_guidance_tables",
        sql: include_str!("sql/005_create_guidance_sessions.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 6,
        description: "create_evaluations_table",
        sql: include_str!("sql/006_create_evaluations.sql"),
        kind: MigrationKind::Standard,
    },
    Migration {
        version: 7,
        description: "add_jabatan_instansi_to_supervisors",
        sql: include_str!("sql/007_add_jabatan_instansi.sql"),
        kind: MigrationKind::AddColumn {
            table: "supervisors",
            column: "jabatan_instansi",
        },
    },
];

/// Brings the schema up to date. Each pending migration commits on its own
/// together with its `_migrations` row.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied: u32 = conn.query_row(
        "SELECT IFNULL(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    let skip = match &migration.kind {
        MigrationKind::Standard => false,
        MigrationKind::AddColumn { table, column } => column_exists(&tx, table, column)?,
    };
    if skip {
        log::info!(
            "Migration v{} ({}) already reflected in schema",
            migration.version,
            migration.description
        );
    } else {
        log::info!("Applying migration v{}: {}", migration.version, migration.description);
        tx.execute_batch(migration.sql)
            .map_err(|e| DatabaseError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;
    }

    tx.execute(
        "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
        rusqlite::params![migration.version, migration.description],
    )?;
    tx.commit()?;
    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        rusqlite::params![table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
