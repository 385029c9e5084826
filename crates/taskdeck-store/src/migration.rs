//! Schema creation for the task and category collections

use rusqlite::{Connection, OptionalExtension, params};
use taskdeck_core::error::{TodoError, TodoResult};
use tracing::info;

/// Creates the store's tables and records which versions have been applied.
pub struct MigrationEngine {
    migrations: Vec<Migration>,
}

/// Individual migration definition
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationEngine {
    pub fn new() -> Self {
        Self {
            migrations: Self::default_migrations(),
        }
    }

    fn default_migrations() -> Vec<Migration> {
        vec![
            Migration {
                version: 1,
                description: "Create tasks collection",
                up: r#"
                    CREATE TABLE IF NOT EXISTS tasks (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
                    );
                "#,
            },
            Migration {
                version: 2,
                description: "Create categories collection",
                up: r#"
                    CREATE TABLE IF NOT EXISTS categories (
                        key TEXT PRIMARY KEY,
                        value TEXT NOT NULL,
                        updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
                    );
                "#,
            },
        ]
    }

    /// Highest version this engine knows about.
    pub fn latest_version(&self) -> u32 {
        self.migrations.iter().map(|m| m.version).max().unwrap_or(0)
    }

    /// Highest version recorded in `conn`, or 0 for a fresh database.
    pub fn current_version(conn: &Connection) -> TodoResult<u32> {
        let has_table: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| TodoError::storage("schema_version", e))?;
        if has_table.is_none() {
            return Ok(0);
        }

        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| TodoError::storage("schema_version", e))
    }

    /// Apply every pending migration in a single immediate transaction.
    ///
    /// Returns the schema version afterwards. Running it on an up-to-date
    /// database changes nothing.
    pub fn migrate(&self, conn: &Connection) -> TodoResult<u32> {
        let fail = |stage: &str, e: rusqlite::Error| {
            TodoError::unavailable(format!("schema setup failed ({}): {}", stage, e))
        };

        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| fail("begin", e))?;

        let result = self.apply_pending(conn);
        match result {
            Ok(version) => {
                conn.execute_batch("COMMIT").map_err(|e| fail("commit", e))?;
                Ok(version)
            }
            Err(e) => {
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    tracing::warn!(error = %rollback_err, "Failed to roll back schema setup");
                }
                Err(e)
            }
        }
    }

    fn apply_pending(&self, conn: &Connection) -> TodoResult<u32> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )
        .map_err(|e| TodoError::unavailable(format!("failed to create migrations table: {}", e)))?;

        let current = Self::current_version(conn)?;

        for migration in self.migrations.iter().filter(|m| m.version > current) {
            conn.execute_batch(migration.up).map_err(|e| {
                TodoError::unavailable(format!("migration {} failed: {}", migration.version, e))
            })?;

            conn.execute(
                "INSERT INTO schema_migrations (version, description) VALUES (?1, ?2)",
                params![migration.version, migration.description],
            )
            .map_err(|e| {
                TodoError::unavailable(format!(
                    "failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

            info!(
                version = migration.version,
                description = migration.description,
                "Applied migration"
            );
        }

        Ok(current.max(self.latest_version()))
    }
}
