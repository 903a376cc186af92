use crate::catalog::ServiceDefinition;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio_rusqlite::Connection;
use tracing::{debug, info, warn};

const SCHEMA_VERSION: i32 = 1;

/// SQLite-backed store for the catalog, lifecycle records and layouts.
///
/// Wraps a single `tokio_rusqlite` connection. Its background thread
/// serializes every call, so concurrent callers queue instead of failing.
/// Cloning shares the same connection.
#[derive(Clone)]
pub struct Store {
    path: PathBuf,
    pub(super) conn: Connection,
}

impl Store {
    /// Open (or create) the database file at `path`.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path).await?;

        conn.call(|conn: &mut rusqlite::Connection| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await?;

        debug!("Opened database at {}", path.display());
        Ok(Self { path, conn })
    }

    /// In-memory database. Nothing touches disk; contents vanish on drop.
    pub async fn open_ephemeral() -> Result<Self> {
        let conn = Connection::open(":memory:").await?;

        conn.call(|conn: &mut rusqlite::Connection| {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside a transaction and commit it.
    #[tracing::instrument(skip(self, f), fields(operation = "db_transaction"))]
    pub(super) async fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let result = self
            .conn
            .call(move |conn: &mut rusqlite::Connection| {
                let tx = conn.transaction()?;
                let result = f(&tx)?;
                tx.commit()?;
                Ok(result)
            })
            .await?;
        Ok(result)
    }

    /// Create the schema on first use, or check the version of an existing one.
    pub async fn initialize(&self) -> Result<()> {
        let schema_exists: bool = self
            .conn
            .call(
                |conn: &mut rusqlite::Connection| -> tokio_rusqlite::Result<bool> {
                    Ok(conn.query_row(
                        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
                        [],
                        |row| row.get(0),
                    )?)
                },
            )
            .await?;

        if !schema_exists {
            debug!("Creating SQLite schema");
            return self.create_schema().await;
        }

        let version: i32 = self
            .conn
            .call(
                |conn: &mut rusqlite::Connection| -> tokio_rusqlite::Result<i32> {
                    Ok(conn.query_row(
                        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                        [],
                        |row| row.get(0),
                    )?)
                },
            )
            .await?;

        if version > SCHEMA_VERSION {
            warn!(
                "Database schema version {} is newer than this build understands ({})",
                version, SCHEMA_VERSION
            );
        } else {
            debug!("Database schema is up to date (version {})", version);
        }
        Ok(())
    }

    async fn create_schema(&self) -> Result<()> {
        self.conn
            .call(|conn: &mut rusqlite::Connection| -> tokio_rusqlite::Result<()> {
                conn.execute_batch(
                    r#"
                    CREATE TABLE schema_version (
                        version INTEGER PRIMARY KEY,
                        applied_at TEXT NOT NULL
                    );

                    -- Catalog of runnable tools
                    CREATE TABLE services (
                        id TEXT PRIMARY KEY,
                        name TEXT NOT NULL,
                        category TEXT NOT NULL,
                        image TEXT NOT NULL,
                        tag TEXT NOT NULL DEFAULT 'latest',
                        description TEXT,
                        ports TEXT NOT NULL DEFAULT '[]',
                        env_vars TEXT NOT NULL DEFAULT '{}',
                        volumes TEXT NOT NULL DEFAULT '[]',
                        health_check TEXT,
                        enabled INTEGER NOT NULL DEFAULT 0,
                        icon TEXT NOT NULL DEFAULT 'Box',
                        created_at TEXT NOT NULL
                    );

                    CREATE INDEX idx_services_category ON services(category);

                    -- Last known container per service
                    CREATE TABLE containers (
                        service_id TEXT PRIMARY KEY,
                        container_id TEXT,
                        status TEXT NOT NULL,
                        started_at TEXT,
                        stopped_at TEXT,
                        FOREIGN KEY (service_id) REFERENCES services(id) ON DELETE CASCADE
                    );

                    CREATE TABLE layouts (
                        id TEXT PRIMARY KEY,
                        name TEXT NOT NULL,
                        layout_data TEXT NOT NULL,
                        is_default INTEGER NOT NULL DEFAULT 0,
                        created_at TEXT NOT NULL
                    );
                    "#,
                )?;

                conn.execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
                    rusqlite::params![SCHEMA_VERSION],
                )?;

                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Insert `catalog` when the services table is empty. Returns the number inserted.
    pub async fn seed_if_empty(&self, catalog: Vec<ServiceDefinition>) -> Result<usize> {
        if self.count_services().await? > 0 {
            debug!("Catalog already populated, skipping seed");
            return Ok(0);
        }

        let rows = catalog
            .iter()
            .map(super::catalog::ServiceRow::from_definition)
            .collect::<Result<Vec<_>>>()?;

        let inserted = self
            .with_transaction(move |tx| {
                let mut inserted = 0;
                for row in &rows {
                    inserted += row.insert_or_ignore(tx)?;
                }
                Ok(inserted)
            })
            .await?;

        info!("Seeded catalog with {} services", inserted);
        Ok(inserted)
    }

    /// Wait for queued calls to finish and close the connection.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}
