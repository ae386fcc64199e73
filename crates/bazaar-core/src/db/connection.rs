//! Opening the catalog database.
//!
//! The catalog lives either in a plain local libSQL file, in memory, or in an
//! embedded replica of a Turso database. Every open path ends in the same
//! place: one connection, pragmas applied, and the catalog schema migrated.

use std::path::Path;
use std::time::Duration;

use libsql::{Builder, Connection, Database as LibSqlDatabase};

use super::migrations;
use crate::error::{Error, Result};

/// Default pull interval for embedded replicas.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

const IN_MEMORY: &str = ":memory:";

/// How to reach the Turso primary behind an embedded catalog replica.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncConfig {
    /// Primary database URL (e.g., `libsql://shop.turso.io`)
    pub url: Option<String>,
    /// Token presented to the primary
    pub auth_token: Option<String>,
    /// Background pull interval; `None` means pulls happen only on `sync()`
    pub sync_interval: Option<Duration>,
}

impl SyncConfig {
    /// Replica settings pulling every [`DEFAULT_SYNC_INTERVAL`].
    pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            auth_token: Some(auth_token.into()),
            sync_interval: Some(DEFAULT_SYNC_INTERVAL),
        }
    }

    /// Pull from the primary every `interval`.
    #[must_use]
    pub const fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = Some(interval);
        self
    }

    /// Only pull when `Database::sync` is called.
    #[must_use]
    pub const fn without_auto_sync(mut self) -> Self {
        self.sync_interval = None;
        self
    }

    /// Both the URL and the token are present.
    pub const fn is_configured(&self) -> bool {
        self.url.is_some() && self.auth_token.is_some()
    }

    fn credentials(&self) -> Result<(String, String)> {
        match (&self.url, &self.auth_token) {
            (Some(url), Some(token)) => Ok((url.clone(), token.clone())),
            (None, _) => Err(Error::InvalidInput(
                "replica sync needs a primary URL".into(),
            )),
            (_, None) => Err(Error::InvalidInput(
                "replica sync needs an auth token".into(),
            )),
        }
    }
}

/// Handle on the catalog database and its single connection.
pub struct Database {
    db: LibSqlDatabase,
    conn: Connection,
    sync_config: Option<SyncConfig>,
}

impl Database {
    /// Open (or create) a local catalog file and migrate it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new_local(path.as_ref()).build().await?;
        Self::prepare(db, None).await
    }

    /// Throwaway catalog, gone when the handle drops.
    pub async fn open_in_memory() -> Result<Self> {
        let db = Builder::new_local(IN_MEMORY).build().await?;
        Self::prepare(db, None).await
    }

    /// Open an embedded replica of the Turso primary described by `sync_config`.
    ///
    /// Reads are served from `local_path`; writes go to the primary and come
    /// back on the next pull. The replica is pulled once before migrating so an
    /// existing remote schema is reused instead of recreated.
    pub async fn open_with_sync(
        local_path: impl AsRef<Path>,
        sync_config: SyncConfig,
    ) -> Result<Self> {
        let (url, token) = sync_config.credentials()?;
        let local_path = local_path.as_ref().to_string_lossy().into_owned();

        let mut builder = Builder::new_remote_replica(local_path, url, token);
        if let Some(interval) = sync_config.sync_interval {
            tracing::debug!("Catalog replica pulls every {interval:?}");
            builder = builder.sync_interval(interval);
        }

        let db = builder.build().await?;
        db.sync().await?;
        Self::prepare(db, Some(sync_config)).await
    }

    async fn prepare(db: LibSqlDatabase, sync_config: Option<SyncConfig>) -> Result<Self> {
        let conn = db.connect()?;
        apply_pragmas(&conn).await;
        migrations::run(&conn).await?;
        Ok(Self {
            db,
            conn,
            sync_config,
        })
    }

    /// Pull the latest catalog rows from the primary. A no-op for local files.
    pub async fn sync(&self) -> Result<()> {
        if self.sync_config.is_none() {
            return Ok(());
        }
        self.db.sync().await?;
        tracing::debug!("Catalog replica synced with remote");
        Ok(())
    }

    pub const fn is_sync_enabled(&self) -> bool {
        self.sync_config.is_some()
    }

    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Replicas reject some pragmas, so failures here are ignored.
async fn apply_pragmas(conn: &Connection) {
    for pragma in ["PRAGMA journal_mode = WAL;", "PRAGMA synchronous = NORMAL;"] {
        if let Err(error) = conn.execute(pragma, ()).await {
            tracing::debug!("Skipping `{pragma}`: {error}");
        }
    }
}
