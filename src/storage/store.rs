use duckdb::Connection;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to the DuckDB connection, starting out empty.
///
/// The server binds and accepts requests before the dataset bootstrap (open,
/// migrate, import) finishes. Until [`Datastore::install`] runs, every query
/// gets [`StoreError::Unavailable`] instead of hitting an unset connection.
#[derive(Clone)]
pub struct Datastore {
    inner: Arc<Mutex<Option<Connection>>>,
}

/// Errors surfaced by datastore access.
#[derive(Debug)]
pub enum StoreError {
    /// The bootstrap has not completed (or it failed and the handle was
    /// never installed).
    Unavailable,
    Db(duckdb::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "datastore is not ready"),
            Self::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<duckdb::Error> for StoreError {
    fn from(e: duckdb::Error) -> Self {
        Self::Db(e)
    }
}

impl Datastore {
    /// An empty handle; queries fail with `Unavailable` until a connection
    /// is installed.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// A handle that is ready immediately. Used by tests and by callers that
    /// bootstrap synchronously.
    pub fn ready(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Install the bootstrapped connection, flipping the handle to ready.
    pub fn install(&self, conn: Connection) {
        *self.inner.lock() = Some(conn);
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Run `f` against the connection while holding the lock.
    ///
    /// Call from `spawn_blocking`; queries hold the lock for their full
    /// duration.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, duckdb::Error>,
    ) -> Result<T, StoreError> {
        let guard = self.inner.lock();
        let conn = guard.as_ref().ok_or(StoreError::Unavailable)?;
        f(conn).map_err(StoreError::Db)
    }
}
