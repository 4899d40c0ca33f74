//! Shared application state.

use std::sync::Arc;

use reportify::{Config, Database, DatabaseError, IdentityProvider};

use crate::error::ApiError;

/// State handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, identity: Arc<dyn IdentityProvider>, config: Config) -> Self {
        Self {
            db,
            identity,
            config: Arc::new(config),
        }
    }

    /// Runs a store call on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| ApiError::Internal(format!("Store task failed: {e}")))?
    }

    /// Like [`AppState::run`] for closures that only touch the store.
    pub async fn query<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
        T: Send + 'static,
    {
        self.run(move |db| f(db).map_err(ApiError::from)).await
    }
}
