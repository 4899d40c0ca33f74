pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod secrets;
pub mod tracking;
pub mod validate;

pub use auth::{AuthError, Identity, IdentityProvider, Operation, Role};
pub use config::{load_config, resolve_config, Config};
pub use db::{Database, DatabaseError, Upserted};
pub use error::{ConfigError, ReportifyError, Result, ValidationError};
pub use secrets::{SecretError, SecretSource};
