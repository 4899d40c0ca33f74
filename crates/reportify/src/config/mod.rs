pub mod loader;
pub mod schema;

pub use loader::{apply_env_overrides, load_config, load_config_from_str, resolve_config};
pub use schema::{
    Config, DatabaseConfig, DevToken, IdentityConfig, LogFormat, LoggingConfig, ServerConfig,
    UploadsConfig,
};
