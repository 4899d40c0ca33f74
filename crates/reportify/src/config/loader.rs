use std::path::{Path, PathBuf};

use crate::config::schema::{Config, LogFormat};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "REPORTIFY_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Builds the effective configuration: the file at `path` (or
/// `REPORTIFY_CONFIG`) if any, then environment overrides on top.
pub fn resolve_config(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let path = path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            load_config(&path)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Applies `REPORTIFY_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("REPORTIFY_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("REPORTIFY_PORT") {
        config.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            key: "REPORTIFY_PORT".to_string(),
            reason: format!("'{}' is not a valid port", port),
        })?;
    }
    if let Some(uri) = get("REPORTIFY_DATABASE_URI") {
        config.database.uri = Some(uri);
    }
    if let Some(url) = get("REPORTIFY_KEYCLOAK_URL") {
        config.identity.keycloak_url = Some(url);
    }
    if let Some(realm) = get("REPORTIFY_KEYCLOAK_REALM") {
        config.identity.realm = realm;
    }
    if let Some(client) = get("REPORTIFY_KEYCLOAK_CLIENT") {
        config.identity.client_id = client;
    }
    if let Some(secret) = get("REPORTIFY_KEYCLOAK_SECRET") {
        config.identity.client_secret = Some(secret);
    }
    if let Some(file) = get("REPORTIFY_KEYCLOAK_SECRET_FILE") {
        config.identity.client_secret_file = Some(file);
    }
    if let Some(endpoint) = get("REPORTIFY_UPLOAD_SIGNATURE_ENDPOINT") {
        config.uploads.signature_endpoint = Some(endpoint);
    }
    if let Some(format) = get("REPORTIFY_LOG_FORMAT") {
        config.logging.format =
            format
                .parse::<LogFormat>()
                .map_err(|reason| ConfigError::InvalidEnv {
                    key: "REPORTIFY_LOG_FORMAT".to_string(),
                    reason,
                })?;
    }

    Ok(())
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| format!("{} at {}", e, e.instance_path()))
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.server.port == 0 {
        return Err(ConfigError::Validation {
            message: "server.port must be greater than 0".to_string(),
        });
    }

    let identity = &config.identity;
    if identity.keycloak_url.is_some() {
        if identity.realm.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "identity.realm is required when keycloak_url is set".to_string(),
            });
        }
        if identity.client_id.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "identity.client_id is required when keycloak_url is set".to_string(),
            });
        }
    }

    let mut tokens = std::collections::HashSet::new();
    for dev in &identity.dev_tokens {
        if !tokens.insert(dev.token.as_str()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate dev token for {}", dev.email),
            });
        }
    }

    Ok(())
}
