//! Bearer token verification.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{AuthError, Identity};
use crate::config::{DevToken, IdentityConfig};
use crate::secrets::SecretSource;

/// Truncation limit for provider error bodies written to logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies `token` and returns the identity it was issued to.
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Builds the provider described by the identity config: Keycloak when a
/// server URL is set, otherwise the configured development tokens.
pub fn provider_from_config(config: &IdentityConfig) -> crate::Result<Arc<dyn IdentityProvider>> {
    if config.keycloak_url.is_some() {
        return Ok(Arc::new(KeycloakProvider::from_config(config)?));
    }
    if config.dev_tokens.is_empty() {
        warn!("No identity server or dev tokens configured; every API call will be rejected");
    } else {
        warn!(
            "Using {} static development token(s) for authentication",
            config.dev_tokens.len()
        );
    }
    Ok(Arc::new(StaticIdentityProvider::from_dev_tokens(
        &config.dev_tokens,
    )))
}

/// Fixed token table for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn from_dev_tokens(tokens: &[DevToken]) -> Self {
        tokens.iter().fold(Self::new(), |provider, dev| {
            provider.with_token(
                dev.token.clone(),
                Identity {
                    email: dev.email.clone(),
                    nama: dev.nama.clone(),
                    raw_roles: dev.roles.clone(),
                },
            )
        })
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}

/// Token introspection response (RFC 7662) with Keycloak's extra claims.
#[derive(Debug, Deserialize)]
struct Introspection {
    #[serde(default)]
    active: bool,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    resource_access: HashMap<String, ClientAccess>,
}

#[derive(Debug, Default, Deserialize)]
struct ClientAccess {
    #[serde(default)]
    roles: Vec<String>,
}

impl Introspection {
    fn into_identity(self, client_id: &str) -> Result<Identity, AuthError> {
        if !self.active {
            return Err(AuthError::InvalidToken);
        }
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::InvalidToken)?;
        let nama = self
            .name
            .or(self.preferred_username)
            .unwrap_or_default();
        let raw_roles = self
            .resource_access
            .into_iter()
            .find(|(client, _)| client == client_id)
            .map(|(_, access)| access.roles)
            .unwrap_or_default();

        Ok(Identity {
            email,
            nama,
            raw_roles,
        })
    }
}

/// Verifies tokens against a Keycloak realm's introspection endpoint.
pub struct KeycloakProvider {
    client: Client,
    introspect_url: String,
    client_id: String,
    client_secret: SecretString,
    cache: Option<moka::sync::Cache<String, Identity>>,
}

impl KeycloakProvider {
    pub fn from_config(config: &IdentityConfig) -> crate::Result<Self> {
        let base = config
            .keycloak_url
            .as_deref()
            .ok_or_else(|| AuthError::Provider("keycloak_url is not set".to_string()))?;
        let source = SecretSource::identity_client(config);
        if !source.is_configured() {
            warn!("No client secret configured for '{}'", config.client_id);
        }
        let client_secret = source
            .resolve_optional()?
            .unwrap_or_else(|| SecretString::from(String::new()));

        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        let cache = (config.cache_ttl_secs > 0).then(|| {
            moka::sync::Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .build()
        });

        let introspect_url = introspection_url(base, &config.realm);
        info!("Verifying tokens via {}", introspect_url);

        Ok(Self {
            client,
            introspect_url,
            client_id: config.client_id.clone(),
            client_secret,
            cache,
        })
    }

    async fn introspect(&self, token: &str) -> Result<Identity, AuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("token", token),
        ];

        let response = self
            .client
            .post(&self.introspect_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Provider(format!("Introspection request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!(
                "Introspection failed ({}): {}",
                status,
                truncate(&body)
            )));
        }

        let introspection: Introspection = response
            .json()
            .await
            .map_err(|e| AuthError::Provider(format!("Malformed introspection response: {}", e)))?;

        introspection.into_identity(&self.client_id)
    }
}

#[async_trait]
impl IdentityProvider for KeycloakProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if let Some(identity) = self.cache.as_ref().and_then(|c| c.get(token)) {
            return Ok(identity);
        }

        let identity = self.introspect(token).await?;
        debug!("Verified token for {}", identity.email);

        if let Some(cache) = &self.cache {
            cache.insert(token.to_string(), identity.clone());
        }
        Ok(identity)
    }
}

fn introspection_url(base: &str, realm: &str) -> String {
    format!(
        "{}/realms/{}/protocol/openid-connect/token/introspect",
        base.trim_end_matches('/'),
        realm
    )
}

fn truncate(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let cut = (0..=MAX_ERROR_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Introspection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_active_token_yields_client_roles() {
        let identity = parse(json!({
            "active": true,
            "email": "a@x.com",
            "name": "Ani",
            "resource_access": {
                "reportify-kp": {"roles": ["mahasiswa"]},
                "account": {"roles": ["manage-account"]}
            }
        }))
        .into_identity("reportify-kp")
        .unwrap();

        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.nama, "Ani");
        assert_eq!(identity.raw_roles, vec!["mahasiswa"]);
    }

    #[test]
    fn test_inactive_or_emailless_token_rejected() {
        let inactive = parse(json!({"active": false, "email": "a@x.com"}));
        assert!(matches!(
            inactive.into_identity("c"),
            Err(AuthError::InvalidToken)
        ));

        let no_email = parse(json!({"active": true}));
        assert!(no_email.into_identity("c").is_err());
    }

    #[test]
    fn test_missing_client_section_means_no_roles() {
        let identity = parse(json!({
            "active": true,
            "email": "a@x.com",
            "preferred_username": "ani"
        }))
        .into_identity("reportify-kp")
        .unwrap();
        assert!(identity.raw_roles.is_empty());
        assert_eq!(identity.nama, "ani");
    }

    #[test]
    fn test_introspection_url() {
        assert_eq!(
            introspection_url("https://sso.example.ac.id/", "kampus"),
            "https://sso.example.ac.id/realms/kampus/protocol/openid-connect/token/introspect"
        );
    }

    #[test]
    fn test_truncate_long_bodies() {
        let body = "x".repeat(500);
        assert!(truncate(&body).ends_with("... (truncated)"));
        assert_eq!(truncate("short"), "short");
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticIdentityProvider::from_dev_tokens(&[DevToken {
            token: "dev-ani".to_string(),
            email: "a@x.com".to_string(),
            nama: "Ani".to_string(),
            roles: vec!["mahasiswa".to_string()],
        }]);

        let identity = provider.verify("dev-ani").await.unwrap();
        assert_eq!(identity.email, "a@x.com");
        assert!(matches!(
            provider.verify("nope").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_provider_from_config_without_server() {
        let provider = provider_from_config(&IdentityConfig::default());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_keycloak_from_config() {
        let config = IdentityConfig {
            keycloak_url: Some("https://sso.example.ac.id".to_string()),
            realm: "kampus".to_string(),
            client_id: "reportify-kp".to_string(),
            client_secret: Some("s3cret".to_string()),
            ..Default::default()
        };
        let provider = KeycloakProvider::from_config(&config).unwrap();
        assert!(provider.cache.is_some());
        assert!(provider.introspect_url.ends_with("/realms/kampus/protocol/openid-connect/token/introspect"));
    }
}
