//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLEMENTINE_DOCSTORE_URL` - Base URL of the hosted document store
//! - `CLEMENTINE_DOCSTORE_API_KEY` - Document store API key
//! - `CLEMENTINE_AUTH_URL` - Base URL of the authentication service
//! - `CLEMENTINE_AUTH_API_KEY` - Authentication service API key
//!
//! ## Optional
//! - `CLEMENTINE_DATA_DIR` - Directory for local persistence (default: `.clementine`)
//! - `CLEMENTINE_ADMIN_EMAILS` - Comma-separated emails granted the admin role on sign-up
//! - `CLEMENTINE_CATALOG_CACHE_TTL_SECS` - Catalog read cache TTL (default: 300)
//! - `CLEMENTINE_REFERENCE_POLICY` - `orphan` or `restrict` (default: `orphan`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".clementine";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Policy applied when deleting a category or brand that products still
/// reference.
///
/// The document store enforces no referential integrity, so the choice
/// lives here: keep the source behavior (dangling references) or refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Delete regardless; referencing products keep a dangling id.
    #[default]
    Orphan,
    /// Refuse deletion while any product references the entity.
    Restrict,
}

impl std::str::FromStr for ReferencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orphan" => Ok(Self::Orphan),
            "restrict" => Ok(Self::Restrict),
            _ => Err(format!("invalid reference policy: {s}")),
        }
    }
}

/// Document store connection configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct DocStoreConfig {
    /// Base URL of the hosted document store.
    pub base_url: String,
    /// API key sent as a bearer token.
    pub api_key: SecretString,
}

impl std::fmt::Debug for DocStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Authentication service configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Base URL of the authentication service.
    pub base_url: String,
    /// API key for the authentication service.
    pub api_key: SecretString,
    /// Emails granted the admin role when they sign up.
    pub admin_emails: Vec<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("admin_emails", &self.admin_emails)
            .finish()
    }
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Document store connection settings.
    pub docstore: DocStoreConfig,
    /// Authentication service settings.
    pub auth: AuthConfig,
    /// Directory for local key-value persistence (cart, session token).
    pub data_dir: PathBuf,
    /// Catalog read cache time-to-live.
    pub catalog_cache_ttl: Duration,
    /// Behavior when deleting referenced categories/brands.
    pub reference_policy: ReferencePolicy,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let docstore = DocStoreConfig {
            base_url: require_env("CLEMENTINE_DOCSTORE_URL")?,
            api_key: require_env("CLEMENTINE_DOCSTORE_API_KEY")?.into(),
        };

        let admin_emails = optional_env("CLEMENTINE_ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let auth = AuthConfig {
            base_url: require_env("CLEMENTINE_AUTH_URL")?,
            api_key: require_env("CLEMENTINE_AUTH_API_KEY")?.into(),
            admin_emails,
        };

        let data_dir = optional_env("CLEMENTINE_DATA_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        let catalog_cache_ttl = match optional_env("CLEMENTINE_CATALOG_CACHE_TTL_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    "CLEMENTINE_CATALOG_CACHE_TTL_SECS".to_owned(),
                    format!("not a number of seconds: {raw}"),
                )
            })?),
            None => Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        };

        let reference_policy = match optional_env("CLEMENTINE_REFERENCE_POLICY") {
            Some(raw) => raw.parse().map_err(|e: String| {
                ConfigError::InvalidEnvVar("CLEMENTINE_REFERENCE_POLICY".to_owned(), e)
            })?,
            None => ReferencePolicy::default(),
        };

        Ok(Self {
            docstore,
            auth,
            data_dir,
            catalog_cache_ttl,
            reference_policy,
        })
    }

    /// Whether an email is on the admin whitelist.
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.auth
            .admin_emails
            .iter()
            .any(|white| white.eq_ignore_ascii_case(email))
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_policy_parse() {
        assert_eq!(
            "orphan".parse::<ReferencePolicy>().unwrap(),
            ReferencePolicy::Orphan
        );
        assert_eq!(
            "restrict".parse::<ReferencePolicy>().unwrap(),
            ReferencePolicy::Restrict
        );
        assert!("cascade".parse::<ReferencePolicy>().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = DocStoreConfig {
            base_url: "https://store.example".to_owned(),
            api_key: "super-secret".into(),
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_admin_whitelist_is_case_insensitive() {
        let config = StoreConfig {
            docstore: DocStoreConfig {
                base_url: String::new(),
                api_key: String::new().into(),
            },
            auth: AuthConfig {
                base_url: String::new(),
                api_key: String::new().into(),
                admin_emails: vec!["Admin@Example.com".to_owned()],
            },
            data_dir: PathBuf::new(),
            catalog_cache_ttl: Duration::from_secs(1),
            reference_policy: ReferencePolicy::Orphan,
        };
        assert!(config.is_admin_email("admin@example.com"));
        assert!(!config.is_admin_email("other@example.com"));
    }
}
