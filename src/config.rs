//! # Sanity Test Configuration
//!
//! Connection settings loaded from environment variables.
//!
//! Every setting has a default matching the stock Bitnami-style MongoDB
//! install (`mongodb` Secret in `default`, root user, `admin` auth source),
//! so running with an empty environment checks a port-forwarded local
//! deployment.

use crate::constants::{
    DEFAULT_AUTH_SOURCE, DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_MONGODB_HOST,
    DEFAULT_MONGODB_PORT, DEFAULT_MONGODB_USERNAME, DEFAULT_SECRET_KEY, DEFAULT_SECRET_NAME,
    DEFAULT_SECRET_NAMESPACE,
};
use tracing::warn;

/// Where to find the MongoDB password in the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    /// Secret name
    pub name: String,
    /// Secret namespace
    pub namespace: String,
    /// Key in the Secret's `data` map
    pub key: String,
    /// Kubeconfig context to use (current context when `None`)
    pub context: Option<String>,
}

/// How to reach MongoDB and where the test document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Authentication database
    pub auth_source: String,
    /// Working database
    pub database: String,
    /// Working collection
    pub collection: String,
}

/// Full configuration for one sanity run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanityConfig {
    pub secret: SecretRef,
    pub mongo: MongoConfig,
}

impl Default for SecretRef {
    fn default() -> Self {
        Self {
            name: DEFAULT_SECRET_NAME.to_string(),
            namespace: DEFAULT_SECRET_NAMESPACE.to_string(),
            key: DEFAULT_SECRET_KEY.to_string(),
            context: None,
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MONGODB_HOST.to_string(),
            port: DEFAULT_MONGODB_PORT,
            username: DEFAULT_MONGODB_USERNAME.to_string(),
            auth_source: DEFAULT_AUTH_SOURCE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl SanityConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = SecretRef {
            name: var_or_default(&lookup, "MONGODB_SECRET_NAME", DEFAULT_SECRET_NAME.to_string()),
            namespace: var_or_default(
                &lookup,
                "MONGODB_SECRET_NAMESPACE",
                DEFAULT_SECRET_NAMESPACE.to_string(),
            ),
            key: var_or_default(&lookup, "MONGODB_SECRET_KEY", DEFAULT_SECRET_KEY.to_string()),
            context: lookup("KUBE_CONTEXT").filter(|c| !c.is_empty()),
        };

        let mongo = MongoConfig {
            host: var_or_default(&lookup, "MONGODB_HOST", DEFAULT_MONGODB_HOST.to_string()),
            port: var_or_default(&lookup, "MONGODB_PORT", DEFAULT_MONGODB_PORT),
            username: var_or_default(
                &lookup,
                "MONGODB_USERNAME",
                DEFAULT_MONGODB_USERNAME.to_string(),
            ),
            auth_source: var_or_default(
                &lookup,
                "MONGODB_AUTH_SOURCE",
                DEFAULT_AUTH_SOURCE.to_string(),
            ),
            database: var_or_default(&lookup, "MONGODB_DATABASE", DEFAULT_DATABASE.to_string()),
            collection: var_or_default(
                &lookup,
                "MONGODB_COLLECTION",
                DEFAULT_COLLECTION.to_string(),
            ),
        };

        Self { secret, mongo }
    }
}

/// Read a variable through `lookup` or return the default value
///
/// Empty values fall back to the default silently. Unparseable values fall
/// back with a warning naming the variable.
fn var_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .and_then(|v| parse_var(key, &v, &default))
        .unwrap_or(default)
}

fn parse_var<T>(key: &str, value: &str, default: &T) -> Option<T>
where
    T: std::str::FromStr + std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(
                "Ignoring invalid value '{}' for {}, using default '{}'",
                value, key, default
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = SanityConfig::from_lookup(|_| None);
        assert_eq!(config, SanityConfig::default());
        assert_eq!(config.secret.name, "mongodb");
        assert_eq!(config.secret.namespace, "default");
        assert_eq!(config.secret.key, "mongodb-root-password");
        assert_eq!(config.mongo.host, "localhost");
        assert_eq!(config.mongo.port, 27017);
        assert_eq!(config.mongo.username, "root");
        assert_eq!(config.mongo.auth_source, "admin");
        assert_eq!(config.mongo.database, "testdb");
        assert_eq!(config.mongo.collection, "testcollection");
        assert!(config.secret.context.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = SanityConfig::from_lookup(lookup_from(&[
            ("MONGODB_SECRET_NAMESPACE", "databases"),
            ("MONGODB_HOST", "mongodb.databases.svc"),
            ("MONGODB_PORT", "27018"),
            ("KUBE_CONTEXT", "kind-dev"),
        ]));
        assert_eq!(config.secret.namespace, "databases");
        assert_eq!(config.mongo.host, "mongodb.databases.svc");
        assert_eq!(config.mongo.port, 27018);
        assert_eq!(config.secret.context.as_deref(), Some("kind-dev"));
        // Untouched values keep their defaults
        assert_eq!(config.secret.name, "mongodb");
        assert_eq!(config.mongo.collection, "testcollection");
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = SanityConfig::from_lookup(lookup_from(&[("MONGODB_PORT", "not-a-port")]));
        assert_eq!(config.mongo.port, 27017);

        let config = SanityConfig::from_lookup(lookup_from(&[("MONGODB_PORT", "70000")]));
        assert_eq!(config.mongo.port, 27017);
    }

    #[test]
    fn test_parse_var_rejects_out_of_range_port() {
        assert_eq!(parse_var::<u16>("MONGODB_PORT", "27018", &27017), Some(27018));
        assert_eq!(parse_var::<u16>("MONGODB_PORT", "abc", &27017), None);
        assert_eq!(parse_var::<u16>("MONGODB_PORT", "70000", &27017), None);
        assert_eq!(parse_var::<u16>("MONGODB_PORT", "-1", &27017), None);
    }

    #[test]
    fn test_empty_values_fall_back_to_default() {
        let config = SanityConfig::from_lookup(lookup_from(&[
            ("MONGODB_USERNAME", ""),
            ("KUBE_CONTEXT", ""),
        ]));
        assert_eq!(config.mongo.username, "root");
        assert!(config.secret.context.is_none());
    }
}
