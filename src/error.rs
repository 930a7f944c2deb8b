//! # Sanity Test Error Types
//!
//! Errors are split into two tiers: setup failures abort the run before any
//! test case executes, assertion failures fail a single case and still let
//! cleanup and teardown run.

use thiserror::Error;

/// Tier of a [`SanityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTier {
    /// Credential retrieval or connection failure (fatal)
    Setup,
    /// Data mismatch or missing document (case failure)
    Assertion,
}

impl ErrorTier {
    /// Get human-readable tier string for logs and reports
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTier::Setup => "setup",
            ErrorTier::Assertion => "assertion",
        }
    }
}

/// Error raised by the sanity test
#[derive(Debug, Error)]
pub enum SanityError {
    /// Kubeconfig could not be loaded or the API call failed
    #[error("Kubernetes client error: {message}")]
    KubeClient {
        message: String,
        #[source]
        source: Option<kube::Error>,
    },

    /// Named kubeconfig context could not be loaded
    #[error("Failed to load kubeconfig context '{context}': {source}")]
    Kubeconfig {
        context: String,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// Secret does not exist in the namespace
    #[error("Secret '{namespace}/{name}' not found")]
    SecretNotFound { namespace: String, name: String },

    /// Secret exists but has no such key in `data`
    #[error("Secret '{namespace}/{name}' has no key '{key}'")]
    SecretKeyMissing {
        namespace: String,
        name: String,
        key: String,
    },

    /// Secret value is not valid UTF-8
    #[error("Failed to decode key '{key}' as UTF-8: {source}")]
    CredentialDecode {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Connection or authentication against MongoDB failed
    #[error("Failed to connect to MongoDB at {address}: {source}")]
    DatabaseConnect {
        address: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// A field check in the round trip failed
    #[error("Failed: {0}")]
    Assertion(String),
}

impl SanityError {
    /// Classify this error
    #[must_use]
    pub fn tier(&self) -> ErrorTier {
        match self {
            SanityError::Assertion(_) => ErrorTier::Assertion,
            SanityError::KubeClient { .. }
            | SanityError::Kubeconfig { .. }
            | SanityError::SecretNotFound { .. }
            | SanityError::SecretKeyMissing { .. }
            | SanityError::CredentialDecode { .. }
            | SanityError::DatabaseConnect { .. } => ErrorTier::Setup,
        }
    }

    /// Returns true when the whole run must stop
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.tier() == ErrorTier::Setup
    }

    /// Get remediation guidance for this error
    #[must_use]
    pub fn remediation(&self) -> String {
        match self {
            SanityError::KubeClient { .. } => {
                "Check the kubeconfig (KUBECONFIG, current context or KUBE_CONTEXT) and that the user may 'get' secrets in the target namespace.".to_string()
            }
            SanityError::Kubeconfig { context, .. } => format!(
                "Check the context exists: kubectl config get-contexts {context}"
            ),
            SanityError::SecretNotFound { namespace, name } => format!(
                "Verify MongoDB is installed: kubectl get secret {name} -n {namespace}"
            ),
            SanityError::SecretKeyMissing { key, .. } => format!(
                "The Secret exists but holds no '{key}' entry. Set MONGODB_SECRET_KEY to the key the chart uses."
            ),
            SanityError::CredentialDecode { .. } => {
                "The password is not valid UTF-8. Re-create the Secret from a text value.".to_string()
            }
            SanityError::DatabaseConnect { .. } => {
                "Check MongoDB is reachable (e.g. kubectl port-forward svc/mongodb 27017:27017) and that the user and auth source are correct.".to_string()
            }
            SanityError::Assertion(_) => {
                "MongoDB accepted the connection but did not return the written document. Inspect the collection and server logs.".to_string()
            }
        }
    }

    pub(crate) fn assertion(message: impl Into<String>) -> Self {
        SanityError::Assertion(message.into())
    }
}
