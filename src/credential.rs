//! # Credential Retrieval
//!
//! Loads the MongoDB password from a Kubernetes Secret.
//!
//! The API server transports Secret `data` values as base64 text;
//! `k8s-openapi` decodes them into raw bytes on deserialization, so all
//! that is left here is the UTF-8 check.

use crate::config::SecretRef;
use crate::error::SanityError;
use crate::runner::CredentialSource;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::config::{KubeConfigOptions, KubeconfigError};
use kube::{Api, Client, Config};
use tracing::{debug, info};
use zeroize::Zeroizing;

/// [`CredentialSource`] backed by a Kubernetes Secret
#[derive(Debug, Clone)]
pub struct KubeSecretSource {
    secret: SecretRef,
}

impl KubeSecretSource {
    #[must_use]
    pub fn new(secret: SecretRef) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl CredentialSource for KubeSecretSource {
    async fn fetch(&self) -> Result<Zeroizing<String>, SanityError> {
        fetch_password(&self.secret).await
    }
}

/// Fetch and decode the MongoDB password
///
/// Opens a short-lived Kubernetes client from the ambient kubeconfig (or
/// in-cluster config), reads the Secret once and drops the client before
/// returning.
///
/// # Errors
/// Every failure is a setup error: client creation, a missing Secret, a
/// missing key, or a value that is not UTF-8.
pub async fn fetch_password(secret_ref: &SecretRef) -> Result<Zeroizing<String>, SanityError> {
    let client = create_client(secret_ref.context.as_deref()).await?;

    let secrets: Api<Secret> = Api::namespaced(client, &secret_ref.namespace);
    let secret = match secrets.get(&secret_ref.name).await {
        Ok(secret) => secret,
        Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
            return Err(SanityError::SecretNotFound {
                namespace: secret_ref.namespace.clone(),
                name: secret_ref.name.clone(),
            });
        }
        Err(e) => {
            return Err(SanityError::KubeClient {
                message: format!(
                    "failed to get secret '{}/{}'",
                    secret_ref.namespace, secret_ref.name
                ),
                source: Some(e),
            });
        }
    };
    // The Api handle owned the only client; dropping it closes the session
    drop(secrets);
    debug!("Kubernetes API session closed");

    let password = extract_password(&secret, &secret_ref.key)?;
    info!(
        "Loaded MongoDB password from secret '{}/{}' (key '{}')",
        secret_ref.namespace, secret_ref.name, secret_ref.key
    );
    Ok(password)
}

/// Extract and decode one key from a Secret
///
/// # Errors
/// [`SanityError::SecretKeyMissing`] if `data` is absent or lacks `key`,
/// [`SanityError::CredentialDecode`] if the value is not UTF-8.
pub fn extract_password(secret: &Secret, key: &str) -> Result<Zeroizing<String>, SanityError> {
    let data = secret
        .data
        .as_ref()
        .and_then(|data_map| data_map.get(key))
        .ok_or_else(|| SanityError::SecretKeyMissing {
            namespace: secret
                .metadata
                .namespace
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            name: secret
                .metadata
                .name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            key: key.to_string(),
        })?;

    let password =
        String::from_utf8(data.0.clone()).map_err(|source| SanityError::CredentialDecode {
            key: key.to_string(),
            source,
        })?;

    Ok(Zeroizing::new(password))
}

async fn create_client(context: Option<&str>) -> Result<Client, SanityError> {
    match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context.to_string()),
                ..KubeConfigOptions::default()
            };
            let config = Config::from_kubeconfig(&options)
                .await
                .map_err(|source| kubeconfig_error(context, source))?;
            Client::try_from(config).map_err(|e| SanityError::KubeClient {
                message: format!("failed to create client for context '{context}'"),
                source: Some(e),
            })
        }
        None => Client::try_default()
            .await
            .map_err(|e| SanityError::KubeClient {
                message: "failed to create Kubernetes client. Ensure kubeconfig is configured."
                    .to_string(),
                source: Some(e),
            }),
    }
}

fn kubeconfig_error(context: &str, source: KubeconfigError) -> SanityError {
    SanityError::Kubeconfig {
        context: context.to_string(),
        source,
    }
}
