//! # Sanity Test Runner
//!
//! Setup (credential, connection), the test case, then teardown.
//! Setup errors abort the run before any case executes. Once connected,
//! the connection is closed on every path.

use crate::config::SanityConfig;
use crate::credential::KubeSecretSource;
use crate::database::MongoConnector;
use crate::error::SanityError;
use crate::round_trip::{run_insert_and_find, CaseReport, DocumentStore};
use async_trait::async_trait;
use tracing::{info, Instrument};
use zeroize::Zeroizing;

/// Result of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub cases: Vec<CaseReport>,
}

impl RunReport {
    /// True when every case passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.cases.iter().all(CaseReport::passed)
    }

    #[must_use]
    pub fn failed_cases(&self) -> Vec<&CaseReport> {
        self.cases.iter().filter(|c| !c.passed()).collect()
    }

    /// One-line summary in the style of a test harness
    #[must_use]
    pub fn summary(&self) -> String {
        let failed = self.failed_cases().len();
        let passed = self.cases.len() - failed;
        let result = if failed == 0 { "ok" } else { "FAILED" };
        format!("test result: {result}. {passed} passed; {failed} failed")
    }
}

/// Where the database password comes from
///
/// [`crate::credential::KubeSecretSource`] reads it from a Kubernetes Secret.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Fetch and decode the password
    async fn fetch(&self) -> Result<Zeroizing<String>, SanityError>;
}

/// Opens and closes the store the test case runs against
///
/// [`crate::database::MongoConnector`] opens a [`crate::database::SanityDatabase`].
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: DocumentStore;

    /// Open an authenticated connection
    async fn connect(&self, password: &str) -> Result<Self::Store, SanityError>;

    /// Release the connection
    async fn close(&self, store: Self::Store);
}

/// Run the sanity test once against the configured cluster and database
///
/// # Errors
/// Returns a setup-tier [`SanityError`] if the credential cannot be loaded
/// or the connection cannot be opened. Case failures are reported in the
/// [`RunReport`], not as errors.
pub async fn run(config: &SanityConfig) -> Result<RunReport, SanityError> {
    let span = tracing::info_span!(
        "sanity.run",
        mongodb.host = %config.mongo.host,
        mongodb.port = config.mongo.port,
        secret.namespace = %config.secret.namespace,
        secret.name = %config.secret.name,
    );

    let credentials = KubeSecretSource::new(config.secret.clone());
    let connector = MongoConnector::new(config.mongo.clone());
    run_with(&credentials, &connector).instrument(span).await
}

/// Run the sanity test once with explicit setup collaborators
///
/// The credential is fetched before anything else; if that fails the
/// connector is never called and no case runs. Once `connect` succeeds,
/// `close` is called on every path.
///
/// # Errors
/// Propagates setup errors from `credentials` and `connector`.
pub async fn run_with<C, D>(credentials: &C, connector: &D) -> Result<RunReport, SanityError>
where
    C: CredentialSource + ?Sized,
    D: Connector + ?Sized,
{
    info!("Setting up: loading MongoDB credential");
    let password = credentials.fetch().await?;

    let store = connector.connect(&password).await?;
    drop(password);

    let report = RunReport {
        cases: vec![run_insert_and_find(&store).await],
    };

    connector.close(store).await;
    info!("{}", report.summary());
    Ok(report)
}
