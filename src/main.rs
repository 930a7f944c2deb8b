//! # MongoDB Sanity Test Runner
//!
//! Runs the MongoDB sanity check once against the cluster in the current
//! kubeconfig context.
//!
//! ## Usage
//!
//! ```bash
//! # Port-forward MongoDB, then run with defaults
//! kubectl port-forward svc/mongodb 27017:27017 &
//! mongodb-sanity-test
//!
//! # Different namespace and host
//! mongodb-sanity-test --secret-namespace databases --host 127.0.0.1
//! ```
//!
//! Exit codes: `0` all cases passed, `1` a case failed, `2` setup failed.

use clap::Parser;
use mongodb_sanity_test::{observability, run, RunReport, SanityConfig, SanityError};
use std::process::ExitCode;
use tracing::error;

const EXIT_PASSED: u8 = 0;
const EXIT_CASE_FAILED: u8 = 1;
const EXIT_SETUP_FAILED: u8 = 2;

/// MongoDB sanity test for Kubernetes deployments
///
/// Every flag falls back to its environment variable, then to the default.
#[derive(Parser, Debug)]
#[command(name = "mongodb-sanity-test")]
#[command(about = "Insert, read back and delete a document in a Kubernetes-hosted MongoDB", long_about = None)]
struct Cli {
    /// Kubernetes context to use [env: KUBE_CONTEXT]
    #[arg(short, long)]
    context: Option<String>,

    /// Secret holding the MongoDB password [env: MONGODB_SECRET_NAME]
    #[arg(long)]
    secret_name: Option<String>,

    /// Namespace of the Secret [env: MONGODB_SECRET_NAMESPACE]
    #[arg(short = 'n', long)]
    secret_namespace: Option<String>,

    /// Key of the password in the Secret [env: MONGODB_SECRET_KEY]
    #[arg(long)]
    secret_key: Option<String>,

    /// MongoDB host [env: MONGODB_HOST]
    #[arg(long)]
    host: Option<String>,

    /// MongoDB port [env: MONGODB_PORT]
    #[arg(short, long)]
    port: Option<u16>,

    /// MongoDB user [env: MONGODB_USERNAME]
    #[arg(short, long)]
    username: Option<String>,

    /// Authentication database [env: MONGODB_AUTH_SOURCE]
    #[arg(long)]
    auth_source: Option<String>,

    /// Working database [env: MONGODB_DATABASE]
    #[arg(long)]
    database: Option<String>,

    /// Working collection [env: MONGODB_COLLECTION]
    #[arg(long)]
    collection: Option<String>,
}

impl Cli {
    /// Layer flags over the environment-derived configuration
    fn apply(self, mut config: SanityConfig) -> SanityConfig {
        if let Some(context) = self.context {
            config.secret.context = Some(context);
        }
        if let Some(name) = self.secret_name {
            config.secret.name = name;
        }
        if let Some(namespace) = self.secret_namespace {
            config.secret.namespace = namespace;
        }
        if let Some(key) = self.secret_key {
            config.secret.key = key;
        }
        if let Some(host) = self.host {
            config.mongo.host = host;
        }
        if let Some(port) = self.port {
            config.mongo.port = port;
        }
        if let Some(username) = self.username {
            config.mongo.username = username;
        }
        if let Some(auth_source) = self.auth_source {
            config.mongo.auth_source = auth_source;
        }
        if let Some(database) = self.database {
            config.mongo.database = database;
        }
        if let Some(collection) = self.collection {
            config.mongo.collection = collection;
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    observability::install_crypto_provider();
    observability::init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(SanityConfig::from_env());

    let result = run(&config).await;
    match &result {
        Ok(report) => {
            for case in report.failed_cases() {
                error!(
                    "{} failed in state '{}': {}",
                    case.name,
                    case.state().as_str(),
                    case.failure.as_deref().unwrap_or("unknown failure")
                );
            }
            println!("{}", report.summary());
        }
        Err(e) => {
            error!("Setup failed ({}): {}", e.tier().as_str(), e);
            error!("Remediation: {}", e.remediation());
            println!("test result: FAILED. setup error, no test case executed");
        }
    }
    ExitCode::from(exit_status(&result))
}

/// Process exit status for a run result
fn exit_status(result: &Result<RunReport, SanityError>) -> u8 {
    match result {
        Ok(report) if report.passed() => EXIT_PASSED,
        Ok(_) => EXIT_CASE_FAILED,
        Err(_) => EXIT_SETUP_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb_sanity_test::round_trip::{CaseReport, RoundTripState, INSERT_AND_FIND_CASE};

    fn report(failure: Option<&str>) -> RunReport {
        RunReport {
            cases: vec![CaseReport {
                name: INSERT_AND_FIND_CASE.to_string(),
                transitions: vec![
                    RoundTripState::Inserted,
                    RoundTripState::Verified,
                    RoundTripState::Cleaned,
                ],
                failure: failure.map(str::to_string),
            }],
        }
    }

    #[test]
    fn test_exit_status_passed() {
        assert_eq!(exit_status(&Ok(report(None))), 0);
    }

    #[test]
    fn test_exit_status_case_failed() {
        let result = Ok(report(Some("Failed: Age mismatch. Expected: 25, Actual: 26")));
        assert_eq!(exit_status(&result), 1);
    }

    #[test]
    fn test_exit_status_setup_failed() {
        let result = Err(SanityError::SecretKeyMissing {
            namespace: "default".to_string(),
            name: "mongodb".to_string(),
            key: "mongodb-root-password".to_string(),
        });
        assert_eq!(exit_status(&result), 2);
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "mongodb-sanity-test",
            "--secret-namespace",
            "databases",
            "--port",
            "27018",
        ]);
        let config = cli.apply(SanityConfig::default());
        assert_eq!(config.secret.namespace, "databases");
        assert_eq!(config.mongo.port, 27018);
        assert_eq!(config.secret.name, "mongodb");
        assert_eq!(config.mongo.host, "localhost");
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::parse_from(["mongodb-sanity-test"]);
        assert_eq!(cli.apply(SanityConfig::default()), SanityConfig::default());
    }
}
