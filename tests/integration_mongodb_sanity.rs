//! MongoDB Sanity Integration Tests
//!
//! These tests run the sanity check against a real deployment:
//! 1. Read the root password from the `mongodb` Secret
//! 2. Connect to MongoDB
//! 3. Insert, fetch, verify and delete the test document
//!
//! **Note**: These tests require:
//! - A kubeconfig pointing at a cluster with MongoDB installed
//! - MongoDB reachable at `MONGODB_HOST:MONGODB_PORT` (defaults to
//!   `localhost:27017`, e.g. via `kubectl port-forward svc/mongodb 27017:27017`)
//!
//! Run with: `cargo test --test integration_mongodb_sanity -- --ignored --test-threads=1`

use mongodb_sanity_test::credential::fetch_password;
use mongodb_sanity_test::database::SanityDatabase;
use mongodb_sanity_test::document::TestDocument;
use mongodb_sanity_test::round_trip::{run_insert_and_find, RoundTripState};
use mongodb_sanity_test::{observability, run, ErrorTier, SanityConfig, SanityError};

fn setup() -> SanityConfig {
    observability::install_crypto_provider();
    observability::init_tracing();
    SanityConfig::from_env()
}

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_mongodb_sanity -- --ignored
async fn test_mongo_insert_and_find() {
    let config = setup();

    let password = fetch_password(&config.secret)
        .await
        .unwrap_or_else(|e| panic!("Setup failed: {e}. {}", e.remediation()));
    let database = SanityDatabase::connect(&config.mongo, &password)
        .await
        .unwrap_or_else(|e| panic!("Setup failed: {e}. {}", e.remediation()));

    let report = run_insert_and_find(&database).await;
    let remaining = database
        .count(&TestDocument::expected().filter())
        .await
        .expect("count after cleanup");
    database.close().await;

    assert!(report.passed(), "{:?}", report.failure);
    assert_eq!(report.state(), RoundTripState::Cleaned);
    assert_eq!(remaining, 0, "test document was left behind");
}

#[tokio::test]
#[ignore]
async fn test_two_runs_both_pass() {
    let config = setup();

    let first = run(&config).await.expect("first run setup");
    let second = run(&config).await.expect("second run setup");

    assert!(first.passed(), "first run: {}", first.summary());
    assert!(second.passed(), "second run: {}", second.summary());
}

#[tokio::test]
#[ignore]
async fn test_missing_secret_key_fails_setup() {
    let mut config = setup();
    config.secret.key = "no-such-key".to_string();

    let err = run(&config).await.expect_err("setup should fail");

    assert_eq!(err.tier(), ErrorTier::Setup);
    assert!(
        matches!(err, SanityError::SecretKeyMissing { .. }),
        "unexpected error: {err}"
    );
}
