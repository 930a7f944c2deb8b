//! # Round-Trip Verification
//!
//! Inserts the test document, reads it back, checks every field and deletes
//! it again. Cleanup runs after every case regardless of the outcome.
//!
//! ```text
//! Pending ──insert──▶ Inserted ──verify──▶ Verified
//!    │                   │                    │
//!    └───────────────────┴──────cleanup───────┴──▶ Cleaned
//! ```

use crate::document::{verify_document, TestDocument};
use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::bson::Document;
use tracing::{debug, error, info, warn, Instrument};

/// Name of the single test case, reported in the run summary
pub const INSERT_AND_FIND_CASE: &str = "mongo_insert_and_find";

/// Storage the round trip runs against
///
/// Implemented by [`crate::database::SanityDatabase`] for MongoDB. Filters
/// are MongoDB query documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document
    async fn insert_one(&self, document: &TestDocument) -> Result<()>;

    /// Fetch the first document matching `filter`
    async fn find_one(&self, filter: &Document) -> Result<Option<TestDocument>>;

    /// Delete the first document matching `filter`, returning the count deleted
    async fn delete_one(&self, filter: &Document) -> Result<u64>;

    /// Delete every document matching `filter`, returning the count deleted
    async fn delete_many(&self, filter: &Document) -> Result<u64>;
}

/// States of one round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTripState {
    Pending,
    Inserted,
    Verified,
    Cleaned,
}

impl RoundTripState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundTripState::Pending => "pending",
            RoundTripState::Inserted => "inserted",
            RoundTripState::Verified => "verified",
            RoundTripState::Cleaned => "cleaned",
        }
    }
}

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub name: String,
    /// States entered, in order, starting after `Pending`
    pub transitions: Vec<RoundTripState>,
    /// First failure seen, if any
    pub failure: Option<String>,
}

impl CaseReport {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transitions: Vec::new(),
            failure: None,
        }
    }

    /// Current state of the case
    #[must_use]
    pub fn state(&self) -> RoundTripState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(RoundTripState::Pending)
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether the case reached `state` at some point
    #[must_use]
    pub fn reached(&self, state: RoundTripState) -> bool {
        state == RoundTripState::Pending || self.transitions.contains(&state)
    }

    fn enter(&mut self, state: RoundTripState) {
        debug!(case = %self.name, state = state.as_str(), "Round trip state change");
        self.transitions.push(state);
    }

    fn fail(&mut self, message: String) {
        // Keep the first failure; later ones are only logged
        if self.failure.is_none() {
            self.failure = Some(message);
        }
    }
}

/// Run the insert-and-find case against `store`
///
/// Never returns an error: every failure is recorded in the report, and
/// cleanup is attempted on all paths.
pub async fn run_insert_and_find<S>(store: &S) -> CaseReport
where
    S: DocumentStore + ?Sized,
{
    let span = tracing::info_span!("sanity.case", case = INSERT_AND_FIND_CASE);
    async move {
        let expected = TestDocument::expected();
        let filter = expected.filter();
        let mut report = CaseReport::new(INSERT_AND_FIND_CASE);

        remove_stale_documents(store, &filter).await;

        info!("Testing: Inserting and fetching a document from MongoDB...");
        if let Err(e) = insert_and_verify(store, &expected, &filter, &mut report).await {
            error!("{e:#}");
            report.fail(format!("{e:#}"));
        }

        cleanup(store, &filter, &mut report).await;

        if report.passed() {
            info!("Passed: Document was inserted and fetched successfully.");
        }
        report
    }
    .instrument(span)
    .await
}

async fn insert_and_verify<S>(
    store: &S,
    expected: &TestDocument,
    filter: &Document,
    report: &mut CaseReport,
) -> Result<()>
where
    S: DocumentStore + ?Sized,
{
    store
        .insert_one(expected)
        .await
        .context("Failed to insert test document")?;
    report.enter(RoundTripState::Inserted);

    let found = store
        .find_one(filter)
        .await
        .context("Failed to fetch test document")?;
    verify_document(found.as_ref(), expected)?;
    report.enter(RoundTripState::Verified);

    Ok(())
}

async fn cleanup<S>(store: &S, filter: &Document, report: &mut CaseReport)
where
    S: DocumentStore + ?Sized,
{
    match store.delete_one(filter).await {
        Ok(deleted) => {
            debug!("Cleanup deleted {} document(s)", deleted);
            report.enter(RoundTripState::Cleaned);
        }
        Err(e) => {
            error!("Cleanup failed, test document may be left behind: {e:#}");
            report.fail(format!("Cleanup failed: {e:#}"));
        }
    }
}

/// Remove documents left behind by an earlier run that crashed before cleanup
///
/// A leftover match would make `find_one` ambiguous. Failure here is only
/// logged; the case itself decides pass or fail.
async fn remove_stale_documents<S>(store: &S, filter: &Document)
where
    S: DocumentStore + ?Sized,
{
    match store.delete_many(filter).await {
        Ok(0) => {}
        Ok(stale) => warn!(
            "Removed {} stale test document(s) left by a previous run",
            stale
        ),
        Err(e) => warn!("Failed to check for stale test documents: {e:#}"),
    }
}
