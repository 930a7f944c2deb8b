//! # MongoDB Sanity Test
//!
//! Verifies a MongoDB deployment running in Kubernetes is reachable and
//! handles a basic write/read cycle:
//!
//! 1. **Credential** - reads the root password from the `mongodb` Secret
//! 2. **Connect** - opens one authenticated connection
//! 3. **Round trip** - inserts a document, reads it back, checks every field
//! 4. **Cleanup** - deletes the document and closes the connection
//!
//! The [`runner::run`] entry point drives the whole flow; each step is also
//! public so the live integration test can assert on intermediate state.

pub mod config;
pub mod constants;
pub mod credential;
pub mod database;
pub mod document;
pub mod error;
pub mod observability;
pub mod round_trip;
pub mod runner;

pub use config::SanityConfig;
pub use error::{ErrorTier, SanityError};
pub use runner::{run, run_with, Connector, CredentialSource, RunReport};
