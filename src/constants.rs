//! # Constants
//!
//! Default values for the sanity test. Each one can be overridden through
//! the environment (see [`crate::config`]).

/// Name of the Kubernetes Secret holding the MongoDB root password
pub const DEFAULT_SECRET_NAME: &str = "mongodb";

/// Namespace of the MongoDB Secret
pub const DEFAULT_SECRET_NAMESPACE: &str = "default";

/// Key inside the Secret's `data` map
pub const DEFAULT_SECRET_KEY: &str = "mongodb-root-password";

/// MongoDB host
pub const DEFAULT_MONGODB_HOST: &str = "localhost";

/// MongoDB port
pub const DEFAULT_MONGODB_PORT: u16 = 27017;

/// MongoDB user authenticated with the Secret's password
pub const DEFAULT_MONGODB_USERNAME: &str = "root";

/// Database the credentials are validated against
pub const DEFAULT_AUTH_SOURCE: &str = "admin";

/// Working database for the test document
pub const DEFAULT_DATABASE: &str = "testdb";

/// Working collection for the test document
pub const DEFAULT_COLLECTION: &str = "testcollection";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "mongodb_sanity_test=info";
