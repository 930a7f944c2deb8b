//! # Database Connection
//!
//! Opens the one authenticated MongoDB connection used by a sanity run and
//! exposes the working collection as a [`DocumentStore`].

use crate::config::MongoConfig;
use crate::document::TestDocument;
use crate::error::SanityError;
use crate::round_trip::DocumentStore;
use crate::runner::Connector;
use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Collection};
use tracing::{debug, info};

/// Application name sent in the MongoDB handshake
const APP_NAME: &str = "mongodb-sanity-test";

/// Open MongoDB connection scoped to the working collection
pub struct SanityDatabase {
    client: Client,
    collection: Collection<TestDocument>,
    address: String,
}

impl std::fmt::Debug for SanityDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanityDatabase")
            .field("address", &self.address)
            .field("collection", &self.collection.namespace().to_string())
            .finish_non_exhaustive()
    }
}

impl SanityDatabase {
    /// Connect and authenticate
    ///
    /// The driver connects lazily, so a `ping` is issued against the
    /// authentication database to surface bad credentials or an unreachable
    /// server here instead of on the first insert.
    ///
    /// The driver's `Credential` only accepts a plain `String`, so `password`
    /// is copied into the client options and stays in memory, unwiped, until
    /// the client is dropped. Only the caller's `Zeroizing` buffer is cleared.
    ///
    /// # Errors
    /// [`SanityError::DatabaseConnect`] on invalid options, network failure or
    /// authentication failure.
    pub async fn connect(config: &MongoConfig, password: &str) -> Result<Self, SanityError> {
        let address = format!("{}:{}", config.host, config.port);
        let options = client_options(config, password);

        let client =
            Client::with_options(options).map_err(|source| SanityError::DatabaseConnect {
                address: address.clone(),
                source,
            })?;

        client
            .database(&config.auth_source)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| SanityError::DatabaseConnect {
                address: address.clone(),
                source,
            })?;

        let collection = client
            .database(&config.database)
            .collection::<TestDocument>(&config.collection);

        info!(
            "Connected to MongoDB at {} as '{}' (auth source '{}'), using {}.{}",
            address, config.username, config.auth_source, config.database, config.collection
        );

        Ok(Self {
            client,
            collection,
            address,
        })
    }

    /// Count documents matching `filter` in the working collection
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count(&self, filter: &Document) -> Result<u64> {
        Ok(self.collection.count_documents(filter.clone()).await?)
    }

    /// Close the connection
    ///
    /// Waits for in-flight operations and releases the connection pool.
    pub async fn close(self) {
        debug!("Closing MongoDB connection to {}", self.address);
        self.client.shutdown().await;
        info!("MongoDB connection closed");
    }
}

/// [`Connector`] that opens a [`SanityDatabase`] from a [`MongoConfig`]
#[derive(Debug, Clone)]
pub struct MongoConnector {
    config: MongoConfig,
}

impl MongoConnector {
    #[must_use]
    pub fn new(config: MongoConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Store = SanityDatabase;

    async fn connect(&self, password: &str) -> std::result::Result<SanityDatabase, SanityError> {
        SanityDatabase::connect(&self.config, password).await
    }

    async fn close(&self, store: SanityDatabase) {
        store.close().await;
    }
}

/// Build driver options for a single host with SCRAM credentials
///
/// The returned options own a plain copy of `password`.
fn client_options(config: &MongoConfig, password: &str) -> ClientOptions {
    let mut credential = Credential::default();
    credential.username = Some(config.username.clone());
    credential.password = Some(password.to_string());
    credential.source = Some(config.auth_source.clone());

    let mut options = ClientOptions::default();
    options.hosts = vec![ServerAddress::Tcp {
        host: config.host.clone(),
        port: Some(config.port),
    }];
    options.credential = Some(credential);
    options.app_name = Some(APP_NAME.to_string());
    options
}

#[async_trait]
impl DocumentStore for SanityDatabase {
    async fn insert_one(&self, document: &TestDocument) -> Result<()> {
        let result = self.collection.insert_one(document).await?;
        debug!("Inserted test document with _id {}", result.inserted_id);
        Ok(())
    }

    async fn find_one(&self, filter: &Document) -> Result<Option<TestDocument>> {
        Ok(self.collection.find_one(filter.clone()).await?)
    }

    async fn delete_one(&self, filter: &Document) -> Result<u64> {
        Ok(self.collection.delete_one(filter.clone()).await?.deleted_count)
    }

    async fn delete_many(&self, filter: &Document) -> Result<u64> {
        Ok(self
            .collection
            .delete_many(filter.clone())
            .await?
            .deleted_count)
    }
}
