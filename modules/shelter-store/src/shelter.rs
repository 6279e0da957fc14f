use std::sync::Arc;
use std::time::Duration;

use bson::{doc, Document};
use mongodb::{options::ClientOptions, Client};
use tracing::{info, warn};

use shelter_common::{AnimalRecord, Config, RecordQuery};

use crate::collection::RecordCollection;
use crate::error::StoreError;

/// How long construction waits for a reachable server before giving up.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// CRUD gateway over the animal collection.
///
/// Cheap to share behind an `Arc`: every call is a self-contained round trip
/// with no transaction held between calls.
pub struct AnimalShelter {
    collection: Arc<dyn RecordCollection>,
    client: Option<Client>,
}

impl AnimalShelter {
    /// Open a MongoDB connection eagerly. Failing to reach the server is a
    /// construction error, not something the operations recover from.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(config.mongo_uri())
            .await
            .map_err(StoreError::Connect)?;
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.app_name = Some("shelter-dashboard".to_string());

        let client = Client::with_options(options).map_err(StoreError::Connect)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connect)?;

        let collection = client
            .database(&config.mongo_database)
            .collection::<Document>(&config.mongo_collection);

        info!(
            host = %config.mongo_host,
            port = config.mongo_port,
            database = %config.mongo_database,
            collection = %config.mongo_collection,
            "Connected to MongoDB"
        );

        Ok(Self {
            collection: Arc::new(collection),
            client: Some(client),
        })
    }

    /// Build a gateway over any collection implementation.
    pub fn with_collection(collection: Arc<dyn RecordCollection>) -> Self {
        Self {
            collection,
            client: None,
        }
    }

    // --- Typed operations ---

    pub async fn try_create(&self, record: Document) -> Result<bool, StoreError> {
        if record.is_empty() {
            return Err(StoreError::InvalidInput("record is required"));
        }
        self.collection.insert_one(record).await
    }

    pub async fn try_create_record(&self, record: &AnimalRecord) -> Result<bool, StoreError> {
        self.try_create(record.to_document()?).await
    }

    pub async fn try_read(&self, query: &RecordQuery) -> Result<Vec<Document>, StoreError> {
        self.collection.find(query).await
    }

    pub async fn try_update(
        &self,
        query: &RecordQuery,
        changes: Document,
    ) -> Result<u64, StoreError> {
        if changes.is_empty() {
            return Err(StoreError::InvalidInput("changes are required"));
        }
        self.collection.update_many(query, changes).await
    }

    pub async fn try_delete(&self, query: &RecordQuery) -> Result<u64, StoreError> {
        self.collection.delete_many(query).await
    }

    // --- Sentinel operations ---

    /// Insert one record. `false` on any failure.
    pub async fn create(&self, record: Document) -> bool {
        self.try_create(record).await.unwrap_or_else(|e| {
            warn!(error = %e, "Error inserting document");
            false
        })
    }

    pub async fn create_record(&self, record: &AnimalRecord) -> bool {
        self.try_create_record(record).await.unwrap_or_else(|e| {
            warn!(error = %e, "Error inserting document");
            false
        })
    }

    /// Every matching record in store order. Empty on any failure, which is
    /// indistinguishable from "no matches" at this level.
    pub async fn read(&self, query: &RecordQuery) -> Vec<Document> {
        self.try_read(query).await.unwrap_or_else(|e| {
            warn!(error = %e, "Error reading documents");
            Vec::new()
        })
    }

    /// Apply `$set` changes to every match. Modified count, `0` on failure.
    pub async fn update(&self, query: &RecordQuery, changes: Document) -> u64 {
        self.try_update(query, changes).await.unwrap_or_else(|e| {
            warn!(error = %e, "Error updating documents");
            0
        })
    }

    /// Remove every match. Deleted count, `0` on failure.
    pub async fn delete(&self, query: &RecordQuery) -> u64 {
        self.try_delete(query).await.unwrap_or_else(|e| {
            warn!(error = %e, "Error deleting documents");
            0
        })
    }

    /// Shut the driver client down. Gateways built over an injected
    /// collection have nothing to close.
    pub async fn close(self) {
        if let Some(client) = self.client {
            client.shutdown().await;
            info!("Client closed");
        }
    }
}
