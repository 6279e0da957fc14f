use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::Collection;

use shelter_common::RecordQuery;

use crate::error::StoreError;

/// The four collection primitives the gateway is built on.
///
/// Implemented by the MongoDB driver's collection handle and by
/// [`MemoryCollection`](crate::MemoryCollection).
#[async_trait]
pub trait RecordCollection: Send + Sync {
    /// Insert one document. Returns whether the store acknowledged the write.
    async fn insert_one(&self, doc: Document) -> Result<bool, StoreError>;

    /// All matching documents in store-native order.
    async fn find(&self, query: &RecordQuery) -> Result<Vec<Document>, StoreError>;

    /// Set `changes` on every matching document. Returns the modified count.
    async fn update_many(&self, query: &RecordQuery, changes: Document) -> Result<u64, StoreError>;

    /// Remove every matching document. Returns the deleted count.
    async fn delete_many(&self, query: &RecordQuery) -> Result<u64, StoreError>;
}

#[async_trait]
impl RecordCollection for Collection<Document> {
    async fn insert_one(&self, doc: Document) -> Result<bool, StoreError> {
        Collection::insert_one(self, doc).await?;
        Ok(true)
    }

    async fn find(&self, query: &RecordQuery) -> Result<Vec<Document>, StoreError> {
        let cursor = Collection::find(self, query.to_document()).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_many(&self, query: &RecordQuery, changes: Document) -> Result<u64, StoreError> {
        let result =
            Collection::update_many(self, query.to_document(), doc! { "$set": changes }).await?;
        Ok(result.modified_count)
    }

    async fn delete_many(&self, query: &RecordQuery) -> Result<u64, StoreError> {
        let result = Collection::delete_many(self, query.to_document()).await?;
        Ok(result.deleted_count)
    }
}
