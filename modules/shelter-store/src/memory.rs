//! In-process collection with MongoDB matching and update semantics.

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use tokio::sync::RwLock;

use shelter_common::{types::ID_FIELD, RecordQuery};

use crate::collection::RecordCollection;
use crate::error::StoreError;

/// Documents kept in insertion order behind an async lock.
#[derive(Default)]
pub struct MemoryCollection {
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection. Documents without `_id` get a fresh ObjectId, as
    /// the driver would assign on insert.
    pub fn with_documents(docs: impl IntoIterator<Item = Document>) -> Self {
        Self {
            docs: RwLock::new(docs.into_iter().map(with_object_id).collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

fn with_object_id(mut doc: Document) -> Document {
    if !doc.contains_key(ID_FIELD) {
        let mut with_id = Document::new();
        with_id.insert(ID_FIELD, ObjectId::new());
        for (key, value) in doc {
            with_id.insert(key, value);
        }
        doc = with_id;
    }
    doc
}

#[async_trait]
impl RecordCollection for MemoryCollection {
    async fn insert_one(&self, doc: Document) -> Result<bool, StoreError> {
        self.docs.write().await.push(with_object_id(doc));
        Ok(true)
    }

    async fn find(&self, query: &RecordQuery) -> Result<Vec<Document>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| query.matches(d)).cloned().collect())
    }

    async fn update_many(&self, query: &RecordQuery, changes: Document) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let mut modified = 0;

        for doc in docs.iter_mut().filter(|d| query.matches(d)) {
            // Matched documents that already hold the new values are not counted.
            let changed = changes.iter().any(|(k, v)| doc.get(k) != Some(v));
            if changed {
                for (k, v) in changes.iter() {
                    doc.insert(k.clone(), v.clone());
                }
                modified += 1;
            }
        }

        Ok(modified)
    }

    async fn delete_many(&self, query: &RecordQuery) -> Result<u64, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| !query.matches(d));
        Ok((before - docs.len()) as u64)
    }
}
