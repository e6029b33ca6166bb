//! In-memory collection store for handler and aggregation tests.

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::Document;

use super::{Collection, CollectionStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: HashMap<Collection, Vec<Document>>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every query fails, as if the server were unreachable.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, collection: Collection, docs: Vec<Document>) -> Self {
        self.collections.insert(collection, docs);
        self
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        if self.failing {
            return Err(StoreError::Connection("server selection timeout".to_string()));
        }
        Ok(self.collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Connection("server selection timeout".to_string()));
        }
        Ok(())
    }
}
