//! Read-only access to the product's MongoDB collections.
//!
//! Handlers talk to a [`CollectionStore`]; [`mongo::MongoStore`] is the
//! production implementation. Documents are passed through untouched; the
//! helpers in [`fields`] read them leniently and [`json`] renders them.

pub mod fields;
pub mod json;
pub mod mongo;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document};
use strum::{AsRefStr, Display, EnumIter};

pub use mongo::MongoStore;

/// Collections the admin API reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Users,
    Calls,
    Subscriptions,
    Automations,
    Feedbacks,
    Contacts,
    Recordings,
    Usage,
    ContactLists,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("query on '{collection}' failed: {message}")]
    Query { collection: String, message: String },
}

impl StoreError {
    pub fn query(collection: impl AsRef<str>, err: impl std::fmt::Display) -> Self {
        StoreError::Query {
            collection: collection.as_ref().to_string(),
            message: err.to_string(),
        }
    }
}

/// Call volume of one user inside a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerActivity {
    pub user_id: Bson,
    pub call_count: u64,
    pub last_call: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Every document in `collection`, in natural order.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Round-trip to the server.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Distinct `userId` values of calls created at or after `since`.
    async fn distinct_callers_since(&self, since: DateTime<Utc>) -> Result<Vec<Bson>, StoreError> {
        let calls = self.find_all(Collection::Calls).await?;
        let mut ids: Vec<Bson> = Vec::new();
        for call in &calls {
            let recent = fields::get_datetime(call, "createdAt").is_some_and(|at| at >= since);
            if !recent {
                continue;
            }
            if let Some(id) = call.get("userId").filter(|id| !matches!(id, Bson::Null)) {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        Ok(ids)
    }

    /// Users with the most calls created at or after `since`, busiest first.
    async fn top_callers_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CallerActivity>, StoreError> {
        let calls = self.find_all(Collection::Calls).await?;
        Ok(crate::stats::activity::rank_callers(&calls, since, limit))
    }
}
