//! MongoDB-backed collection store.
//!
//! The client is created on the first query and reused for the life of the
//! process; pooling is left to the driver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Client, Database};
use tokio::sync::OnceCell;

use super::{fields, CallerActivity, Collection, CollectionStore, StoreError};
use crate::config::defaults;

pub struct MongoStore {
    uri: String,
    database_name: Option<String>,
    db: OnceCell<Database>,
}

impl MongoStore {
    /// `database_name` overrides the database named in the URI path.
    pub fn new(uri: impl Into<String>, database_name: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            database_name,
            db: OnceCell::new(),
        }
    }

    async fn database(&self) -> Result<&Database, StoreError> {
        self.db
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.uri)
                    .await
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
                let db = match &self.database_name {
                    Some(name) => client.database(name),
                    None => client
                        .default_database()
                        .unwrap_or_else(|| client.database(defaults::DATABASE_NAME)),
                };
                db.run_command(doc! { "ping": 1 })
                    .await
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
                log::info!("Connected to MongoDB database '{}'", db.name());
                Ok::<Database, StoreError>(db)
            })
            .await
    }

    async fn collection(&self, collection: Collection) -> Result<mongodb::Collection<Document>, StoreError> {
        Ok(self.database().await?.collection::<Document>(collection.as_ref()))
    }
}

fn bson_date(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

/// Stages keeping calls created at or after `since`, with the creation time
/// normalised into `callAt`. `createdAt` may be a BSON date or a timestamp
/// string; anything else is dropped.
fn calls_since_stages(since: DateTime<Utc>) -> Vec<Document> {
    vec![
        doc! {
            "$project": {
                "userId": 1,
                "callAt": {
                    "$switch": {
                        "branches": [
                            {
                                "case": { "$eq": [{ "$type": "$createdAt" }, "date"] },
                                "then": "$createdAt",
                            },
                            {
                                "case": { "$eq": [{ "$type": "$createdAt" }, "string"] },
                                "then": {
                                    "$dateFromString": {
                                        "dateString": { "$trim": { "input": "$createdAt" } },
                                        "onError": Bson::Null,
                                    }
                                },
                            },
                        ],
                        "default": Bson::Null,
                    }
                },
            }
        },
        doc! { "$match": { "callAt": { "$type": "date", "$gte": bson_date(since) } } },
    ]
}

#[async_trait]
impl CollectionStore for MongoStore {
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .collection(collection)
            .await?
            .find(doc! {})
            .await
            .map_err(|e| StoreError::query(collection, e))?;
        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::query(collection, e))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database()
            .await?
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn distinct_callers_since(&self, since: DateTime<Utc>) -> Result<Vec<Bson>, StoreError> {
        let mut pipeline = calls_since_stages(since);
        pipeline.push(doc! { "$group": { "_id": "$userId" } });

        let rows: Vec<Document> = self
            .collection(Collection::Calls)
            .await?
            .aggregate(pipeline)
            .await
            .map_err(|e| StoreError::query(Collection::Calls, e))?
            .try_collect()
            .await
            .map_err(|e| StoreError::query(Collection::Calls, e))?;

        // Calls without a userId group under null, which no user matches
        Ok(rows
            .iter()
            .filter_map(|row| row.get("_id"))
            .filter(|id| !matches!(id, Bson::Null))
            .cloned()
            .collect())
    }

    async fn top_callers_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CallerActivity>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut pipeline = calls_since_stages(since);
        pipeline.extend([
            doc! {
                "$group": {
                    "_id": "$userId",
                    "callCount": { "$sum": 1 },
                    "lastCallDate": { "$max": "$callAt" },
                }
            },
            doc! { "$sort": { "callCount": -1, "lastCallDate": -1 } },
            doc! { "$limit": limit },
        ]);

        let rows: Vec<Document> = self
            .collection(Collection::Calls)
            .await?
            .aggregate(pipeline)
            .await
            .map_err(|e| StoreError::query(Collection::Calls, e))?
            .try_collect()
            .await
            .map_err(|e| StoreError::query(Collection::Calls, e))?;

        Ok(rows
            .iter()
            .map(|row| CallerActivity {
                user_id: row.get("_id").cloned().unwrap_or(Bson::Null),
                call_count: fields::get_f64(row, "callCount").unwrap_or(0.0) as u64,
                last_call: fields::get_datetime(row, "lastCallDate"),
            })
            .collect())
    }
}
