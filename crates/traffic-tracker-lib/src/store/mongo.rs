use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, Bson, DateTime as BsonDateTime, Document as BsonDocument};
use mongodb::{Client, Database};
use serde_json::Value;

use super::{
    Document, DocumentId, DocumentStore, EqualityFilter, StoredDocument, CREATED_AT, UPDATED_AT,
};
use crate::error::{StoreError, StoreResult};

/// Database used when neither the caller nor the connection string names one.
pub const DEFAULT_DATABASE_NAME: &str = "traffic";

/// MongoDB-backed document store.
///
/// The driver's `Client` pools connections internally and is cheap to clone,
/// so a single `MongoStore` is shared by every request.
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
    name: String,
}

impl MongoStore {
    /// Build a store from a connection string.
    ///
    /// The database is `database_name` when given, otherwise the default
    /// database from the URI, otherwise [`DEFAULT_DATABASE_NAME`]. The driver
    /// connects lazily; use [`DocumentStore::ping`] to confirm reachability.
    pub async fn connect(uri: &str, database_name: Option<&str>) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = match database_name {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE_NAME)),
        };
        let name = database.name().to_string();
        tracing::info!(database = %name, "document store client created");

        Ok(Self { database, name })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<DocumentId> {
        let mut record = bson::to_document(&document)?;
        let now = BsonDateTime::now();
        record.insert(CREATED_AT, now);
        record.insert(UPDATED_AT, now);

        let result = self
            .database
            .collection::<BsonDocument>(collection)
            .insert_one(record)
            .await?;

        id_from_bson(&result.inserted_id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &EqualityFilter,
        limit: usize,
    ) -> StoreResult<Vec<StoredDocument>> {
        let mut query = BsonDocument::new();
        for (field, value) in filter.iter() {
            query.insert(field, value);
        }

        let mut cursor = self
            .database
            .collection::<BsonDocument>(collection)
            .find(query)
            .sort(doc! { "_id": -1 })
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        let mut documents = Vec::new();
        while cursor.advance().await? {
            let raw = cursor.deserialize_current()?;
            documents.push(stored_from_bson(raw)?);
        }
        Ok(documents)
    }

    async fn list_collection_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.database.list_collection_names().await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn database_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

fn id_from_bson(value: &Bson) -> StoreResult<DocumentId> {
    match value {
        Bson::ObjectId(oid) => Ok(DocumentId::new(oid.to_hex())),
        Bson::String(s) => Ok(DocumentId::new(s.clone())),
        Bson::Int32(n) => Ok(DocumentId::new(n.to_string())),
        Bson::Int64(n) => Ok(DocumentId::new(n.to_string())),
        _ => Err(StoreError::MissingId),
    }
}

fn timestamp_from_bson(value: Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis()),
        Bson::String(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

fn stored_from_bson(mut raw: BsonDocument) -> StoreResult<StoredDocument> {
    let id = raw
        .remove("_id")
        .ok_or(StoreError::MissingId)
        .and_then(|value| id_from_bson(&value))?;
    let created_at = raw.remove(CREATED_AT).and_then(timestamp_from_bson);
    let updated_at = raw.remove(UPDATED_AT).and_then(timestamp_from_bson);

    let fields = match Bson::Document(raw).into_relaxed_extjson() {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::Encode {
                message: format!("expected a document, found {other}"),
            })
        }
    };

    Ok(StoredDocument {
        id,
        created_at,
        updated_at,
        fields,
    })
}
