//! Qdrant-backed [`VectorIndex`]: one collection, partitioned by a `namespace` payload field.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    Filter, PointStruct, ScoredPoint, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
};

use crate::namespace::Namespace;
use crate::vector_store::{BoxFuture, QueryMatch, VectorIndex, VectorRecord, VectorStoreError};

pub const DEFAULT_COLLECTION: &str = "docchat_chunks";

const NAMESPACE_FIELD: &str = "namespace";
const RECORD_ID_FIELD: &str = "record_id";

#[derive(Clone)]
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl std::fmt::Debug for QdrantIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantIndex")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl QdrantIndex {
    /// Create a client for the Qdrant instance at `url`.
    ///
    /// No request is made until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`VectorStoreError::Connection`] if the client cannot be built.
    pub fn new(url: &str, collection: impl Into<String>) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            collection: collection.into(),
        })
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))
    }
}

/// Stable Qdrant point id for a record: UUIDv5 over `"{namespace}/{record_id}"`.
#[must_use]
pub fn point_id(namespace: &Namespace, record_id: &str) -> String {
    uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        format!("{namespace}/{record_id}").as_bytes(),
    )
    .to_string()
}

fn to_point(namespace: &Namespace, record: VectorRecord) -> Result<PointStruct, VectorStoreError> {
    let mut fields = record.metadata_map()?;
    fields.insert(
        NAMESPACE_FIELD.to_owned(),
        serde_json::Value::String(namespace.as_str().to_owned()),
    );
    fields.insert(
        RECORD_ID_FIELD.to_owned(),
        serde_json::Value::String(record.id.clone()),
    );
    let payload: HashMap<String, qdrant_client::qdrant::Value> =
        serde_json::from_value(serde_json::Value::Object(fields.into_iter().collect()))
            .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;
    Ok(PointStruct::new(
        point_id(namespace, &record.id),
        record.values,
        payload,
    ))
}

fn to_match(point: ScoredPoint) -> QueryMatch {
    let mut metadata: HashMap<String, serde_json::Value> = point
        .payload
        .into_iter()
        .filter_map(|(k, v)| {
            let json_val = match v.kind? {
                Kind::StringValue(s) => serde_json::Value::String(s),
                Kind::IntegerValue(i) => serde_json::Value::Number(i.into()),
                Kind::DoubleValue(d) => {
                    serde_json::Number::from_f64(d).map(serde_json::Value::Number)?
                }
                Kind::BoolValue(b) => serde_json::Value::Bool(b),
                _ => return None,
            };
            Some((k, json_val))
        })
        .collect();
    metadata.remove(NAMESPACE_FIELD);

    let id = match metadata.remove(RECORD_ID_FIELD) {
        Some(serde_json::Value::String(id)) => id,
        _ => match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Uuid(u)) => u,
            Some(PointIdOptions::Num(n)) => n.to_string(),
            None => String::new(),
        },
    };

    QueryMatch {
        id,
        score: point.score,
        metadata,
    }
}

impl VectorIndex for QdrantIndex {
    fn ensure_index(&self, vector_size: u64) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        Box::pin(async move {
            if self.collection_exists().await? {
                return Ok(());
            }
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
                )
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    &self.collection,
                    NAMESPACE_FIELD,
                    FieldType::Keyword,
                ))
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            tracing::info!(collection = %self.collection, vector_size, "created Qdrant collection");
            Ok(())
        })
    }

    fn upsert<'a>(
        &'a self,
        namespace: &'a Namespace,
        records: Vec<VectorRecord>,
    ) -> BoxFuture<'a, Result<(), VectorStoreError>> {
        Box::pin(async move {
            if records.is_empty() {
                return Ok(());
            }
            let count = records.len();
            let points = records
                .into_iter()
                .map(|record| to_point(namespace, record))
                .collect::<Result<Vec<_>, _>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            tracing::debug!(%namespace, count, "upserted points");
            Ok(())
        })
    }

    fn query<'a>(
        &'a self,
        namespace: &'a Namespace,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> BoxFuture<'a, Result<Vec<QueryMatch>, VectorStoreError>> {
        Box::pin(async move {
            if top_k == 0 || !self.collection_exists().await? {
                return Ok(Vec::new());
            }
            let filter = Filter::must(vec![Condition::matches(
                NAMESPACE_FIELD,
                namespace.as_str().to_owned(),
            )]);
            // The stored record id lives in the payload, so it is always fetched.
            let results = self
                .client
                .search_points(
                    SearchPointsBuilder::new(&self.collection, vector, top_k)
                        .filter(filter)
                        .with_payload(true),
                )
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;

            Ok(results
                .result
                .into_iter()
                .map(to_match)
                .map(|mut m| {
                    if !include_metadata {
                        m.metadata.clear();
                    }
                    m
                })
                .collect())
        })
    }
}
