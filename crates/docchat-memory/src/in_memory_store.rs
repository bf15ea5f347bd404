use std::collections::HashMap;
use std::sync::RwLock;

use crate::namespace::Namespace;
use crate::vector_store::{BoxFuture, QueryMatch, VectorIndex, VectorRecord, VectorStoreError};

struct StoredRecord {
    values: Vec<f32>,
    metadata: HashMap<String, serde_json::Value>,
}

/// Brute-force index held in process memory, keyed by namespace then record id.
pub struct InMemoryIndex {
    namespaces: RwLock<HashMap<String, HashMap<String, StoredRecord>>>,
}

impl InMemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records stored under `namespace`.
    #[must_use]
    pub fn len(&self, namespace: &Namespace) -> usize {
        self.namespaces
            .read()
            .map(|ns| ns.get(namespace.as_str()).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    /// True when no namespace holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces
            .read()
            .map(|ns| ns.values().all(HashMap::is_empty))
            .unwrap_or(true)
    }

    /// Sorted record ids stored under `namespace`.
    #[must_use]
    pub fn record_ids(&self, namespace: &Namespace) -> Vec<String> {
        let mut ids: Vec<String> = self
            .namespaces
            .read()
            .map(|ns| {
                ns.get(namespace.as_str())
                    .map(|records| records.keys().cloned().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIndex").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Vector length shared by every record in `namespace`, if it holds any.
fn namespace_dimensions(
    namespaces: &HashMap<String, HashMap<String, StoredRecord>>,
    namespace: &Namespace,
) -> Option<usize> {
    namespaces
        .get(namespace.as_str())?
        .values()
        .next()
        .map(|r| r.values.len())
}

impl VectorIndex for InMemoryIndex {
    fn ensure_index(&self, _vector_size: u64) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        Box::pin(async { Ok(()) })
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

            // Encode and check the whole batch before touching stored state.
            let dims = records[0].values.len();
            let mut batch = Vec::with_capacity(records.len());
            for record in records {
                if record.values.len() != dims {
                    return Err(VectorStoreError::Upsert(format!(
                        "record {} has {} dimensions, expected {dims}",
                        record.id,
                        record.values.len()
                    )));
                }
                let metadata = record.metadata_map()?;
                batch.push((
                    record.id,
                    StoredRecord {
                        values: record.values,
                        metadata,
                    },
                ));
            }

            let mut namespaces = self
                .namespaces
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            if let Some(held) = namespace_dimensions(&namespaces, namespace)
                && held != dims
            {
                return Err(VectorStoreError::Upsert(format!(
                    "namespace {namespace} holds {held}-dimension vectors, got {dims}"
                )));
            }
            namespaces
                .entry(namespace.as_str().to_owned())
                .or_default()
                .extend(batch);
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
            let namespaces = self
                .namespaces
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let Some(records) = namespaces.get(namespace.as_str()) else {
                return Ok(Vec::new());
            };
            if let Some(held) = namespace_dimensions(&namespaces, namespace)
                && held != vector.len()
            {
                return Err(VectorStoreError::Search(format!(
                    "query has {} dimensions, namespace {namespace} holds {held}",
                    vector.len()
                )));
            }

            let mut scored: Vec<QueryMatch> = records
                .iter()
                .map(|(id, record)| QueryMatch {
                    id: id.clone(),
                    score: cosine_similarity(&vector, &record.values),
                    metadata: if include_metadata {
                        record.metadata.clone()
                    } else {
                        HashMap::new()
                    },
                })
                .collect();

            scored.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });
            scored.truncate(usize::try_from(top_k).unwrap_or(usize::MAX));
            Ok(scored)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::ChunkMetadata;

    fn record(id: &str, values: Vec<f32>, text: &str) -> VectorRecord {
        VectorRecord {
            id: id.into(),
            values,
            metadata: ChunkMetadata {
                text: text.into(),
                page_number: 1,
            },
        }
    }

    #[tokio::test]
    async fn upsert_and_query() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        index
            .upsert(
                &ns,
                vec![
                    record("a", vec![1.0, 0.0, 0.0], "alpha"),
                    record("b", vec![0.0, 1.0, 0.0], "beta"),
                ],
            )
            .await
            .unwrap();

        let results = index.query(&ns, vec![1.0, 0.0, 0.0], 2, true).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert!((results[0].score - 1.0).abs() < f32::EPSILON);
        assert_eq!(results[0].text(), "alpha");
        assert_eq!(results[0].page_number(), Some(1));
    }

    #[tokio::test]
    async fn query_respects_top_k() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        let records = (0..10u8)
            .map(|i| record(&format!("r{i}"), vec![f32::from(i), 1.0], "t"))
            .collect();
        index.upsert(&ns, records).await.unwrap();

        let results = index.query(&ns, vec![1.0, 1.0], 3, false).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|m| m.metadata.is_empty()));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn unknown_namespace_is_empty() {
        let index = InMemoryIndex::new();
        let results = index
            .query(&Namespace::from_identity("none.pdf"), vec![1.0], 5, true)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        index
            .upsert(&ns, vec![record("a", vec![1.0, 0.0], "old")])
            .await
            .unwrap();
        index
            .upsert(&ns, vec![record("a", vec![1.0, 0.0], "new")])
            .await
            .unwrap();

        assert_eq!(index.len(&ns), 1);
        let results = index.query(&ns, vec![1.0, 0.0], 5, true).await.unwrap();
        assert_eq!(results[0].text(), "new");
    }

    #[tokio::test]
    async fn empty_batch_is_noop() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        index.upsert(&ns, Vec::new()).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn mixed_dimensions_rejected_atomically() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        let err = index
            .upsert(
                &ns,
                vec![record("a", vec![1.0, 0.0], "x"), record("b", vec![1.0], "y")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::Upsert(_)));
        assert_eq!(index.len(&ns), 0);
    }

    #[tokio::test]
    async fn dimension_change_within_namespace_rejected() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        index
            .upsert(&ns, vec![record("a", vec![1.0, 0.0], "x")])
            .await
            .unwrap();
        assert!(
            index
                .upsert(&ns, vec![record("b", vec![1.0, 0.0, 0.0], "y")])
                .await
                .is_err()
        );
        assert_eq!(index.record_ids(&ns), vec!["a".to_owned()]);
    }

    #[tokio::test]
    async fn query_dimension_mismatch_is_error() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        index
            .upsert(&ns, vec![record("a", vec![1.0, 0.0, 0.0], "alpha")])
            .await
            .unwrap();

        let err = index.query(&ns, vec![1.0], 5, true).await.unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::Search(ref msg) if msg.contains("query has 1 dimensions")
        ));
        assert_eq!(index.query(&ns, vec![1.0, 0.0, 0.0], 5, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_first_upsert_leaves_no_namespace() {
        let index = InMemoryIndex::new();
        let ns = Namespace::from_identity("a.pdf");
        index
            .upsert(
                &ns,
                vec![record("a", vec![1.0, 0.0], "x"), record("b", vec![1.0], "y")],
            )
            .await
            .unwrap_err();
        assert!(index.namespaces.read().unwrap().get(ns.as_str()).is_none());

        index
            .upsert(&ns, vec![record("c", vec![1.0, 0.0, 0.0], "z")])
            .await
            .unwrap();
        assert_eq!(index.record_ids(&ns), vec!["c".to_owned()]);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    }
}
