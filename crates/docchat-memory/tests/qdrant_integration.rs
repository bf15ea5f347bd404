//! Requires Docker; run with `cargo test -p docchat-memory -- --ignored`.

use std::sync::Arc;

use docchat_llm::mock::MockEmbedder;
use docchat_memory::document::{ChunkMetadata, SplitterConfig, TextSplitter};
use docchat_memory::{
    ContextRetriever, Namespace, QdrantIndex, RetrievalConfig, VectorIndex, VectorRecord,
};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

const QDRANT_GRPC_PORT: ContainerPort = ContainerPort::Tcp(6334);
const COLLECTION: &str = "test_chunks";

fn qdrant_image() -> GenericImage {
    GenericImage::new("qdrant/qdrant", "v1.16.0")
        .with_wait_for(WaitFor::message_on_stdout("gRPC listening"))
        .with_exposed_port(QDRANT_GRPC_PORT)
}

async fn setup() -> (QdrantIndex, ContainerAsync<GenericImage>) {
    let container = qdrant_image().start().await.unwrap();
    let port = container.get_host_port_ipv4(6334).await.unwrap();
    let index = QdrantIndex::new(&format!("http://127.0.0.1:{port}"), COLLECTION).unwrap();
    (index, container)
}

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
#[ignore = "requires Docker"]
async fn ensure_index_is_idempotent() {
    let (index, _container) = setup().await;
    index.ensure_index(4).await.unwrap();
    index.ensure_index(4).await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn query_before_any_ingest_is_empty() {
    let (index, _container) = setup().await;
    let results = index
        .query(&Namespace::from_identity("a.pdf"), vec![1.0, 0.0], 5, true)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn upsert_then_query_within_namespace() {
    let (index, _container) = setup().await;
    let a = Namespace::from_identity("uploads/a.pdf");
    let b = Namespace::from_identity("uploads/b.pdf");
    index.ensure_index(3).await.unwrap();

    index
        .upsert(
            &a,
            vec![
                record("a1", vec![1.0, 0.0, 0.0], "alpha one"),
                record("a2", vec![0.0, 1.0, 0.0], "alpha two"),
            ],
        )
        .await
        .unwrap();
    index
        .upsert(&b, vec![record("b1", vec![1.0, 0.0, 0.0], "bravo one")])
        .await
        .unwrap();

    let results = index.query(&a, vec![1.0, 0.0, 0.0], 5, true).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "a1");
    assert_eq!(results[0].text(), "alpha one");
    assert!(results.iter().all(|m| !m.text().starts_with("bravo")));

    let bare = index.query(&a, vec![1.0, 0.0, 0.0], 1, false).await.unwrap();
    assert_eq!(bare.len(), 1);
    assert!(bare[0].metadata.is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn upsert_same_id_overwrites() {
    let (index, _container) = setup().await;
    let ns = Namespace::from_identity("uploads/a.pdf");
    index.ensure_index(2).await.unwrap();

    index
        .upsert(&ns, vec![record("x", vec![1.0, 0.0], "old")])
        .await
        .unwrap();
    index
        .upsert(&ns, vec![record("x", vec![1.0, 0.0], "new")])
        .await
        .unwrap();

    let results = index.query(&ns, vec![1.0, 0.0], 5, true).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text(), "new");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn retriever_over_qdrant() {
    let (index, _container) = setup().await;
    let index = Arc::new(index);
    let embedder = MockEmbedder::default();
    let identity = "uploads/policy.pdf";
    let ns = Namespace::from_identity(identity);

    let splitter = TextSplitter::new(SplitterConfig::default());
    let page = docchat_memory::document::Page {
        number: 1,
        text: "Refunds are available within 30 days.".into(),
    };
    let chunk = &splitter.split(&page)[0];
    let values = embedder.vector_for(&chunk.text);

    index.ensure_index(values.len() as u64).await.unwrap();
    index
        .upsert(&ns, vec![VectorRecord::from_chunk(chunk, values)])
        .await
        .unwrap();

    let retriever = ContextRetriever::new(
        Arc::new(embedder),
        index as Arc<dyn VectorIndex>,
        RetrievalConfig::default(),
    );
    let context = retriever
        .retrieve_context("What is the refund policy?", identity)
        .await
        .unwrap();
    assert_eq!(context, "Refunds are available within 30 days.");
}
