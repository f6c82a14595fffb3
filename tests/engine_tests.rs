//! Tests for the retrieval engine: ranking, degraded mode, skip accounting,
//! and owner isolation.

use std::sync::Arc;

use async_trait::async_trait;
use docrag::{
    Document, DocumentStore, EmbeddingProvider, HashingEmbedder, InMemoryDocumentStore,
    MemoryDocument, RagConfig, RagError, RetrievalEngine, Result, SearchRequest, SourceRef,
};
use proptest::prelude::*;
use tokio::runtime::Runtime;

// ── test doubles ────────────────────────────────────────────────────────────

/// An embedding provider whose backend is always down.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::ModelUnavailable {
            provider: "test".to_string(),
            message: "connection refused".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        384
    }
}

/// An embedding provider that rejects texts containing a marker word and
/// otherwise behaves like [`HashingEmbedder`].
struct PartialEmbedder {
    inner: HashingEmbedder,
}

impl PartialEmbedder {
    fn new() -> Self {
        Self { inner: HashingEmbedder::new() }
    }
}

#[async_trait]
impl EmbeddingProvider for PartialEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains("corrupt") {
            return Err(RagError::EmbeddingError {
                provider: "test".to_string(),
                message: "undecodable input".to_string(),
            });
        }
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

/// A store that returns another owner's document regardless of the
/// requested owner.
struct LeakyStore;

#[async_trait]
impl DocumentStore for LeakyStore {
    async fn upsert(&self, _documents: &[Document]) -> Result<()> {
        Ok(())
    }

    async fn fetch_candidates(&self, _owner_id: &str) -> Result<Vec<Document>> {
        Ok(vec![Document {
            id: "doc_other".to_string(),
            owner_id: "someone_else".to_string(),
            filename: None,
            content: "leaked content".to_string(),
            embedding: Some(vec![1.0; 384]),
        }])
    }
}

// ── helpers ─────────────────────────────────────────────────────────────────

fn mem_doc(filename: &str, content: &str) -> MemoryDocument {
    MemoryDocument {
        filename: filename.to_string(),
        content: content.to_string(),
        kind: "document".to_string(),
    }
}

fn hashing_engine() -> RetrievalEngine {
    RetrievalEngine::builder()
        .embedder(Arc::new(HashingEmbedder::new()))
        .store(Arc::new(InMemoryDocumentStore::new()))
        .build()
        .unwrap()
}

/// Embed `content` with the engine's provider and store it for `owner_id`.
async fn seed(store: &InMemoryDocumentStore, owner_id: &str, id: &str, content: &str) {
    let embedder = HashingEmbedder::new();
    let embedding = embedder.embed(content).await.unwrap();
    let document = Document {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        filename: Some(format!("{id}.txt")),
        content: content.to_string(),
        embedding: Some(embedding),
    };
    store.upsert(std::slice::from_ref(&document)).await.unwrap();
}

// ── in-memory mode ──────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_in_memory_input_yields_empty_outcome() {
    let engine = hashing_engine();
    let outcome = engine.search_in_memory("anything", Vec::new(), 5).await.unwrap();

    assert!(outcome.is_empty());
    assert!(!outcome.degraded);
    assert_eq!(outcome.skipped, 0);
}

#[tokio::test]
async fn ranking_orders_by_lexical_overlap() {
    let engine = hashing_engine();
    let documents = vec![
        mem_doc("a.txt", "apple fruit"),
        mem_doc("b.txt", "banana fruit"),
        mem_doc("c.txt", "car engine"),
    ];

    let outcome = engine.search_in_memory("fruit", documents, 2).await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    for result in &outcome.results {
        assert!(result.text.contains("fruit"));
        assert!(result.score > 0.7, "fruit document scored {}", result.score);
    }
    assert!(outcome.results[0].score >= outcome.results[1].score);
}

#[tokio::test]
async fn limit_covers_low_scoring_tail() {
    let engine = hashing_engine();
    let documents = vec![
        mem_doc("a.txt", "apple fruit"),
        mem_doc("b.txt", "banana fruit"),
        mem_doc("c.txt", "car engine"),
    ];

    let outcome = engine.search_in_memory("fruit", documents, 3).await.unwrap();

    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.results[2].text, "car engine");
    assert!(outcome.results[2].score.abs() < 1e-4);
    let ranks: Vec<usize> = outcome.results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![0, 1, 2]);
}

#[tokio::test]
async fn ties_preserve_document_order() {
    let engine = hashing_engine();
    let documents = vec![
        mem_doc("first.txt", "same words here"),
        mem_doc("second.txt", "same words here"),
    ];

    let outcome = engine.search_in_memory("same words", documents, 5).await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].score, outcome.results[1].score);
    assert_eq!(outcome.results[0].source, SourceRef::Memory { index: 0 });
    assert_eq!(outcome.results[1].source, SourceRef::Memory { index: 1 });
}

#[tokio::test]
async fn degraded_mode_returns_neutral_unranked_results() {
    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(FailingEmbedder))
        .store(Arc::new(InMemoryDocumentStore::new()))
        .build()
        .unwrap();
    let documents = vec![
        mem_doc("a.txt", "first document"),
        mem_doc("b.txt", "second document"),
        mem_doc("c.txt", "third document"),
    ];

    let outcome = engine.search_in_memory("query", documents.clone(), 5).await.unwrap();

    assert!(outcome.degraded);
    assert_eq!(outcome.results.len(), 3);
    for (index, result) in outcome.results.iter().enumerate() {
        assert_eq!(result.score, 0.0);
        assert_eq!(result.rank, index);
        assert_eq!(result.source, SourceRef::Memory { index });
    }

    // The limit still applies in degraded mode.
    let bounded = engine.search_in_memory("query", documents, 2).await.unwrap();
    assert!(bounded.degraded);
    assert_eq!(bounded.results.len(), 2);
}

#[tokio::test]
async fn unembeddable_documents_are_skipped_and_counted() {
    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(PartialEmbedder::new()))
        .store(Arc::new(InMemoryDocumentStore::new()))
        .build()
        .unwrap();
    let documents = vec![
        mem_doc("a.txt", "apple fruit"),
        mem_doc("bad.bin", "corrupt blob"),
        mem_doc("b.txt", "banana fruit"),
    ];

    let outcome = engine.search_in_memory("fruit", documents, 5).await.unwrap();

    assert!(!outcome.degraded);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.results.len(), 2);
    assert!(outcome.results.iter().all(|r| r.source != SourceRef::Memory { index: 1 }));
}

// ── persistent mode ─────────────────────────────────────────────────────────

#[tokio::test]
async fn owner_isolation_restricts_candidates() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed(&store, "owner_a", "doc_a", "apple fruit").await;
    seed(&store, "owner_b", "doc_b", "banana fruit").await;

    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(HashingEmbedder::new()))
        .store(store)
        .build()
        .unwrap();

    let outcome = engine.search_persistent("fruit", "owner_a", 10).await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].source, SourceRef::Stored { id: "doc_a".to_string() });
}

#[tokio::test]
async fn foreign_candidates_fail_loudly() {
    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(HashingEmbedder::new()))
        .store(Arc::new(LeakyStore))
        .build()
        .unwrap();

    let error = engine.search_persistent("query", "owner_a", 5).await.unwrap_err();

    match error {
        RagError::IsolationViolation { document_id, requested_owner, actual_owner } => {
            assert_eq!(document_id, "doc_other");
            assert_eq!(requested_owner, "owner_a");
            assert_eq!(actual_owner, "someone_else");
        }
        other => panic!("expected IsolationViolation, got {other:?}"),
    }
}

#[tokio::test]
async fn unembedded_documents_never_match() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed(&store, "owner_a", "doc_ready", "rust compiles fast native binaries").await;
    store
        .upsert(&[Document {
            id: "doc_pending".to_string(),
            owner_id: "owner_a".to_string(),
            filename: None,
            content: "rust binaries build notes".to_string(),
            embedding: None,
        }])
        .await
        .unwrap();

    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(HashingEmbedder::new()))
        .store(store)
        .build()
        .unwrap();

    let outcome = engine.search_persistent("rust binaries", "owner_a", 10).await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].source, SourceRef::Stored { id: "doc_ready".to_string() });
    assert!(outcome.results[0].score > 0.5);
    assert_eq!(outcome.skipped, 0);
}

#[tokio::test]
async fn empty_store_yields_empty_outcome() {
    let engine = hashing_engine();
    let outcome = engine.search_persistent("anything", "owner_a", 5).await.unwrap();

    assert!(outcome.is_empty());
    assert!(!outcome.degraded);
}

#[tokio::test]
async fn degraded_persistent_search_returns_store_order() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed(&store, "owner_a", "doc_1", "first content").await;
    store
        .upsert(&[Document {
            id: "doc_2".to_string(),
            owner_id: "owner_a".to_string(),
            filename: None,
            content: "second content, not yet embedded".to_string(),
            embedding: None,
        }])
        .await
        .unwrap();

    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(FailingEmbedder))
        .store(store)
        .build()
        .unwrap();

    let outcome = engine.search_persistent("query", "owner_a", 10).await.unwrap();

    assert!(outcome.degraded);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].source, SourceRef::Stored { id: "doc_1".to_string() });
    assert_eq!(outcome.results[1].source, SourceRef::Stored { id: "doc_2".to_string() });
    assert!(outcome.results.iter().all(|r| r.score == 0.0));
}

// ── request dispatch ────────────────────────────────────────────────────────

#[tokio::test]
async fn search_dispatches_on_request_variant() {
    let store = Arc::new(InMemoryDocumentStore::new());
    seed(&store, "owner_a", "doc_stored", "rust compiles fast native binaries").await;

    let engine = RetrievalEngine::builder()
        .embedder(Arc::new(HashingEmbedder::new()))
        .store(store)
        .build()
        .unwrap();

    let persistent = engine
        .search("rust binaries", SearchRequest::Persistent { owner_id: "owner_a".to_string() }, 5)
        .await
        .unwrap();
    assert_eq!(persistent.results.len(), 1);
    assert!(matches!(persistent.results[0].source, SourceRef::Stored { .. }));

    let in_memory = engine
        .search(
            "rust binaries",
            SearchRequest::InMemory {
                documents: vec![mem_doc("notes.txt", "gardening tips spring tomatoes")],
            },
            5,
        )
        .await
        .unwrap();
    assert_eq!(in_memory.results.len(), 1);
    assert!(matches!(in_memory.results[0].source, SourceRef::Memory { index: 0 }));
}

#[tokio::test]
async fn wrapper_methods_match_search() {
    let engine = hashing_engine();
    let documents = vec![mem_doc("a.txt", "apple fruit"), mem_doc("c.txt", "car engine")];

    let via_wrapper = engine.search_in_memory("fruit", documents.clone(), 5).await.unwrap();
    let via_request =
        engine.search("fruit", SearchRequest::InMemory { documents }, 5).await.unwrap();

    let wrapper_refs: Vec<String> =
        via_wrapper.results.iter().map(|r| r.source.reference()).collect();
    let request_refs: Vec<String> =
        via_request.results.iter().map(|r| r.source.reference()).collect();
    assert_eq!(wrapper_refs, request_refs);
}

// ── configuration ───────────────────────────────────────────────────────────

#[tokio::test]
async fn score_threshold_filters_results() {
    let config = RagConfig::builder().similarity_threshold(0.5).build().unwrap();
    let engine = RetrievalEngine::builder()
        .config(config)
        .embedder(Arc::new(HashingEmbedder::new()))
        .store(Arc::new(InMemoryDocumentStore::new()))
        .build()
        .unwrap();
    let documents = vec![mem_doc("a.txt", "apple fruit"), mem_doc("c.txt", "car engine")];

    let outcome = engine.search_in_memory("fruit", documents, 5).await.unwrap();

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].source, SourceRef::Memory { index: 0 });
}

#[test]
fn builder_requires_embedder_and_store() {
    let missing_embedder =
        RetrievalEngine::builder().store(Arc::new(InMemoryDocumentStore::new())).build();
    assert!(matches!(missing_embedder, Err(RagError::ConfigError(_))));

    let missing_store =
        RetrievalEngine::builder().embedder(Arc::new(HashingEmbedder::new())).build();
    assert!(matches!(missing_store, Err(RagError::ConfigError(_))));
}

// ── end to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn question_about_python_finds_the_cv() {
    let engine = hashing_engine();
    let cv = MemoryDocument {
        filename: "cv.pdf".to_string(),
        content: "5 years Python experience at IBM".to_string(),
        kind: "applicant".to_string(),
    };
    let question = "Does the candidate know Python?";

    let outcome = engine.search_in_memory(question, vec![cv.clone()], 3).await.unwrap();

    assert!(!outcome.degraded);
    assert_eq!(outcome.results.len(), 1);
    let top = &outcome.results[0];
    assert_eq!(top.source.reference(), "memory_0");
    assert_eq!(top.rank, 0);
    assert_eq!(top.label.as_deref(), Some("cv.pdf"));
    assert!(top.score > 0.15, "shared-term score was {}", top.score);

    // With an unrelated document added, the CV still wins by a clear margin.
    let documents = vec![cv, mem_doc("notes.txt", "gardening tips spring tomatoes")];
    let outcome = engine.search_in_memory(question, documents, 3).await.unwrap();

    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].source.reference(), "memory_0");
    assert!(outcome.results[0].score > outcome.results[1].score + 0.1);
}

// ── ordering properties ─────────────────────────────────────────────────────

fn arb_documents() -> impl Strategy<Value = Vec<MemoryDocument>> {
    proptest::collection::vec(
        (proptest::collection::vec("[a-d][a-z]{1,5}", 1..6), "[a-z]{1,8}").prop_map(
            |(words, name)| MemoryDocument {
                filename: format!("{name}.txt"),
                content: words.join(" "),
                kind: "document".to_string(),
            },
        ),
        1..10,
    )
}

/// *For any* document set, query, and limit, search SHALL return at most
/// `limit` results in non-increasing score order with ranks assigned
/// sequentially from zero.
mod prop_ranking {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn results_are_bounded_sorted_and_ranked(
            documents in arb_documents(),
            query_words in proptest::collection::vec("[a-d][a-z]{1,5}", 0..4),
            limit in 1usize..12,
        ) {
            let rt = Runtime::new().unwrap();
            let engine = hashing_engine();
            let query = query_words.join(" ");
            let candidate_count = documents.len();

            let outcome = rt.block_on(engine.search_in_memory(&query, documents, limit)).unwrap();

            prop_assert!(!outcome.degraded);
            prop_assert_eq!(outcome.skipped, 0);
            prop_assert!(outcome.results.len() <= limit.min(candidate_count));

            for window in outcome.results.windows(2) {
                prop_assert!(window[0].score >= window[1].score);
            }
            for (index, result) in outcome.results.iter().enumerate() {
                prop_assert_eq!(result.rank, index);
            }
        }
    }
}
