use chat_core::RetrievalConfig;
use store::{ChatStore, Chunk, StoreResult};
use tracing::debug;
use uuid::Uuid;

use crate::scorer::{KeywordOverlapScorer, Scorer};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Ranks a document's stored chunks against a query.
pub struct Retriever {
    scorer: Box<dyn Scorer>,
    default_limit: usize,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("scorer", &"Scorer<...>")
            .field("default_limit", &self.default_limit)
            .finish()
    }
}

impl Retriever {
    pub fn new(config: &RetrievalConfig) -> Self {
        Self::with_scorer(config, Box::new(KeywordOverlapScorer))
    }

    pub fn with_scorer(config: &RetrievalConfig, scorer: Box<dyn Scorer>) -> Self {
        Self {
            scorer,
            default_limit: config.default_limit,
        }
    }

    /// Scores every chunk, drops the irrelevant ones and keeps the best `limit`.
    /// Equal scores are ordered by ascending ordinal.
    pub fn rank<'a>(&self, query: &str, chunks: &'a [Chunk], limit: usize) -> Vec<ScoredChunk<'a>> {
        let mut scored: Vec<ScoredChunk<'a>> = chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk,
                score: self.scorer.score(query, &chunk.content),
            })
            .filter(|scored| scored.score > 0.0)
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.chunk.ordinal.cmp(&b.chunk.ordinal))
        });
        scored.truncate(limit);
        scored
    }

    /// Loads the document's chunks and returns the contents of the best matches,
    /// at most `limit` of them (the configured default when `None`).
    pub async fn retrieve(
        &self,
        store: &dyn ChatStore,
        query: &str,
        document_id: Uuid,
        limit: Option<usize>,
    ) -> StoreResult<Vec<String>> {
        let limit = limit.unwrap_or(self.default_limit);
        let chunks = store.list_chunks(document_id).await?;
        if chunks.is_empty() {
            debug!(%document_id, "No chunks stored for document");
            return Ok(Vec::new());
        }

        let ranked = self.rank(query, &chunks, limit);
        debug!(
            %document_id,
            candidates = chunks.len(),
            matched = ranked.len(),
            top_score = ranked.first().map(|s| s.score).unwrap_or(0.0),
            "Ranked chunks"
        );

        Ok(ranked
            .into_iter()
            .map(|scored| scored.chunk.content.clone())
            .collect())
    }
}
