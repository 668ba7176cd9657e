pub mod context;
pub mod retriever;
pub mod scorer;

pub use context::format_context;
pub use retriever::{Retriever, ScoredChunk};
pub use scorer::{tokenize, KeywordOverlapScorer, Scorer};
