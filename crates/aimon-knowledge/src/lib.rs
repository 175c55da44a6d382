//! Knowledge retrieval for solution synthesis.
//!
//! The analysis pipeline asks a [`KnowledgeStore`] for remediation snippets
//! matching an issue description. Retrieval is best-effort: an empty result
//! means "no snippets", never an error the caller has to handle.

pub mod memory;

use std::collections::HashMap;

/// One ranked retrieval hit.
#[derive(Debug, Clone)]
pub struct Snippet {
    pub content: String,
    pub score: f32,
    pub metadata: HashMap<String, String>,
}

/// Text-to-snippets lookup over an operational knowledge corpus.
///
/// Implementations return at most `k` hits ordered by descending score.
pub trait KnowledgeStore: Send + Sync {
    fn search(&self, query: &str, k: usize) -> Vec<Snippet>;
}
