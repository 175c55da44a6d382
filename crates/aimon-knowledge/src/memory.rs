use crate::{KnowledgeStore, Snippet};
use std::collections::HashMap;

/// Keyword groups used for scoring. A document earns one increment per
/// group that appears in both the query and the document text.
const KEYWORD_GROUPS: &[&[&str]] = &[
    &["cpu", "processor"],
    &["memory", "ram", "oom", "swap"],
    &["load", "queue", "runqueue"],
    &["i/o", "iowait", "disk", "iostat"],
    &["network", "traffic", "bandwidth", "packet"],
];

const GROUP_SCORE: f32 = 0.8;

struct Document {
    content: String,
    metadata: HashMap<String, String>,
}

/// In-memory keyword-scored knowledge store.
///
/// Stands in for a real similarity-search engine: good enough to rank the
/// seeded operational documents against issue labels, and cheap enough to
/// query on every analysis cycle.
#[derive(Default)]
pub struct MemoryKnowledgeStore {
    documents: Vec<Document>,
}

impl MemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the default operational playbooks.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for (content, category) in default_documents() {
            let mut metadata = HashMap::new();
            metadata.insert("category".to_string(), category.to_string());
            store.add(content.to_string(), metadata);
        }
        store
    }

    pub fn add(&mut self, content: String, metadata: HashMap<String, String>) {
        self.documents.push(Document { content, metadata });
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn score(query: &str, content: &str) -> f32 {
        let query = query.to_lowercase();
        let content = content.to_lowercase();
        let mut score = 0.0;
        for group in KEYWORD_GROUPS {
            let in_query = group.iter().any(|kw| query.contains(kw));
            let in_doc = group.iter().any(|kw| content.contains(kw));
            if in_query && in_doc {
                score += GROUP_SCORE;
            }
        }
        score
    }
}

impl KnowledgeStore for MemoryKnowledgeStore {
    fn search(&self, query: &str, k: usize) -> Vec<Snippet> {
        let mut hits: Vec<Snippet> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let score = Self::score(query, &doc.content);
                if score > 0.0 {
                    Some(Snippet {
                        content: doc.content.clone(),
                        score,
                        metadata: doc.metadata.clone(),
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        tracing::debug!(query, hits = hits.len(), "Knowledge store search");
        hits
    }
}

fn default_documents() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "High CPU usage diagnosis: identify CPU-bound processes with top, \
             htop or `ps aux --sort=-%cpu`. Mitigate by renicing or restarting \
             non-critical hot processes, capping them with cpulimit or cgroups, \
             and longer term by optimizing the hot code path, adding cores or \
             spreading work behind a load balancer.",
            "cpu",
        ),
        (
            "High memory usage diagnosis: inspect overall usage with `free -h` \
             and per-process usage with `ps aux --sort=-%mem` or `pmap -d`. \
             Mitigate by restarting leaking processes, dropping the page cache \
             (`echo 3 > /proc/sys/vm/drop_caches`), and reviewing swap sizing. \
             Prevent recurrence with per-process memory limits and leak \
             monitoring.",
            "memory",
        ),
        (
            "High system load diagnosis: read 1/5/15-minute averages with \
             uptime; load above the core count means queued work. Use iostat \
             and vmstat to split CPU pressure from I/O wait, then either \
             optimize the CPU-heavy tasks or the disk access pattern behind \
             the wait.",
            "load",
        ),
        (
            "Network traffic anomaly diagnosis: watch live rates with iftop, \
             attribute them per process with nethogs, and check connection \
             state with `ss -tuln`. Investigate unexpected flows for abuse, \
             tune TCP parameters for sustained congestion, and raise bandwidth \
             only after ruling out misbehaving clients.",
            "network",
        ),
    ]
}
