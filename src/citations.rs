use crate::models::Citation;
use std::collections::HashSet;

/// Collects citations keyed by URI, keeping first-seen order and title.
#[derive(Debug, Default)]
pub struct CitationCollector {
    seen: HashSet<String>,
    citations: Vec<Citation>,
}

impl CitationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the URI was already collected.
    pub fn push(&mut self, citation: Citation) -> bool {
        if self.seen.contains(&citation.uri) {
            return false;
        }
        self.seen.insert(citation.uri.clone());
        self.citations.push(citation);
        true
    }

    pub fn extend<I: IntoIterator<Item = Citation>>(&mut self, citations: I) {
        for citation in citations {
            self.push(citation);
        }
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn into_vec(self) -> Vec<Citation> {
        self.citations
    }
}

pub fn dedup_citations<I: IntoIterator<Item = Citation>>(citations: I) -> Vec<Citation> {
    let mut collector = CitationCollector::new();
    collector.extend(citations);
    collector.into_vec()
}
