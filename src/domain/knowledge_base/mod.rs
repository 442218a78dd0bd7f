//! Read-only question/answer records with best-effort fuzzy matching
//!
//! Lookup tries exact match, then substring containment, then keyword
//! overlap, in that priority order; the first strategy producing any match
//! wins. No match is a reportable condition, not a failure.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// Words too common to count toward keyword overlap
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "you", "your", "what", "when", "where", "how", "who", "why", "can",
    "does", "are", "with", "that", "this", "have", "has", "will", "about",
];

/// One knowledge-base record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbRecord {
    pub id: String,
    pub question: String,
    pub text: String,
}

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Exact,
    Substring,
    Keyword,
}

/// A selected record and how it was found
#[derive(Debug, Clone)]
pub struct KbMatch {
    pub record: KbRecord,
    pub strategy: MatchStrategy,
}

/// Static, read-only knowledge base
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: Vec<KbRecord>,
}

impl KnowledgeBase {
    pub fn new(records: Vec<KbRecord>) -> Self {
        Self { records }
    }

    /// Parse records from their JSON representation
    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        let records: Vec<KbRecord> = serde_json::from_str(raw)
            .map_err(|e| DomainError::configuration(format!("invalid knowledge base: {}", e)))?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the single best record for a query, or `None` when nothing
    /// matches ("no answer found" is the caller's reportable condition).
    pub fn search(&self, query: &str) -> Option<KbMatch> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let normalized = query.to_lowercase();

        if let Some(record) = self.exact_match(&normalized) {
            return Some(KbMatch {
                record: record.clone(),
                strategy: MatchStrategy::Exact,
            });
        }

        if let Some(record) = self.substring_match(&normalized) {
            return Some(KbMatch {
                record: record.clone(),
                strategy: MatchStrategy::Substring,
            });
        }

        self.keyword_match(&normalized).map(|record| KbMatch {
            record: record.clone(),
            strategy: MatchStrategy::Keyword,
        })
    }

    fn exact_match(&self, normalized: &str) -> Option<&KbRecord> {
        self.records
            .iter()
            .find(|r| r.question.to_lowercase() == normalized)
    }

    fn substring_match(&self, normalized: &str) -> Option<&KbRecord> {
        self.records.iter().find(|r| {
            let question = r.question.to_lowercase();
            question.contains(normalized) || normalized.contains(&question)
        })
    }

    fn keyword_match(&self, normalized: &str) -> Option<&KbRecord> {
        let query_words = keywords(normalized);
        if query_words.is_empty() {
            return None;
        }

        self.records
            .iter()
            .map(|record| {
                let record_words = keywords(&record.question.to_lowercase());
                let overlap = query_words
                    .iter()
                    .filter(|w| record_words.contains(w))
                    .count();
                (record, overlap)
            })
            .filter(|(_, overlap)| *overlap > 0)
            .max_by_key(|(_, overlap)| *overlap)
            .map(|(record, _)| record)
    }
}

/// Lowercased content words of at least three characters
fn keywords(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() >= 3 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}
