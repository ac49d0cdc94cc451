//! Process-lifetime knowledge state: appended entries and the interaction log.
//!
//! Both lists are append-only and guarded by their own mutex; that is the only
//! synchronization the services need. Nothing is persisted — a restart resets
//! everything, which is accepted behavior.

use crate::matcher::{keyword_hit, LookupResult, CATEGORY_TABLE, HELP_PATTERN};
use deskrag_shared::{clamp_confidence, now_rfc3339, text::normalize};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

/// One appended knowledge entry. Immutable once added.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub keywords: Vec<String>,
    pub answer: String,
    pub confidence: f64,
    pub category: String,
}

/// One interaction log record; appended once per lookup and on explicit
/// `log_interaction` calls.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionRecord {
    pub id: String,
    pub question: String,
    pub answer: Option<String>,
    pub source: String,
    pub matched_entry: Option<String>,
    pub confidence: f64,
    pub timestamp: String,
}

/// Aggregate counters and breakdowns reported by `/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeStats {
    pub total_entries: usize,
    pub total_interactions: usize,
    pub avg_entry_confidence: f64,
    pub avg_interaction_confidence: f64,
    pub entries_by_category: BTreeMap<String, usize>,
    pub interactions_by_source: BTreeMap<String, usize>,
}

/// In-memory knowledge base owned by the knowledge lookup service.
pub struct KnowledgeBase {
    entries: Mutex<Vec<KnowledgeEntry>>,
    interactions: Mutex<Vec<InteractionRecord>>,
}

impl KnowledgeBase {
    /// Creates the base with the single seeded sample entry.
    pub fn new() -> Self {
        let seed = KnowledgeEntry {
            id: "sample-1".to_string(),
            keywords: vec!["sample".to_string()],
            answer: "Sample answer for schema".to_string(),
            confidence: 0.8,
            category: "sample".to_string(),
        };
        Self {
            entries: Mutex::new(vec![seed]),
            interactions: Mutex::new(Vec::new()),
        }
    }

    /// Looks a question up against the built-in categories, then the appended
    /// entries, then the generic-help pattern. Always appends one interaction
    /// record, matched or not.
    pub fn lookup(&self, question: &str) -> LookupResult {
        let normalized = normalize(question);

        let mut result = None;
        for pattern in &CATEGORY_TABLE {
            if keyword_hit(&normalized, pattern.keywords) {
                result = Some(LookupResult::matched(pattern, None));
                break;
            }
        }
        if result.is_none() {
            let entries = self.entries.lock().expect("entries mutex poisoned");
            result = entries
                .iter()
                .find(|e| keyword_hit(&normalized, &e.keywords))
                .map(|e| LookupResult {
                    found: true,
                    answer: e.answer.clone(),
                    confidence: e.confidence,
                    source_type: "manual".to_string(),
                    category: Some(e.category.clone()),
                    entry_id: Some(e.id.clone()),
                });
        }
        if result.is_none() && keyword_hit(&normalized, HELP_PATTERN.keywords) {
            result = Some(LookupResult::matched(&HELP_PATTERN, None));
        }
        let result = result.unwrap_or_else(LookupResult::not_found);

        let record = InteractionRecord {
            id: Uuid::new_v4().to_string(),
            question: question.to_string(),
            answer: result.found.then(|| result.answer.clone()),
            source: result.source_type.clone(),
            matched_entry: result
                .entry_id
                .clone()
                .or_else(|| result.category.clone()),
            confidence: result.confidence,
            timestamp: now_rfc3339(),
        };
        self.interactions
            .lock()
            .expect("interactions mutex poisoned")
            .push(record);

        tracing::info!(
            found = result.found,
            confidence = result.confidence,
            "knowledge lookup"
        );
        result
    }

    /// Appends a new entry for the process lifetime and returns its id.
    /// Confidence is clamped into [0, 1].
    pub fn add_entry(
        &self,
        keywords: Vec<String>,
        answer: String,
        confidence: f64,
        category: String,
    ) -> String {
        let entry = KnowledgeEntry {
            id: Uuid::new_v4().to_string(),
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            answer,
            confidence: clamp_confidence(confidence),
            category,
        };
        let id = entry.id.clone();
        self.entries
            .lock()
            .expect("entries mutex poisoned")
            .push(entry);
        tracing::info!(entry_id = %id, "added knowledge entry");
        id
    }

    /// Appends an externally supplied interaction record (the orchestrator
    /// logs combined results here) and returns the record id.
    pub fn log_interaction(
        &self,
        question: &str,
        answer: Option<&str>,
        source: Option<&str>,
        confidence: f64,
    ) -> String {
        let record = InteractionRecord {
            id: Uuid::new_v4().to_string(),
            question: question.to_string(),
            answer: answer.map(str::to_string),
            source: source.unwrap_or("unknown").to_string(),
            matched_entry: None,
            confidence: clamp_confidence(confidence),
            timestamp: now_rfc3339(),
        };
        let id = record.id.clone();
        self.interactions
            .lock()
            .expect("interactions mutex poisoned")
            .push(record);
        id
    }

    /// Fetches one interaction record by id.
    pub fn interaction(&self, id: &str) -> Option<InteractionRecord> {
        self.interactions
            .lock()
            .expect("interactions mutex poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("entries mutex poisoned").len()
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions
            .lock()
            .expect("interactions mutex poisoned")
            .len()
    }

    pub fn stats(&self) -> KnowledgeStats {
        let entries = self.entries.lock().expect("entries mutex poisoned");
        let interactions = self.interactions.lock().expect("interactions mutex poisoned");
        let avg = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };

        let mut entries_by_category = BTreeMap::new();
        for entry in entries.iter() {
            *entries_by_category.entry(entry.category.clone()).or_insert(0) += 1;
        }
        let mut interactions_by_source = BTreeMap::new();
        for record in interactions.iter() {
            *interactions_by_source.entry(record.source.clone()).or_insert(0) += 1;
        }

        KnowledgeStats {
            total_entries: entries.len(),
            total_interactions: interactions.len(),
            avg_entry_confidence: avg(entries.iter().map(|e| e.confidence).sum(), entries.len()),
            avg_interaction_confidence: avg(
                interactions.iter().map(|r| r.confidence).sum(),
                interactions.len(),
            ),
            entries_by_category,
            interactions_by_source,
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}
