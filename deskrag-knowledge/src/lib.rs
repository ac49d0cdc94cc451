//! In-memory knowledge base: built-in keyword categories plus appended entries,
//! with an append-only interaction log. State lives for the process lifetime only.

mod base;
mod matcher;

pub use base::{InteractionRecord, KnowledgeBase, KnowledgeEntry, KnowledgeStats};
pub use matcher::{
    match_builtin, CategoryPattern, LookupResult, CATEGORY_TABLE, HELP_PATTERN, NO_MATCH_ANSWER,
};
