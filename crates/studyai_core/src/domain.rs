//! crates/studyai_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How hard a generated paper is expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// A named collection of study material and the quiz papers generated from it.
///
/// Modules are created on the first successful ingestion for their id and are
/// only ever mutated by appending papers.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Overall completion, 0 to 100.
    pub progress: u8,
    pub color_tag: String,
    pub papers: Vec<Paper>,
    pub created_at: DateTime<Utc>,
}

/// One generated quiz belonging to a module. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Paper {
    pub id: Uuid,
    pub name: String,
    pub questions: Vec<Question>,
    pub completed: u32,
    pub difficulty: Difficulty,
    pub time_limit_minutes: u32,
    pub created_at: DateTime<Utc>,
}

/// A single multiple-choice item within a paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// 1-based position within the paper.
    pub ordinal: u32,
    pub text: String,
    pub options: Vec<String>,
    /// Must index into `options`; validated at parse time, never clamped.
    pub correct_option_index: usize,
    pub explanation: String,
}

/// An uploaded file on its way through the pipeline. Transient: persisted to
/// the blob store and attached to the gateway call, but not kept in the catalog.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

// Carries the caller-supplied identity for a module that may not exist yet.
// The catalog consults it only when the id is unseen.
#[derive(Debug, Clone)]
pub struct ModuleSeed {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}
