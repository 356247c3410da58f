//! crates/studyai_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like filesystems or APIs.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::{DocumentPayload, Module, ModuleSeed, Paper};

//=========================================================================================
// Error Types, One Per Failure Domain
//=========================================================================================

/// Failures from the blob store. Fatal for the request; never retried.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to write '{filename}' for module '{module_id}': {source}")]
    Write {
        module_id: String,
        filename: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list files for module '{module_id}': {source}")]
    List {
        module_id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures from the external model gateway, classified so callers can decide
/// what is worth retrying on their side. Nothing here retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway rejected the configured credential")]
    Unauthorized,
    #[error("gateway quota exhausted")]
    Quota,
    #[error("gateway network failure: {0}")]
    Network(String),
    #[error("gateway call did not complete within {0:?}")]
    Timeout(Duration),
    #[error("gateway failure: {0}")]
    Unknown(String),
}

/// The model reply could not be turned into a valid question batch.
/// Carries the raw reply so the caller can surface it for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("model reply did not match the question schema: {reason}")]
    Malformed { reason: String, raw_reply: String },
}

/// The top-level failure type for one ingestion run. Each pipeline step
/// contributes its own variant; the first failure short-circuits.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no documents were supplied")]
    NoDocuments,
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("module '{0}' not found")]
    NotFound(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persists uploaded documents under a per-module namespace.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes one document. The module's directory is created on demand and a
    /// filename collision overwrites the previous bytes (last write wins).
    async fn put(&self, module_id: &str, filename: &str, bytes: &[u8])
        -> Result<(), StorageError>;

    /// Lists the filenames stored for a module, sorted lexically. The listing
    /// is the manifest; there is no separate index.
    async fn list_files(&self, module_id: &str) -> Result<Vec<String>, StorageError>;
}

/// The opaque generation capability that turns documents plus an instruction
/// into free text. The reply is untrusted; the parser validates it.
#[async_trait]
pub trait QuestionGenerationService: Send + Sync {
    async fn generate_questions(
        &self,
        documents: &[DocumentPayload],
        instruction: &str,
    ) -> Result<String, GatewayError>;
}

/// Free-text study-plan generation for the small adjacent `/api/plan` feature.
#[async_trait]
pub trait PlanGenerationService: Send + Sync {
    async fn generate_plan(&self, goal: &str) -> Result<String, GatewayError>;
}

/// The in-memory registry of modules. All mutation is serialized inside the
/// implementation (single writer), so concurrent ingestions for one module id
/// cannot interleave appends or double-create the module record.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Snapshot of every module, in creation order.
    async fn list_modules(&self) -> Vec<Module>;

    async fn get_module(&self, module_id: &str) -> Option<Module>;

    /// Appends `paper` to the module named by `seed.id`, creating the module
    /// from the seed first when the id is unseen. A paper arriving with an
    /// empty name is titled by its position ("Practice Paper N") under the
    /// same lock that performs the append. Returns the updated module.
    async fn append_paper(&self, seed: ModuleSeed, paper: Paper) -> Module;
}
