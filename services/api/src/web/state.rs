//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use studyai_core::ports::{
    BlobStore, CatalogService, PlanGenerationService, QuestionGenerationService,
};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub blob_store: Arc<dyn BlobStore>,
    pub catalog: Arc<dyn CatalogService>,
    pub question_adapter: Arc<dyn QuestionGenerationService>,
    pub plan_adapter: Arc<dyn PlanGenerationService>,
}
