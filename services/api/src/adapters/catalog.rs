//! services/api/src/adapters/catalog.rs
//!
//! This module contains the in-memory module catalog, the concrete
//! implementation of the `CatalogService` port from the `core` crate. The
//! whole registry sits behind one `tokio::sync::Mutex`; a single writer at a
//! time keeps concurrent ingestions for the same module id from
//! double-creating the module or interleaving paper appends.

use async_trait::async_trait;
use chrono::Utc;
use studyai_core::domain::{Module, ModuleSeed, Paper};
use studyai_core::ports::CatalogService;
use tokio::sync::Mutex;

/// Gradient accents the dashboard renders modules with, assigned round-robin
/// in creation order.
const COLOR_PALETTE: [&str; 4] = [
    "from-blue-500 to-cyan-500",
    "from-purple-500 to-pink-500",
    "from-emerald-500 to-teal-500",
    "from-orange-500 to-red-500",
];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An in-memory catalog adapter. Lives for the process lifetime; nothing is
/// persisted across restarts.
pub struct MemoryCatalogAdapter {
    modules: Mutex<Vec<Module>>,
}

impl MemoryCatalogAdapter {
    /// Creates a new, empty `MemoryCatalogAdapter`.
    pub fn new() -> Self {
        Self {
            modules: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MemoryCatalogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogService for MemoryCatalogAdapter {
    async fn list_modules(&self) -> Vec<Module> {
        self.modules.lock().await.clone()
    }

    async fn get_module(&self, module_id: &str) -> Option<Module> {
        self.modules
            .lock()
            .await
            .iter()
            .find(|m| m.id == module_id)
            .cloned()
    }

    /// Creates the module from `seed` when its id is unseen, then appends
    /// `paper`. Both happen under the same lock acquisition, so the append is
    /// atomic at the catalog level: the full paper lands or nothing does.
    async fn append_paper(&self, seed: ModuleSeed, mut paper: Paper) -> Module {
        let mut modules = self.modules.lock().await;

        let position = match modules.iter().position(|m| m.id == seed.id) {
            Some(position) => position,
            None => {
                let color_tag =
                    COLOR_PALETTE[modules.len() % COLOR_PALETTE.len()].to_string();
                modules.push(Module {
                    id: seed.id.clone(),
                    name: seed.name.unwrap_or_else(|| seed.id.clone()),
                    description: seed.description.unwrap_or_default(),
                    progress: 0,
                    color_tag,
                    papers: Vec::new(),
                    created_at: Utc::now(),
                });
                modules.len() - 1
            }
        };

        let module = &mut modules[position];
        if paper.name.is_empty() {
            paper.name = format!("Practice Paper {}", module.papers.len() + 1);
        }
        module.papers.push(paper);
        module.clone()
    }
}
