//! Application lifecycle.
//!
//! [`App`] is the owned, explicitly constructed replacement for ambient
//! globals: it holds the registry and the renderer, is built once at
//! startup from a file index, and exposes the toggle/token entry points UI
//! collaborators call. All registry mutation goes through here.

mod config;

pub use config::{AppConfig, DEFAULT_INDEX_PATH, ENROUTE_DOMAIN, TERMINAL_DOMAIN};

use std::fmt;

use crate::classify::Category;
use crate::loader::{load_index, CollectionSource, FileIndex, LoadError, LoadReport};
use crate::reconcile;
use crate::registry::{Handle, Registry};
use crate::render::LayerRenderer;
use crate::snapshot::{self, ActiveState};

/// Errors that can occur during application startup.
#[derive(Debug)]
pub enum AppError {
    /// The file index could not be read or parsed.
    Index(LoadError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Index(e) => write!(f, "Failed to load file index: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Index(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<LoadError> for AppError {
    fn from(e: LoadError) -> Self {
        AppError::Index(e)
    }
}

/// The running application: registry plus renderer, built once at startup.
pub struct App<R: LayerRenderer> {
    registry: Registry,
    renderer: R,
}

impl<R: LayerRenderer> App<R> {
    /// Bootstrap: read the file index through the source, load every file
    /// concurrently, and return the queryable application plus the load
    /// report. Per-file failures are reported, never fatal; only a missing
    /// or malformed index aborts startup.
    pub async fn start(
        config: AppConfig,
        source: &dyn CollectionSource,
        mut renderer: R,
    ) -> Result<(Self, LoadReport), AppError> {
        let index_text =
            source
                .read(&config.index_path)
                .await
                .map_err(|message| LoadError::Source {
                    path: config.index_path.clone(),
                    message,
                })?;
        let index = FileIndex::from_json(&index_text).map_err(|source| LoadError::Parse {
            path: config.index_path.clone(),
            source,
        })?;

        let mut registry = Registry::new();
        for (domain, policy) in &config.policies {
            registry.set_policy(domain, *policy);
        }

        tracing::info!(files = index.file_count(), "loading file index");
        let report = load_index(&index, source, &mut registry, &mut renderer).await;

        Ok((Self { registry, renderer }, report))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Current snapshot of visible layers.
    pub fn active_state(&self) -> ActiveState {
        snapshot::read_state(&self.registry, &self.renderer)
    }

    /// Current share token, `None` when nothing is active.
    pub fn current_token(&self) -> Option<String> {
        reconcile::current_token(&self.registry, &self.renderer)
    }

    /// Apply a share token and return the canonical snapshot achieved.
    pub fn apply_token(&mut self, token: &str) -> ActiveState {
        reconcile::apply_token(token, &self.registry, &mut self.renderer)
    }

    /// Toggle a whole item. For sector items this drives every position.
    ///
    /// Returns `false` when the item does not exist.
    pub fn set_item_visible(
        &mut self,
        domain: &str,
        facility: &str,
        category: Category,
        item: &str,
        visible: bool,
    ) -> bool {
        let item = match self.registry.item(domain, facility, category, item) {
            Some(item) => item,
            None => return false,
        };
        match &item.handle {
            Handle::Single(id) => {
                let id = *id;
                if self.renderer.is_visible(id) != visible {
                    self.renderer.set_visible(id, visible);
                }
            }
            Handle::BySector(positions) => {
                let ids: Vec<_> = positions.values().copied().collect();
                for id in ids {
                    if self.renderer.is_visible(id) != visible {
                        self.renderer.set_visible(id, visible);
                    }
                }
            }
        }
        true
    }

    /// Toggle a single position of a sector item.
    ///
    /// Returns `false` when the item or position does not exist, or the
    /// item is not a sector item.
    pub fn set_position_visible(
        &mut self,
        domain: &str,
        facility: &str,
        item: &str,
        position: &str,
        visible: bool,
    ) -> bool {
        let item = match self
            .registry
            .item(domain, facility, Category::Sectors, item)
        {
            Some(item) => item,
            None => return false,
        };
        let id = match &item.handle {
            Handle::BySector(positions) => match positions.get(position) {
                Some(id) => *id,
                None => return false,
            },
            Handle::Single(_) => return false,
        };
        if self.renderer.is_visible(id) != visible {
            self.renderer.set_visible(id, visible);
        }
        true
    }

    /// Hide every layer (the "reset layers" control).
    pub fn reset_layers(&mut self) {
        snapshot::clear_all(&self.registry, &mut self.renderer);
    }
}
