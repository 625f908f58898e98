//! ATCLayer - shareable ATC sector and procedure map layers.
//!
//! This library ingests geospatial feature collections (airspace sectors,
//! STAR/SID procedures, video maps), organizes them into a hierarchical,
//! toggleable layer registry, and captures the current selection of visible
//! layers as a compact URL-safe token that round-trips back into the same
//! selection.
//!
//! Rendering is an external concern: the core builds prepared layer specs
//! and toggles opaque handles through the [`render::LayerRenderer`] seam.
//!
//! # Example
//!
//! ```ignore
//! use atclayer::app::{App, AppConfig};
//! use atclayer::loader::FsSource;
//! use atclayer::render::MemoryRenderer;
//!
//! let source = FsSource::new("data");
//! let (mut app, report) =
//!     App::start(AppConfig::default(), &source, MemoryRenderer::new()).await?;
//!
//! app.apply_token("dHJhY29uOjpqZms7MTpKRktfNHMtTg");
//! let token = app.current_token();
//! ```

pub mod app;
pub mod classify;
pub mod codec;
pub mod constraint;
pub mod geodata;
pub mod loader;
pub mod reconcile;
pub mod registry;
pub mod render;
pub mod snapshot;
pub mod style;

pub use app::{App, AppConfig, AppError};
pub use classify::{classify, Category};
pub use codec::{decode, encode};
pub use loader::{CollectionSource, FileIndex, FsSource, LoadReport};
pub use reconcile::{apply_token, current_token};
pub use registry::{EmptyPositionPolicy, Handle, Registry};
pub use render::{LayerId, LayerRenderer, MemoryRenderer};
pub use snapshot::ActiveState;
