//! The renderer seam.
//!
//! The core never draws anything. It distills feature collections into
//! prepared layer specs (geometry plus style data) and hands them to a
//! [`LayerRenderer`], receiving an opaque [`LayerId`] per renderable layer.
//! Visibility toggles go back through the same trait. A real front end
//! implements this against its map widget; tests and the CLI use
//! [`MemoryRenderer`].

use std::collections::HashMap;

use crate::constraint::Constraint;
use crate::geodata::LonLat;
use crate::style::Color;

/// Opaque identifier of a renderable layer, issued by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// One sector polygon feature, grouped under a position.
#[derive(Debug, Clone)]
pub struct SectorFeature {
    /// Polygons of this feature, each a list of rings.
    pub polygons: Vec<Vec<Vec<LonLat>>>,
    /// Lower altitude bound, raw.
    pub low: Option<String>,
    /// Upper altitude bound, raw.
    pub high: Option<String>,
    /// Hover notes.
    pub notes: Option<String>,
}

/// A renderable sector layer: every polygon of one position, one fill.
#[derive(Debug, Clone)]
pub struct SectorLayerSpec {
    /// Position this layer covers.
    pub position: String,
    /// Fill color taken from the group's features.
    pub fill: Color,
    pub features: Vec<SectorFeature>,
}

/// Prepared marker data for one procedure point.
///
/// Label/glyph construction from this data is the renderer's job.
#[derive(Debug, Clone)]
pub struct MarkerSpec {
    pub at: LonLat,
    /// Fix identifier shown as the label headline.
    pub label: Option<String>,
    /// Altitude constraints, below-first, at most two.
    pub altitudes: Vec<Constraint>,
    /// Speed constraints, below-first, at most two.
    pub speeds: Vec<Constraint>,
    pub color: Color,
    /// Glyph selection hint.
    pub icon: Option<String>,
}

/// A renderable STAR/SID layer: all markers and lines of one procedure file,
/// toggled as a single unit.
#[derive(Debug, Clone, Default)]
pub struct ProcedureLayerSpec {
    pub markers: Vec<MarkerSpec>,
    pub lines: Vec<Vec<LonLat>>,
}

/// A renderable videomap layer. Point geometry is never part of it.
#[derive(Debug, Clone, Default)]
pub struct VideomapLayerSpec {
    pub lines: Vec<Vec<LonLat>>,
    pub polygons: Vec<Vec<Vec<LonLat>>>,
}

/// External rendering collaborator.
///
/// Implementations own the actual map layers. The contract the core relies
/// on:
///
/// - `create_*` returns a fresh id for a hidden layer;
/// - `set_visible` is level-triggered (idempotent per target state);
/// - `release` detaches a layer for good; its id is never reused by the core.
pub trait LayerRenderer {
    fn create_sector_layer(&mut self, spec: SectorLayerSpec) -> LayerId;
    fn create_procedure_layer(&mut self, spec: ProcedureLayerSpec) -> LayerId;
    fn create_videomap_layer(&mut self, spec: VideomapLayerSpec) -> LayerId;

    /// Detach and drop a layer (on item replacement or full reload).
    fn release(&mut self, id: LayerId);

    fn set_visible(&mut self, id: LayerId, visible: bool);
    fn is_visible(&self, id: LayerId) -> bool;
}

/// What a [`MemoryRenderer`] layer was created from.
#[derive(Debug, Clone)]
pub enum LayerKind {
    Sector(SectorLayerSpec),
    Procedure(ProcedureLayerSpec),
    Videomap(VideomapLayerSpec),
}

#[derive(Debug, Clone)]
struct LayerRecord {
    kind: LayerKind,
    visible: bool,
}

/// In-memory renderer for tests, the CLI, and headless embedding.
///
/// Tracks layer specs and visibility, and counts visibility transitions so
/// idempotence is observable.
#[derive(Debug, Default)]
pub struct MemoryRenderer {
    next_id: u64,
    layers: HashMap<LayerId, LayerRecord>,
    /// Number of actual visibility transitions performed.
    transitions: u64,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, kind: LayerKind) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(
            id,
            LayerRecord {
                kind,
                visible: false,
            },
        );
        id
    }

    /// Spec the given layer was created from, if it is still attached.
    pub fn layer(&self, id: LayerId) -> Option<&LayerKind> {
        self.layers.get(&id).map(|record| &record.kind)
    }

    /// Number of layers currently attached.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total visibility transitions performed so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }
}

impl LayerRenderer for MemoryRenderer {
    fn create_sector_layer(&mut self, spec: SectorLayerSpec) -> LayerId {
        self.create(LayerKind::Sector(spec))
    }

    fn create_procedure_layer(&mut self, spec: ProcedureLayerSpec) -> LayerId {
        self.create(LayerKind::Procedure(spec))
    }

    fn create_videomap_layer(&mut self, spec: VideomapLayerSpec) -> LayerId {
        self.create(LayerKind::Videomap(spec))
    }

    fn release(&mut self, id: LayerId) {
        self.layers.remove(&id);
    }

    fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(record) = self.layers.get_mut(&id) {
            if record.visible != visible {
                record.visible = visible;
                self.transitions += 1;
            }
        }
    }

    fn is_visible(&self, id: LayerId) -> bool {
        self.layers
            .get(&id)
            .map(|record| record.visible)
            .unwrap_or(false)
    }
}
