//! Active-state snapshots and the reader/writer over the renderer seam.
//!
//! A snapshot is a sparse, point-in-time record of which items (and, for
//! sectors, which positions) are visible: absent means "not active" at every
//! level, and empty containers are never stored. Snapshots reference names
//! only; handles stay in the registry.
//!
//! The writer is authoritative and idempotent: applying a snapshot drives
//! every handle in the registry to the snapshot's target state, touching the
//! renderer only where the state actually changes.

use std::collections::{BTreeMap, BTreeSet};

use crate::classify::{Category, ALL_CATEGORIES};
use crate::registry::{EmptyPositionPolicy, Handle, Registry};
use crate::render::LayerRenderer;

/// Active selection within one facility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilityState {
    /// Sector item name → explicitly selected positions.
    ///
    /// An explicitly empty set is meaningful: it defers to the owning
    /// domain's [`EmptyPositionPolicy`] at write time.
    pub sectors: BTreeMap<String, BTreeSet<String>>,
    pub stars: BTreeSet<String>,
    pub sids: BTreeSet<String>,
    pub videomaps: BTreeSet<String>,
}

impl FacilityState {
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
            && self.stars.is_empty()
            && self.sids.is_empty()
            && self.videomaps.is_empty()
    }

    /// The name set of a single-handle category; `None` for sectors.
    pub fn named(&self, category: Category) -> Option<&BTreeSet<String>> {
        match category {
            Category::Sectors => None,
            Category::Stars => Some(&self.stars),
            Category::Sids => Some(&self.sids),
            Category::Videomap => Some(&self.videomaps),
        }
    }

    pub(crate) fn named_mut(&mut self, category: Category) -> Option<&mut BTreeSet<String>> {
        match category {
            Category::Sectors => None,
            Category::Stars => Some(&mut self.stars),
            Category::Sids => Some(&mut self.sids),
            Category::Videomap => Some(&mut self.videomaps),
        }
    }
}

/// Active selection within one domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainState {
    pub facilities: BTreeMap<String, FacilityState>,
}

impl DomainState {
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

/// A point-in-time record of every visible layer, scoped per
/// domain → facility → category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveState {
    pub domains: BTreeMap<String, DomainState>,
}

impl ActiveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn facility(&self, domain: &str, facility: &str) -> Option<&FacilityState> {
        self.domains.get(domain)?.facilities.get(facility)
    }

    /// Facility entry for mutation, created on demand.
    ///
    /// Callers are expected to leave it non-empty or prune it; the encoder
    /// and comparisons rely on sparseness.
    pub fn facility_mut(&mut self, domain: &str, facility: &str) -> &mut FacilityState {
        self.domains
            .entry(domain.to_string())
            .or_default()
            .facilities
            .entry(facility.to_string())
            .or_default()
    }

    /// Remove empty facility and domain entries, restoring sparseness.
    pub fn prune(&mut self) {
        for domain in self.domains.values_mut() {
            domain.facilities.retain(|_, facility| !facility.is_empty());
        }
        self.domains.retain(|_, domain| !domain.is_empty());
    }
}

/// Read the current snapshot from the registry.
///
/// For sector items the subset of visible positions is recorded; for other
/// categories the item name. Empty results are omitted at every level.
pub fn read_state(registry: &Registry, renderer: &dyn LayerRenderer) -> ActiveState {
    let mut state = ActiveState::new();

    for domain in registry.domains() {
        for facility in domain.facilities() {
            let mut facility_state = FacilityState::default();

            for category in ALL_CATEGORIES {
                for item in facility.items(category) {
                    match &item.handle {
                        Handle::BySector(positions) => {
                            let visible: BTreeSet<String> = positions
                                .iter()
                                .filter(|(_, id)| renderer.is_visible(**id))
                                .map(|(position, _)| position.clone())
                                .collect();
                            if !visible.is_empty() {
                                facility_state.sectors.insert(item.name.clone(), visible);
                            }
                        }
                        Handle::Single(id) => {
                            if renderer.is_visible(*id) {
                                if let Some(names) = facility_state.named_mut(category) {
                                    names.insert(item.name.clone());
                                }
                            }
                        }
                    }
                }
            }

            if !facility_state.is_empty() {
                state
                    .facility_mut(&domain.name, &facility.name)
                    .clone_from(&facility_state);
            }
        }
    }

    state
}

/// Drive the registry's visibility to match a desired snapshot.
///
/// Snapshot references that no longer resolve are ignored. Sector items
/// listed with an explicitly empty position set follow the owning domain's
/// policy. The write only touches handles whose state differs, so applying
/// the same snapshot twice performs no further renderer calls.
pub fn apply_state(registry: &Registry, state: &ActiveState, renderer: &mut dyn LayerRenderer) {
    for domain in registry.domains() {
        for facility in domain.facilities() {
            let selection = state.facility(&domain.name, &facility.name);

            for category in ALL_CATEGORIES {
                for item in facility.items(category) {
                    match &item.handle {
                        Handle::BySector(positions) => {
                            let selected = selection.and_then(|s| s.sectors.get(&item.name));
                            for (position, id) in positions {
                                let target = match selected {
                                    None => false,
                                    Some(set) if set.is_empty() => {
                                        domain.policy == EmptyPositionPolicy::ActivateAll
                                    }
                                    Some(set) => set.contains(position),
                                };
                                set_if_changed(renderer, *id, target);
                            }
                        }
                        Handle::Single(id) => {
                            let target = selection
                                .and_then(|s| s.named(category))
                                .map(|names| names.contains(&item.name))
                                .unwrap_or(false);
                            set_if_changed(renderer, *id, target);
                        }
                    }
                }
            }
        }
    }
}

/// Hide every handle in the registry (the "reset layers" operation).
pub fn clear_all(registry: &Registry, renderer: &mut dyn LayerRenderer) {
    for domain in registry.domains() {
        for facility in domain.facilities() {
            for category in ALL_CATEGORIES {
                for item in facility.items(category) {
                    for id in item.handle.layer_ids() {
                        set_if_changed(renderer, id, false);
                    }
                }
            }
        }
    }
}

fn set_if_changed(renderer: &mut dyn LayerRenderer, id: crate::render::LayerId, target: bool) {
    if renderer.is_visible(id) != target {
        renderer.set_visible(id, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ingest, Registry};
    use crate::render::MemoryRenderer;
    use serde_json::json;

    fn sector_fixture() -> (Registry, MemoryRenderer) {
        let fc = serde_json::from_value(json!({
            "name": "JFK_4s",
            "features": [
                {
                    "properties": {"Position": "N"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]]}
                },
                {
                    "properties": {"Position": "S"},
                    "geometry": {"type": "Polygon", "coordinates": [[[2.0, 0.0], [3.0, 0.0], [2.0, 1.0]]]}
                }
            ]
        }))
        .unwrap();
        let star = serde_json::from_value(json!({
            "name": "parch",
            "features": [{
                "properties": {"id": "CCC"},
                "geometry": {"type": "Point", "coordinates": [-72.5, 40.2]}
            }]
        }))
        .unwrap();

        let mut registry = Registry::new();
        let mut renderer = MemoryRenderer::new();
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Sectors,
            "JFK_4s",
            &fc,
        );
        ingest(
            &mut registry,
            &mut renderer,
            "tracon",
            "jfk",
            Category::Stars,
            "parch",
            &star,
        );
        (registry, renderer)
    }

    fn select_position(state: &mut ActiveState, item: &str, positions: &[&str]) {
        state.facility_mut("tracon", "jfk").sectors.insert(
            item.to_string(),
            positions.iter().map(|p| p.to_string()).collect(),
        );
    }

    #[test]
    fn test_read_empty_registry_is_sparse() {
        let (registry, renderer) = sector_fixture();
        let state = read_state(&registry, &renderer);
        assert!(state.is_empty());
    }

    #[test]
    fn test_apply_then_read_roundtrip() {
        let (registry, mut renderer) = sector_fixture();

        let mut desired = ActiveState::new();
        select_position(&mut desired, "JFK_4s", &["N"]);
        desired
            .facility_mut("tracon", "jfk")
            .stars
            .insert("parch".to_string());

        apply_state(&registry, &desired, &mut renderer);
        let observed = read_state(&registry, &renderer);
        assert_eq!(observed, desired);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (registry, mut renderer) = sector_fixture();

        let mut desired = ActiveState::new();
        select_position(&mut desired, "JFK_4s", &["N", "S"]);

        apply_state(&registry, &desired, &mut renderer);
        let transitions = renderer.transitions();
        apply_state(&registry, &desired, &mut renderer);
        assert_eq!(renderer.transitions(), transitions);
        assert_eq!(read_state(&registry, &renderer), desired);
    }

    #[test]
    fn test_apply_is_authoritative() {
        let (registry, mut renderer) = sector_fixture();

        let mut first = ActiveState::new();
        select_position(&mut first, "JFK_4s", &["N", "S"]);
        apply_state(&registry, &first, &mut renderer);

        // A narrower snapshot hides what it no longer lists.
        let mut second = ActiveState::new();
        select_position(&mut second, "JFK_4s", &["S"]);
        apply_state(&registry, &second, &mut renderer);
        assert_eq!(read_state(&registry, &renderer), second);
    }

    #[test]
    fn test_empty_positions_activate_all_policy() {
        let (registry, mut renderer) = sector_fixture();

        let mut desired = ActiveState::new();
        select_position(&mut desired, "JFK_4s", &[]);
        apply_state(&registry, &desired, &mut renderer);

        let observed = read_state(&registry, &renderer);
        let positions = &observed.facility("tracon", "jfk").unwrap().sectors["JFK_4s"];
        assert_eq!(
            positions.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["N", "S"]
        );
    }

    #[test]
    fn test_empty_positions_deactivate_policy() {
        let (mut registry, mut renderer) = sector_fixture();
        registry.set_policy("tracon", EmptyPositionPolicy::Deactivate);

        // Start from everything on.
        let mut all_on = ActiveState::new();
        select_position(&mut all_on, "JFK_4s", &["N", "S"]);
        apply_state(&registry, &all_on, &mut renderer);

        let mut desired = ActiveState::new();
        select_position(&mut desired, "JFK_4s", &[]);
        apply_state(&registry, &desired, &mut renderer);
        assert!(read_state(&registry, &renderer).is_empty());
    }

    #[test]
    fn test_stale_references_ignored() {
        let (registry, mut renderer) = sector_fixture();

        let mut desired = ActiveState::new();
        select_position(&mut desired, "GONE", &["N"]);
        desired
            .facility_mut("tracon", "lga")
            .stars
            .insert("nope".to_string());

        apply_state(&registry, &desired, &mut renderer);
        assert!(read_state(&registry, &renderer).is_empty());
        assert_eq!(renderer.transitions(), 0);
    }

    #[test]
    fn test_clear_all() {
        let (registry, mut renderer) = sector_fixture();
        let mut desired = ActiveState::new();
        select_position(&mut desired, "JFK_4s", &["N"]);
        apply_state(&registry, &desired, &mut renderer);

        clear_all(&registry, &mut renderer);
        assert!(read_state(&registry, &renderer).is_empty());
    }

    #[test]
    fn test_prune_drops_empty_entries() {
        let mut state = ActiveState::new();
        state.facility_mut("tracon", "jfk");
        assert!(!state.domains.is_empty());
        state.prune();
        assert!(state.is_empty());
    }
}
