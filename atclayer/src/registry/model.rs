//! The layer registry data model.
//!
//! The registry is the long-lived hierarchy built from loaded feature
//! collections: `Domain → Facility → Category → Item → Handle`. It owns no
//! geometry — only names, structure, and the opaque layer ids the renderer
//! issued. Ordered maps keep traversal and encoding deterministic.
//!
//! Structural keys are append-only during a load pass: domains, facilities
//! and items are created on demand and removed only by a full reload.

use std::collections::BTreeMap;

use crate::classify::Category;
use crate::render::LayerId;

/// What an empty sector position list in a snapshot means, per domain.
///
/// The two domains of the original product disagreed on this; the rule is
/// therefore keyed by domain and configured at registry construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyPositionPolicy {
    /// An item listed without positions activates all of its positions.
    #[default]
    ActivateAll,
    /// An item listed without positions deactivates all of its positions.
    Deactivate,
}

/// Renderable handle(s) of one item.
///
/// Exactly one shape per category: procedure and videomap items toggle as a
/// single unit, sector items toggle per position. Call sites match
/// exhaustively — there is no runtime type probing.
#[derive(Debug, Clone)]
pub enum Handle {
    /// One layer covering the whole item.
    Single(LayerId),
    /// One layer per sector position.
    BySector(BTreeMap<String, LayerId>),
}

impl Handle {
    /// All layer ids owned by this handle.
    pub fn layer_ids(&self) -> Vec<LayerId> {
        match self {
            Handle::Single(id) => vec![*id],
            Handle::BySector(positions) => positions.values().copied().collect(),
        }
    }
}

/// A named unit within a category: one loaded file or distilled layer group.
#[derive(Debug, Clone)]
pub struct Item {
    pub name: String,
    pub handle: Handle,
}

impl Item {
    pub fn new(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }

    /// Position names of a sector item, empty for single-handle items.
    pub fn positions(&self) -> Vec<&str> {
        match &self.handle {
            Handle::Single(_) => Vec::new(),
            Handle::BySector(positions) => positions.keys().map(String::as_str).collect(),
        }
    }
}

/// A facility (airport/station) within a domain.
#[derive(Debug, Clone, Default)]
pub struct Facility {
    pub name: String,
    items: BTreeMap<Category, BTreeMap<String, Item>>,
}

impl Facility {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: BTreeMap::new(),
        }
    }

    /// Items of one category, in name order.
    pub fn items(&self, category: Category) -> impl Iterator<Item = &Item> {
        self.items
            .get(&category)
            .into_iter()
            .flat_map(|items| items.values())
    }

    /// Look up one item by category and name.
    pub fn item(&self, category: Category, name: &str) -> Option<&Item> {
        self.items.get(&category)?.get(name)
    }

    /// Whether the facility has any item in the given category.
    pub fn has_category(&self, category: Category) -> bool {
        self.items
            .get(&category)
            .map(|items| !items.is_empty())
            .unwrap_or(false)
    }

    pub(crate) fn items_mut(&mut self, category: Category) -> &mut BTreeMap<String, Item> {
        self.items.entry(category).or_default()
    }
}

/// A top-level registry partition (terminal vs en-route airspace).
#[derive(Debug, Clone)]
pub struct Domain {
    pub name: String,
    /// Defaulting rule for sector items listed without positions.
    pub policy: EmptyPositionPolicy,
    facilities: BTreeMap<String, Facility>,
}

impl Domain {
    fn new(name: impl Into<String>, policy: EmptyPositionPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            facilities: BTreeMap::new(),
        }
    }

    /// Facilities in name order.
    pub fn facilities(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.values()
    }

    pub fn facility(&self, name: &str) -> Option<&Facility> {
        self.facilities.get(name)
    }

    pub(crate) fn facility_mut(&mut self, name: &str) -> &mut Facility {
        self.facilities
            .entry(name.to_string())
            .or_insert_with(|| Facility::new(name))
    }
}

/// The long-lived layer registry.
///
/// Built once at startup by the loader, then queried by the snapshot
/// reader/writer, the codec and UI collaborators. There are no ambient
/// singletons: the registry is owned and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    domains: BTreeMap<String, Domain>,
    policies: BTreeMap<String, EmptyPositionPolicy>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the empty-position policy for a domain.
    ///
    /// Applies to the domain whether it exists yet or is created later;
    /// unconfigured domains use [`EmptyPositionPolicy::default`].
    pub fn set_policy(&mut self, domain: &str, policy: EmptyPositionPolicy) {
        self.policies.insert(domain.to_string(), policy);
        if let Some(existing) = self.domains.get_mut(domain) {
            existing.policy = policy;
        }
    }

    /// Builder form of [`Registry::set_policy`].
    pub fn with_policy(mut self, domain: &str, policy: EmptyPositionPolicy) -> Self {
        self.set_policy(domain, policy);
        self
    }

    /// Domains in name order.
    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.domains.get(name)
    }

    /// Look up an item by its full path.
    pub fn item(
        &self,
        domain: &str,
        facility: &str,
        category: Category,
        name: &str,
    ) -> Option<&Item> {
        self.domain(domain)?.facility(facility)?.item(category, name)
    }

    /// Whether the registry holds no domains at all.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Drop every domain, for a full reload. Configured policies survive.
    pub fn clear(&mut self) {
        self.domains.clear();
    }

    pub(crate) fn domain_mut(&mut self, name: &str) -> &mut Domain {
        let policy = self.policies.get(name).copied().unwrap_or_default();
        self.domains
            .entry(name.to_string())
            .or_insert_with(|| Domain::new(name, policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domains_created_on_demand() {
        let mut registry = Registry::new();
        registry.domain_mut("tracon").facility_mut("jfk");
        assert!(registry.domain("tracon").is_some());
        assert!(registry.domain("tracon").unwrap().facility("jfk").is_some());
        assert!(registry.domain("enroute").is_none());
    }

    #[test]
    fn test_policy_applies_before_and_after_creation() {
        let mut registry = Registry::new();
        registry.set_policy("enroute", EmptyPositionPolicy::Deactivate);
        assert_eq!(
            registry.domain_mut("enroute").policy,
            EmptyPositionPolicy::Deactivate
        );

        // And retroactively.
        registry.domain_mut("tracon");
        registry.set_policy("tracon", EmptyPositionPolicy::Deactivate);
        assert_eq!(
            registry.domain("tracon").unwrap().policy,
            EmptyPositionPolicy::Deactivate
        );
    }

    #[test]
    fn test_clear_keeps_policies() {
        let mut registry =
            Registry::new().with_policy("enroute", EmptyPositionPolicy::Deactivate);
        registry.domain_mut("enroute");
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(
            registry.domain_mut("enroute").policy,
            EmptyPositionPolicy::Deactivate
        );
    }

    #[test]
    fn test_handle_layer_ids() {
        let single = Handle::Single(LayerId(7));
        assert_eq!(single.layer_ids(), vec![LayerId(7)]);

        let mut positions = BTreeMap::new();
        positions.insert("N".to_string(), LayerId(1));
        positions.insert("S".to_string(), LayerId(2));
        let by_sector = Handle::BySector(positions);
        assert_eq!(by_sector.layer_ids(), vec![LayerId(1), LayerId(2)]);
    }

    #[test]
    fn test_item_positions() {
        let mut positions = BTreeMap::new();
        positions.insert("N".to_string(), LayerId(1));
        let item = Item::new("JFK_4s", Handle::BySector(positions));
        assert_eq!(item.positions(), vec!["N"]);

        let single = Item::new("parch", Handle::Single(LayerId(2)));
        assert!(single.positions().is_empty());
    }
}
