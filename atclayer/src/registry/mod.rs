//! Hierarchical layer registry.
//!
//! Classified feature collections land here as a navigable hierarchy of
//! `Domain → Facility → Category → Item`, each item owning the renderable
//! handle(s) the renderer issued for it. The registry is built once at
//! startup and mutated only through [`ingest`] and [`Registry::clear`].

mod builder;
mod model;

pub use builder::ingest;
pub use model::{Domain, EmptyPositionPolicy, Facility, Handle, Item, Registry};
