//! Reconciliation between share tokens and live registry state.
//!
//! `apply_token` closes the loop on URL load: decode the token, drive the
//! registry to the decoded state, then read back what was actually achieved.
//! The achieved snapshot is the canonical one — it may differ from the
//! request when the token referenced since-removed items, or when a bare
//! sector item was expanded by its domain's defaulting rule. Persisting the
//! re-encoded token into the address bar is the embedding front end's job.

use crate::codec;
use crate::registry::Registry;
use crate::render::LayerRenderer;
use crate::snapshot::{self, ActiveState};

/// Apply a share token to the registry and return the canonical snapshot
/// actually achieved.
pub fn apply_token(
    token: &str,
    registry: &Registry,
    renderer: &mut dyn LayerRenderer,
) -> ActiveState {
    let desired = codec::decode(token, registry);
    snapshot::apply_state(registry, &desired, renderer);
    snapshot::read_state(registry, renderer)
}

/// Token for the current visibility state.
///
/// `None` means nothing is active: the caller removes the URL parameter.
/// The token always reflects the post-toggle state because it is read from
/// the renderer at call time, never from a cached snapshot.
pub fn current_token(registry: &Registry, renderer: &dyn LayerRenderer) -> Option<String> {
    let state = snapshot::read_state(registry, renderer);
    codec::encode(&state, registry)
}
