//! Compact state codec: snapshot ⇄ URL-safe token.
//!
//! The wire form is a nested, separator-structured string, base64url-encoded
//! with padding stripped:
//!
//! ```text
//! domain-list  := domain ("||" domain)*
//! domain       := domain-id "::" facility-list
//! facility-list:= facility ("|" facility)*
//! facility     := facility-id (";" cat-block)*
//! cat-block    := cat-abbrev ":" items
//! items        := sector-items | name-list
//! name-list    := name ("," name)*
//! sector-items := sector-item ("|" sector-item)*
//! sector-item  := item-name ["-" suffix ("," suffix)*]
//! ```
//!
//! Category abbreviations are the stable single digits of
//! [`Category::abbrev`]. Output is sparse: a domain, facility or category
//! with nothing active is never emitted, so an empty selection and a missing
//! entry are indistinguishable on the wire.
//!
//! `|` separates both facilities and sector-items. The canonical encoder
//! resolves the collision structurally by emitting a facility's sectors
//! block last: after it, a `|`-chunk without `;` is a sector-item
//! continuation and a chunk with `;` opens the next facility. Foreign
//! tokens that interleave differently degrade to dropped chunks, never to
//! an error.
//!
//! Decoding is fail-open: a malformed token yields an empty snapshot and a
//! diagnostic, never an error to the caller. References to items or
//! positions that are no longer registered are silently dropped.

mod suffix;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use crate::classify::Category;
use crate::registry::{Facility, Registry};
use crate::snapshot::ActiveState;

pub use suffix::{resolve_suffix, shortest_unique_suffix};

/// Errors detected by the strict decoder.
///
/// The public [`decode`] absorbs these; they surface only through logs and
/// through [`decode_strict`] in tests.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token is not valid UTF-8")]
    Utf8,

    #[error("malformed domain segment {0:?}")]
    Domain(String),

    #[error("malformed facility segment {0:?}")]
    Facility(String),

    #[error("malformed category block {0:?}")]
    Block(String),

    #[error("unknown category abbreviation {0:?}")]
    UnknownCategory(String),
}

/// Encode a snapshot into a compact token.
///
/// Returns `None` for an empty snapshot — the caller removes the URL
/// parameter instead of writing an empty token. The registry supplies each
/// sector item's known positions for suffix compression; positions of items
/// the registry no longer knows encode as their full names.
pub fn encode(state: &ActiveState, registry: &Registry) -> Option<String> {
    let mut domain_parts = Vec::new();

    for (domain_name, domain_state) in &state.domains {
        let mut facility_parts = Vec::new();

        for (facility_name, selection) in &domain_state.facilities {
            let mut blocks = Vec::new();

            for category in [Category::Stars, Category::Sids, Category::Videomap] {
                let names = selection.named(category).expect("non-sector category");
                if !names.is_empty() {
                    let list: Vec<&str> = names.iter().map(String::as_str).collect();
                    blocks.push(format!("{}:{}", category.abbrev(), list.join(",")));
                }
            }

            // Sectors go last: their item list may contain `|`, which only
            // parses unambiguously at the tail of a facility.
            if !selection.sectors.is_empty() {
                let items: Vec<String> = selection
                    .sectors
                    .iter()
                    .map(|(item_name, positions)| {
                        encode_sector_item(registry, domain_name, facility_name, item_name, positions)
                    })
                    .collect();
                blocks.push(format!("{}:{}", Category::Sectors.abbrev(), items.join("|")));
            }

            if !blocks.is_empty() {
                facility_parts.push(format!("{};{}", facility_name, blocks.join(";")));
            }
        }

        if !facility_parts.is_empty() {
            domain_parts.push(format!("{}::{}", domain_name, facility_parts.join("|")));
        }
    }

    if domain_parts.is_empty() {
        return None;
    }
    Some(URL_SAFE_NO_PAD.encode(domain_parts.join("||")))
}

fn encode_sector_item(
    registry: &Registry,
    domain: &str,
    facility: &str,
    item_name: &str,
    positions: &std::collections::BTreeSet<String>,
) -> String {
    if positions.is_empty() {
        // Explicitly empty selection: bare name, resolved by the
        // per-domain defaulting rule at write time.
        return item_name.to_string();
    }
    let known: Vec<&str> = registry
        .item(domain, facility, Category::Sectors, item_name)
        .map(|item| item.positions())
        .unwrap_or_default();
    let suffixes: Vec<String> = positions
        .iter()
        .map(|position| shortest_unique_suffix(position, &known))
        .collect();
    format!("{}-{}", item_name, suffixes.join(","))
}

/// Decode a token against the live registry, fail-open.
///
/// Any structural failure (bad base64, bad grammar, unknown abbreviation)
/// yields an empty snapshot with a warning; the map loads with nothing
/// pre-selected rather than crashing.
pub fn decode(token: &str, registry: &Registry) -> ActiveState {
    match decode_strict(token, registry) {
        Ok(state) => state,
        Err(error) => {
            tracing::warn!(%error, "discarding malformed layer token");
            ActiveState::new()
        }
    }
}

/// Strict decoder behind [`decode`]; exposed for tests.
pub fn decode_strict(token: &str, registry: &Registry) -> Result<ActiveState, TokenError> {
    // Tolerate padded input even though canonical tokens strip padding.
    let bytes = URL_SAFE_NO_PAD.decode(token.trim().trim_end_matches('='))?;
    let text = String::from_utf8(bytes).map_err(|_| TokenError::Utf8)?;

    let mut state = ActiveState::new();
    if text.is_empty() {
        return Ok(state);
    }

    for domain_part in text.split("||") {
        let (domain_name, facility_list) = domain_part
            .split_once("::")
            .ok_or_else(|| TokenError::Domain(domain_part.to_string()))?;

        for facility_chunk in split_facilities(facility_list)? {
            decode_facility(&facility_chunk, domain_name, registry, &mut state)?;
        }
    }

    state.prune();
    Ok(state)
}

/// Split a facility list on `|`, folding sector-item continuations back.
///
/// `|` separates both facilities and sector-items; a chunk without `;`
/// cannot open a facility (facilities with zero active categories are never
/// emitted) and belongs to the preceding facility's trailing sector list.
fn split_facilities(facility_list: &str) -> Result<Vec<String>, TokenError> {
    let mut chunks: Vec<String> = Vec::new();
    for chunk in facility_list.split('|') {
        if chunk.contains(';') {
            chunks.push(chunk.to_string());
        } else if let Some(previous) = chunks.last_mut() {
            previous.push('|');
            previous.push_str(chunk);
        } else {
            return Err(TokenError::Facility(chunk.to_string()));
        }
    }
    Ok(chunks)
}

fn decode_facility(
    facility_chunk: &str,
    domain_name: &str,
    registry: &Registry,
    state: &mut ActiveState,
) -> Result<(), TokenError> {
    let mut parts = facility_chunk.split(';');
    let facility_name = parts
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TokenError::Facility(facility_chunk.to_string()))?;

    // Unknown domains/facilities still get their grammar validated; their
    // content is dropped as stale.
    let facility = registry
        .domain(domain_name)
        .and_then(|domain| domain.facility(facility_name));

    for block in parts {
        let (abbrev, items) = block
            .split_once(':')
            .ok_or_else(|| TokenError::Block(block.to_string()))?;
        let category = Category::from_abbrev(abbrev)
            .ok_or_else(|| TokenError::UnknownCategory(abbrev.to_string()))?;

        let facility = match facility {
            Some(facility) => facility,
            None => {
                tracing::debug!(
                    domain = domain_name,
                    facility = facility_name,
                    "dropping selection for unknown facility"
                );
                continue;
            }
        };

        match category {
            Category::Sectors => {
                decode_sector_items(items, facility, domain_name, facility_name, state);
            }
            _ => {
                for name in items.split(',').filter(|name| !name.is_empty()) {
                    if facility.item(category, name).is_none() {
                        tracing::debug!(item = name, %category, "dropping stale item reference");
                        continue;
                    }
                    if let Some(names) = state
                        .facility_mut(domain_name, facility_name)
                        .named_mut(category)
                    {
                        names.insert(name.to_string());
                    }
                }
            }
        }
    }
    Ok(())
}

fn decode_sector_items(
    items: &str,
    facility: &Facility,
    domain_name: &str,
    facility_name: &str,
    state: &mut ActiveState,
) {
    for chunk in items.split('|').filter(|chunk| !chunk.is_empty()) {
        // Prefer the name/suffix split when the left side is a registered
        // item; otherwise treat the whole chunk as a bare item name, which
        // also covers item names that themselves contain `-`.
        let (item_name, suffixes) = match chunk.rsplit_once('-') {
            Some((name, rest))
                if !rest.is_empty() && facility.item(Category::Sectors, name).is_some() =>
            {
                (name, Some(rest))
            }
            _ => (chunk, None),
        };

        let item = match facility.item(Category::Sectors, item_name) {
            Some(item) => item,
            None => {
                tracing::debug!(item = item_name, "dropping stale sector reference");
                continue;
            }
        };

        let known = item.positions();
        let positions: std::collections::BTreeSet<String> = match suffixes {
            None => Default::default(),
            Some(suffixes) => {
                let resolved: std::collections::BTreeSet<String> = suffixes
                    .split(',')
                    .filter_map(|s| resolve_suffix(s, &known))
                    .map(str::to_string)
                    .collect();
                if resolved.is_empty() {
                    // Every listed position is stale: drop the item rather
                    // than falling through to the defaulting rule.
                    continue;
                }
                resolved
            }
        };

        state
            .facility_mut(domain_name, facility_name)
            .sectors
            .insert(item_name.to_string(), positions);
    }
}
