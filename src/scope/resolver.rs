//! Context resolution: merge the bundles of every frame in a chain

use tracing::debug;
use crate::scope::bundle::ScopeBundle;
use crate::scope::context::ParentData;

/// Walk `chain` from the innermost frame outwards and merge its bundles
///
/// The nearest frame defining a field wins that field wholesale; fields are
/// never merged key by key across frames. Frames are only read. A chain
/// without any bundle yields an empty bundle.
pub fn resolve_scope(chain: &dyn ParentData) -> ScopeBundle {
    let mut merged = ScopeBundle::default();
    let mut depth = 0;

    while let Some(frame) = chain.parent_data(depth) {
        if let Some(intl) = &frame.intl {
            merged.fill_from(intl);
        }
        depth += 1;
    }

    debug!(frames = depth, has_locales = merged.locales.is_some(), "Resolved scope bundle");
    merged
}
