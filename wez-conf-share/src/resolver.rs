//! Reconciling local state with state embedded in an incoming share URL.
//!
//! A single load attempt ends in one of three outcomes:
//!
//! - [`LoadOutcome::NoData`] — no usable share data in the fragment (absent,
//!   empty, or undecodable).
//! - [`LoadOutcome::Applied`] — the shared state was adopted, either because
//!   the local store had no changes and no mappings, or because the shared
//!   state is already identical to it.
//! - [`LoadOutcome::Conflict`] — the shared state differs from non-empty
//!   local state. The decoded data is held as a pending value until the user
//!   accepts or dismisses it; the store is untouched in the meantime.
//!
//! Accepting resets the store to defaults before overlaying the shared
//! settings, unlike a text import, which applies incrementally. That
//! asymmetry is deliberate: an accepted share means "give me exactly that
//! person's config", an import means "pull these settings into mine".

use crate::codec::{DecodedData, decode_fragment};
use wez_conf_config::SettingsStore;

/// Terminal outcome of one URL load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No usable share data was present.
    NoData,
    /// Shared state was adopted (or already matched local state).
    Applied,
    /// Shared state differs from local state; a decision is pending.
    Conflict,
}

/// Holds decoded share data across a conflict until resolved.
#[derive(Debug, Default)]
pub struct UrlResolver {
    pending: Option<DecodedData>,
}

impl UrlResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the fragment and reconcile it against the store.
    ///
    /// On [`LoadOutcome::Conflict`] the decoded data is retained: inspect
    /// it via [`pending`], then call [`accept_pending`] or
    /// [`dismiss_pending`].
    ///
    /// [`pending`]: UrlResolver::pending
    /// [`accept_pending`]: UrlResolver::accept_pending
    /// [`dismiss_pending`]: UrlResolver::dismiss_pending
    pub fn load_fragment(&mut self, store: &mut SettingsStore, fragment: &str) -> LoadOutcome {
        let Some(data) = decode_fragment(fragment) else {
            return LoadOutcome::NoData;
        };
        if data.is_empty() {
            return LoadOutcome::NoData;
        }

        let has_local_changes =
            !store.changed_entries().is_empty() || !store.mappings().is_empty();
        if !has_local_changes {
            log::info!(
                "Adopting shared config: {} setting(s), {} mapping(s)",
                data.settings.len(),
                data.mappings.len()
            );
            store.overwrite_with(&data.settings, &data.mappings);
            return LoadOutcome::Applied;
        }

        if Self::matches_store(store, &data) {
            // Already in exactly that state; nothing to mutate.
            return LoadOutcome::Applied;
        }

        log::info!("Shared config differs from local state; holding for resolution");
        self.pending = Some(data);
        LoadOutcome::Conflict
    }

    /// Shared data equals local state: every decoded setting value matches
    /// the store exactly, and the mapping lists match positionally.
    fn matches_store(store: &SettingsStore, data: &DecodedData) -> bool {
        if data.settings.iter().any(|(key, value)| store.value(key) != value) {
            return false;
        }
        if data.mappings.len() != store.mappings().len() {
            return false;
        }
        data.mappings
            .iter()
            .zip(store.mappings())
            .all(|(a, b)| a.mods == b.mods && a.key == b.key && a.action == b.action)
    }

    /// The decoded data awaiting resolution, if any.
    pub fn pending(&self) -> Option<&DecodedData> {
        self.pending.as_ref()
    }

    /// Adopt the pending shared state: reset the store to defaults, overlay
    /// every pending setting, and replace the mapping list wholesale. No-op
    /// when nothing is pending.
    pub fn accept_pending(&mut self, store: &mut SettingsStore) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        store.overwrite_with(&pending.settings, &pending.mappings);
    }

    /// Discard the pending shared state without touching the store.
    pub fn dismiss_pending(&mut self) {
        self.pending = None;
    }
}
