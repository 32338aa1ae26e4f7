//! Mutable settings state: current values, key-binding mappings, change
//! notification, and persist-on-write.
//!
//! The store is the single source of truth for everything the importer, the
//! share codec, and the generator touch. It holds one string value per
//! schema key (initialized from defaults) plus an ordered mapping list.
//! Mapping order is significant and preserved exactly; first-match-wins
//! semantics belong to WezTerm itself, not to this store.
//!
//! Writes never validate: callers may store invalid-looking strings so an
//! editing surface can show transient bad input. Validation happens on the
//! way out: [`SettingsStore::changed_entries`] silently excludes invalid
//! values from generated output and from the compact encoding, while the
//! persisted record keeps them so edits survive a restart.

use crate::catalog::{Mapping, MappingFields, MappingPatch};
use crate::persistence::{
    StorePaths, load_mappings_record, load_settings_record, save_mappings_record,
    save_settings_record,
};
use crate::schema::{self, SettingDef, SettingType};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// What changed, handed to every subscriber synchronously after the mutation.
///
/// Subscribers receive the event value, not the store; read the store after
/// the mutating call returns. Fan-out is in subscription order with no
/// batching or coalescing: one mutating call, one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A single setting value changed via [`SettingsStore::set_value`].
    SettingChanged { key: &'static str },
    /// The mapping list changed (add/update/remove/replace).
    MappingsChanged,
    /// Everything was restored to defaults.
    Reset,
    /// The whole store was replaced by decoded share data.
    Overwritten,
}

/// Handle returned by [`SettingsStore::subscribe`], usable to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

type Subscriber = Box<dyn FnMut(&ChangeEvent)>;

/// Type-aware validity check for a candidate value.
///
/// Numeric types require a plain signed lexeme (no exponents, no leading
/// `+`) and, when the definition specifies them, membership in `[min, max]`.
/// Enum settings require membership in `options`, except `color_scheme`,
/// which accepts any string because scheme names are typed freely. Bool
/// requires exactly `"true"` or `"false"`. Strings always validate.
pub fn is_valid(def: &SettingDef, value: &str) -> bool {
    match def.ty {
        SettingType::Int => {
            let trimmed = value.trim();
            if !is_int_lexeme(trimmed) {
                return false;
            }
            in_range(def, trimmed)
        }
        SettingType::Float => {
            let trimmed = value.trim();
            if !is_decimal_lexeme(trimmed) {
                return false;
            }
            in_range(def, trimmed)
        }
        SettingType::Enum => {
            // color_scheme allows any string (typed by user)
            def.key == "color_scheme" || def.options.contains(&value)
        }
        SettingType::Bool => value == "true" || value == "false",
        SettingType::String => true,
    }
}

/// Type-aware equality: numeric comparison for int/float settings (so `"1"`
/// equals `"1.0"`), exact string comparison otherwise. Values that fail to
/// parse as numbers never compare equal, even to themselves.
pub fn values_equal(def: &SettingDef, a: &str, b: &str) -> bool {
    if matches!(def.ty, SettingType::Int | SettingType::Float) {
        match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) => x == y,
            _ => false,
        }
    } else {
        a == b
    }
}

fn is_int_lexeme(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_lexeme(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    match unsigned.split_once('.') {
        None => !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()),
        Some((int, frac)) => {
            !int.is_empty()
                && !frac.is_empty()
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

fn in_range(def: &SettingDef, lexeme: &str) -> bool {
    let Ok(n) = lexeme.parse::<f64>() else {
        return false;
    };
    if let Some(min) = def.min
        && n < min
    {
        return false;
    }
    if let Some(max) = def.max
        && n > max
    {
        return false;
    }
    true
}

/// The mutable settings state. Construct exactly one per process.
pub struct SettingsStore {
    values: HashMap<&'static str, String>,
    mappings: Vec<Mapping>,
    listeners: Vec<(usize, Subscriber)>,
    next_listener: usize,
    paths: StorePaths,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("changed", &self.changed_values().len())
            .field("mappings", &self.mappings.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl SettingsStore {
    /// A store holding pure defaults, persisting to the platform data dir.
    pub fn new() -> Self {
        Self::with_paths(StorePaths::new())
    }

    /// A store holding pure defaults, persisting to explicit paths (tests).
    pub fn with_paths(paths: StorePaths) -> Self {
        let values = schema::settings().map(|s| (s.key, s.default.to_string())).collect();
        Self { values, mappings: Vec::new(), listeners: Vec::new(), next_listener: 0, paths }
    }

    /// Defaults overlaid with the persisted changed-key and mapping records.
    ///
    /// Unknown keys in the settings record are ignored (they may belong to a
    /// newer release). Mappings get fresh session-local ids.
    pub fn load() -> Self {
        Self::load_with_paths(StorePaths::new())
    }

    /// [`SettingsStore::load`] against explicit paths (tests).
    pub fn load_with_paths(paths: StorePaths) -> Self {
        let mut store = Self::with_paths(paths);
        let saved = load_settings_record(&store.paths);
        for (key, value) in saved {
            match schema::setting(&key) {
                Some(def) => {
                    store.values.insert(def.key, value);
                }
                None => log::debug!("Ignoring persisted value for unknown key '{}'", key),
            }
        }
        store.mappings = load_mappings_record(&store.paths)
            .into_iter()
            .map(MappingFields::into_mapping)
            .collect();
        log::info!(
            "Loaded store: {} changed setting(s), {} mapping(s)",
            store.changed_values().len(),
            store.mappings.len()
        );
        store
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Current value for a key; empty string for unknown keys.
    pub fn value(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Store a value.
    ///
    /// No-op when the value is unchanged by exact string equality (the
    /// storage layer never normalizes). Unknown keys are dropped. The value
    /// is NOT validated here (see the module docs), but every accepted
    /// change persists the changed-from-default subset synchronously.
    pub fn set_value(&mut self, key: &str, value: &str) {
        let Some(def) = schema::setting(key) else {
            log::debug!("Ignoring value for unknown setting '{}'", key);
            return;
        };
        if self.value(def.key) == value {
            return;
        }
        self.values.insert(def.key, value.to_string());
        self.persist_settings();
        self.notify(ChangeEvent::SettingChanged { key: def.key });
    }

    /// Changed-and-valid entries in schema declaration order.
    ///
    /// This is the set the compact encoding and the generated config see.
    /// Invalid values stay out of it (but stay in the store and in the
    /// persisted record) until corrected.
    pub fn changed_entries(&self) -> Vec<(&'static str, String)> {
        let mut changed = Vec::new();
        for def in schema::settings() {
            let value = self.value(def.key);
            if !values_equal(def, value, def.default) && is_valid(def, value) {
                changed.push((def.key, value.to_string()));
            }
        }
        changed
    }

    /// Everything differing from its default under type-aware comparison,
    /// validity not considered. This is the persisted shape.
    pub fn changed_values(&self) -> BTreeMap<String, String> {
        let mut changed = BTreeMap::new();
        for def in schema::settings() {
            let value = self.value(def.key);
            if !values_equal(def, value, def.default) {
                changed.insert(def.key.to_string(), value.to_string());
            }
        }
        changed
    }

    /// Restore every setting to its default, clear all mappings, clear the
    /// persisted records, and raise a single [`ChangeEvent::Reset`].
    pub fn reset(&mut self) {
        for def in schema::settings() {
            self.values.insert(def.key, def.default.to_string());
        }
        self.mappings.clear();
        self.persist_settings();
        self.persist_mappings();
        self.notify(ChangeEvent::Reset);
    }

    /// Replace the entire store with decoded share data: defaults, then the
    /// given settings overlaid, then the mapping list wholesale (fresh ids).
    /// Persists both records and raises one [`ChangeEvent::Overwritten`].
    pub fn overwrite_with(&mut self, settings: &[(String, String)], mappings: &[MappingFields]) {
        for def in schema::settings() {
            self.values.insert(def.key, def.default.to_string());
        }
        for (key, value) in settings {
            match schema::setting(key) {
                Some(def) => {
                    self.values.insert(def.key, value.clone());
                }
                None => log::debug!("Ignoring decoded value for unknown key '{}'", key),
            }
        }
        self.mappings = mappings.iter().cloned().map(MappingFields::into_mapping).collect();
        self.persist_settings();
        self.persist_mappings();
        self.notify(ChangeEvent::Overwritten);
    }

    // ------------------------------------------------------------------
    // Mappings
    // ------------------------------------------------------------------

    /// The mapping list, in order.
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Append a mapping, returning its session-local id.
    pub fn add_mapping(&mut self, fields: MappingFields) -> Uuid {
        let mapping = fields.into_mapping();
        let id = mapping.id;
        self.mappings.push(mapping);
        self.persist_mappings();
        self.notify(ChangeEvent::MappingsChanged);
        id
    }

    /// Apply a partial update to the mapping with the given id. Unknown ids
    /// are a silent no-op.
    pub fn update_mapping(&mut self, id: Uuid, patch: MappingPatch) {
        let Some(mapping) = self.mappings.iter_mut().find(|m| m.id == id) else {
            return;
        };
        if let Some(mods) = patch.mods {
            mapping.mods = mods;
        }
        if let Some(key) = patch.key {
            mapping.key = key;
        }
        if let Some(action) = patch.action {
            mapping.action = action;
        }
        self.persist_mappings();
        self.notify(ChangeEvent::MappingsChanged);
    }

    /// Remove the mapping with the given id. Unknown ids are a silent no-op
    /// and raise no notification.
    pub fn remove_mapping(&mut self, id: Uuid) {
        let Some(idx) = self.mappings.iter().position(|m| m.id == id) else {
            return;
        };
        self.mappings.remove(idx);
        self.persist_mappings();
        self.notify(ChangeEvent::MappingsChanged);
    }

    /// Replace the whole mapping list, assigning fresh session-local ids.
    pub fn replace_mappings(&mut self, items: Vec<MappingFields>) {
        self.mappings = items.into_iter().map(MappingFields::into_mapping).collect();
        self.persist_mappings();
        self.notify(ChangeEvent::MappingsChanged);
    }

    // ------------------------------------------------------------------
    // Notification
    // ------------------------------------------------------------------

    /// Register a change listener; returns a handle for [`unsubscribe`].
    ///
    /// Listeners run synchronously inside the mutating call, in subscription
    /// order. They receive the [`ChangeEvent`] only; to observe the new
    /// state, read the store after the mutating call returns.
    ///
    /// [`unsubscribe`]: SettingsStore::unsubscribe
    pub fn subscribe(&mut self, handler: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(handler)));
        SubscriptionId(id)
    }

    /// Remove a listener. Unknown handles are a no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(lid, _)| *lid != id.0);
    }

    fn notify(&mut self, event: ChangeEvent) {
        for (_, handler) in &mut self.listeners {
            handler(&event);
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Paths this store persists to.
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn persist_settings(&self) {
        if let Err(e) = save_settings_record(&self.paths, &self.changed_values()) {
            log::warn!("Failed to persist settings record: {}", e);
        }
    }

    fn persist_mappings(&self) {
        let fields: Vec<MappingFields> = self.mappings.iter().map(Mapping::fields).collect();
        if let Err(e) = save_mappings_record(&self.paths, &fields) {
            log::warn!("Failed to persist mappings record: {}", e);
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn temp_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::with_paths(StorePaths::with_dir(dir.path()));
        (dir, store)
    }

    // --- validation ---

    #[test]
    fn test_int_validation_boundaries() {
        // font_size carries min=1, max=72 in the schema; use an equivalent
        // int setting shape directly for the canonical boundary check.
        let def = SettingDef {
            key: "t",
            sid: 999,
            label: "t",
            ty: SettingType::Int,
            default: "1",
            min: Some(1.0),
            max: Some(72.0),
            step: None,
            options: &[],
            description: None,
        };
        assert!(!is_valid(&def, "0"));
        assert!(!is_valid(&def, "73"));
        assert!(!is_valid(&def, "abc"));
        assert!(is_valid(&def, "1"));
        assert!(is_valid(&def, "72"));
    }

    #[test]
    fn test_int_rejects_decimal() {
        let def = schema::setting("scrollback_lines").unwrap();
        assert!(!is_valid(def, "10.5"));
        assert!(is_valid(def, "10"));
        assert!(!is_valid(def, "-1")); // min = 0
    }

    #[test]
    fn test_float_validation() {
        let def = schema::setting("font_size").unwrap();
        assert!(is_valid(def, "14.5"));
        assert!(is_valid(def, "14"));
        assert!(!is_valid(def, "0.5")); // below min
        assert!(!is_valid(def, "100")); // above max
        assert!(!is_valid(def, "1e3"));
        assert!(!is_valid(def, "14."));
    }

    #[test]
    fn test_enum_validation() {
        let def = schema::setting("exit_behavior").unwrap();
        assert!(is_valid(def, "Hold"));
        assert!(!is_valid(def, "hold"));
        // The free-form enum accepts anything.
        let scheme = schema::setting("color_scheme").unwrap();
        assert!(is_valid(scheme, "Dracula (Official)"));
    }

    #[test]
    fn test_bool_validation() {
        let def = schema::setting("enable_tab_bar").unwrap();
        assert!(is_valid(def, "true"));
        assert!(is_valid(def, "false"));
        assert!(!is_valid(def, "True"));
        assert!(!is_valid(def, "1"));
    }

    #[test]
    fn test_values_equal_numeric() {
        let def = schema::setting("line_height").unwrap();
        assert!(values_equal(def, "1", "1.0"));
        assert!(values_equal(def, "1.50", "1.5"));
        assert!(!values_equal(def, "abc", "abc")); // unparseable never equal
        let term = schema::setting("term").unwrap();
        assert!(!values_equal(term, "Xterm", "xterm"));
    }

    // --- store ---

    #[test]
    fn test_get_unknown_key_empty() {
        let (_dir, store) = temp_store();
        assert_eq!(store.value("no_such_key"), "");
    }

    #[test]
    fn test_set_and_get() {
        let (_dir, mut store) = temp_store();
        store.set_value("font_size", "14.5");
        assert_eq!(store.value("font_size"), "14.5");
    }

    #[test]
    fn test_set_unchanged_is_noop() {
        let (_dir, mut store) = temp_store();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        store.set_value("font_size", "14.5");
        store.set_value("font_size", "14.5");
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn test_changed_entries_excludes_defaults() {
        let (_dir, mut store) = temp_store();
        assert!(store.changed_entries().is_empty());
        // Numerically equal to the default "1.0", so not changed.
        store.set_value("line_height", "1");
        assert!(store.changed_entries().is_empty());
        store.set_value("line_height", "1.2");
        assert_eq!(store.changed_entries(), vec![("line_height", "1.2".to_string())]);
    }

    #[test]
    fn test_changed_entries_excludes_invalid() {
        let (_dir, mut store) = temp_store();
        store.set_value("font_size", "999");
        assert!(store.changed_entries().is_empty());
        // The raw value stays visible to the editing surface,
        assert_eq!(store.value("font_size"), "999");
        // and stays in the persisted record.
        assert!(store.changed_values().contains_key("font_size"));
    }

    #[test]
    fn test_changed_entries_registry_order() {
        let (_dir, mut store) = temp_store();
        store.set_value("term", "tmux-256color");
        store.set_value("font_size", "14.5");
        store.set_value("color_scheme", "Dracula");
        let keys: Vec<&str> = store.changed_entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["color_scheme", "font_size", "term"]);
    }

    #[test]
    fn test_reset_restores_defaults_single_event() {
        let (_dir, mut store) = temp_store();
        store.set_value("font_size", "14.5");
        store.add_mapping(MappingFields::new("CTRL", "c", "CopyTo"));

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        store.reset();
        assert_eq!(store.value("font_size"), "12.0");
        assert!(store.mappings().is_empty());
        assert_eq!(*events.borrow(), vec![ChangeEvent::Reset]);
        assert!(!store.paths().settings_file().exists());
        assert!(!store.paths().mappings_file().exists());
    }

    #[test]
    fn test_mapping_crud() {
        let (_dir, mut store) = temp_store();
        let id = store.add_mapping(MappingFields::new("CTRL", "c", "CopyTo"));
        store.add_mapping(MappingFields::new("", "F11", "ToggleFullScreen"));
        assert_eq!(store.mappings().len(), 2);

        store.update_mapping(
            id,
            MappingPatch { mods: Some("CTRL|SHIFT".to_string()), ..Default::default() },
        );
        assert_eq!(store.mappings()[0].mods, "CTRL|SHIFT");
        assert_eq!(store.mappings()[0].key, "c");

        store.remove_mapping(id);
        assert_eq!(store.mappings().len(), 1);
        assert_eq!(store.mappings()[0].action, "ToggleFullScreen");
    }

    #[test]
    fn test_remove_unknown_mapping_no_event() {
        let (_dir, mut store) = temp_store();
        let events = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&events);
        store.subscribe(move |_| *sink.borrow_mut() += 1);
        store.remove_mapping(Uuid::new_v4());
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn test_replace_mappings_fresh_ids() {
        let (_dir, mut store) = temp_store();
        let old_id = store.add_mapping(MappingFields::new("CTRL", "c", "CopyTo"));
        store.replace_mappings(vec![
            MappingFields::new("CTRL", "c", "CopyTo"),
            MappingFields::new("CTRL", "v", "PasteFrom"),
        ]);
        assert_eq!(store.mappings().len(), 2);
        assert!(store.mappings().iter().all(|m| m.id != old_id));
    }

    #[test]
    fn test_persistence_roundtrip_through_load() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = SettingsStore::with_paths(StorePaths::with_dir(dir.path()));
            store.set_value("font_size", "14.5");
            store.set_value("enable_tab_bar", "false");
            store.add_mapping(MappingFields::new("CTRL|SHIFT", "c", "CopyTo"));
        }
        let store = SettingsStore::load_with_paths(StorePaths::with_dir(dir.path()));
        assert_eq!(store.value("font_size"), "14.5");
        assert_eq!(store.value("enable_tab_bar"), "false");
        // Untouched settings stay at their defaults.
        assert_eq!(store.value("term"), "xterm-256color");
        assert_eq!(store.mappings().len(), 1);
        assert_eq!(store.mappings()[0].fields(), MappingFields::new("CTRL|SHIFT", "c", "CopyTo"));
    }

    #[test]
    fn test_unsubscribe() {
        let (_dir, mut store) = temp_store();
        let events = Rc::new(RefCell::new(0usize));
        let sink = Rc::clone(&events);
        let sub = store.subscribe(move |_| *sink.borrow_mut() += 1);
        store.set_value("font_size", "14.5");
        store.unsubscribe(sub);
        store.set_value("font_size", "15.0");
        assert_eq!(*events.borrow(), 1);
    }

    #[test]
    fn test_overwrite_with() {
        let (_dir, mut store) = temp_store();
        store.set_value("font_size", "14.5");
        store.set_value("term", "tmux-256color");

        store.overwrite_with(
            &[("font_size".to_string(), "16.0".to_string())],
            &[MappingFields::new("CTRL", "c", "CopyTo")],
        );
        assert_eq!(store.value("font_size"), "16.0");
        // Settings absent from the overlay fall back to defaults.
        assert_eq!(store.value("term"), "xterm-256color");
        assert_eq!(store.mappings().len(), 1);
    }
}
