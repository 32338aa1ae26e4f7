//! Settings schema, action catalog, and state store for wez-conf.
//!
//! This crate is the core of wez-conf's state handling. It includes:
//!
//! - The static setting schema with stable share ids
//! - The action and key catalogs for key-binding mappings
//! - The mutable settings store with change notification
//! - Persistence of the changed-key and mapping records
//!
//! Everything is synchronous and single-threaded; construct one
//! [`SettingsStore`] per process.

pub mod catalog;
pub mod error;
pub mod persistence;
pub mod schema;
pub mod store;

// Re-export main types for convenience
pub use catalog::{
    ACTION_GROUPS, ActionDef, ActionGroup, KeyDef, KeyGroup, Mapping, MappingFields, MappingPatch,
    Modifier, action_by_aid, action_by_value, action_lua, build_mods, is_catalog_key, key_groups,
    parse_mods,
};
pub use error::StateError;
pub use persistence::StorePaths;
pub use schema::{CATEGORIES, Category, SettingDef, SettingType, setting, setting_by_sid, settings};
pub use store::{ChangeEvent, SettingsStore, SubscriptionId, is_valid, values_equal};
