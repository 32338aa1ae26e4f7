//! The two apply paths deliberately differ: a text import writes into
//! whatever state the store already holds (the caller decides whether to
//! reset first), while accepting a shared URL always resets to defaults
//! before overlaying. These tests pin that asymmetry down.

use wez_conf_config::{MappingFields, SettingsStore, StorePaths};
use wez_conf_import::apply_config_text;
use wez_conf_share::{LoadOutcome, UrlResolver, encode_fragment};

fn temp_store() -> (tempfile::TempDir, SettingsStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::with_paths(StorePaths::with_dir(dir.path()));
    (dir, store)
}

#[test]
fn test_import_is_incremental() {
    let (_dir, mut store) = temp_store();
    store.set_value("term", "tmux-256color");
    store.set_value("font_size", "16.0");

    let applied = apply_config_text(&mut store, "config.font_size = 14.5\n");
    assert_eq!(applied, 1);

    // The imported setting wins, but the unrelated local change survives;
    // the parser never resets on its own.
    assert_eq!(store.value("font_size"), "14.5");
    assert_eq!(store.value("term"), "tmux-256color");
}

#[test]
fn test_import_without_bindings_keeps_local_bindings() {
    let (_dir, mut store) = temp_store();
    store.add_mapping(MappingFields::new("CTRL", "q", "QuickSelect"));

    apply_config_text(&mut store, "config.font_size = 14.5\n");
    assert_eq!(store.mappings().len(), 1);
}

#[test]
fn test_import_with_bindings_replaces_binding_list_only() {
    let (_dir, mut store) = temp_store();
    store.set_value("term", "tmux-256color");
    store.add_mapping(MappingFields::new("CTRL", "q", "QuickSelect"));

    let text = "config.keys = {\n  { key = 'c', mods = 'CTRL|SHIFT', action = wezterm.action.CopyTo 'Clipboard' },\n}\n";
    apply_config_text(&mut store, text);

    // Binding list replaced wholesale, settings untouched.
    assert_eq!(store.mappings().len(), 1);
    assert_eq!(store.mappings()[0].action, "CopyTo");
    assert_eq!(store.value("term"), "tmux-256color");
}

#[test]
fn test_accept_pending_resets_before_overlay() {
    let (_dir_a, mut sender) = temp_store();
    sender.set_value("font_size", "14.5");
    let fragment = encode_fragment(&sender).unwrap();

    let (_dir_b, mut store) = temp_store();
    store.set_value("font_size", "16.0");
    store.set_value("term", "tmux-256color");
    store.add_mapping(MappingFields::new("CTRL", "q", "QuickSelect"));

    let mut resolver = UrlResolver::new();
    assert_eq!(resolver.load_fragment(&mut store, &fragment), LoadOutcome::Conflict);
    resolver.accept_pending(&mut store);

    // The shared setting applied, and everything the share did not carry
    // (the local term override and the binding) went back to defaults
    // rather than surviving the overlay.
    assert_eq!(store.value("font_size"), "14.5");
    assert_eq!(store.value("term"), "xterm-256color");
    assert!(store.mappings().is_empty());
}
