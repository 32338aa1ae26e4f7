//! wezterm.lua generation from the current store state.
//!
//! Pure templating over [`SettingsStore::changed_entries`]: only
//! changed-and-valid settings appear in the output, so a default store
//! generates the minimal skeleton. The four `window_padding_*` settings are
//! grouped back into one `window_padding` table, `font_family` becomes a
//! `wezterm.font()` call, and the list-valued settings become Lua string
//! tables, the exact inverse of what the importer extracts.

use wez_conf_config::{SettingType, SettingsStore, action_lua, schema};

/// Settings rendered by dedicated rules rather than plain assignments.
const PADDING_KEYS: [&str; 4] = [
    "window_padding_left",
    "window_padding_right",
    "window_padding_top",
    "window_padding_bottom",
];

/// Render the current store state as a complete wezterm.lua.
pub fn generate_config(store: &SettingsStore) -> String {
    let mut out = String::new();
    out.push_str("local wezterm = require 'wezterm'\n");
    out.push_str("local config = wezterm.config_builder()\n\n");

    let changed = store.changed_entries();
    let mut body = String::new();

    for (key, value) in &changed {
        match *key {
            "font_family" => {
                body.push_str(&format!("config.font = wezterm.font({})\n", lua_quote(value)));
            }
            "harfbuzz_features" => {
                body.push_str(&format!(
                    "config.harfbuzz_features = {}\n",
                    lua_string_table(value.split(',').map(str::trim))
                ));
            }
            "default_prog" => {
                body.push_str(&format!(
                    "config.default_prog = {}\n",
                    lua_string_table(value.split(','))
                ));
            }
            key if PADDING_KEYS.contains(&key) => {
                // Grouped below, once.
            }
            key => {
                let def = schema::setting(key)
                    .expect("changed_entries only yields keys present in the schema");
                body.push_str(&format!("config.{} = {}\n", key, lua_literal(def.ty, value)));
            }
        }
    }

    if changed.iter().any(|(key, _)| PADDING_KEYS.contains(key)) {
        body.push_str(&format!(
            "config.window_padding = {{ left = {}, right = {}, top = {}, bottom = {} }}\n",
            store.value("window_padding_left"),
            store.value("window_padding_right"),
            store.value("window_padding_top"),
            store.value("window_padding_bottom"),
        ));
    }

    if !body.is_empty() {
        out.push_str(&body);
    }

    if !store.mappings().is_empty() {
        out.push('\n');
        out.push_str("config.keys = {\n");
        for mapping in store.mappings() {
            out.push_str("  { key = ");
            out.push_str(&lua_quote(&mapping.key));
            if !mapping.mods.is_empty() {
                out.push_str(", mods = ");
                out.push_str(&lua_quote(&mapping.mods));
            }
            out.push_str(", action = ");
            out.push_str(&action_lua(&mapping.action));
            out.push_str(" },\n");
        }
        out.push_str("}\n");
    }

    out.push_str("\nreturn config\n");
    out
}

fn lua_literal(ty: SettingType, value: &str) -> String {
    match ty {
        // Numeric and boolean values are valid bare Lua literals by the time
        // they pass validation.
        SettingType::Int | SettingType::Float | SettingType::Bool => value.to_string(),
        SettingType::String | SettingType::Enum => lua_quote(value),
    }
}

fn lua_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn lua_string_table<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = items.filter(|s| !s.is_empty()).map(lua_quote).collect();
    format!("{{ {} }}", quoted.join(", "))
}
