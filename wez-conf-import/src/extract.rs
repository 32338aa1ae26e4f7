//! Best-effort extraction of settings and key bindings from wezterm.lua text.
//!
//! This is not a Lua parser. It recognizes a handful of structural idioms
//! (scalar `config.<key> = <literal>` assignments, the `wezterm.font()` call,
//! the `window_padding` table, string-list tables, and `config.keys` binding
//! records) and ignores everything else. Each idiom is an explicit named
//! extraction rule returning an `Option`; unrecognized fragments are simply
//! not counted. The function never fails.

use regex::Regex;
use std::sync::LazyLock;
use wez_conf_config::{MappingFields, SettingsStore, schema};

/// Keys handled by dedicated table rules and therefore excluded from the
/// generic scalar pass.
const STRUCTURAL_KEYS: &[&str] = &["keys", "window_padding", "default_prog", "harfbuzz_features"];

static SIMPLE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"config\.(\w+)\s*=\s*(.+)")
        .expect("scalar-assignment regex is a compile-time constant and must be valid")
});

static FONT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"wezterm\.font\s*\(\s*'([^']+)'\s*\)")
        .expect("font-call regex is a compile-time constant and must be valid")
});

static PADDING_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"config\.window_padding\s*=\s*\{([^}]+)\}")
        .expect("padding-table regex is a compile-time constant and must be valid")
});

static PADDING_SIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(left|right|top|bottom)\s*=\s*(\d+)")
        .expect("padding-side regex is a compile-time constant and must be valid")
});

static PROG_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"config\.default_prog\s*=\s*\{([^}]+)\}")
        .expect("default-prog regex is a compile-time constant and must be valid")
});

static HARFBUZZ_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"config\.harfbuzz_features\s*=\s*\{([^}]+)\}")
        .expect("harfbuzz-table regex is a compile-time constant and must be valid")
});

static QUOTED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'([^']*)'")
        .expect("quoted-item regex is a compile-time constant and must be valid")
});

static KEYS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)config\.keys\s*=\s*\{(.*?)\n\}")
        .expect("keys-block regex is a compile-time constant and must be valid")
});

static KEY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bkey\s*=\s*'([^']+)'")
        .expect("key-field regex is a compile-time constant and must be valid")
});

static MODS_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"mods\s*=\s*'([^']+)'")
        .expect("mods-field regex is a compile-time constant and must be valid")
});

static ACTION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"action\s*=\s*(wezterm\.action\.\w+(?:\s*\{[^{}]*\}|\s*\(\s*-?\d+\s*\)|\s+'[^']*')?)")
        .expect("action-field regex is a compile-time constant and must be valid")
});

static ACTION_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^wezterm\.action\.(\w+)$")
        .expect("bare-action regex is a compile-time constant and must be valid")
});

static ACTION_STR_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^wezterm\.action\.(\w+)\s+'([^']+)'$")
        .expect("string-arg action regex is a compile-time constant and must be valid")
});

static ACTION_NUM_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^wezterm\.action\.(\w+)\(\s*(-?\d+)\s*\)$")
        .expect("numeric-arg action regex is a compile-time constant and must be valid")
});

static ACTION_TABLE_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^wezterm\.action\.(\w+)\s*\{")
        .expect("table-arg action regex is a compile-time constant and must be valid")
});

/// Apply every recognized setting and key binding from `text` to the store.
///
/// Returns the number of individually applied items (settings plus binding
/// records). Scalar settings are applied incrementally via the store's
/// normal write path; a non-empty parsed binding list replaces the store's
/// mapping list wholesale. The store is never reset here; whether to start
/// from defaults is the caller's decision.
pub fn apply_config_text(store: &mut SettingsStore, text: &str) -> usize {
    let mut applied = 0;

    // Scalar assignments. Structural keys are parsed by their own rules
    // below; matching them here would corrupt or double-count them.
    for caps in SIMPLE_ASSIGN.captures_iter(text) {
        let key = &caps[1];
        let raw_value = caps[2].trim();

        if STRUCTURAL_KEYS.contains(&key) {
            continue;
        }

        // config.font = wezterm.font('...') (and the font_family alias)
        if key == "font" || key == "font_family" {
            if let Some(font) = FONT_CALL.captures(raw_value) {
                store.set_value("font_family", &font[1]);
                applied += 1;
            }
            continue;
        }

        if schema::setting(key).is_none() {
            continue;
        }
        if let Some(value) = parse_lua_value(raw_value) {
            store.set_value(key, &value);
            applied += 1;
        }
    }

    // window_padding table: each side applies independently.
    if let Some(caps) = PADDING_TABLE.captures(text) {
        let inner = &caps[1];
        let mut sides: [Option<String>; 4] = [None, None, None, None];
        for side_caps in PADDING_SIDE.captures_iter(inner) {
            let idx = match &side_caps[1] {
                "left" => 0,
                "right" => 1,
                "top" => 2,
                _ => 3,
            };
            // First occurrence wins.
            if sides[idx].is_none() {
                sides[idx] = Some(side_caps[2].to_string());
            }
        }
        for (side, value) in ["left", "right", "top", "bottom"].iter().zip(sides) {
            if let Some(value) = value {
                store.set_value(&format!("window_padding_{side}"), &value);
                applied += 1;
            }
        }
    }

    // default_prog table → comma-joined argument list.
    if let Some(caps) = PROG_TABLE.captures(text) {
        let items = parse_string_table(&caps[1]);
        if !items.is_empty() {
            store.set_value("default_prog", &items.join(","));
            applied += 1;
        }
    }

    // harfbuzz_features table → comma-separated feature list.
    if let Some(caps) = HARFBUZZ_TABLE.captures(text) {
        let items = parse_string_table(&caps[1]);
        if !items.is_empty() {
            store.set_value("harfbuzz_features", &items.join(", "));
            applied += 1;
        }
    }

    // Key bindings: a non-empty parsed list replaces the current one.
    if let Some(caps) = KEYS_BLOCK.captures(text) {
        let parsed = parse_key_bindings(&caps[1]);
        if !parsed.is_empty() {
            applied += parsed.len();
            log::info!("Imported {} key binding(s)", parsed.len());
            store.replace_mappings(parsed);
        }
    }

    applied
}

/// Interpret a Lua literal: boolean, number, or quoted string.
fn parse_lua_value(raw: &str) -> Option<String> {
    let s = raw.trim_end_matches(',').trim();

    if s == "true" || s == "false" {
        return Some(s.to_string());
    }

    if is_number_lexeme(s) {
        return Some(s.to_string());
    }

    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'\'' && bytes[s.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[s.len() - 1] == b'"')
        {
            let inner = &s[1..s.len() - 1];
            // Reject strings whose quote kind reappears inside; those are
            // expressions, not plain literals.
            if !inner.contains(bytes[0] as char) {
                return Some(inner.to_string());
            }
        }
    }

    None
}

fn is_number_lexeme(s: &str) -> bool {
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

fn parse_string_table(inner: &str) -> Vec<String> {
    QUOTED_ITEM.captures_iter(inner).map(|c| c[1].to_string()).collect()
}

/// Split a `config.keys` block body into individual `{ ... }` entry tables.
///
/// Brace-depth aware so entries whose action carries a table argument
/// (`wezterm.action.SplitHorizontal { domain = ... }`) stay in one piece.
/// Quote-naive: a brace inside a quoted string would confuse it, which is
/// acceptable for a best-effort importer.
fn split_binding_entries(inner: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in inner.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        entries.push(&inner[start..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    entries
}

fn parse_key_bindings(inner: &str) -> Vec<MappingFields> {
    let mut results = Vec::new();

    for entry in split_binding_entries(inner) {
        let Some(key) = KEY_FIELD.captures(entry).map(|c| c[1].to_string()) else {
            continue;
        };
        let mods = MODS_FIELD.captures(entry).map(|c| c[1].to_string()).unwrap_or_default();
        let action = ACTION_FIELD
            .captures(entry)
            .and_then(|c| identify_action(c[1].trim()));

        // Both key and a recognized action are required to keep a record.
        match action {
            Some(action) if !key.is_empty() => {
                results.push(MappingFields::new(mods, key, action));
            }
            _ => log::debug!("Skipping unrecognized binding entry: {}", entry.trim()),
        }
    }

    results
}

/// Map an action expression back to a symbolic action name.
///
/// Four call shapes are recognized; anything else yields `None` and the
/// binding record is skipped entirely.
fn identify_action(expr: &str) -> Option<String> {
    // Bare reference: wezterm.action.FooBar
    if let Some(caps) = ACTION_BARE.captures(expr) {
        return Some(caps[1].to_string());
    }

    // Quoted string argument: wezterm.action.Foo 'bar'
    if let Some(caps) = ACTION_STR_ARG.captures(expr) {
        let name = &caps[1];
        if name == "ActivatePaneDirection" {
            return Some(format!("{}-{}", name, &caps[2]));
        }
        return Some(name.to_string());
    }

    // Signed integer argument: wezterm.action.Foo(N)
    if let Some(caps) = ACTION_NUM_ARG.captures(expr) {
        return Some(format!("{}-{}", &caps[1], &caps[2]));
    }

    // Table argument: wezterm.action.Foo { ... }, contents ignored.
    if let Some(caps) = ACTION_TABLE_ARG.captures(expr) {
        return Some(caps[1].to_string());
    }

    None
}
