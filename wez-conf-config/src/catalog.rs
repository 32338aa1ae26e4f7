//! Action and key catalogs for key-binding mappings.
//!
//! Actions carry a *stable action id* (`aid`) with the same stability
//! contract as setting sids: assigned once, never reused, never changed.
//! The compact share encoding writes aids for recognized actions and the
//! literal action string for anything it does not recognize, so bindings to
//! actions from newer (or older) releases survive a round trip verbatim.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;
use uuid::Uuid;

/// One catalog action: symbolic value, stable id, and the Lua expression
/// emitted for it by the config generator.
#[derive(Debug)]
pub struct ActionDef {
    /// Stable action id. Never reuse or change once assigned.
    pub aid: u16,
    /// Symbolic action name, e.g. `"ActivatePaneDirection-Left"`.
    pub value: &'static str,
    pub label: &'static str,
    /// Lua expression for the action.
    pub lua: &'static str,
}

#[derive(Debug)]
pub struct ActionGroup {
    pub label: &'static str,
    pub actions: &'static [ActionDef],
}

const fn action(aid: u16, value: &'static str, label: &'static str, lua: &'static str) -> ActionDef {
    ActionDef { aid, value, label, lua }
}

pub static ACTION_GROUPS: &[ActionGroup] = &[
    ActionGroup {
        label: "Clipboard",
        actions: &[
            action(1, "CopyTo", "Copy to clipboard", "wezterm.action.CopyTo 'Clipboard'"),
            action(2, "PasteFrom", "Paste from clipboard", "wezterm.action.PasteFrom 'Clipboard'"),
        ],
    },
    ActionGroup {
        label: "Panes",
        actions: &[
            action(
                3,
                "SplitHorizontal",
                "Split horizontal",
                "wezterm.action.SplitHorizontal { domain = 'CurrentPaneDomain' }",
            ),
            action(
                4,
                "SplitVertical",
                "Split vertical",
                "wezterm.action.SplitVertical { domain = 'CurrentPaneDomain' }",
            ),
            action(
                5,
                "CloseCurrentPane",
                "Close pane",
                "wezterm.action.CloseCurrentPane { confirm = true }",
            ),
            action(
                6,
                "ActivatePaneDirection-Left",
                "Focus pane left",
                "wezterm.action.ActivatePaneDirection 'Left'",
            ),
            action(
                7,
                "ActivatePaneDirection-Right",
                "Focus pane right",
                "wezterm.action.ActivatePaneDirection 'Right'",
            ),
            action(
                8,
                "ActivatePaneDirection-Up",
                "Focus pane up",
                "wezterm.action.ActivatePaneDirection 'Up'",
            ),
            action(
                9,
                "ActivatePaneDirection-Down",
                "Focus pane down",
                "wezterm.action.ActivatePaneDirection 'Down'",
            ),
            action(
                10,
                "TogglePaneZoomState",
                "Toggle pane zoom",
                "wezterm.action.TogglePaneZoomState",
            ),
        ],
    },
    ActionGroup {
        label: "Tabs",
        actions: &[
            action(11, "SpawnTab", "New tab", "wezterm.action.SpawnTab 'CurrentPaneDomain'"),
            action(
                12,
                "CloseCurrentTab",
                "Close tab",
                "wezterm.action.CloseCurrentTab { confirm = true }",
            ),
            action(13, "ActivateTabRelative-1", "Next tab", "wezterm.action.ActivateTabRelative(1)"),
            action(
                14,
                "ActivateTabRelative--1",
                "Previous tab",
                "wezterm.action.ActivateTabRelative(-1)",
            ),
            action(15, "MoveTabRelative-1", "Move tab right", "wezterm.action.MoveTabRelative(1)"),
            action(16, "MoveTabRelative--1", "Move tab left", "wezterm.action.MoveTabRelative(-1)"),
        ],
    },
    ActionGroup {
        label: "Window",
        actions: &[
            action(17, "ToggleFullScreen", "Toggle fullscreen", "wezterm.action.ToggleFullScreen"),
            action(18, "SpawnWindow", "New window", "wezterm.action.SpawnWindow"),
        ],
    },
    ActionGroup {
        label: "Font Size",
        actions: &[
            action(19, "IncreaseFontSize", "Increase font", "wezterm.action.IncreaseFontSize"),
            action(20, "DecreaseFontSize", "Decrease font", "wezterm.action.DecreaseFontSize"),
            action(21, "ResetFontSize", "Reset font size", "wezterm.action.ResetFontSize"),
        ],
    },
    ActionGroup {
        label: "Scrolling",
        actions: &[
            action(22, "ScrollByPage-1", "Scroll page up", "wezterm.action.ScrollByPage(-1)"),
            action(23, "ScrollByPage+1", "Scroll page down", "wezterm.action.ScrollByPage(1)"),
            action(24, "ScrollByLine--1", "Scroll line up", "wezterm.action.ScrollByLine(-1)"),
            action(25, "ScrollByLine-1", "Scroll line down", "wezterm.action.ScrollByLine(1)"),
            action(26, "ScrollToTop", "Scroll to top", "wezterm.action.ScrollToTop"),
            action(27, "ScrollToBottom", "Scroll to bottom", "wezterm.action.ScrollToBottom"),
        ],
    },
    ActionGroup {
        label: "Search",
        actions: &[action(
            28,
            "Search",
            "Search",
            "wezterm.action.Search 'CurrentSelectionOrEmptyString'",
        )],
    },
    ActionGroup {
        label: "Misc",
        actions: &[
            action(29, "ShowDebugOverlay", "Debug overlay", "wezterm.action.ShowDebugOverlay"),
            action(30, "ActivateCopyMode", "Copy mode", "wezterm.action.ActivateCopyMode"),
            action(31, "QuickSelect", "Quick select", "wezterm.action.QuickSelect"),
            action(32, "ShowLauncher", "Show launcher", "wezterm.action.ShowLauncher"),
            action(33, "ReloadConfiguration", "Reload config", "wezterm.action.ReloadConfiguration"),
        ],
    },
];

static ACTION_BY_VALUE: LazyLock<HashMap<&'static str, &'static ActionDef>> = LazyLock::new(|| {
    ACTION_GROUPS
        .iter()
        .flat_map(|g| g.actions.iter())
        .map(|a| (a.value, a))
        .collect()
});

static ACTION_BY_AID: LazyLock<HashMap<u16, &'static ActionDef>> = LazyLock::new(|| {
    ACTION_GROUPS
        .iter()
        .flat_map(|g| g.actions.iter())
        .map(|a| (a.aid, a))
        .collect()
});

/// Look up a catalog action by symbolic name.
pub fn action_by_value(value: &str) -> Option<&'static ActionDef> {
    ACTION_BY_VALUE.get(value).copied()
}

/// Look up a catalog action by stable id (compact decode path).
pub fn action_by_aid(aid: u16) -> Option<&'static ActionDef> {
    ACTION_BY_AID.get(&aid).copied()
}

/// Lua expression for an action name.
///
/// Unknown actions fall back to `wezterm.action.<name>` so user-entered
/// actions outside the catalog still generate something plausible.
pub fn action_lua(value: &str) -> String {
    match action_by_value(value) {
        Some(def) => def.lua.to_string(),
        None => format!("wezterm.action.{value}"),
    }
}

// ============================================================================
// Modifiers and keys
// ============================================================================

/// Keyboard modifier tokens, in canonical serialization order.
///
/// `Ord` follows declaration order, so a `BTreeSet<Modifier>` iterates in the
/// order [`build_mods`] serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Super,
    Leader,
}

impl Modifier {
    pub const ALL: [Modifier; 5] = [
        Modifier::Ctrl,
        Modifier::Shift,
        Modifier::Alt,
        Modifier::Super,
        Modifier::Leader,
    ];

    /// Wire token, e.g. `"CTRL"`.
    pub fn token(self) -> &'static str {
        match self {
            Modifier::Ctrl => "CTRL",
            Modifier::Shift => "SHIFT",
            Modifier::Alt => "ALT",
            Modifier::Super => "SUPER",
            Modifier::Leader => "LEADER",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "CTRL" => Some(Modifier::Ctrl),
            "SHIFT" => Some(Modifier::Shift),
            "ALT" => Some(Modifier::Alt),
            "SUPER" => Some(Modifier::Super),
            "LEADER" => Some(Modifier::Leader),
            _ => None,
        }
    }
}

/// Parse a pipe-joined modifier string like `"CTRL|SHIFT"`.
///
/// Tokens are trimmed and upper-cased; unknown tokens are dropped.
pub fn parse_mods(mods: &str) -> BTreeSet<Modifier> {
    let mut result = BTreeSet::new();
    if mods.is_empty() {
        return result;
    }
    for part in mods.split('|') {
        if let Some(m) = Modifier::from_token(&part.trim().to_uppercase()) {
            result.insert(m);
        }
    }
    result
}

/// Serialize a modifier set in canonical order, pipe-joined.
pub fn build_mods(modifiers: &BTreeSet<Modifier>) -> String {
    modifiers
        .iter()
        .map(|m| m.token())
        .collect::<Vec<_>>()
        .join("|")
}

/// One key in the named-key catalog.
#[derive(Debug, Clone)]
pub struct KeyDef {
    pub value: String,
    pub label: String,
}

/// A titled group of keys.
#[derive(Debug)]
pub struct KeyGroup {
    pub label: &'static str,
    pub keys: Vec<KeyDef>,
}

fn key(value: &str, label: &str) -> KeyDef {
    KeyDef { value: value.to_string(), label: label.to_string() }
}

static KEY_GROUPS_DATA: LazyLock<Vec<KeyGroup>> = LazyLock::new(|| {
    vec![
        KeyGroup {
            label: "Letters",
            keys: ('a'..='z').map(|c| key(&c.to_string(), &c.to_string())).collect(),
        },
        KeyGroup {
            label: "Numbers",
            keys: (0..10).map(|i| key(&i.to_string(), &i.to_string())).collect(),
        },
        KeyGroup {
            label: "Function",
            keys: (1..=12).map(|i| key(&format!("F{i}"), &format!("F{i}"))).collect(),
        },
        KeyGroup {
            label: "Navigation",
            keys: vec![
                key("UpArrow", "Up"),
                key("DownArrow", "Down"),
                key("LeftArrow", "Left"),
                key("RightArrow", "Right"),
                key("Home", "Home"),
                key("End", "End"),
                key("PageUp", "Page Up"),
                key("PageDown", "Page Down"),
                key("Insert", "Insert"),
                key("Delete", "Delete"),
            ],
        },
        KeyGroup {
            label: "Whitespace",
            keys: vec![
                key("Return", "Enter"),
                key("Escape", "Escape"),
                key("Tab", "Tab"),
                key("Backspace", "Backspace"),
                key("Space", "Space"),
            ],
        },
        KeyGroup {
            label: "Punctuation",
            keys: vec![
                key("-", "- minus"),
                key("=", "= equal"),
                key("[", "[ bracket"),
                key("]", "] bracket"),
                key("\\", "\\ backslash"),
                key(";", "; semicolon"),
                key("'", "' apostrophe"),
                key("`", "` grave"),
                key(",", ", comma"),
                key(".", ". period"),
                key("/", "/ slash"),
                key("|", "| pipe"),
            ],
        },
    ]
});

static KEY_VALUES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    KEY_GROUPS_DATA
        .iter()
        .flat_map(|g| g.keys.iter())
        .map(|k| k.value.as_str())
        .collect()
});

/// All named-key groups.
pub fn key_groups() -> &'static [KeyGroup] {
    &KEY_GROUPS_DATA
}

/// Whether a key token is representable in the catalog: a named key, any
/// single character, or empty (an unfinished binding row).
pub fn is_catalog_key(key: &str) -> bool {
    key.is_empty() || KEY_VALUES.contains(key) || key.chars().count() == 1
}

// ============================================================================
// Mapping types
// ============================================================================

/// One key binding held by the store.
///
/// `id` is session-local only: regenerated on every load, never persisted,
/// never shared. Everything else round-trips through persistence and the
/// compact encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub id: Uuid,
    /// Pipe-joined modifier tokens in canonical order (may be empty).
    pub mods: String,
    /// Named key or single character.
    pub key: String,
    /// Symbolic action name. Names outside the catalog are preserved verbatim.
    pub action: String,
}

impl Mapping {
    /// The persisted/wire shape of this mapping (id stripped).
    pub fn fields(&self) -> MappingFields {
        MappingFields {
            mods: self.mods.clone(),
            key: self.key.clone(),
            action: self.action.clone(),
        }
    }
}

/// A mapping without its session-local id: the persisted and wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFields {
    #[serde(default)]
    pub mods: String,
    pub key: String,
    pub action: String,
}

impl MappingFields {
    pub fn new(mods: impl Into<String>, key: impl Into<String>, action: impl Into<String>) -> Self {
        Self { mods: mods.into(), key: key.into(), action: action.into() }
    }

    /// Attach a fresh session-local id.
    pub fn into_mapping(self) -> Mapping {
        Mapping { id: Uuid::new_v4(), mods: self.mods, key: self.key, action: self.action }
    }
}

/// Partial update for [`SettingsStore::update_mapping`].
///
/// [`SettingsStore::update_mapping`]: crate::store::SettingsStore::update_mapping
#[derive(Debug, Clone, Default)]
pub struct MappingPatch {
    pub mods: Option<String>,
    pub key: Option<String>,
    pub action: Option<String>,
}
