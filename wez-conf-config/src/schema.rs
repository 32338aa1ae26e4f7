//! Static catalog of WezTerm settings editable through wez-conf.
//!
//! Every setting carries a *stable share id* (`sid`) used in the compact
//! share encoding. Sids are assigned once and never reused or changed, even
//! if a setting is later removed: they are the only identifier written into
//! shared URLs, so their meaning must stay stable across releases. Each
//! category starts at a round base (0, 1, 10, 20, 40, 50) to leave room for
//! future settings without renumbering.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Value type of a setting, driving validation and Lua literal formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    /// Free-form string, always valid.
    String,
    /// Signed decimal number, optionally range-limited.
    Float,
    /// Signed integer, optionally range-limited.
    Int,
    /// One of a fixed set of options. `color_scheme` is the free-form
    /// exception; any string is accepted there.
    Enum,
    /// Exactly `"true"` or `"false"`.
    Bool,
}

/// Immutable definition of one setting.
///
/// All values are stored and compared as strings; `default` is the
/// string-encoded default value.
#[derive(Debug)]
pub struct SettingDef {
    pub key: &'static str,
    /// Stable share id. Never reuse or change once assigned.
    pub sid: u16,
    pub label: &'static str,
    pub ty: SettingType,
    pub default: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// UI step hint for numeric settings. Not used for validation.
    pub step: Option<f64>,
    /// Allowed values for enum settings (empty for other types).
    pub options: &'static [&'static str],
    pub description: Option<&'static str>,
}

impl SettingDef {
    const fn new(
        key: &'static str,
        sid: u16,
        label: &'static str,
        ty: SettingType,
        default: &'static str,
    ) -> Self {
        Self {
            key,
            sid,
            label,
            ty,
            default,
            min: None,
            max: None,
            step: None,
            options: &[],
            description: None,
        }
    }

    const fn string(key: &'static str, sid: u16, label: &'static str, default: &'static str) -> Self {
        Self::new(key, sid, label, SettingType::String, default)
    }

    const fn float(key: &'static str, sid: u16, label: &'static str, default: &'static str) -> Self {
        Self::new(key, sid, label, SettingType::Float, default)
    }

    const fn int(key: &'static str, sid: u16, label: &'static str, default: &'static str) -> Self {
        Self::new(key, sid, label, SettingType::Int, default)
    }

    const fn boolean(key: &'static str, sid: u16, label: &'static str, default: &'static str) -> Self {
        Self::new(key, sid, label, SettingType::Bool, default)
    }

    const fn enumeration(
        key: &'static str,
        sid: u16,
        label: &'static str,
        default: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        let mut def = Self::new(key, sid, label, SettingType::Enum, default);
        def.options = options;
        def
    }

    const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    const fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// A titled group of settings. Declaration order is the canonical iteration
/// order everywhere (changed-entry listing, compact encoding, generation).
#[derive(Debug)]
pub struct Category {
    pub id: &'static str,
    pub title: &'static str,
    pub settings: &'static [SettingDef],
}

pub static CATEGORIES: &[Category] = &[
    Category {
        id: "color_scheme",
        title: "Color Scheme",
        settings: &[
            SettingDef::enumeration("color_scheme", 0, "Color scheme", "", &[])
                .describe("Built-in color scheme name. Leave empty for default."),
        ],
    },
    Category {
        id: "fonts",
        title: "Fonts",
        settings: &[
            SettingDef::string("font_family", 1, "Font family", "")
                .describe("Generates wezterm.font() call"),
            SettingDef::float("font_size", 2, "Font size", "12.0")
                .range(1.0, 72.0)
                .step(0.5),
            SettingDef::float("line_height", 3, "Line height", "1.0")
                .range(0.5, 3.0)
                .step(0.05),
            SettingDef::float("cell_width", 4, "Cell width", "1.0")
                .range(0.5, 2.0)
                .step(0.05),
            SettingDef::enumeration(
                "bold_brightens_ansi_colors",
                5,
                "Bold brightens ANSI",
                "BrightAndBold",
                &["BrightAndBold", "BrightOnly", "No"],
            ),
            SettingDef::enumeration(
                "freetype_load_target",
                6,
                "FreeType load target",
                "Normal",
                &["Normal", "Light", "Mono", "HorizontalLcd"],
            ),
            SettingDef::string("harfbuzz_features", 7, "HarfBuzz features", "")
                .describe("Comma-separated, e.g. calt=1, liga=1"),
        ],
    },
    Category {
        id: "cursor",
        title: "Cursor",
        settings: &[
            SettingDef::enumeration(
                "default_cursor_style",
                10,
                "Style",
                "SteadyBlock",
                &[
                    "SteadyBlock",
                    "BlinkingBlock",
                    "SteadyUnderline",
                    "BlinkingUnderline",
                    "SteadyBar",
                    "BlinkingBar",
                ],
            ),
            SettingDef::int("cursor_blink_rate", 11, "Blink rate", "800")
                .min(0.0)
                .describe("Milliseconds. 0 = no blink"),
            SettingDef::boolean("force_reverse_video_cursor", 12, "Reverse video cursor", "false"),
            SettingDef::float("cursor_thickness", 13, "Thickness", "1.0")
                .range(0.1, 5.0)
                .step(0.1)
                .describe("Pixels"),
            SettingDef::int("animation_fps", 14, "Animation FPS", "10").range(1.0, 120.0),
        ],
    },
    Category {
        id: "window",
        title: "Window",
        settings: &[
            SettingDef::enumeration(
                "window_decorations",
                20,
                "Decorations",
                "FULL",
                &["FULL", "NONE", "TITLE", "RESIZE", "TITLE | RESIZE"],
            ),
            SettingDef::float("window_background_opacity", 21, "Background opacity", "1.0")
                .range(0.0, 1.0)
                .step(0.05),
            SettingDef::int("macos_window_background_blur", 22, "macOS bg blur", "0")
                .range(0.0, 100.0)
                .describe("macOS background blur radius"),
            SettingDef::float("text_background_opacity", 23, "Text bg opacity", "1.0")
                .range(0.0, 1.0)
                .step(0.05),
            SettingDef::int("window_padding_left", 24, "Padding left", "0")
                .min(0.0)
                .describe("Grouped as window_padding in Lua output"),
            SettingDef::int("window_padding_right", 25, "Padding right", "0").min(0.0),
            SettingDef::int("window_padding_top", 26, "Padding top", "0").min(0.0),
            SettingDef::int("window_padding_bottom", 27, "Padding bottom", "0").min(0.0),
            SettingDef::int("initial_cols", 28, "Initial columns", "80").min(1.0),
            SettingDef::int("initial_rows", 29, "Initial rows", "24").min(1.0),
            SettingDef::enumeration(
                "window_close_confirmation",
                30,
                "Close confirmation",
                "AlwaysPrompt",
                &["AlwaysPrompt", "NeverPrompt"],
            ),
            SettingDef::boolean(
                "adjust_window_size_when_changing_font_size",
                31,
                "Adjust size on font change",
                "true",
            ),
            SettingDef::int("max_fps", 32, "Max FPS", "60").range(1.0, 255.0),
        ],
    },
    Category {
        id: "tab_bar",
        title: "Tab Bar",
        settings: &[
            SettingDef::boolean("enable_tab_bar", 40, "Enable tab bar", "true"),
            SettingDef::boolean("hide_tab_bar_if_only_one_tab", 41, "Hide if one tab", "false"),
            SettingDef::boolean("tab_bar_at_bottom", 42, "Tab bar at bottom", "false"),
            SettingDef::boolean("use_fancy_tab_bar", 43, "Fancy tab bar", "true"),
            SettingDef::int("tab_max_width", 44, "Tab max width", "16").min(1.0),
            SettingDef::boolean("show_tab_index_in_tab_bar", 45, "Show tab index", "true"),
            SettingDef::boolean(
                "show_new_tab_button_in_tab_bar",
                46,
                "Show new tab button",
                "true",
            ),
        ],
    },
    Category {
        id: "terminal",
        title: "Terminal",
        settings: &[
            SettingDef::int("scrollback_lines", 50, "Scrollback lines", "3500").min(0.0),
            SettingDef::boolean("enable_scroll_bar", 51, "Scroll bar", "false"),
            SettingDef::string("term", 52, "TERM", "xterm-256color"),
            SettingDef::boolean("automatically_reload_config", 53, "Auto-reload config", "true"),
            SettingDef::enumeration(
                "exit_behavior",
                54,
                "Exit behavior",
                "CloseOnCleanExit",
                &["CloseOnCleanExit", "Hold", "Close"],
            ),
            SettingDef::enumeration(
                "exit_behavior_messaging",
                55,
                "Exit messaging",
                "Verbose",
                &["Verbose", "Brief", "None"],
            ),
            SettingDef::string("default_prog", 56, "Default program", "")
                .describe("Comma-separated args, e.g. /bin/bash,-l"),
            SettingDef::string("default_cwd", 57, "Default CWD", ""),
            SettingDef::enumeration(
                "front_end",
                58,
                "Front end",
                "OpenGL",
                &["OpenGL", "WebGpu", "Software"],
            ),
        ],
    },
];

static BY_KEY: LazyLock<HashMap<&'static str, &'static SettingDef>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .flat_map(|c| c.settings.iter())
        .map(|s| (s.key, s))
        .collect()
});

static BY_SID: LazyLock<HashMap<u16, &'static SettingDef>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .flat_map(|c| c.settings.iter())
        .map(|s| (s.sid, s))
        .collect()
});

/// Look up a setting definition by key.
pub fn setting(key: &str) -> Option<&'static SettingDef> {
    BY_KEY.get(key).copied()
}

/// Look up a setting definition by stable share id (compact decode path).
pub fn setting_by_sid(sid: u16) -> Option<&'static SettingDef> {
    BY_SID.get(&sid).copied()
}

/// All settings in category declaration order.
pub fn settings() -> impl Iterator<Item = &'static SettingDef> {
    CATEGORIES.iter().flat_map(|c| c.settings.iter())
}
