//! Command-line interface for wez-conf.
//!
//! This module handles CLI argument parsing and subcommand dispatch. Every
//! subcommand opens the persisted store, performs one operation, and exits;
//! the store persists its own changes on write, so there is no explicit save
//! step anywhere here.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use wez_conf_config::{
    MappingFields, MappingPatch, Modifier, SettingsStore, StorePaths, action_by_value, build_mods,
    catalog, is_catalog_key, is_valid, key_groups, parse_mods, schema,
};
use wez_conf_import::{apply_config_text, fetch_config_text};
use wez_conf_share::{LoadOutcome, UrlResolver, encode_fragment};

use crate::generate::generate_config;

/// wez-conf - Build, import, and share WezTerm configurations
#[derive(Parser)]
#[command(name = "wez-conf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the current value of a setting
    Get {
        /// Setting key, e.g. font_size
        key: String,
    },

    /// Set a setting value (stored even if invalid, but flagged)
    Set {
        /// Setting key, e.g. font_size
        key: String,
        /// New value
        value: String,
    },

    /// Show all settings that differ from their defaults, plus key bindings
    Show,

    /// List every available setting with its default value
    Settings,

    /// List bindable actions by group
    Actions,

    /// List named keys and modifier tokens usable in bindings
    Keys,

    /// Add a key binding
    Bind {
        /// Key token: a named key (F11, PageUp, ...) or a single character
        key: String,
        /// Action name, e.g. CopyTo or ActivatePaneDirection-Left
        action: String,
        /// Pipe-joined modifiers, e.g. CTRL|SHIFT
        #[arg(long, default_value = "")]
        mods: String,
    },

    /// Edit an existing key binding by its position in `show`
    Rebind {
        /// Zero-based binding index
        index: usize,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        mods: Option<String>,
    },

    /// Remove a key binding by its position in `show`
    Unbind {
        /// Zero-based binding index
        index: usize,
    },

    /// Import a wezterm.lua file, replacing the current state
    Import {
        /// Path to a wezterm.lua file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Fetch the file from a GitHub URL instead
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,

        /// Merge into the current state instead of starting from defaults
        #[arg(long)]
        merge: bool,
    },

    /// Print a shareable URL fragment for the current state
    Share {
        /// Prepend a base URL, producing a complete link
        #[arg(long, value_name = "URL")]
        base: Option<String>,
    },

    /// Generate wezterm.lua from the current state
    Render {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Apply state shared through a URL, detecting conflicts
    Load {
        /// A shared URL or its #c=... fragment
        source: String,

        /// On conflict, adopt the shared state (resets local state first)
        #[arg(long)]
        accept: bool,

        /// On conflict, keep local state and discard the shared data
        #[arg(long, conflicts_with = "accept")]
        dismiss: bool,
    },

    /// Restore every setting to its default and remove all key bindings
    Reset,
}

/// Open the persisted store, honoring the `WEZ_CONF_DATA_DIR` override.
fn open_store() -> SettingsStore {
    match std::env::var("WEZ_CONF_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => SettingsStore::load_with_paths(StorePaths::with_dir(dir)),
        _ => SettingsStore::load(),
    }
}

/// Parse arguments and run the selected subcommand.
///
/// Returns the process exit code: 0 on success, 1 on operational failure or
/// an unresolved conflict (so scripts can detect it).
pub fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    let mut store = open_store();
    // Trace every store mutation when RUST_LOG=debug is set.
    store.subscribe(|event| log::debug!("store change: {:?}", event));

    match cli.command {
        Commands::Get { key } => {
            println!("{}", store.value(&key));
            Ok(0)
        }

        Commands::Set { key, value } => {
            let Some(def) = schema::setting(&key) else {
                eprintln!("wez-conf: unknown setting '{key}'");
                return Ok(1);
            };
            store.set_value(&key, &value);
            if !is_valid(def, &value) {
                eprintln!(
                    "wez-conf: warning: '{value}' is not a valid value for {key}; \
                     it will be excluded from generated output until corrected"
                );
            }
            Ok(0)
        }

        Commands::Show => {
            let changed = store.changed_entries();
            if changed.is_empty() && store.mappings().is_empty() {
                println!("(all defaults, no key bindings)");
                return Ok(0);
            }
            for (key, value) in &changed {
                println!("{key} = {value}");
            }
            for (key, value) in store.changed_values() {
                if let Some(def) = schema::setting(&key)
                    && !is_valid(def, &value)
                {
                    println!("{key} = {value}  (invalid, excluded from output)");
                }
            }
            for mapping in store.mappings() {
                if mapping.mods.is_empty() {
                    println!("bind {} -> {}", mapping.key, mapping.action);
                } else {
                    println!("bind {}+{} -> {}", mapping.mods, mapping.key, mapping.action);
                }
            }
            Ok(0)
        }

        Commands::Settings => {
            for category in schema::CATEGORIES {
                println!("[{}]", category.title);
                for def in category.settings {
                    if def.default.is_empty() {
                        println!("  {}", def.key);
                    } else {
                        println!("  {} (default: {})", def.key, def.default);
                    }
                    if let Some(description) = def.description {
                        println!("      {description}");
                    }
                }
            }
            Ok(0)
        }

        Commands::Actions => {
            for group in catalog::ACTION_GROUPS {
                println!("[{}]", group.label);
                for action in group.actions {
                    println!("  {} - {}", action.value, action.label);
                }
            }
            Ok(0)
        }

        Commands::Keys => {
            let mods: Vec<&str> = Modifier::ALL.iter().map(|m| m.token()).collect();
            println!("Modifiers: {}", mods.join(", "));
            for group in key_groups() {
                let keys: Vec<&str> = group.keys.iter().map(|k| k.value.as_str()).collect();
                println!("[{}] {}", group.label, keys.join(" "));
            }
            Ok(0)
        }

        Commands::Bind { key, action, mods } => {
            if !is_catalog_key(&key) {
                eprintln!("wez-conf: '{key}' is not a named key or single character; see `wez-conf keys`");
                return Ok(1);
            }
            if action_by_value(&action).is_none() {
                eprintln!("wez-conf: note: '{action}' is not a catalog action; it will be kept verbatim");
            }
            // Canonicalize modifier order and drop unknown tokens.
            let mods = build_mods(&parse_mods(&mods));
            store.add_mapping(MappingFields::new(mods, key, action));
            Ok(0)
        }

        Commands::Rebind { index, key, action, mods } => {
            let Some(mapping) = store.mappings().get(index) else {
                eprintln!("wez-conf: no binding at index {index}");
                return Ok(1);
            };
            let id = mapping.id;
            let patch = MappingPatch {
                mods: mods.map(|m| build_mods(&parse_mods(&m))),
                key,
                action,
            };
            store.update_mapping(id, patch);
            Ok(0)
        }

        Commands::Unbind { index } => {
            let Some(mapping) = store.mappings().get(index) else {
                eprintln!("wez-conf: no binding at index {index}");
                return Ok(1);
            };
            let id = mapping.id;
            store.remove_mapping(id);
            Ok(0)
        }

        Commands::Import { file, url, merge } => {
            let text = match (&file, &url) {
                (_, Some(url)) => fetch_config_text(url)?,
                (Some(path), _) => std::fs::read_to_string(path)?,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            // Imports start from defaults unless asked to merge; the parser
            // itself never resets.
            if !merge {
                store.reset();
            }
            let applied = apply_config_text(&mut store, &text);
            println!("Applied {applied} setting(s)");
            Ok(0)
        }

        Commands::Share { base } => match encode_fragment(&store) {
            Some(fragment) => {
                let link = match base {
                    Some(base) => format!("{}#{}", base.trim_end_matches('#'), fragment),
                    None => format!("#{fragment}"),
                };
                if link.len() > 2000 {
                    log::warn!("Share link is {} characters; some apps truncate long URLs", link.len());
                }
                println!("{link}");
                Ok(0)
            }
            None => {
                eprintln!("wez-conf: nothing to share (all defaults, no key bindings)");
                Ok(1)
            }
        },

        Commands::Render { output } => {
            let lua = generate_config(&store);
            match output {
                Some(path) => {
                    std::fs::write(&path, lua)?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{lua}"),
            }
            Ok(0)
        }

        Commands::Load { source, accept, dismiss } => {
            let fragment = source.rsplit_once('#').map(|(_, f)| f).unwrap_or(&source);
            let mut resolver = UrlResolver::new();
            match resolver.load_fragment(&mut store, fragment) {
                LoadOutcome::NoData => {
                    eprintln!("wez-conf: no usable shared config in that URL");
                    Ok(1)
                }
                LoadOutcome::Applied => {
                    println!("Applied shared config");
                    Ok(0)
                }
                LoadOutcome::Conflict => {
                    if accept {
                        resolver.accept_pending(&mut store);
                        println!("Adopted shared config, replacing local state");
                        return Ok(0);
                    }
                    if dismiss {
                        resolver.dismiss_pending();
                        println!("Kept local state");
                        return Ok(0);
                    }
                    report_conflict(&store, &resolver);
                    eprintln!(
                        "wez-conf: shared config differs from local state; \
                         re-run with --accept to adopt it or --dismiss to keep yours"
                    );
                    Ok(1)
                }
            }
        }

        Commands::Reset => {
            store.reset();
            println!("Reset to defaults");
            Ok(0)
        }
    }
}

fn report_conflict(store: &SettingsStore, resolver: &UrlResolver) {
    let Some(pending) = resolver.pending() else {
        return;
    };
    println!("Shared config:");
    for (key, value) in &pending.settings {
        println!("  {key} = {value}");
    }
    if !pending.mappings.is_empty() {
        println!("  {} key binding(s)", pending.mappings.len());
    }
    println!("Local config:");
    for (key, value) in store.changed_entries() {
        println!("  {key} = {value}");
    }
    if !store.mappings().is_empty() {
        println!("  {} key binding(s)", store.mappings().len());
    }
}
