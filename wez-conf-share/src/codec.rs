//! Compact, versionless encoding of changed state for share URLs.
//!
//! The wire format is a compressed rendering of a small compact text:
//!
//! ```text
//! compact   := settings ("|" mappings)?
//! settings  := (pair ("&" pair)*)?
//! pair      := <sid:int> "=" <value:string>
//! mappings  := JSON array of [mods:string, key:string, action:(int|string)]
//! ```
//!
//! Only stable ids go on the wire, never setting keys, so keys can be
//! renamed without breaking old URLs. The compact text is raw-deflated and
//! base64-encoded with the URL-safe alphabet, no padding, producing the
//! `<token>` of a `#c=<token>` fragment.
//!
//! Decoding is tolerant of corruption at every stage: an undecodable token
//! yields no data, unknown sids are dropped pair-by-pair, and a malformed
//! mapping array yields an empty mapping list without discarding the
//! settings already parsed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use wez_conf_config::{
    MappingFields, SettingsStore, action_by_aid, action_by_value, setting, setting_by_sid,
};

/// Action component of a wire triple: the stable id for catalog actions, the
/// literal name for anything unrecognized. Keeping this a tagged union (not
/// a stringly coercion) is what makes unknown-action round-trips type-safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireAction {
    Id(u16),
    Name(String),
}

type WireTriple = (String, String, WireAction);

/// A fully decoded `(settings, mappings)` pair from a share token.
///
/// Held as the pending URL state while a conflict awaits resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedData {
    /// Setting key/value pairs, ids already resolved back to keys.
    pub settings: Vec<(String, String)>,
    /// Mapping list in wire order.
    pub mappings: Vec<MappingFields>,
}

impl DecodedData {
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty() && self.mappings.is_empty()
    }
}

/// Build the compact text for the given changed entries and mappings.
///
/// Entries whose key has no schema definition are skipped (they cannot be
/// assigned a stable id). An empty state yields an empty string.
pub fn encode_compact(changed: &[(&str, String)], mappings: &[MappingFields]) -> String {
    let mut parts = Vec::new();
    for (key, value) in changed {
        if let Some(def) = setting(key) {
            parts.push(format!("{}={}", def.sid, value));
        }
    }
    let mut result = parts.join("&");

    if !mappings.is_empty() {
        let triples: Vec<WireTriple> = mappings
            .iter()
            .map(|m| {
                let action = match action_by_value(&m.action) {
                    Some(def) => WireAction::Id(def.aid),
                    None => WireAction::Name(m.action.clone()),
                };
                (m.mods.clone(), m.key.clone(), action)
            })
            .collect();
        result.push('|');
        result.push_str(
            &serde_json::to_string(&triples)
                .expect("serializing strings and integers to JSON cannot fail"),
        );
    }

    result
}

/// Parse a compact text back into settings and mappings.
pub fn decode_compact(input: &str) -> DecodedData {
    let (settings_part, mappings_part) = match input.split_once('|') {
        Some((left, right)) => (left, Some(right)),
        None => (input, None),
    };

    let mut settings = Vec::new();
    if !settings_part.is_empty() {
        for pair in settings_part.split('&') {
            let Some((sid_str, value)) = pair.split_once('=') else {
                continue;
            };
            let Ok(sid) = sid_str.parse::<u16>() else {
                continue;
            };
            match setting_by_sid(sid) {
                Some(def) => settings.push((def.key.to_string(), value.to_string())),
                None => log::debug!("Dropping pair with unknown sid {}", sid),
            }
        }
    }

    let mut mappings = Vec::new();
    if let Some(part) = mappings_part {
        match serde_json::from_str::<Vec<WireTriple>>(part) {
            Ok(triples) => {
                mappings = triples
                    .into_iter()
                    .map(|(mods, key, action)| {
                        let action = match action {
                            WireAction::Id(aid) => match action_by_aid(aid) {
                                Some(def) => def.value.to_string(),
                                // Unknown id: keep the numeric string rather
                                // than dropping the binding.
                                None => aid.to_string(),
                            },
                            WireAction::Name(name) => name,
                        };
                        MappingFields::new(mods, key, action)
                    })
                    .collect();
            }
            Err(e) => log::debug!("Dropping malformed mapping array: {}", e),
        }
    }

    DecodedData { settings, mappings }
}

/// Deflate and base64-encode a compact text into a URL-safe token.
pub fn compress(input: &str) -> String {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(input.as_bytes())
        .expect("writing to an in-memory deflate stream cannot fail");
    let compressed = encoder
        .finish()
        .expect("finishing an in-memory deflate stream cannot fail");
    URL_SAFE_NO_PAD.encode(compressed)
}

/// Invert [`compress`]. Any failure (bad base64, bad deflate stream,
/// non-UTF-8 output) yields `None` rather than an error.
pub fn decompress(token: &str) -> Option<String> {
    // Tolerate tokens that kept their base64 padding.
    let bytes = URL_SAFE_NO_PAD.decode(token.trim_end_matches('=')).ok()?;
    let mut text = String::new();
    DeflateDecoder::new(bytes.as_slice()).read_to_string(&mut text).ok()?;
    Some(text)
}

/// Extract the share token from a URL fragment (`#` optional), e.g.
/// `"c=eJxLTc..."` or `"#theme=dark&c=eJxLTc..."`.
pub fn token_from_fragment(fragment: &str) -> Option<&str> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    fragment
        .split('&')
        .find_map(|param| param.strip_prefix("c="))
        .filter(|token| !token.is_empty())
}

/// Decode the share data embedded in a URL fragment, if any.
pub fn decode_fragment(fragment: &str) -> Option<DecodedData> {
    let token = token_from_fragment(fragment)?;
    let compact = decompress(token)?;
    Some(decode_compact(&compact))
}

/// Encode a store's changed state as a `c=<token>` fragment.
///
/// Returns `None` when nothing differs from defaults and no mappings exist
/// (there is nothing worth sharing).
pub fn encode_fragment(store: &SettingsStore) -> Option<String> {
    let changed = store.changed_entries();
    let fields: Vec<MappingFields> =
        store.mappings().iter().map(|m| m.fields()).collect();
    let compact = encode_compact(&changed, &fields);
    if compact.is_empty() {
        return None;
    }
    Some(format!("c={}", compress(&compact)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_compact_settings_only() {
        let changed = vec![("font_size", "14.5".to_string()), ("term", "tmux-256color".to_string())];
        assert_eq!(encode_compact(&changed, &[]), "2=14.5&52=tmux-256color");
    }

    #[test]
    fn test_encode_compact_with_mappings() {
        let changed = vec![("font_size", "14.5".to_string())];
        let mappings = vec![MappingFields::new("CTRL|SHIFT", "c", "CopyTo")];
        assert_eq!(encode_compact(&changed, &mappings), r#"2=14.5|[["CTRL|SHIFT","c",1]]"#);
    }

    #[test]
    fn test_encode_compact_unknown_action_verbatim() {
        let mappings = vec![MappingFields::new("", "x", "SomeFutureAction")];
        assert_eq!(encode_compact(&[], &mappings), r#"|[["","x","SomeFutureAction"]]"#);
    }

    #[test]
    fn test_decode_compact_settings() {
        let decoded = decode_compact("2=14.5&52=tmux-256color");
        assert_eq!(
            decoded.settings,
            vec![
                ("font_size".to_string(), "14.5".to_string()),
                ("term".to_string(), "tmux-256color".to_string()),
            ]
        );
        assert!(decoded.mappings.is_empty());
    }

    #[test]
    fn test_decode_compact_drops_unknown_sid() {
        let decoded = decode_compact("2=14.5&9999=zzz&notapair");
        assert_eq!(decoded.settings.len(), 1);
        assert_eq!(decoded.settings[0].0, "font_size");
    }

    #[test]
    fn test_decode_compact_resolves_action_id() {
        let decoded = decode_compact(r#"|[["CTRL|SHIFT","c",1]]"#);
        assert_eq!(decoded.mappings, vec![MappingFields::new("CTRL|SHIFT", "c", "CopyTo")]);
    }

    #[test]
    fn test_decode_compact_unknown_action_id_kept_numeric() {
        let decoded = decode_compact(r#"|[["","x",9999]]"#);
        assert_eq!(decoded.mappings[0].action, "9999");
    }

    #[test]
    fn test_decode_compact_malformed_mappings_keep_settings() {
        let decoded = decode_compact("2=14.5|this is not json");
        assert_eq!(decoded.settings.len(), 1);
        assert!(decoded.mappings.is_empty());
    }

    #[test]
    fn test_compress_roundtrip() {
        let compact = r#"2=14.5&52=tmux-256color|[["CTRL|SHIFT","c",1]]"#;
        let token = compress(compact);
        // URL-safe alphabet, no padding.
        assert!(!token.contains('+') && !token.contains('/') && !token.contains('='));
        assert_eq!(decompress(&token).as_deref(), Some(compact));
    }

    #[test]
    fn test_decompress_garbage_is_none() {
        assert!(decompress("!!!not base64!!!").is_none());
        // Valid base64, not a deflate stream.
        assert!(decompress(&URL_SAFE_NO_PAD.encode(b"plain bytes")).is_none());
    }

    #[test]
    fn test_token_from_fragment() {
        assert_eq!(token_from_fragment("c=abc123"), Some("abc123"));
        assert_eq!(token_from_fragment("#c=abc123"), Some("abc123"));
        assert_eq!(token_from_fragment("#theme=dark&c=abc123"), Some("abc123"));
        assert_eq!(token_from_fragment("#theme=dark"), None);
        assert_eq!(token_from_fragment("#c="), None);
        assert_eq!(token_from_fragment(""), None);
    }

    #[test]
    fn test_full_roundtrip_preserves_state() {
        let changed = vec![
            ("color_scheme", "Dracula".to_string()),
            ("font_size", "14.5".to_string()),
            ("enable_tab_bar", "false".to_string()),
        ];
        let mappings = vec![
            MappingFields::new("CTRL|SHIFT", "c", "CopyTo"),
            MappingFields::new("", "F11", "ToggleFullScreen"),
            MappingFields::new("ALT", "q", "NotInTheCatalog"),
        ];
        let token = compress(&encode_compact(&changed, &mappings));
        let decoded = decode_compact(&decompress(&token).unwrap());

        let decoded_keys: Vec<&str> = decoded.settings.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(decoded_keys, vec!["color_scheme", "font_size", "enable_tab_bar"]);
        // Mapping order is significant; unknown actions survive verbatim.
        assert_eq!(decoded.mappings, mappings);
    }

    #[test]
    fn test_mappings_only_roundtrip() {
        let mappings = vec![MappingFields::new("CTRL", "v", "PasteFrom")];
        let compact = encode_compact(&[], &mappings);
        let decoded = decode_compact(&compact);
        assert!(decoded.settings.is_empty());
        assert_eq!(decoded.mappings, mappings);
    }
}
