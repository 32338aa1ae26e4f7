//! Importing externally authored wezterm.lua configurations.
//!
//! Two pieces:
//!
//! - [`extract`] — best-effort, pattern-based extraction of settings and key
//!   bindings from config text of unknown structure. Tolerant by contract:
//!   anything it cannot confidently interpret is skipped, never a failure.
//! - [`fetch`] — retrieval of config text hosted on GitHub, with URL
//!   rewriting and validation.

pub mod extract;
pub mod fetch;

pub use extract::apply_config_text;
pub use fetch::{FetchError, fetch_config_text, to_raw_github};
