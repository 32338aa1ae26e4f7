//! Library exports for the wez-conf application crate.
//!
//! The heavy lifting lives in the member crates (`wez-conf-config`,
//! `wez-conf-import`, `wez-conf-share`); this crate adds the CLI surface and
//! the wezterm.lua generator, and re-exports both for integration tests.

pub mod cli;
pub mod generate;

/// Application version (root crate version).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
