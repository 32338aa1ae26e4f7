//! Compact share encoding and URL conflict resolution for wez-conf.
//!
//! - [`codec`] — deterministic, reversible compression of everything that
//!   differs from defaults into a short URL-safe token, and its tolerant
//!   inverse.
//! - [`resolver`] — the three-outcome protocol for adopting, rejecting, or
//!   deferring state carried by an incoming share URL.

pub mod codec;
pub mod resolver;

pub use codec::{
    DecodedData, WireAction, decode_compact, decode_fragment, decompress, encode_compact,
    encode_fragment, compress, token_from_fragment,
};
pub use resolver::{LoadOutcome, UrlResolver};
