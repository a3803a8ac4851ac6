//! Shared pattern utilities for the user-agent capability index.
//!
//! Both halves of the system lean on this crate: the compiler uses it to turn
//! catalog section names into stored regex fragments, and the lookup engine
//! uses it to hash incoming user agents and to turn a matched fragment back
//! into the literal section name that keys the property records.
//!
//! ## What lives here
//!
//! - Prefix hashing (`md5` of the leading literal run, capped at 32 bytes) and
//!   the bucket subkeys derived from it
//! - Regex quoting of `*`/`?` wildcard patterns and its exact inverse
//! - Digit compression: version digits collapse into a placeholder so that
//!   `firefox/12.0` and `firefox/13.0` are stored once
//!
//! ## Pure function guarantee
//!
//! No I/O and no global state. Same input, same output on every machine,
//! which is what lets two builds of the same catalog be byte-identical.

mod compress;
mod hash;
mod quote;

pub use crate::compress::{
    compress_digits, expand_placeholders, has_digits, placeholder_count, reinsert_digits,
    DIGIT_CAPTURE, DIGIT_PLACEHOLDER,
};
pub use crate::hash::{
    content_subkey, detail_subkey, literal_length, md5_hex, pattern_hash, prefix_hash,
    prefix_hash_variants, prefix_run, CONTENT_SUBKEY_LEN, DETAIL_SUBKEY_LEN, FALLBACK_HASH,
    PREFIX_WINDOW,
};
pub use crate::quote::{quote, unquote};
