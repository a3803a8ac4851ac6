//! Prefix hashing and bucket subkeys.
//!
//! Every stored pattern is filed under the md5 of its leading literal run:
//! the bytes before the first wildcard, dot, whitespace or backslash, looking
//! at no more than the first [`PREFIX_WINDOW`] bytes. A user agent has no
//! wildcards, so its run is usually longer than the run of the pattern that
//! matches it. The lookup side therefore hashes every shortening of its run
//! (see [`prefix_hash_variants`]) until it meets the pattern's hash.
//!
//! ```text
//! pattern  "mozilla/* (nintendo 3ds; *) version/*"  -> md5("mozilla/")
//! ua       "mozilla/5.0 (nintendo 3ds; u; ; en) ..." -> md5("mozilla/5"),
//!                                                      md5("mozilla/"), ...
//! ```
//!
//! Hashes are 32 lowercase hex characters. Content buckets are keyed by the
//! first [`CONTENT_SUBKEY_LEN`] characters, property buckets by the first
//! [`DETAIL_SUBKEY_LEN`].

/// Reserved prefix hash of the catch-all pattern. Sorts after every hex
/// digest, so its bucket is always consulted last.
pub const FALLBACK_HASH: &str = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";

/// Number of leading bytes considered when computing a prefix hash.
pub const PREFIX_WINDOW: usize = 32;

/// Width of the content bucket subkey.
pub const CONTENT_SUBKEY_LEN: usize = 2;

/// Width of the property (detail) bucket subkey.
pub const DETAIL_SUBKEY_LEN: usize = 3;

/// Lowercase hex md5 digest of raw bytes.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Leading literal run of `text`, capped at [`PREFIX_WINDOW`] bytes.
pub fn prefix_run(text: &[u8]) -> &[u8] {
    let window = &text[..text.len().min(PREFIX_WINDOW)];
    let end = window
        .iter()
        .position(|b| is_run_terminator(*b))
        .unwrap_or(window.len());
    &window[..end]
}

fn is_run_terminator(byte: u8) -> bool {
    matches!(
        byte,
        b'.' | b'*' | b'?' | b'\\' | b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c
    )
}

/// Prefix hash of a (lowercased) catalog pattern.
///
/// Patterns starting with a wildcard hash to `md5("")`. The catch-all pattern
/// is not special-cased here; the compiler swaps in [`FALLBACK_HASH`] for any
/// pattern whose [`literal_length`] is zero.
pub fn prefix_hash(pattern: &str) -> String {
    md5_hex(prefix_run(pattern.as_bytes()))
}

/// Prefix hashes to probe for a (lowercased) user agent, most specific first.
///
/// One hash per shortening of the literal run, down to a single byte, then
/// `md5("")` for patterns that begin with `*`. The fallback hash is not
/// included; the candidate generator appends it.
pub fn prefix_hash_variants(user_agent: &str) -> Vec<String> {
    let run = prefix_run(user_agent.as_bytes());
    let mut hashes = Vec::with_capacity(run.len() + 1);
    hashes.extend((1..=run.len()).rev().map(|len| md5_hex(&run[..len])));
    hashes.push(md5_hex(b""));
    hashes
}

/// Content bucket key for a prefix hash.
pub fn content_subkey(hash: &str) -> &str {
    hash.get(..CONTENT_SUBKEY_LEN).unwrap_or(hash)
}

/// Detail bucket key for a pattern hash.
pub fn detail_subkey(hash: &str) -> &str {
    hash.get(..DETAIL_SUBKEY_LEN).unwrap_or(hash)
}

/// Key of a property record: md5 of the ASCII-lowercased literal pattern.
pub fn pattern_hash(literal: &str) -> String {
    md5_hex(literal.to_ascii_lowercase().as_bytes())
}

/// Byte length of a pattern once every `*` is removed.
///
/// `?` stays counted: it always consumes one byte of the user agent, so the
/// value remains a lower bound on the length of anything the pattern matches.
pub fn literal_length(pattern: &str) -> usize {
    pattern.bytes().filter(|b| *b != b'*').count()
}
