//! Digit compression for version-heavy patterns.
//!
//! Catalogs list the same browser once per version (`firefox/12.0`,
//! `firefox/13.0`, ...). Replacing every digit of the quoted pattern with
//! [`DIGIT_PLACEHOLDER`] lets the compiler store one fragment for the whole
//! family. At lookup time the placeholder becomes a capture group, and the
//! digits the user agent actually carried are put back to rebuild the exact
//! section name.

/// Stand-in for a single ASCII digit inside a stored fragment.
pub const DIGIT_PLACEHOLDER: &str = "[0-9]";

/// Capturing form of [`DIGIT_PLACEHOLDER`] used when matching a single pattern.
pub const DIGIT_CAPTURE: &str = "([0-9])";

/// Whether the fragment contains any ASCII digit.
pub fn has_digits(fragment: &str) -> bool {
    fragment.bytes().any(|b| b.is_ascii_digit())
}

/// Replace every ASCII digit of a quoted fragment with [`DIGIT_PLACEHOLDER`].
///
/// Quoting escapes `[` and `]`, so an unescaped placeholder in the output can
/// only come from this function.
pub fn compress_digits(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len() + 8);
    for ch in quoted.chars() {
        if ch.is_ascii_digit() {
            out.push_str(DIGIT_PLACEHOLDER);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Number of placeholders in a compressed fragment.
pub fn placeholder_count(compressed: &str) -> usize {
    compressed.matches(DIGIT_PLACEHOLDER).count()
}

/// Turn each placeholder into a capture group, one group per digit.
pub fn expand_placeholders(compressed: &str) -> String {
    compressed.replace(DIGIT_PLACEHOLDER, DIGIT_CAPTURE)
}

/// Put captured digits back into the placeholders, left to right.
///
/// Placeholders left over when `digits` runs out are kept as they are.
pub fn reinsert_digits<'a, I>(compressed: &str, digits: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut digits = digits.into_iter();
    let mut parts = compressed.split(DIGIT_PLACEHOLDER);
    let mut out = String::with_capacity(compressed.len());
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        out.push_str(digits.next().unwrap_or(DIGIT_PLACEHOLDER));
        out.push_str(part);
    }
    out
}
