//! Conversion between catalog wildcard patterns and regex fragments.
//!
//! Catalog patterns know two wildcards: `*` (any run) and `?` (any single
//! character). Everything else is literal. [`quote`] escapes the literal part
//! and expands the wildcards, [`unquote`] undoes exactly that, so
//! `unquote(quote(p)) == p` holds for every pattern.
//!
//! Backslashes are ordinary literals. Real user agents carry raw `\x..`
//! sequences (`Der gro\xdfe BilderSauger 2.00u`), and quoting one as `\\x`
//! keeps it matching the literal backslash instead of turning into a hex
//! escape.

/// Turn a wildcard pattern into an (unanchored) regex fragment.
pub fn quote(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + pattern.len() / 4);
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c if is_regex_meta(c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Recover the wildcard pattern from a fragment produced by [`quote`].
///
/// Names made of letters and whitespace only (`DefaultProperties`, most
/// parent sections) cannot contain anything quoted and are returned as is.
pub fn unquote(quoted: &str) -> String {
    if quoted
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return quoted.to_string();
    }

    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '.' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push('*');
            }
            '.' => out.push('?'),
            c => out.push(c),
        }
    }
    out
}

/// Characters with a meaning in `regex` syntax, mirroring `regex::escape`.
fn is_regex_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '.'
            | '+'
            | '*'
            | '?'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '#'
            | '&'
            | '-'
            | '~'
    )
}
