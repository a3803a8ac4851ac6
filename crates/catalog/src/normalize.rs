//! Pattern extraction and normalization.

use std::cmp::Reverse;

use pattern::{compress_digits, has_digits, literal_length, prefix_hash, quote, FALLBACK_HASH};
use tracing::debug;

use crate::{Catalog, CompileOptions, PatternTable};

/// Result of [`normalize`]: the table plus how many patterns were refused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub table: PatternTable,
    pub stored: usize,
    pub rejected: usize,
}

/// Section names that act as user-agent patterns, longest first.
///
/// Wildcard names always qualify. Plain names qualify unless the section
/// carries a `Comment` property, which marks group headers such as
/// `[Firefox]`. The version section is never a pattern.
pub fn extract_patterns(catalog: &Catalog, options: &CompileOptions) -> Vec<String> {
    let mut patterns: Vec<String> = catalog
        .sections
        .iter()
        .filter(|section| section.name != options.version_section)
        .filter(|section| section.is_wildcard() || !section.has_property("Comment"))
        .map(|section| section.name.clone())
        .collect();
    // Stable, so equal lengths keep catalog order.
    patterns.sort_by_key(|p| Reverse(p.len()));
    patterns
}

/// Lowercase, hash, quote and compress each pattern into a [`PatternTable`].
///
/// Within one `(hash, length)` group a fragment is stored once; after digit
/// compression many versioned patterns collapse into the same fragment.
pub fn normalize<I, S>(patterns: I) -> Normalized
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Normalized::default();

    for raw in patterns {
        let raw = raw.as_ref();
        if raw.contains('\t') {
            debug!(pattern = raw, "pattern_rejected_tab");
            out.rejected += 1;
            continue;
        }

        let lowered = raw.to_ascii_lowercase();
        let length = literal_length(&lowered);
        let hash = if length == 0 {
            FALLBACK_HASH.to_string()
        } else {
            prefix_hash(&lowered)
        };

        let quoted = quote(&lowered);
        let fragment = if has_digits(&quoted) {
            compress_digits(&quoted)
        } else {
            quoted
        };

        let group = out
            .table
            .entry(hash)
            .or_default()
            .entry(Reverse(length))
            .or_default();
        if !group.contains(&fragment) {
            group.push(fragment);
            out.stored += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_catalog;
    use pattern::md5_hex;

    #[test]
    fn extraction_rules() {
        let catalog = parse_catalog(
            "[GJK_Browscap_Version]\nVersion=1\n\
             [Firefox]\nComment=\"Firefox\"\n\
             [Plain Label]\nBrowser=\"P\"\n\
             [Mozilla/5.0 (*Linux*) Firefox/*]\nParent=\"Firefox\"\n\
             [*]\nBrowser=\"Default Browser\"\n",
        );
        let patterns = extract_patterns(&catalog, &CompileOptions::default());
        assert_eq!(
            patterns,
            vec!["Mozilla/5.0 (*Linux*) Firefox/*", "Plain Label", "*"]
        );
    }

    #[test]
    fn catch_all_goes_to_fallback_bucket() {
        let normalized = normalize(["*"]);
        let group = &normalized.table[FALLBACK_HASH][&Reverse(0)];
        assert_eq!(group, &vec![".*".to_string()]);
    }

    #[test]
    fn versions_collapse_within_a_group() {
        let normalized = normalize(["Opera/9.80 *Version/12.*", "Opera/9.80 *Version/11.*"]);
        assert_eq!(normalized.stored, 1);
        let groups = &normalized.table[&md5_hex(b"opera/9")];
        let fragments = &groups[&Reverse(22)];
        assert_eq!(
            fragments,
            &vec!["opera/[0-9]\\.[0-9][0-9] .*version/[0-9][0-9]\\..*".to_string()]
        );
    }

    #[test]
    fn tab_patterns_are_rejected() {
        let normalized = normalize(["bad\tpattern*", "good*"]);
        assert_eq!(normalized.rejected, 1);
        assert_eq!(normalized.stored, 1);
    }

    #[test]
    fn groups_ordered_by_length_descending() {
        let normalized = normalize(["abc*", "abc*def*", "abc*de"]);
        let lengths: Vec<usize> = normalized.table[&md5_hex(b"abc")]
            .keys()
            .map(|Reverse(len)| *len)
            .collect();
        assert_eq!(lengths, vec![6, 5, 3]);
    }
}
