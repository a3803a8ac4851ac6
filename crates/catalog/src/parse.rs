//! Line-oriented catalog reader.
//!
//! The catalog is INI-like:
//!
//! ```text
//! ; comment
//! [Mozilla/5.0 (*Linux*) Firefox/*]
//! Parent = "Firefox"
//! Platform = "Linux"
//! ```
//!
//! Anything that is neither blank, a comment, a section header nor a
//! `key = value` line is skipped and counted, never fatal.

use tracing::debug;

use crate::{Catalog, CatalogStats, Section};

/// Parse catalog text into sections in file order.
pub fn parse_catalog(text: &str) -> Catalog {
    let mut stats = CatalogStats::default();
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for (idx, raw) in text.lines().enumerate() {
        stats.lines += 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(name) = section_name(line) {
            if let Some(done) = current.take() {
                sections.push(done);
            }
            current = Some(Section::new(name));
            stats.sections += 1;
            continue;
        }

        match (property(line), current.as_mut()) {
            (Some((key, value)), Some(section)) => {
                section.properties.push((key.to_string(), value.to_string()));
                stats.properties += 1;
            }
            (Some(_), None) => {
                debug!(line = idx + 1, "catalog_property_outside_section");
                stats.skipped_lines += 1;
            }
            (None, _) => {
                debug!(line = idx + 1, text = line, "catalog_malformed_line");
                stats.skipped_lines += 1;
            }
        }
    }

    if let Some(done) = current {
        sections.push(done);
    }

    Catalog { sections, stats }
}

/// Name of a `[name]` header: the text between the first `[` and the last `]`.
fn section_name(line: &str) -> Option<&str> {
    let body = line.strip_prefix('[')?;
    let end = body.rfind(']')?;
    let name = &body[..end];
    (!name.is_empty()).then_some(name)
}

/// `key = "value"` with an identifier key and a non-empty right-hand side.
/// Surrounding quotes on the value are optional and stripped.
fn property(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#";;; header comment
[GJK_Browscap_Version]
Version=5031

[DefaultProperties]
Comment="DefaultProperties"
Browser="DefaultProperties"
Crawler="false"

[Firefox]
Parent="DefaultProperties"
Browser="Firefox"

[Mozilla/5.0 (*Linux*) Firefox/*]
Parent="Firefox"
Platform="Linux"
"#;

    #[test]
    fn parses_sections_in_order() {
        let catalog = parse_catalog(SAMPLE);
        let names: Vec<_> = catalog.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "GJK_Browscap_Version",
                "DefaultProperties",
                "Firefox",
                "Mozilla/5.0 (*Linux*) Firefox/*",
            ]
        );
        assert_eq!(catalog.stats.sections, 4);
        assert_eq!(catalog.stats.properties, 8);
        assert_eq!(catalog.stats.skipped_lines, 0);
    }

    #[test]
    fn last_section_is_kept() {
        let catalog = parse_catalog("[a*]\nBrowser=\"A\"\n[b*]\nBrowser=\"B\"");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.sections[1].property_text("Browser"), Some("B"));
    }

    #[test]
    fn quotes_are_optional() {
        let catalog = parse_catalog("[x*]\nVersion = 1.0\nBrowser = \"X\"\nEmpty=\"\"");
        let section = &catalog.sections[0];
        assert_eq!(section.property_text("Version"), Some("1.0"));
        assert_eq!(section.property_text("Browser"), Some("X"));
        assert_eq!(section.property_text("Empty"), Some(""));
    }

    #[test]
    fn malformed_lines_are_counted_not_fatal() {
        let text = "Orphan=\"1\"\n[x*]\nnot a property\nbad key=\"v\"\nNoValue=\nBrowser=\"X\"\n";
        let catalog = parse_catalog(text);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.sections[0].properties.len(), 1);
        assert_eq!(catalog.stats.skipped_lines, 4);
    }

    #[test]
    fn header_uses_last_closing_bracket() {
        let catalog = parse_catalog("[Mozilla/5.0 (*) [FB*]*]\nBrowser=\"Facebook\"");
        assert_eq!(catalog.sections[0].name, "Mozilla/5.0 (*) [FB*]*");
    }

    #[test]
    fn value_keeps_inner_equals() {
        let catalog = parse_catalog("[x*]\nComment=\"a=b\"");
        assert_eq!(catalog.sections[0].property_text("Comment"), Some("a=b"));
    }
}
