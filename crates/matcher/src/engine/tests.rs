use super::*;
use std::io::Cursor;
use std::sync::RwLock;
use std::time::Duration;

use catalog::{compile, CompileOptions};
use index::{IndexError, IndexWriter, InMemoryStorage};

use crate::metrics::{set_match_metrics, MatchMetrics};
use crate::types::PropertyValue;

const CATALOG: &str = r#"
[GJK_Browscap_Version]
Version=6001000
Released="Mon, 01 Jan 2024 00:00:00 +0000"

[DefaultProperties]
Comment="DefaultProperties"
Browser="DefaultProperties"
Version="0.0"
Platform="unknown"
isMobileDevice="false"
Crawler="false"

[Firefox/*]
Parent="DefaultProperties"
Browser="Firefox"
Browser_Maker="Mozilla Foundation"

[Firefox Generic]
Parent="DefaultProperties"
Comment="Firefox Generic"
Browser="Firefox"

[Mozilla/5.0 (*Linux*) Gecko/* Firefox/12.0*]
Parent="Firefox Generic"
Platform="Linux"
Version="12.0"
MajorVer="12"

[Mozilla/5.0 (*Linux*) Gecko/* Firefox/13.0*]
Parent="Firefox Generic"
Platform="Linux"
Version="13.0"
MajorVer="13"

[Mozilla/* (Nintendo 3DS; *) Version/*]
Parent="DefaultProperties"
Browser="NetFront NX"
Platform="Nintendo 3DS"
isMobileDevice="true"
Device_Type="Console"

[*]
Browser="Default Browser"
Parent="DefaultProperties"
"#;

fn classifier_for(text: &str, config: ClassifierConfig) -> Classifier {
    let compiled = compile(text, &CompileOptions::default()).unwrap();
    let (cursor, _) = IndexWriter::new(Cursor::new(Vec::new()))
        .write(&compiled.buckets)
        .unwrap();
    let reader =
        IndexReader::from_storage(Box::new(InMemoryStorage::new(cursor.into_inner()))).unwrap();
    Classifier::new(reader, config)
}

fn classifier() -> Classifier {
    classifier_for(CATALOG, ClassifierConfig::default())
}

#[test]
fn firefox_inherits_default_properties() -> Result<(), MatchError> {
    let info = classifier().classify("Firefox/99.0")?.expect("match");
    assert_eq!(info.pattern, "firefox/*");
    assert_eq!(info.browser(), Some("Firefox"));
    assert_eq!(info.browser_maker(), Some("Mozilla Foundation"));
    assert_eq!(info.crawler(), Some(false));
    assert_eq!(info.get("Crawler"), Some(&PropertyValue::Bool(false)));
    assert!(info.get("Parent").is_none());
    Ok(())
}

#[test]
fn compressed_versions_resolve_to_their_own_section() -> Result<(), MatchError> {
    let classifier = classifier();
    let ua = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/13.0.1";
    let info = classifier.classify(ua)?.expect("match");
    assert_eq!(info.pattern, "mozilla/5.0 (*linux*) gecko/* firefox/13.0*");
    assert_eq!(info.version(), Some("13.0"));
    assert_eq!(info.major_version(), Some("13"));
    assert_eq!(info.platform(), Some("Linux"));
    // Inherited through "Firefox Generic".
    assert_eq!(info.browser(), Some("Firefox"));

    let info = classifier
        .classify("Mozilla/5.0 (X11; Linux i686) Gecko/20100101 Firefox/12.0")?
        .expect("match");
    assert_eq!(info.version(), Some("12.0"));
    Ok(())
}

#[test]
fn unknown_version_falls_through_to_next_match() -> Result<(), MatchError> {
    // Same compressed fragment, but no section exists for 14.0.
    let info = classifier()
        .classify("Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/14.0")?
        .expect("match");
    assert_eq!(info.pattern, "*");
    assert_eq!(info.browser(), Some("Default Browser"));
    Ok(())
}

#[test]
fn nintendo_matches_through_shortened_prefix() -> Result<(), MatchError> {
    let info = classifier()
        .classify("Mozilla/5.0 (Nintendo 3DS; U; ; en) Version/1.7567.US")?
        .expect("match");
    assert_eq!(info.pattern, "mozilla/* (nintendo 3ds; *) version/*");
    assert_eq!(info.platform(), Some("Nintendo 3DS"));
    assert_eq!(info.is_mobile_device(), Some(true));
    assert_eq!(info.device_type(), Some("Console"));
    Ok(())
}

#[test]
fn unmatched_agent_gets_catch_all() -> Result<(), MatchError> {
    let info = classifier().classify("curl/8.4.0")?.expect("fallback");
    assert_eq!(info.pattern, "*");
    assert_eq!(info.browser(), Some("Default Browser"));
    assert_eq!(info.platform(), Some("unknown"));
    assert_eq!(info.crawler(), Some(false));
    Ok(())
}

#[test]
fn empty_agent_gets_catch_all() -> Result<(), MatchError> {
    let info = classifier().classify("")?.expect("fallback");
    assert_eq!(info.browser(), Some("Default Browser"));
    Ok(())
}

#[test]
fn no_catch_all_means_none() -> Result<(), MatchError> {
    let classifier = classifier_for(
        "[Firefox/*]\nBrowser=\"Firefox\"\n",
        ClassifierConfig::default(),
    );
    assert!(classifier.classify("curl/8.4.0")?.is_none());
    assert!(classifier.classify("firefox/1")?.is_some());
    Ok(())
}

#[test]
fn lookups_ignore_case() -> Result<(), MatchError> {
    let classifier = classifier();
    let lower = classifier.classify("firefox/99.0")?;
    let upper = classifier.classify("FIREFOX/99.0")?;
    assert_eq!(lower, upper);
    Ok(())
}

#[test]
fn candidates_end_with_sentinel() {
    let classifier = classifier();
    let groups: Vec<String> = classifier
        .candidates("curl/8.4.0")
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(groups.last().map(String::as_str), Some(""));
    assert_eq!(groups[groups.len() - 2], ".*");
}

#[test]
fn parent_cycle_is_an_error() {
    let classifier = classifier_for(
        "[a*]\nParent=\"b*\"\nBrowser=\"A\"\n[b*]\nParent=\"a*\"\n",
        ClassifierConfig {
            max_parent_depth: 8,
            ..ClassifierConfig::default()
        },
    );
    let err = classifier.classify("abc").unwrap_err();
    assert!(matches!(err, MatchError::ParentChainTooDeep { .. }));
}

#[test]
fn compiled_expressions_are_reused_across_lookups() -> Result<(), MatchError> {
    let classifier = classifier();
    let agent = "Mozilla/5.0 (X11; Linux x86_64; rv:12.0) Gecko/20100101 Firefox/12.0";
    classifier.classify(agent)?;
    let cached = classifier.regex_cache().len();
    assert!(cached > 0);

    let shared = classifier.clone();
    shared.classify(agent)?;
    shared.classify("curl/8.4.0")?;
    classifier.classify(agent)?;
    assert!(std::ptr::eq(classifier.regex_cache(), shared.regex_cache()));
    assert!(classifier.regex_cache().len() >= cached);

    let before = classifier.regex_cache().len();
    classifier.classify(agent)?;
    assert_eq!(classifier.regex_cache().len(), before);
    Ok(())
}

#[test]
fn uncached_classifier_matches_the_same() -> Result<(), MatchError> {
    let uncached = classifier_for(
        CATALOG,
        ClassifierConfig {
            regex_cache_capacity: 0,
            ..ClassifierConfig::default()
        },
    );
    let agent = "Mozilla/5.0 (X11; Linux x86_64; rv:13.0) Gecko/20100101 Firefox/13.0";
    assert_eq!(uncached.classify(agent)?, classifier().classify(agent)?);
    assert!(uncached.regex_cache().is_empty());
    Ok(())
}

#[test]
fn missing_index_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Classifier::open(dir.path().join("missing.bin"), ClassifierConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        MatchError::Index(IndexError::MissingIndex { .. })
    ));
}

struct RecordingMetrics {
    events: RwLock<Vec<MatchOutcome>>,
}

impl MatchMetrics for RecordingMetrics {
    fn record_classification(&self, outcome: MatchOutcome, _latency: Duration) {
        self.events.write().unwrap().push(outcome);
    }
}

#[test]
fn metrics_recorder_observes_classifications() -> Result<(), MatchError> {
    let classifier = classifier_for(
        "[Firefox/*]\nBrowser=\"Firefox\"\n",
        ClassifierConfig::default(),
    );
    let metrics = Arc::new(RecordingMetrics {
        events: RwLock::new(Vec::new()),
    });
    set_match_metrics(Some(metrics.clone()));

    classifier.classify("firefox/3")?;
    classifier.classify("curl/8")?;

    set_match_metrics(None);

    // Other tests may classify concurrently while the recorder is installed.
    let events = metrics.events.read().unwrap();
    assert!(events.contains(&MatchOutcome::Hit));
    assert!(events.contains(&MatchOutcome::Miss));
    Ok(())
}
