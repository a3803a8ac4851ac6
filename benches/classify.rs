use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use uacap::{Classifier, ClassifierConfig, CompileOptions, IndexReader, compile};

/// A catalog with a few hundred versioned sections plus a catch-all.
fn synthetic_catalog() -> String {
    let mut text = String::from(
        "[DefaultProperties]\nComment=\"DefaultProperties\"\nBrowser=\"DefaultProperties\"\nCrawler=\"false\"\n\n",
    );
    for major in 1..=120 {
        write!(
            text,
            "[Mozilla/5.0 (*Linux*) Gecko/* Firefox/{major}.0*]\nParent=\"DefaultProperties\"\nBrowser=\"Firefox\"\nVersion=\"{major}.0\"\n\n\
             [Mozilla/5.0 (*Windows NT*) AppleWebKit/* Chrome/{major}.*]\nParent=\"DefaultProperties\"\nBrowser=\"Chrome\"\nVersion=\"{major}.0\"\n\n"
        )
        .expect("write to String");
    }
    text.push_str("[*]\nParent=\"DefaultProperties\"\nBrowser=\"Default Browser\"\n");
    text
}

/// Digit-free name for section `n`, so sections stay distinct after compression.
fn word(mut n: usize) -> String {
    let mut out = String::new();
    for _ in 0..3 {
        out.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    out
}

/// Thousands of patterns that start with `*`. They all share the empty-prefix
/// bucket, so every lookup walks all of their groups.
fn wildcard_catalog() -> String {
    let mut text = String::from(
        "[DefaultProperties]\nComment=\"DefaultProperties\"\nBrowser=\"DefaultProperties\"\n\n",
    );
    for n in 0..2000 {
        writeln!(
            text,
            "[*agent{}x*]\nParent=\"DefaultProperties\"\nBrowser=\"Agent {n}\"\n",
            word(n)
        )
        .expect("write to String");
    }
    text.push_str("[*]\nParent=\"DefaultProperties\"\nBrowser=\"Default Browser\"\n");
    text
}

fn classifier_for(catalog: &str) -> Classifier {
    let compiled = compile(catalog, &CompileOptions::default()).expect("compile");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bench.bin");
    uacap::write_index_file(&compiled.buckets, &path).expect("write");
    // The reader keeps its file handle open, so the directory may go away.
    let reader = IndexReader::open(&path).expect("open");
    Classifier::new(reader, ClassifierConfig::default())
}

fn classifier() -> Classifier {
    classifier_for(&synthetic_catalog())
}

fn bench_classify(c: &mut Criterion) {
    let classifier = classifier();
    let agents = [
        (
            "firefox_linux",
            "Mozilla/5.0 (X11; Linux x86_64; rv:99.0) Gecko/20100101 Firefox/99.0",
        ),
        (
            "chrome_windows",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
        ),
        ("fallback", "curl/8.4.0"),
    ];

    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(1));
    for (name, agent) in agents {
        group.bench_function(name, |b| {
            b.iter(|| classifier.classify(black_box(agent)).expect("classify"))
        });
    }
    group.finish();

    let wildcards = classifier_for(&wildcard_catalog());
    let mut group = c.benchmark_group("classify_leading_wildcards");
    group.throughput(Throughput::Elements(1));
    group.bench_function("unmatched_firefox", |b| {
        b.iter(|| {
            wildcards
                .classify(black_box(
                    "Mozilla/5.0 (X11; Linux x86_64; rv:99.0) Gecko/20100101 Firefox/99.0",
                ))
                .expect("classify")
        })
    });
    let last = format!("my-agent{}x/1.0", word(1999));
    group.bench_function("last_agent", |b| {
        b.iter(|| wildcards.classify(black_box(&last)).expect("classify"))
    });
    group.finish();

    c.bench_function("compile_synthetic_catalog", |b| {
        let text = synthetic_catalog();
        b.iter(|| compile(black_box(&text), &CompileOptions::default()).expect("compile"))
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
