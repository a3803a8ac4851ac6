#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

/// Small catalog shaped like the real browscap file.
pub const SAMPLE_CATALOG: &str = r#";;; Provided courtesy of the test suite

[GJK_Browscap_Version]
Version=6001000
Released="Mon, 01 Jan 2024 00:00:00 +0000"

;;; DefaultProperties

[DefaultProperties]
Comment="DefaultProperties"
Browser="DefaultProperties"
Version="0.0"
MajorVer="0"
MinorVer="0"
Platform="unknown"
isMobileDevice="false"
isTablet="false"
Crawler="false"
Device_Type="unknown"
Device_Pointing_Method="unknown"

;;; Firefox

[Firefox/*]
Parent="DefaultProperties"
Browser="Firefox"
Browser_Maker="Mozilla Foundation"

[Firefox 12.0]
Parent="DefaultProperties"
Comment="Firefox 12.0"
Browser="Firefox"
Browser_Maker="Mozilla Foundation"
Version="12.0"
MajorVer="12"
Device_Pointing_Method="mouse"

[Mozilla/5.0 (*Linux*) Gecko/* Firefox/12.0*]
Parent="Firefox 12.0"
Platform="Linux"
Device_Type="Desktop"

[Firefox 13.0]
Parent="DefaultProperties"
Comment="Firefox 13.0"
Browser="Firefox"
Version="13.0"
MajorVer="13"

[Mozilla/5.0 (*Linux*) Gecko/* Firefox/13.0*]
Parent="Firefox 13.0"
Platform="Linux"

;;; Consoles

[Mozilla/* (Nintendo 3DS; *) Version/*]
Parent="DefaultProperties"
Browser="NetFront NX"
Browser_Maker="Access"
Platform="Nintendo 3DS"
isMobileDevice="true"
Device_Type="Console"

;;; Crawlers

[Googlebot/2.1*]
Parent="DefaultProperties"
Browser="Googlebot"
Crawler="true"

;;; Default Browser

[*]
Parent="DefaultProperties"
Browser="Default Browser"
"#;

/// Temporary directory holding a catalog file and the index built from it.
pub struct Fixture {
    pub dir: TempDir,
    pub catalog: PathBuf,
    pub index: PathBuf,
}

pub fn fixture_with(catalog_text: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = dir.path().join("browscap.ini");
    let index = dir.path().join("browscap.bin");
    std::fs::write(&catalog, catalog_text).expect("write catalog");
    Fixture {
        dir,
        catalog,
        index,
    }
}

pub fn built_fixture() -> Fixture {
    let fixture = fixture_with(SAMPLE_CATALOG);
    uacap::build(&fixture.catalog, &fixture.index).expect("build");
    fixture
}
