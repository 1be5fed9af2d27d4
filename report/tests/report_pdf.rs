//! Report generation against real SQLite files

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use labreport_core::config::ReportConfig;
use labreport_core::CoreError;
use labreport_pdf::{ReportAssembler, ReportError, ReportRequest};
use lopdf::Document;
use rusqlite::Connection;
use tempfile::TempDir;

fn create(dir: &Path, name: &str, sql: &str) -> PathBuf {
    let path = dir.join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    path
}

fn mfi_db(dir: &Path, detail_rows: usize) -> PathBuf {
    let mut sql = String::from(
        "CREATE TABLE TestAna (TestId INTEGER, TalepNo TEXT, StandartAdi TEXT, TestTarih TEXT);
         CREATE TABLE TestDetay (Detay_Id INTEGER, Detay_TestId INTEGER, Detay_KesmeZamani INTEGER,
                                 Detay_Agirlik REAL, Detay_MVR REAL, Detay_MFR REAL);
         INSERT INTO TestAna VALUES (564, 'T-1', 'ISO 1133', '2024-03-01');",
    );
    for i in 0..detail_rows {
        sql.push_str(&format!(
            "INSERT INTO TestDetay VALUES ({}, 564, 10, {}, 3.1, 3.0);",
            i + 1,
            0.5 + i as f64 * 0.01
        ));
    }
    create(dir, "MFI.db", &sql)
}

fn dsc_db(dir: &Path) -> PathBuf {
    let mut sql = String::from(
        "CREATE TABLE TestAna (TestId INTEGER, NumuneKodu TEXT);
         CREATE TABLE TestDetay (TestId INTEGER, TestSuresi REAL, NumuneSicakligi REAL,
                                 ReferansSicakligi REAL, Watt REAL);
         INSERT INTO TestAna VALUES (142, 'NK-142');",
    );
    for i in 0..40 {
        sql.push_str(&format!(
            "INSERT INTO TestDetay VALUES (142, {}, {}, {}, {});",
            i,
            25.0 + i as f64 * 5.0,
            24.0 + i as f64 * 5.0,
            (i as f64 / 4.0).sin()
        ));
    }
    create(dir, "DSC_OIT.db", &sql)
}

fn config(dir: &Path) -> ReportConfig {
    ReportConfig {
        reports_dir: dir.join("reports"),
        resources_dir: dir.join("resources"),
        ..ReportConfig::default()
    }
}

/// Decoded content of every page, in page order
fn page_contents(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let mut content = Vec::new();
            for id in doc.get_page_contents(*page_id) {
                let stream = doc.get_object(id).unwrap().as_stream().unwrap();
                ZlibDecoder::new(stream.content.as_slice()).read_to_end(&mut content).unwrap();
            }
            String::from_utf8_lossy(&content).into_owned()
        })
        .collect()
}

fn assert_page_numbers(pages: &[String]) {
    let total = pages.len();
    assert!(!pages[0].contains("(Page 1 of"), "cover page carries no page number");
    for (i, page) in pages.iter().enumerate().skip(1) {
        let label = format!("(Page {} of {}) Tj", i + 1, total);
        assert!(page.contains(&label), "page {} lacks {:?}", i + 1, label);
    }
}

#[test]
fn mfi_report_has_cover_and_table_page() {
    let dir = TempDir::new().unwrap();
    let db = mfi_db(dir.path(), 3);
    let assembler = ReportAssembler::new(config(dir.path()));
    let request = ReportRequest::from_raw(db.to_str().unwrap(), "mfi", "564", None, None, 0.8).unwrap();

    let path = assembler.create_report(&request).unwrap();
    assert_eq!(path.file_name().unwrap(), "MFI_564_Report.pdf");

    let pages = page_contents(&path);
    assert_eq!(pages.len(), 2);
    assert!(pages[0].contains("(PLACEHOLDER PARAGRAPH) Tj"));
    assert!(pages[1].contains("(ALARGE TEST RAPORU) Tj"));
    assert!(pages[1].contains("(No) Tj"));
    assert_page_numbers(&pages);
}

#[test]
fn long_tables_continue_on_numbered_pages() {
    let dir = TempDir::new().unwrap();
    let db = mfi_db(dir.path(), 80);
    let assembler = ReportAssembler::new(config(dir.path()));
    let request = ReportRequest::from_raw(db.to_str().unwrap(), "MFI", "564", None, Some("long.pdf"), 0.8).unwrap();

    let path = assembler.create_report(&request).unwrap();
    let pages = page_contents(&path);
    assert!(pages.len() >= 4);
    assert_page_numbers(&pages);

    // header row repeated on every table page
    for page in &pages[2..] {
        assert!(page.contains("(No) Tj"));
    }
}

#[test]
fn dsc_report_embeds_charts() {
    let dir = TempDir::new().unwrap();
    let db = dsc_db(dir.path());
    let assembler = ReportAssembler::new(config(dir.path()));
    let request = ReportRequest::from_raw(db.to_str().unwrap(), "DSC_OIT", "142", None, None, 0.8).unwrap();

    let path = assembler.create_report(&request).unwrap();
    let pages = page_contents(&path);
    assert!(pages.len() >= 3);
    assert_page_numbers(&pages);

    let all = pages.concat();
    assert!(all.contains("Do"));
    assert!(all.contains("(Zaman [sn]) Tj"));
}

#[test]
fn reports_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let db = dsc_db(dir.path());
    let assembler = ReportAssembler::new(config(dir.path()));

    let first = ReportRequest::from_raw(db.to_str().unwrap(), "DSC_OIT", "142", None, Some("a.pdf"), 0.8).unwrap();
    let second = ReportRequest::from_raw(db.to_str().unwrap(), "DSC_OIT", "142", None, Some("b.pdf"), 0.8).unwrap();
    let a = page_contents(&assembler.create_report(&first).unwrap());
    let b = page_contents(&assembler.create_report(&second).unwrap());
    assert_eq!(a, b);
}

#[test]
fn preconditions_fail_before_any_io() {
    let dir = TempDir::new().unwrap();
    let reports = dir.path().join("reports");
    let missing_db = dir.path().join("VICAT.db");

    let err = ReportRequest::from_raw(missing_db.to_str().unwrap(), "VICAT", "1", Some(9), None, 0.8).unwrap_err();
    assert!(matches!(err, ReportError::Core(CoreError::InvalidLineNumber(9))));

    let err = ReportRequest::from_raw("notes.txt", "VICAT", "1", Some(1), None, 0.8).unwrap_err();
    assert!(matches!(err, ReportError::Core(CoreError::InvalidDatabaseFile { .. })));

    assert!(!missing_db.exists());
    assert!(!reports.exists());
}

#[test]
fn missing_summary_row_is_fatal() {
    let dir = TempDir::new().unwrap();
    let db = mfi_db(dir.path(), 3);
    let assembler = ReportAssembler::new(config(dir.path()));
    let request = ReportRequest::from_raw(db.to_str().unwrap(), "MFI", "999", None, None, 0.8).unwrap();

    let err = assembler.create_report(&request).unwrap_err();
    assert!(matches!(err, ReportError::Core(CoreError::NoMatchingRows(_))));
    assert!(!fs::read_dir(dir.path()).unwrap().any(|e| e.unwrap().file_name() == "reports"));
}
