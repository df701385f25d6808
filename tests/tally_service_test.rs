//! Tests for TallyService: line ingestion, file inputs and reporting

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use tldtally::application::services::{IngestStats, TallyService};
use tldtally::application::ApplicationError;
use tldtally::domain::{NoSeparatorPolicy, TldExtractor};
use tldtally::infrastructure::{FileSystem, RealFileSystem};
use tldtally::util::testing::{date, init_test_setup};

/// In-memory filesystem keyed by path.
#[derive(Default)]
struct MemoryFileSystem {
    files: HashMap<PathBuf, String>,
}

impl MemoryFileSystem {
    fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn open_lines(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
        self.files
            .get(path)
            .map(|content| Box::new(Cursor::new(content.clone().into_bytes())) as Box<dyn BufRead + Send>)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

fn january(fs: Arc<dyn FileSystem>) -> TallyService {
    TallyService::new(
        fs,
        date("01/01/2020"),
        date("31/01/2020"),
        TldExtractor::default(),
    )
    .unwrap()
}

const LOG: &str = "\
15/01/2020 a.com
15/01/2020 b.co.uk

15/01/2020 c.com
01/02/2020 d.org
15/01/2020 localhost
garbage
";

#[test]
fn given_log_when_ingested_then_stats_count_every_line_kind() {
    init_test_setup();
    let mut svc = january(Arc::new(RealFileSystem));
    let stats = svc.ingest(Cursor::new(LOG), "log").unwrap();
    assert_eq!(
        stats,
        IngestStats {
            lines: 6,
            accepted: 3,
            out_of_range: 1,
            malformed: 2,
        }
    );
    assert_eq!(svc.tree().count(), 3);
}

#[test]
fn given_log_when_reported_then_rows_sorted_with_percentages() {
    let mut svc = january(Arc::new(RealFileSystem));
    svc.ingest(Cursor::new(LOG), "log").unwrap();
    let report = svc.report();

    assert_eq!(report.total, 3);
    let tlds: Vec<(&str, u64)> = report.rows.iter().map(|r| (r.tld.as_str(), r.count)).collect();
    assert_eq!(tlds, vec![("com", 2), ("uk", 1)]);
    assert_eq!(report.to_string(), " 66.67 com\n 33.33 uk\n");
    let sum: f64 = report.rows.iter().map(|r| r.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn given_nothing_ingested_when_reported_then_empty() {
    let svc = january(Arc::new(RealFileSystem));
    let report = svc.report();
    assert_eq!(report.total, 0);
    assert!(report.rows.is_empty());
    assert_eq!(report.to_string(), "");
}

#[test]
fn given_whole_hostname_policy_when_ingesting_then_bare_hosts_count() {
    let mut svc = TallyService::new(
        Arc::new(RealFileSystem),
        date("01/01/2020"),
        date("31/01/2020"),
        TldExtractor::new('.', NoSeparatorPolicy::WholeHostname),
    )
    .unwrap();
    let stats = svc.ingest(Cursor::new(LOG), "log").unwrap();
    assert_eq!(stats.accepted, 4);
    assert_eq!(svc.tree().get("localhost"), Some(1));
}

#[test]
fn given_memory_files_when_ingesting_paths_then_accumulates_across_files() {
    let fs = MemoryFileSystem::default()
        .with_file("/logs/a.log", "02/01/2020 x.de\n03/01/2020 y.de\n")
        .with_file("/logs/b.log", "04/01/2020 z.fr\n");
    let mut svc = january(Arc::new(fs));

    let mut stats = svc.ingest_path(Path::new("/logs/a.log")).unwrap();
    stats += svc.ingest_path(Path::new("/logs/b.log")).unwrap();

    assert_eq!(stats.accepted, 3);
    assert_eq!(svc.tree().get("de"), Some(2));
    assert_eq!(svc.tree().get("fr"), Some(1));
}

#[test]
fn given_missing_file_when_ingesting_path_then_input_not_found() {
    let mut svc = january(Arc::new(MemoryFileSystem::default()));
    let err = svc.ingest_path(Path::new("/nope.log")).unwrap_err();
    assert!(matches!(err, ApplicationError::InputNotFound(p) if p == Path::new("/nope.log")));
}

#[test]
fn given_real_file_when_ingesting_path_then_reads_it() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("access.log");
    fs::write(&path, LOG).unwrap();

    let mut svc = january(Arc::new(RealFileSystem));
    let stats = svc.ingest_path(&path).unwrap();
    assert_eq!(stats.accepted, 3);

    let tree = svc.into_tree();
    tree.check_invariants().unwrap();
    assert_eq!(tree.destroy(), 2);
}
