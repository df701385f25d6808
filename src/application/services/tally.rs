//! TLD tally service
//!
//! Feeds dated hostname observations into a [`TldTree`] and builds the
//! percentage report from it.

use std::fmt;
use std::io::BufRead;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Date, Observation, TldExtractor, TldTree};
use crate::infrastructure::traits::FileSystem;

/// Line counters from one or more ingest runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-blank lines read
    pub lines: u64,
    pub accepted: u64,
    pub out_of_range: u64,
    /// Lines skipped for a bad date, missing host or unusable hostname
    pub malformed: u64,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.accepted += other.accepted;
        self.out_of_range += other.out_of_range;
        self.malformed += other.malformed;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub tld: String,
    pub count: u64,
    /// Share of all accepted observations, 0..=100
    pub percentage: f64,
}

/// Sorted frequency table.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub total: u64,
    pub rows: Vec<ReportRow>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{:6.2} {}", row.percentage, row.tld)?;
        }
        Ok(())
    }
}

/// What happened to a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Accepted,
    OutOfRange,
    Malformed(String),
}

/// Service for counting TLDs over a date range.
pub struct TallyService {
    fs: Arc<dyn FileSystem>,
    tree: TldTree,
}

impl TallyService {
    /// Create a tally over the inclusive range `[begin, end]`.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        begin: Date,
        end: Date,
        extractor: TldExtractor,
    ) -> ApplicationResult<Self> {
        if begin > end {
            return Err(ApplicationError::InvalidRange {
                begin: begin.to_string(),
                end: end.to_string(),
            });
        }
        debug!("new: range=[{}, {}], extractor={:?}", begin, end, extractor);
        Ok(Self {
            fs,
            tree: TldTree::with_extractor(begin, end, extractor),
        })
    }

    pub fn tree(&self) -> &TldTree {
        &self.tree
    }

    pub fn into_tree(self) -> TldTree {
        self.tree
    }

    /// Classify and record one line.
    pub fn observe(&mut self, line: &str) -> LineOutcome {
        let observation = match Observation::parse(line) {
            Ok(Some(obs)) => obs,
            Ok(None) => return LineOutcome::Blank,
            Err(e) => return LineOutcome::Malformed(e.to_string()),
        };
        match self.tree.add(&observation.hostname, &observation.date) {
            Ok(true) => LineOutcome::Accepted,
            Ok(false) => LineOutcome::OutOfRange,
            Err(e) => LineOutcome::Malformed(e.to_string()),
        }
    }

    /// Read observations line by line from `reader`.
    ///
    /// Malformed lines are logged and counted, never fatal; only I/O
    /// failures abort the run.
    #[instrument(level = "debug", skip(self, reader))]
    pub fn ingest<R: BufRead>(&mut self, reader: R, source: &str) -> ApplicationResult<IngestStats> {
        let mut stats = IngestStats::default();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_source_context("read observations", source)?;
            match self.observe(&line) {
                LineOutcome::Blank => continue,
                LineOutcome::Accepted => stats.accepted += 1,
                LineOutcome::OutOfRange => stats.out_of_range += 1,
                LineOutcome::Malformed(reason) => {
                    warn!("{}:{}: skipped: {}", source, lineno + 1, reason);
                    stats.malformed += 1;
                }
            }
            stats.lines += 1;
        }
        debug!("ingest: {} -> {:?}", source, stats);
        Ok(stats)
    }

    /// Read observations from a file.
    #[instrument(level = "debug", skip(self))]
    pub fn ingest_path(&mut self, path: &Path) -> ApplicationResult<IngestStats> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::InputNotFound(PathBuf::from(path)));
        }
        let display = path.display().to_string();
        let reader = self
            .fs
            .open_lines(path)
            .with_source_context("open", &display)?;
        self.ingest(reader, &display)
    }

    /// Percentages per TLD in ascending key order.
    #[instrument(level = "debug", skip(self))]
    pub fn report(&self) -> Report {
        let total = self.tree.count();
        let rows = self
            .tree
            .iter()
            .map(|entry| ReportRow {
                tld: entry.key().to_string(),
                count: entry.count(),
                percentage: 100.0 * entry.count() as f64 / total as f64,
            })
            .collect();
        Report { total, rows }
    }
}
