use log::{debug, info, warn};
use rayon::prelude::*;

use super::format::sniff;
use super::loader::read_table;
use super::model::{DynoDataset, DynoSeries};
use super::normalize::normalize;
use crate::config::EngineConfig;
use crate::error::{FileError, ParseError};

/// One uploaded file: its bytes and the name used for sniffing and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Result of a batch: the series that parsed, and every file that did not.
///
/// Series keep the caller's file order with failed files left out;
/// [`FileError::index`] tells where a failed file sat in the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub dataset: DynoDataset,
    pub failures: Vec<FileError>,
}

impl ParseReport {
    /// True when every file produced a series.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of rows dropped across all series.
    pub fn rejected_rows(&self) -> usize {
        self.dataset.series.iter().map(|s| s.rejected.len()).sum()
    }
}

/// Sniff → read → normalize, per file and per batch. Holds only its
/// configuration, so one engine can serve any number of calls.
#[derive(Debug, Clone, Default)]
pub struct ParseEngine {
    config: EngineConfig,
}

impl ParseEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse a single file.
    pub fn parse_file(&self, bytes: &[u8], filename: &str) -> Result<DynoSeries, ParseError> {
        let kind = sniff(filename)?;
        debug!("{filename}: sniffed as {kind}");
        let table = read_table(kind, bytes, &self.config)?;
        let series = normalize(table, filename)?;
        debug!(
            "{filename}: {} records, {} rows rejected",
            series.len(),
            series.rejected.len()
        );
        Ok(series)
    }

    /// Parse every file independently. A failing file never stops the
    /// others; it is reported in [`ParseReport::failures`].
    pub fn parse(&self, files: &[SourceFile]) -> ParseReport {
        let parse_one = |(index, file): (usize, &SourceFile)| {
            self.parse_file(&file.bytes, &file.filename)
                .map_err(|error| FileError {
                    index,
                    filename: file.filename.clone(),
                    error,
                })
        };

        // indexed collect keeps the input order under rayon
        let results: Vec<Result<DynoSeries, FileError>> = if self.config.parallel {
            files.par_iter().enumerate().map(parse_one).collect()
        } else {
            files.iter().enumerate().map(parse_one).collect()
        };

        let mut report = ParseReport::default();
        for result in results {
            match result {
                Ok(series) => report.dataset.series.push(series),
                Err(failure) => {
                    warn!("{failure}");
                    report.failures.push(failure);
                }
            }
        }

        info!(
            "parsed {} of {} files ({} rows rejected)",
            report.dataset.len(),
            files.len(),
            report.rejected_rows()
        );
        report
    }
}

/// Parse a batch with the default configuration.
pub fn parse(files: &[SourceFile]) -> ParseReport {
    ParseEngine::default().parse(files)
}
