//! Dyno Merge – normalizes engine dynamometer exports into one dataset.
//!
//! Three vendor layouts are recognised from the filename:
//!
//! - `*csv*` – plain `rpm,hp,tq` CSV
//! - `*ine*` – Horacio Resio whitespace-separated export
//! - `*ad3*` – MWD XML export
//!
//! ```no_run
//! use dyno_merge::{ParseEngine, SourceFile};
//!
//! let files = vec![SourceFile::new("stock.csv", std::fs::read("stock.csv").unwrap())];
//! let report = ParseEngine::default().parse(&files);
//! for series in &report.dataset.series {
//!     println!("{}: {} samples", series.label, series.len());
//! }
//! for failure in &report.failures {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;

pub use config::{ChannelMatch, EngineConfig, LengthPolicy};
pub use data::engine::{parse, ParseEngine, ParseReport, SourceFile};
pub use data::format::{sniff, FormatKind};
pub use data::model::{CanonicalRecord, ColumnNaming, DynoDataset, DynoSeries, OverlayTrace, TableView};
pub use error::{ErrorKind, FileError, ParseError, RowRejection};
