//! Data layer: format detection, vendor readers, normalization, batching.
//!
//! Architecture:
//! ```text
//!  bytes + filename
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  format   │  filename → FormatKind
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  decode + vendor quirks → RawTable (see table)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  RawTable → DynoSeries of finite records
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  engine   │  batch of files → DynoDataset + per-file failures
//!   └──────────┘
//! ```

pub mod engine;
pub mod format;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod table;
