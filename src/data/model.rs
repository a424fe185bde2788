use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

use crate::color::trace_colors;
use crate::error::RowRejection;

// ---------------------------------------------------------------------------
// CanonicalRecord – one normalized sample
// ---------------------------------------------------------------------------

/// One sample of a dyno run. All fields are finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanonicalRecord {
    /// Engine speed.
    pub rpm: f64,
    /// Torque in kgm.
    pub torque: f64,
    /// Power in CV.
    pub horsepower: f64,
}

// ---------------------------------------------------------------------------
// Column naming for consumers
// ---------------------------------------------------------------------------

/// How the power and torque columns are named when a series is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnNaming {
    /// `rpm`, `hp`, `tq`.
    #[default]
    Canonical,
    /// `rpm`, `whp <label>`, `tq <label>`, so several runs can share a chart.
    Overlay,
}

// ---------------------------------------------------------------------------
// DynoSeries – one parsed file
// ---------------------------------------------------------------------------

/// The records of one input file, oldest sample first.
#[derive(Debug, Clone, PartialEq)]
pub struct DynoSeries {
    /// Filename without its extension.
    pub label: String,
    /// Filename as supplied by the caller.
    pub source: String,
    pub records: Vec<CanonicalRecord>,
    /// Rows of the file left out of `records`, with the reason.
    pub rejected: Vec<RowRejection>,
}

impl DynoSeries {
    pub fn new(
        label: impl Into<String>,
        source: impl Into<String>,
        records: Vec<CanonicalRecord>,
        rejected: Vec<RowRejection>,
    ) -> Self {
        Self {
            label: label.into(),
            source: source.into(),
            records,
            rejected,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column headers in `rpm`, power, torque order.
    pub fn column_names(&self, naming: ColumnNaming) -> [String; 3] {
        match naming {
            ColumnNaming::Canonical => ["rpm".into(), "hp".into(), "tq".into()],
            ColumnNaming::Overlay => [
                "rpm".into(),
                format!("whp {}", self.label),
                format!("tq {}", self.label),
            ],
        }
    }

    /// Plain rows and columns for a table widget.
    pub fn table(&self, naming: ColumnNaming) -> TableView {
        TableView {
            title: self.source.clone(),
            columns: self.column_names(naming),
            rows: self
                .records
                .iter()
                .map(|r| [r.rpm, r.horsepower, r.torque])
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// DynoDataset – every series of a batch
// ---------------------------------------------------------------------------

/// Series in the order the files were supplied. Labels may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynoDataset {
    pub series: Vec<DynoSeries>,
}

impl DynoDataset {
    pub fn new(series: Vec<DynoSeries>) -> Self {
        Self { series }
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.label.as_str()).collect()
    }

    /// Power and torque lines for every series, plotted against rpm and
    /// named with the overlay qualifier.
    pub fn overlay_traces(&self) -> Vec<OverlayTrace> {
        let colors = trace_colors(self.series.len());
        self.series
            .iter()
            .zip(colors)
            .flat_map(|(series, (power_color, torque_color))| {
                let [_, power_name, torque_name] = series.column_names(ColumnNaming::Overlay);
                [
                    OverlayTrace {
                        name: power_name,
                        color: power_color,
                        points: series.records.iter().map(|r| [r.rpm, r.horsepower]).collect(),
                    },
                    OverlayTrace {
                        name: torque_name,
                        color: torque_color,
                        points: series.records.iter().map(|r| [r.rpm, r.torque]).collect(),
                    },
                ]
            })
            .collect()
    }
}

/// One line of an overlay chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayTrace {
    pub name: String,
    /// sRGB.
    pub color: [u8; 3],
    /// `[rpm, value]` pairs in sample order.
    pub points: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// TableView – row/column data for display
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub columns: [String; 3],
    pub rows: Vec<[f64; 3]>,
}

impl TableView {
    /// One JSON object per row, keyed by column name.
    pub fn to_records(&self) -> Vec<JsonValue> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(name, &v)| {
                        let value = Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number);
                        (name.clone(), value)
                    })
                    .collect();
                JsonValue::Object(object)
            })
            .collect()
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .columns
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(0)
            .max(10);

        writeln!(f, "{}", self.title)?;
        for name in &self.columns {
            write!(f, "{name:>width$}  ")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            for v in row {
                write!(f, "{v:>width$.2}  ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
