use std::fmt;

use log::warn;

use crate::error::{ParseError, RowRejection};

// ---------------------------------------------------------------------------
// Cell – one value of a raw column
// ---------------------------------------------------------------------------

/// A cell before semantic interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Text exactly as the vendor wrote it.
    Text(String),
    /// A value computed by a transformation step.
    Number(f64),
    /// The source row was shorter than the header.
    Empty,
}

impl Cell {
    /// Interpret the cell as a number. The error is a short description
    /// of the offending text.
    pub fn to_f64(&self) -> Result<f64, String> {
        match self {
            Cell::Number(v) => Ok(*v),
            Cell::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{s}' is not a number")),
            Cell::Empty => Err("value is missing".to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Empty => Ok(()),
        }
    }
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, values.into_iter().map(Cell::Text).collect())
    }
}

// ---------------------------------------------------------------------------
// RawTable – the file's content as ordered named columns
// ---------------------------------------------------------------------------

/// Ordered columns of equal length, plus the source line of every row and
/// the rows dropped so far.
///
/// Transformation steps consume the table and return a new one, so a
/// reader is a chain like `table.drop_first_row()?.rename(..).reversed()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<Column>,
    lines: Vec<usize>,
    rejected: Vec<RowRejection>,
}

impl RawTable {
    /// Build from columns; `lines[i]` is the source position of row `i`.
    pub fn new(columns: Vec<Column>, lines: Vec<usize>) -> Result<Self, ParseError> {
        if let Some(col) = columns.iter().find(|c| c.cells.len() != lines.len()) {
            return Err(ParseError::malformed(format!(
                "column '{}' has {} values but the table has {} rows",
                col.name,
                col.cells.len(),
                lines.len()
            )));
        }
        Ok(Self {
            columns,
            lines,
            rejected: Vec::new(),
        })
    }

    /// Build from a header and row-major records. Short rows are padded with
    /// [`Cell::Empty`]; rows longer than the header are an error.
    pub fn from_rows(headers: Vec<String>, rows: Vec<(usize, Vec<String>)>) -> Result<Self, ParseError> {
        let width = headers.len();
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|h| Column::new(h, Vec::with_capacity(rows.len())))
            .collect();
        let mut lines = Vec::with_capacity(rows.len());

        for (line, fields) in rows {
            if fields.len() > width {
                return Err(ParseError::malformed(format!(
                    "line {line} has {} fields but the header has {width}",
                    fields.len()
                )));
            }
            let mut fields = fields.into_iter();
            for col in &mut columns {
                col.cells.push(fields.next().map(Cell::Text).unwrap_or(Cell::Empty));
            }
            lines.push(line);
        }

        Self::new(columns, lines)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`column`](Self::column) but a missing column is `MalformedTable`.
    pub fn require(&self, name: &str) -> Result<&Column, ParseError> {
        self.column(name)
            .ok_or_else(|| ParseError::malformed(format!("missing column '{name}'")))
    }

    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    /// Rows removed by earlier steps, in the table's current row order.
    pub fn rejected(&self) -> &[RowRejection] {
        &self.rejected
    }

    // -- transformation steps --

    /// Remove the first row. An empty table is `MalformedTable`.
    pub fn drop_first_row(self) -> Result<Self, ParseError> {
        if self.is_empty() {
            return Err(ParseError::malformed("expected at least one row to drop"));
        }
        let mut keep = vec![true; self.len()];
        keep[0] = false;
        Ok(self.retain_rows(&keep))
    }

    /// Rename columns by `(from, to)` pairs; names not present are ignored.
    pub fn rename(mut self, renames: &[(&str, &str)]) -> Self {
        for col in &mut self.columns {
            if let Some((_, to)) = renames.iter().find(|(from, _)| col.name == *from) {
                col.name = (*to).to_string();
            }
        }
        self
    }

    /// Append column `name` computed row by row from the `inputs` columns.
    ///
    /// A non-numeric input fails the whole table. A row for which `f`
    /// returns an error is removed and recorded in [`rejected`](Self::rejected).
    pub fn derive<F>(self, name: &str, inputs: &[&str], f: F) -> Result<Self, ParseError>
    where
        F: Fn(&[f64]) -> Result<f64, ParseError>,
    {
        let sources: Vec<&Column> = inputs
            .iter()
            .map(|n| self.require(n))
            .collect::<Result<_, _>>()?;

        let mut derived = Vec::with_capacity(self.len());
        let mut keep = Vec::with_capacity(self.len());
        let mut rejected = Vec::new();
        let mut args = vec![0.0; sources.len()];

        for (row, &line) in self.lines.iter().enumerate() {
            for (slot, col) in args.iter_mut().zip(&sources) {
                *slot = col.cells[row].to_f64().map_err(|detail| {
                    ParseError::malformed(format!("column '{}' line {line}: {detail}", col.name))
                })?;
            }
            match f(&args) {
                Ok(value) => {
                    derived.push(Cell::Number(value));
                    keep.push(true);
                }
                Err(error) => {
                    warn!("dropping line {line}: {error}");
                    derived.push(Cell::Empty);
                    keep.push(false);
                    rejected.push(RowRejection { line, error });
                }
            }
        }

        let mut table = self;
        table.columns.push(Column::new(name, derived));
        table.rejected.extend(rejected);
        Ok(table.retain_rows(&keep))
    }

    /// Keep only the named columns, in the given order.
    pub fn select(self, names: &[&str]) -> Result<Self, ParseError> {
        let mut remaining = self.columns;
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let pos = remaining
                .iter()
                .position(|c| c.name == *name)
                .ok_or_else(|| ParseError::malformed(format!("missing column '{name}'")))?;
            columns.push(remaining.swap_remove(pos));
        }
        Ok(Self {
            columns,
            lines: self.lines,
            rejected: self.rejected,
        })
    }

    /// Reverse the row order, rejected rows included.
    pub fn reversed(mut self) -> Self {
        for col in &mut self.columns {
            col.cells.reverse();
        }
        self.lines.reverse();
        self.rejected.reverse();
        self
    }

    fn retain_rows(mut self, keep: &[bool]) -> Self {
        for col in &mut self.columns {
            let mut flags = keep.iter();
            col.cells.retain(|_| *flags.next().unwrap_or(&true));
        }
        let mut flags = keep.iter();
        self.lines.retain(|_| *flags.next().unwrap_or(&true));
        self
    }
}
