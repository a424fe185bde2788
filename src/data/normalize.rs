use log::warn;

use super::model::{CanonicalRecord, DynoSeries};
use super::table::RawTable;
use crate::error::{ParseError, RowRejection};

/// Column names every reader converges to, in display order.
pub const CANONICAL_COLUMNS: [&str; 3] = ["rpm", "hp", "tq"];

/// Factor of the torque estimate `tq = hp * 716 / rpm` (kgm from CV).
///
/// One CV is 75 kgf·m/s, so torque in kgm is `CV * 75 * 60 / (2π * rpm)`,
/// about `CV * 716.2 / rpm`. The dyno software rounds it to 716 and we keep
/// that so results match the vendor's own screens.
pub const CRANK_TORQUE_FACTOR: f64 = 716.0;

/// Estimate crank torque from wheel power at a given engine speed.
pub fn crank_torque(hp: f64, rpm: f64) -> Result<f64, ParseError> {
    if rpm == 0.0 {
        return Err(ParseError::arithmetic(format!(
            "rpm is zero, cannot derive torque from {hp} hp"
        )));
    }
    let tq = hp * CRANK_TORQUE_FACTOR / rpm;
    if !tq.is_finite() {
        return Err(ParseError::arithmetic(format!(
            "torque from {hp} hp at {rpm} rpm is not finite"
        )));
    }
    Ok(tq)
}

/// Series label for a file: the name with its last extension removed.
/// `run.2.ine` → `run.2`, `notes` → `notes`.
pub fn label_from_filename(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem)
}

/// Turn a reader's table into a series of finite records.
///
/// A canonical column missing or a cell that is not a number fails the
/// whole table. A row that parses but holds a non-finite value is left out
/// and recorded, next to any rows the reader already rejected.
pub fn normalize(table: RawTable, filename: &str) -> Result<DynoSeries, ParseError> {
    let [rpm, hp, tq] = CANONICAL_COLUMNS.map(|name| table.require(name));
    let (rpm, hp, tq) = (rpm?, hp?, tq?);

    let mut records = Vec::with_capacity(table.len());
    let mut rejected = table.rejected().to_vec();

    for (row, &line) in table.lines().iter().enumerate() {
        let mut values = [0.0; 3];
        for (value, col) in values.iter_mut().zip([rpm, hp, tq]) {
            *value = col.cells[row].to_f64().map_err(|detail| {
                ParseError::malformed(format!("column '{}' line {line}: {detail}", col.name))
            })?;
        }

        let [rpm_v, hp_v, tq_v] = values;
        if values.iter().all(|v| v.is_finite()) {
            records.push(CanonicalRecord {
                rpm: rpm_v,
                torque: tq_v,
                horsepower: hp_v,
            });
        } else {
            let error = ParseError::arithmetic(format!(
                "non-finite value (rpm={rpm_v}, hp={hp_v}, tq={tq_v})"
            ));
            warn!("{filename}: dropping line {line}: {error}");
            rejected.push(RowRejection { line, error });
        }
    }

    Ok(DynoSeries::new(
        label_from_filename(filename),
        filename,
        records,
        rejected,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::{Cell, Column};
    use crate::error::ErrorKind;

    fn table(rpm: Vec<Cell>, hp: Vec<Cell>, tq: Vec<Cell>) -> RawTable {
        let lines = (1..=rpm.len()).collect();
        RawTable::new(
            vec![Column::new("rpm", rpm), Column::new("hp", hp), Column::new("tq", tq)],
            lines,
        )
        .unwrap()
    }

    fn text(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Text(v.to_string())).collect()
    }

    #[test]
    fn torque_factor() {
        let tq = crank_torque(100.0, 5000.0).unwrap();
        assert!((tq - 14.32).abs() < 1e-9);
    }

    #[test]
    fn torque_at_zero_rpm() {
        let err = crank_torque(50.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticFailure);
        assert_eq!(crank_torque(0.0, -0.0).unwrap_err().kind(), ErrorKind::ArithmeticFailure);
    }

    #[test]
    fn torque_non_finite() {
        let err = crank_torque(f64::INFINITY, 1000.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArithmeticFailure);
    }

    #[test]
    fn labels() {
        assert_eq!(label_from_filename("run1.csv"), "run1");
        assert_eq!(label_from_filename("run.2.ine"), "run.2");
        assert_eq!(label_from_filename("notes"), "notes");
    }

    #[test]
    fn text_cells_become_records() {
        let series = normalize(
            table(text(&["1000", "2000"]), text(&["50", "80"]), text(&["35", "28.6"])),
            "base.csv",
        )
        .unwrap();

        assert_eq!(series.label, "base");
        assert_eq!(series.source, "base.csv");
        assert_eq!(
            series.records[0],
            CanonicalRecord {
                rpm: 1000.0,
                torque: 35.0,
                horsepower: 50.0
            }
        );
        assert_eq!(series.records[1].torque, 28.6);
        assert!(series.rejected.is_empty());
    }

    #[test]
    fn non_numeric_cell_fails_table() {
        let err = normalize(
            table(text(&["1000", "abc"]), text(&["50", "80"]), text(&["35", "28"])),
            "bad.csv",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::malformed("column 'rpm' line 2: 'abc' is not a number")
        );
    }

    #[test]
    fn non_finite_rows_are_rejected() {
        let series = normalize(
            table(
                text(&["1000", "inf", "3000"]),
                text(&["50", "60", "NaN"]),
                vec![Cell::Number(35.0), Cell::Number(1.0), Cell::Number(2.0)],
            ),
            "odd.csv",
        )
        .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.rejected.len(), 2);
        assert_eq!(series.rejected[0].line, 2);
        assert_eq!(series.rejected[1].line, 3);
        assert!(series
            .rejected
            .iter()
            .all(|r| r.error.kind() == ErrorKind::ArithmeticFailure));
    }

    #[test]
    fn missing_column() {
        let t = RawTable::new(vec![Column::new("rpm", vec![])], vec![]).unwrap();
        let err = normalize(t, "x.csv").unwrap_err();
        assert_eq!(err, ParseError::malformed("missing column 'hp'"));
    }
}
