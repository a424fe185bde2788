use log::{debug, warn};

use super::format::FormatKind;
use super::normalize::{crank_torque, CANONICAL_COLUMNS};
use super::table::{Column, RawTable};
use crate::config::{ChannelMatch, EngineConfig, LengthPolicy};
use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read raw file bytes into a [`RawTable`] with the reader for `kind`.
///
/// Every reader returns a table holding exactly the canonical columns
/// (`rpm`, `hp`, `tq`) as text or numbers; turning them into records is
/// left to [`normalize`](super::normalize::normalize).
pub fn read_table(kind: FormatKind, bytes: &[u8], config: &EngineConfig) -> Result<RawTable, ParseError> {
    debug!("reading {} bytes as {kind}", bytes.len());
    match kind {
        FormatKind::GenericCsv => read_generic_csv(bytes),
        FormatKind::PseudoCsv => read_pseudo_csv(bytes, config.skip_lines),
        FormatKind::VendorXml => {
            read_vendor_xml(bytes, config.length_policy, config.channel_match)
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode strict UTF-8, dropping a leading byte-order mark.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::DecodeFailure {
        encoding: "UTF-8",
        detail: e.to_string(),
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Decode ISO-8859-1. Every byte maps to the code point of the same value,
/// so this cannot fail.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

// ---------------------------------------------------------------------------
// Generic CSV
// ---------------------------------------------------------------------------

/// Comma-separated UTF-8 text with a header naming `rpm`, `hp` and `tq`.
/// Other columns are ignored; no renaming or reordering happens.
pub fn read_generic_csv(bytes: &[u8]) -> Result<RawTable, ParseError> {
    let text = decode_utf8(bytes)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::malformed(format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ParseError::malformed(format!("CSV row {row_no}: {e}")))?;
        // header is line 1
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row_no + 2);
        rows.push((line, record.iter().map(|f| f.to_string()).collect()));
    }

    RawTable::from_rows(headers, rows)?.select(&CANONICAL_COLUMNS)
}

// ---------------------------------------------------------------------------
// Pseudo-CSV (Horacio Resio `.ine`)
// ---------------------------------------------------------------------------

/// Vehicle rpm column of the `.ine` export.
const VEHICLE_RPM: &str = "RPM_VEH";
/// Wheel power column of the `.ine` export, in CV.
const WHEEL_POWER: &str = "POT_RUEDA";

/// Latin-1 text: `skip_lines` lines of vendor preamble, then a
/// whitespace-separated header, a units row (`Kgm Cv ...`) and the samples
/// newest first.
///
/// The result has torque derived from wheel power, only the canonical
/// columns, and the samples oldest first. Rows whose torque cannot be
/// computed are dropped and listed in [`RawTable::rejected`].
pub fn read_pseudo_csv(bytes: &[u8], skip_lines: usize) -> Result<RawTable, ParseError> {
    let text = decode_latin1(bytes);

    let total = text.lines().count();
    if total < skip_lines {
        return Err(ParseError::malformed(format!(
            "expected a {skip_lines}-line preamble but the file has {total} lines"
        )));
    }

    let mut body = text
        .lines()
        .enumerate()
        .skip(skip_lines)
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = body
        .next()
        .ok_or_else(|| ParseError::malformed("no header row after the preamble"))?;
    let headers: Vec<String> = header.split_whitespace().map(str::to_string).collect();

    for expected in [VEHICLE_RPM, WHEEL_POWER] {
        if !headers.iter().any(|h| h == expected) {
            return Err(ParseError::malformed(format!(
                "missing column '{expected}' after the preamble"
            )));
        }
    }

    let rows: Vec<(usize, Vec<String>)> = body
        .map(|(line, fields)| (line, fields.split_whitespace().map(str::to_string).collect()))
        .collect();

    let table = RawTable::from_rows(headers, rows)?
        .drop_first_row()?
        .rename(&[(VEHICLE_RPM, "rpm"), (WHEEL_POWER, "hp")])
        .derive("tq", &["hp", "rpm"], |v| crank_torque(v[0], v[1]))?
        .select(&CANONICAL_COLUMNS)?
        .reversed();

    debug!(
        "pseudo-csv: {} rows kept, {} rejected",
        table.len(),
        table.rejected().len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Vendor XML (MWD `.ad3`)
// ---------------------------------------------------------------------------

/// Channel name in the export → canonical column it feeds.
const CHANNELS: [(&str, &str); 3] = [
    ("RPM Motor", "rpm"),
    ("Torque Corr", "tq"),
    ("Potencia Corr", "hp"),
];

/// Separator between values of a `Muestra` element.
const SAMPLE_SEPARATOR: &str = ", ";

/// Latin-1 XML. Each `Ensayo` holds `CanalVirtual` elements with a `Nombre`
/// and a `Muestra` whose text is `"v1, v2, ..."`.
///
/// Channels are collected in document order and folded into one slot per
/// canonical column, a later match replacing an earlier one. A channel that
/// never appears leaves its column empty. Unequal column lengths are
/// handled by `policy`. Row positions are 1-based sample indices.
pub fn read_vendor_xml(
    bytes: &[u8],
    policy: LengthPolicy,
    matching: ChannelMatch,
) -> Result<RawTable, ParseError> {
    let text = decode_latin1(bytes);
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(&text, options)
        .map_err(|e| ParseError::malformed(format!("invalid XML: {e}")))?;

    let samples = channel_matches(&doc, matching)?
        .into_iter()
        .fold(<[Vec<String>; 3]>::default(), |mut acc, (slot, values)| {
            acc[slot] = values;
            acc
        });
    let samples = align_lengths(samples, policy)?;

    let rows = samples[0].len();
    let columns = CHANNELS
        .iter()
        .zip(samples)
        .map(|(&(_, column), values)| Column::text(column, values))
        .collect();
    RawTable::new(columns, (1..=rows).collect())
}

/// Every `(slot, samples)` pair in document order, duplicates included.
fn channel_matches(
    doc: &roxmltree::Document<'_>,
    matching: ChannelMatch,
) -> Result<Vec<(usize, Vec<String>)>, ParseError> {
    let mut found = Vec::new();

    for trial in doc.descendants().filter(|n| n.has_tag_name("Ensayo")) {
        for channel in trial.descendants().filter(|n| n.has_tag_name("CanalVirtual")) {
            for name in channel.descendants().filter(|n| n.has_tag_name("Nombre")) {
                let Some(label) = name.text() else {
                    continue;
                };
                let Some(slot) = CHANNELS
                    .iter()
                    .position(|(known, _)| matching.matches(label, known))
                else {
                    continue;
                };
                for sample in channel.descendants().filter(|n| n.has_tag_name("Muestra")) {
                    let text = sample.text().ok_or_else(|| {
                        ParseError::malformed(format!("channel '{label}' has an empty Muestra"))
                    })?;
                    if found.iter().any(|(s, _)| *s == slot) {
                        debug!("channel '{label}' seen again, later samples replace earlier ones");
                    }
                    found.push((
                        slot,
                        text.split(SAMPLE_SEPARATOR).map(str::to_string).collect(),
                    ));
                }
            }
        }
    }

    Ok(found)
}

fn align_lengths(
    mut samples: [Vec<String>; 3],
    policy: LengthPolicy,
) -> Result<[Vec<String>; 3], ParseError> {
    let shortest = samples.iter().map(Vec::len).min().unwrap_or(0);
    let longest = samples.iter().map(Vec::len).max().unwrap_or(0);
    if shortest == longest {
        return Ok(samples);
    }

    let counts = CHANNELS
        .iter()
        .zip(&samples)
        .map(|((_, column), values)| format!("{column}={}", values.len()))
        .collect::<Vec<_>>()
        .join(", ");

    match policy {
        LengthPolicy::Reject => Err(ParseError::malformed(format!(
            "channel sample counts differ ({counts})"
        ))),
        LengthPolicy::Truncate => {
            warn!("channel sample counts differ ({counts}), truncating to {shortest}");
            for values in &mut samples {
                values.truncate(shortest);
            }
            Ok(samples)
        }
    }
}
