use std::fmt;

use crate::error::ParseError;

/// The vendor layouts the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Plain comma-separated text with an `rpm,hp,tq` header.
    GenericCsv,
    /// Horacio Resio `.ine` export: Latin-1, fixed preamble, whitespace columns.
    PseudoCsv,
    /// MWD `.ad3` export: Latin-1 XML with per-channel sample strings.
    VendorXml,
}

impl FormatKind {
    /// Codepage the format is decoded with.
    pub fn encoding(self) -> &'static str {
        match self {
            FormatKind::GenericCsv => "UTF-8",
            FormatKind::PseudoCsv | FormatKind::VendorXml => "ISO-8859-1",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::GenericCsv => "generic-csv",
            FormatKind::PseudoCsv => "pseudo-csv",
            FormatKind::VendorXml => "vendor-xml",
        };
        f.write_str(name)
    }
}

/// Pick a format from the filename alone.
///
/// The check is a substring match anywhere in the name, tried in a fixed
/// order: `csv`, then `ine`, then `ad3`. So `machine.csv.bak` is GenericCsv
/// and `engine.ad3` is PseudoCsv.
pub fn sniff(filename: &str) -> Result<FormatKind, ParseError> {
    const RULES: [(&str, FormatKind); 3] = [
        ("csv", FormatKind::GenericCsv),
        ("ine", FormatKind::PseudoCsv),
        ("ad3", FormatKind::VendorXml),
    ];

    RULES
        .iter()
        .find(|(needle, _)| filename.contains(needle))
        .map(|&(_, kind)| kind)
        .ok_or_else(|| ParseError::UnknownFormat(filename.to_string()))
}
