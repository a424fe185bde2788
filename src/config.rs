use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// What to do when the VendorXml channels carry different sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Fail the file with `MalformedTable`.
    #[default]
    Reject,
    /// Keep only the first `min(len)` samples of every channel.
    Truncate,
}

/// How VendorXml channel names are compared with the known labels.
/// The same rule applies to all three labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMatch {
    #[default]
    CaseInsensitive,
    Exact,
}

impl ChannelMatch {
    pub fn matches(self, name: &str, label: &str) -> bool {
        match self {
            ChannelMatch::CaseInsensitive => name.eq_ignore_ascii_case(label),
            ChannelMatch::Exact => name == label,
        }
    }
}

/// Number of preamble lines written by the PseudoCsv vendor software.
pub const DEFAULT_SKIP_LINES: usize = 24;

/// Tunables for [`ParseEngine`](crate::data::engine::ParseEngine).
///
/// Every field has a default, so an empty JSON object is a valid config:
///
/// ```json
/// { "parallel": false, "length_policy": "truncate", "channel_match": "exact" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Parse the files of a batch on the rayon pool.
    pub parallel: bool,
    pub length_policy: LengthPolicy,
    pub channel_match: ChannelMatch,
    /// Lines dropped before the PseudoCsv header row.
    pub skip_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            length_policy: LengthPolicy::default(),
            channel_match: ChannelMatch::default(),
            skip_lines: DEFAULT_SKIP_LINES,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Defaults, but batches are parsed on the calling thread.
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}
