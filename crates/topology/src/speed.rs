//! USB link speed labels
//!
//! Every backend reports speed differently: libusb hands out a numeric code,
//! `lsusb -t` prints a token such as `480M`, and `system_profiler` uses
//! identifiers like `high_speed`. All of them collapse into [`Speed`], which
//! serializes as its human-readable label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// USB device speed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Speed {
    /// Low speed - 1.5 Mbps (USB 1.0)
    Low,
    /// Full speed - 12 Mbps (USB 1.1)
    Full,
    /// High speed - 480 Mbps (USB 2.0)
    High,
    /// SuperSpeed - 5 Gbps (USB 3.0)
    Super,
    /// SuperSpeed+ - 10 Gbps (USB 3.1)
    SuperPlus,
    /// Speed not reported by the backend
    #[default]
    Unknown,
    /// A backend token the tables do not know, kept verbatim
    Other(String),
}

/// libusb speed codes (`LIBUSB_SPEED_*`) and the speed they stand for
const SPEED_CODES: &[(u8, Speed)] = &[
    (1, Speed::Low),
    (2, Speed::Full),
    (3, Speed::High),
    (4, Speed::Super),
    (5, Speed::SuperPlus),
];

/// `lsusb -t` trailing speed tokens
const TREE_TOKENS: &[(&str, Speed)] = &[
    ("1.5M", Speed::Low),
    ("12M", Speed::Full),
    ("480M", Speed::High),
    ("5000M", Speed::Super),
    ("10000M", Speed::SuperPlus),
];

/// `system_profiler` speed identifiers, most specific first
const PROFILER_SPEEDS: &[(&str, Speed)] = &[
    ("low_speed", Speed::Low),
    ("full_speed", Speed::Full),
    ("high_speed", Speed::High),
    ("super_speed_5gbps", Speed::Super),
    ("super_speed_10gbps", Speed::SuperPlus),
    ("super_speed", Speed::Super),
];

impl Speed {
    /// Display label, e.g. `High (480 Mbps)`
    pub fn label(&self) -> &str {
        match self {
            Speed::Low => "Low (1.5 Mbps)",
            Speed::Full => "Full (12 Mbps)",
            Speed::High => "High (480 Mbps)",
            Speed::Super => "Super (5 Gbps)",
            Speed::SuperPlus => "Super+ (10 Gbps)",
            Speed::Unknown => "Unknown",
            Speed::Other(raw) => raw,
        }
    }

    /// Map a libusb speed code; anything outside the table is `Unknown`
    pub fn from_code(code: u8) -> Self {
        SPEED_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, speed)| speed.clone())
            .unwrap_or(Speed::Unknown)
    }

    /// Map an `lsusb -t` token such as `480M`
    pub fn from_tree_token(token: &str) -> Self {
        let token = token.trim();
        if token.is_empty() {
            return Speed::Unknown;
        }
        TREE_TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, speed)| speed.clone())
            .unwrap_or_else(|| Speed::Other(token.to_string()))
    }

    /// Map a `system_profiler` `device_speed` value
    pub fn from_profiler(value: &str) -> Self {
        if value.is_empty() {
            return Speed::Unknown;
        }
        PROFILER_SPEEDS
            .iter()
            .find(|(needle, _)| value.contains(needle))
            .map(|(_, speed)| speed.clone())
            .unwrap_or_else(|| Speed::Other(value.to_string()))
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Speed::Unknown)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Speed> for String {
    fn from(speed: Speed) -> Self {
        speed.label().to_string()
    }
}

impl From<String> for Speed {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Low (1.5 Mbps)" => Speed::Low,
            "Full (12 Mbps)" => Speed::Full,
            "High (480 Mbps)" => Speed::High,
            "Super (5 Gbps)" => Speed::Super,
            "Super+ (10 Gbps)" => Speed::SuperPlus,
            "Unknown" | "" => Speed::Unknown,
            _ => Speed::Other(label),
        }
    }
}
