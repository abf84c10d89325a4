//! Backend adapters
//!
//! Each adapter turns one discovery source's raw output into [`Record`]s
//! (or, for `lsusb -t`, into hierarchy hints). Adapters are pure: the host
//! binary runs the commands and hands the output over.
//!
//! - [`structured`] - libusb device descriptors
//! - [`flat`] - `lsusb` one-line-per-device text
//! - [`tree`] - `lsusb -t` indentation tree (hints only)
//! - [`profiler`] - macOS `system_profiler SPUSBDataType -json`
//!
//! [`Record`]: crate::Record

pub mod flat;
pub mod profiler;
pub mod structured;
pub mod tree;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use flat::parse_device_list;
pub use profiler::parse_profiler_json;
pub use structured::{UsbDescriptor, records_from_descriptors};
pub use tree::{HierarchyHints, HintNode, parse_hint_tree};

/// Discovery backend identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Structured enumeration through libusb
    Libusb,
    /// `lsusb` flat listing, enriched with `lsusb -t` hints
    Lsusb,
    /// macOS `system_profiler`
    SystemProfiler,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Libusb => "libusb",
            BackendKind::Lsusb => "lsusb",
            BackendKind::SystemProfiler => "system-profiler",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
