//! `lsusb` strategy
//!
//! Runs `lsusb` for the device list and `lsusb -t` for the hierarchy. The
//! tree is optional: if it cannot be produced the devices are still returned
//! and the reconstructor falls back to port matching.

use super::run_command;
use std::path::PathBuf;
use topology::backend::{parse_device_list, parse_hint_tree};
use topology::{BackendKind, Discovery, DiscoveryStrategy, Result};
use tracing::{debug, warn};

pub struct LsusbStrategy {
    program: PathBuf,
}

impl LsusbStrategy {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl DiscoveryStrategy for LsusbStrategy {
    fn kind(&self) -> BackendKind {
        BackendKind::Lsusb
    }

    fn discover(&self) -> Result<Discovery> {
        let list = run_command(BackendKind::Lsusb, &self.program, &[])?;
        let tree = match run_command(BackendKind::Lsusb, &self.program, &["-t"]) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!("{}; continuing without hierarchy hints", e);
                None
            }
        };
        Ok(discovery_from_output(&list, tree.as_deref()))
    }
}

/// Combine `lsusb` and (optional) `lsusb -t` output
fn discovery_from_output(list: &str, tree: Option<&str>) -> Discovery {
    let records = parse_device_list(list);
    let hints = tree.map(parse_hint_tree).filter(|hints| !hints.is_empty());
    debug!(
        "lsusb listed {} device(s), {} hint node(s)",
        records.len(),
        hints.as_ref().map_or(0, |h| h.len())
    );
    Discovery::Flat { records, hints }
}
