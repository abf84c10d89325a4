//! macOS `system_profiler SPUSBDataType -json` strategy

use super::run_command;
use std::path::PathBuf;
use topology::backend::parse_profiler_json;
use topology::{BackendKind, Discovery, DiscoveryStrategy, Result};

const PROFILER_ARGS: &[&str] = &["SPUSBDataType", "-json"];

pub struct SystemProfilerStrategy {
    program: PathBuf,
}

impl SystemProfilerStrategy {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }
}

impl DiscoveryStrategy for SystemProfilerStrategy {
    fn kind(&self) -> BackendKind {
        BackendKind::SystemProfiler
    }

    fn discover(&self) -> Result<Discovery> {
        let output = run_command(BackendKind::SystemProfiler, &self.program, PROFILER_ARGS)?;
        // Already hierarchical; the tree comes back as-is
        Ok(Discovery::Forest(parse_profiler_json(&output)?))
    }
}
