//! Host discovery strategies
//!
//! These are the I/O side of the topology backends: each strategy talks to
//! libusb or runs a system command, then hands the raw result to the
//! matching pure adapter in `topology::backend`.

mod libusb;
mod lsusb;
mod system_profiler;

pub use libusb::LibusbStrategy;
pub use lsusb::LsusbStrategy;
pub use system_profiler::SystemProfilerStrategy;

use crate::config::DiscoverySettings;
use std::io;
use std::path::Path;
use std::process::Command;
use topology::{BackendKind, DiscoveryError, DiscoveryStrategy, Reconstructor, Selector};
use tracing::debug;

/// Build the selector for the configured backend order
pub fn build_selector(settings: &DiscoverySettings) -> Selector {
    let mut selector =
        Selector::new(Reconstructor::default()).with_fallback_root_hubs(settings.fallback_root_hubs);

    for kind in &settings.backends {
        selector.push(strategy_for(*kind, settings));
    }

    debug!("Backend order: {:?}", selector.backends());
    selector
}

fn strategy_for(kind: BackendKind, settings: &DiscoverySettings) -> Box<dyn DiscoveryStrategy> {
    match kind {
        BackendKind::Libusb => Box::new(LibusbStrategy::new()),
        BackendKind::Lsusb => Box::new(LsusbStrategy::new(settings.lsusb_command())),
        BackendKind::SystemProfiler => Box::new(SystemProfilerStrategy::new(
            settings.system_profiler_command(),
        )),
    }
}

/// Run `program` with `args` and return its stdout.
///
/// A missing executable or a non-zero exit makes the backend unavailable;
/// permission problems are reported as access denied.
pub(crate) fn run_command(
    kind: BackendKind,
    program: &Path,
    args: &[&str],
) -> Result<String, DiscoveryError> {
    debug!("Running {} {}", program.display(), args.join(" "));

    let output = Command::new(program).args(args).output().map_err(|e| {
        let reason = format!("failed to run {}: {}", program.display(), e);
        match e.kind() {
            io::ErrorKind::PermissionDenied => DiscoveryError::access_denied(kind, reason),
            _ => DiscoveryError::unavailable(kind, reason),
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = format!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        );
        if stderr.to_lowercase().contains("permission denied") {
            return Err(DiscoveryError::access_denied(kind, reason));
        }
        return Err(DiscoveryError::unavailable(kind, reason));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_selector_keeps_order() {
        let settings = DiscoverySettings {
            backends: vec![
                BackendKind::SystemProfiler,
                BackendKind::Lsusb,
                BackendKind::Libusb,
            ],
            ..DiscoverySettings::default()
        };
        let selector = build_selector(&settings);
        assert_eq!(
            selector.backends(),
            vec![
                BackendKind::SystemProfiler,
                BackendKind::Lsusb,
                BackendKind::Libusb
            ]
        );
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let err = run_command(
            BackendKind::Lsusb,
            &PathBuf::from("/nonexistent/usbtree-test/lsusb"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, DiscoveryError::Unavailable { .. }));
        assert_eq!(err.backend(), Some(BackendKind::Lsusb));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_is_unavailable() {
        let err = run_command(BackendKind::Lsusb, Path::new("false"), &[]).unwrap_err();
        assert!(matches!(err, DiscoveryError::Unavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_permission_message_is_access_denied() {
        let err = run_command(
            BackendKind::Lsusb,
            Path::new("sh"),
            &["-c", "echo 'lsusb: Permission denied' >&2; exit 1"],
        )
        .unwrap_err();
        assert!(matches!(err, DiscoveryError::AccessDenied { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_captured() {
        let output = run_command(BackendKind::Lsusb, Path::new("echo"), &["hello"]).unwrap();
        assert_eq!(output.trim(), "hello");
    }
}
