//! Backend selection
//!
//! The selector walks an ordered list of discovery strategies, most reliable
//! first, and reconstructs the forest from the first one that succeeds.
//! Access-denied failures, and unavailable backends that still have a
//! successor, fall through to the next strategy; anything else is returned
//! to the caller.
//!
//! When nothing usable comes back, a fixed set of default root hubs is
//! returned instead of an empty forest. [`Snapshot::origin`] tells the two
//! cases apart.

use crate::backend::{BackendKind, HierarchyHints};
use crate::error::{DiscoveryError, Result};
use crate::reconstruct::{Reconstructor, default_root_hubs};
use crate::record::{DeviceKey, Record};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Default number of root hubs synthesized when discovery comes back empty
pub const DEFAULT_FALLBACK_ROOT_HUBS: u8 = 2;

/// Raw result of one discovery strategy
#[derive(Debug, Clone)]
pub enum Discovery {
    /// Flat records that still need their edges inferred
    Flat {
        records: Vec<Record>,
        hints: Option<HierarchyHints>,
    },
    /// Roots whose children the backend already reported
    Forest(Vec<Record>),
}

impl Discovery {
    fn is_empty(&self) -> bool {
        match self {
            Discovery::Flat { records, hints } => {
                records.is_empty() && hints.as_ref().is_none_or(HierarchyHints::is_empty)
            }
            Discovery::Forest(roots) => roots.is_empty(),
        }
    }
}

/// One way of finding the host's USB devices
pub trait DiscoveryStrategy {
    fn kind(&self) -> BackendKind;

    fn discover(&self) -> Result<Discovery>;
}

/// Where a snapshot's records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Reported by this backend
    Discovered(BackendKind),
    /// Placeholder root hubs; nothing was actually detected
    Synthesized,
}

/// Reconstructed forest plus its provenance
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub roots: Vec<Record>,
    pub origin: Origin,
}

impl Snapshot {
    pub fn is_synthesized(&self) -> bool {
        self.origin == Origin::Synthesized
    }

    /// Total number of records across all trees
    pub fn device_count(&self) -> usize {
        self.roots.iter().map(Record::subtree_len).sum()
    }
}

/// Ordered list of strategies with a soft-failure fallthrough
pub struct Selector {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
    reconstructor: Reconstructor,
    fallback_root_hubs: u8,
}

impl Selector {
    pub fn new(reconstructor: Reconstructor) -> Self {
        Self {
            strategies: Vec::new(),
            reconstructor,
            fallback_root_hubs: DEFAULT_FALLBACK_ROOT_HUBS,
        }
    }

    /// Append a strategy; earlier strategies are preferred
    pub fn with_strategy(mut self, strategy: impl DiscoveryStrategy + 'static) -> Self {
        self.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn DiscoveryStrategy>) {
        self.strategies.push(strategy);
    }

    /// Number of default root hubs to synthesize when nothing is found
    pub fn with_fallback_root_hubs(mut self, count: u8) -> Self {
        self.fallback_root_hubs = count;
        self
    }

    /// Backends in preference order
    pub fn backends(&self) -> Vec<BackendKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Run the strategies in order and build the forest
    pub fn select(&self) -> Result<Snapshot> {
        if self.strategies.is_empty() {
            return Err(DiscoveryError::NoBackends);
        }

        for (i, strategy) in self.strategies.iter().enumerate() {
            let kind = strategy.kind();
            let has_next = i + 1 < self.strategies.len();
            debug!("Trying {} backend", kind);

            match strategy.discover() {
                Ok(discovery) => return self.finish(kind, discovery),
                Err(e) if e.is_soft(has_next) => {
                    warn!("{}; falling back to next backend", e);
                }
                Err(e) => return Err(e),
            }
        }

        warn!("No backend could enumerate USB devices");
        Ok(self.synthesized())
    }

    fn finish(&self, kind: BackendKind, discovery: Discovery) -> Result<Snapshot> {
        if discovery.is_empty() {
            warn!("{} backend found no devices or buses", kind);
            return Ok(self.synthesized());
        }

        let roots = match discovery {
            Discovery::Flat { records, hints } => {
                self.reconstructor.reconstruct(records, hints.as_ref())
            }
            Discovery::Forest(roots) => check_forest(kind, roots)?,
        };

        let snapshot = Snapshot {
            roots,
            origin: Origin::Discovered(kind),
        };
        info!(
            "Discovered {} device(s) on {} bus(es) via {}",
            snapshot.device_count(),
            snapshot.roots.len(),
            kind
        );
        Ok(snapshot)
    }

    fn synthesized(&self) -> Snapshot {
        warn!(
            "Showing {} placeholder root hub(s); these were not detected",
            self.fallback_root_hubs
        );
        Snapshot {
            roots: default_root_hubs(self.reconstructor.identity(), self.fallback_root_hubs),
            origin: Origin::Synthesized,
        }
    }
}

/// Hold a backend-built forest to the shape the reconstructor guarantees:
/// one root hub per bus in bus order, children on their root's bus, and no
/// key reported twice. Address 0 marks an unknown address and may repeat.
fn check_forest(kind: BackendKind, mut roots: Vec<Record>) -> Result<Vec<Record>> {
    roots.sort_by_key(|root| root.bus);

    let mut seen: HashSet<DeviceKey> = HashSet::new();
    for (i, root) in roots.iter().enumerate() {
        if !root.is_root_hub() {
            return Err(DiscoveryError::malformed(
                kind,
                format!("root of bus {} has address {}", root.bus, root.address),
            ));
        }
        if i > 0 && roots[i - 1].bus == root.bus {
            return Err(DiscoveryError::malformed(
                kind,
                format!("bus {} reported twice", root.bus),
            ));
        }

        for record in root.iter() {
            if record.bus != root.bus {
                return Err(DiscoveryError::malformed(
                    kind,
                    format!(
                        "device {}:{} listed under bus {}",
                        record.bus, record.address, root.bus
                    ),
                ));
            }
            if record.address != 0 && !seen.insert(record.key()) {
                return Err(DiscoveryError::malformed(
                    kind,
                    format!("device {}:{} reported twice", record.bus, record.address),
                ));
            }
        }
    }

    Ok(roots)
}
