//! Topology reconstruction
//!
//! Turns a flat record set into a forest with one root hub per bus.
//!
//! Edges come from one of two sources:
//! - `lsusb -t` hierarchy hints, when available: each hint names the parent
//!   device directly.
//! - the port fallback otherwise: a record on port `N` hangs off the device
//!   at address `N` on the same bus, or off the bus root if there is none.
//!
//! Anything still unattached afterwards is an orphan and goes under its bus
//! root, so no record is ever dropped. Records are kept in an index-based
//! arena while edges are decided, which makes the "at most one parent" and
//! "no cycles" checks cheap, and are only moved into their parents' `children`
//! at the very end.
//!
//! Ordering: buses ascend; siblings keep the order their edges were made in,
//! which is hint order when hints drove the edges and input order otherwise.

use crate::backend::HierarchyHints;
use crate::record::{DeviceKey, ROOT_HUB_ADDRESS, Record};
use crate::speed::Speed;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// Vendor ID the Linux kernel uses for its virtual root hubs
pub const LINUX_FOUNDATION_VENDOR_ID: u16 = 0x1d6b;

/// Apple's vendor ID, used for macOS root hubs
pub const APPLE_VENDOR_ID: u16 = 0x05ac;

/// Vendor identity given to synthesized root hubs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootHubIdentity {
    pub vendor_id: u16,
    pub vendor_name: &'static str,
}

impl RootHubIdentity {
    pub const LINUX: Self = Self {
        vendor_id: LINUX_FOUNDATION_VENDOR_ID,
        vendor_name: "Linux Foundation",
    };

    pub const APPLE: Self = Self {
        vendor_id: APPLE_VENDOR_ID,
        vendor_name: "Apple Inc.",
    };

    /// Identity matching the platform we were built for
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::APPLE
        } else {
            Self::LINUX
        }
    }
}

impl Default for RootHubIdentity {
    fn default() -> Self {
        Self::host()
    }
}

/// Build a root hub record for `bus`.
///
/// Buses 1 and 2 are assumed to be USB 2.0 controllers, higher ones USB 3.0.
pub fn root_hub_for_bus(identity: &RootHubIdentity, bus: u8) -> Record {
    let (product_id, version, speed) = if bus <= 2 {
        (0x0002, 2, Speed::High)
    } else {
        (0x0003, 3, Speed::Super)
    };

    Record {
        vendor_id: identity.vendor_id,
        product_id,
        vendor_name: identity.vendor_name.to_string(),
        product_name: format!("USB {}.0 Root Hub", version),
        bus,
        port: 0,
        address: ROOT_HUB_ADDRESS,
        speed,
        class: "Hub".to_string(),
        subclass: "00".to_string(),
        protocol: "00".to_string(),
        ..Record::default()
    }
}

/// Root hubs for buses `1..=count`, used when nothing could be discovered
pub fn default_root_hubs(identity: &RootHubIdentity, count: u8) -> Vec<Record> {
    (1..=count)
        .map(|bus| root_hub_for_bus(identity, bus))
        .collect()
}

/// Rebuilds the device forest from flat records
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconstructor {
    identity: RootHubIdentity,
}

impl Reconstructor {
    pub fn new(identity: RootHubIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &RootHubIdentity {
        &self.identity
    }

    /// Build the forest: one root record per bus, buses ascending
    pub fn reconstruct(&self, records: Vec<Record>, hints: Option<&HierarchyHints>) -> Vec<Record> {
        let mut arena = Arena::new(records);

        let mut buses: BTreeSet<u8> = arena.buses();
        if let Some(hints) = hints {
            buses.extend(hints.buses());
        }
        for bus in buses {
            arena.ensure_root(bus, &self.identity);
        }

        let mut edges = 0;
        if let Some(hints) = hints {
            edges = arena.apply_hints(hints);
        }
        if edges == 0 {
            arena.attach_by_port();
        }
        arena.attach_orphans();

        let forest = arena.into_forest();
        debug!(
            "Reconstructed {} bus tree(s), {} hint edge(s)",
            forest.len(),
            edges
        );
        forest
    }
}

/// Index-based working set for edge decisions
struct Arena {
    slots: Vec<Option<Record>>,
    keys: Vec<DeviceKey>,
    index: HashMap<DeviceKey, usize>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: BTreeMap<u8, usize>,
}

impl Arena {
    /// Load records, collapsing duplicate `(bus, address)` keys (last wins)
    fn new(records: Vec<Record>) -> Self {
        let mut arena = Self {
            slots: Vec::with_capacity(records.len()),
            keys: Vec::with_capacity(records.len()),
            index: HashMap::with_capacity(records.len()),
            parent: Vec::with_capacity(records.len()),
            children: Vec::with_capacity(records.len()),
            roots: BTreeMap::new(),
        };

        for record in records {
            let key = record.key();
            match arena.index.get(&key) {
                Some(&slot) => {
                    debug!("Duplicate record for bus {} address {}", key.0, key.1);
                    arena.slots[slot] = Some(record);
                }
                None => {
                    arena.push(record);
                }
            }
        }

        for (&key, &slot) in &arena.index {
            if key.1 == ROOT_HUB_ADDRESS {
                arena.roots.insert(key.0, slot);
            }
        }

        arena
    }

    fn push(&mut self, record: Record) -> usize {
        let slot = self.slots.len();
        let key = record.key();
        self.index.insert(key, slot);
        self.keys.push(key);
        self.slots.push(Some(record));
        self.parent.push(None);
        self.children.push(Vec::new());
        slot
    }

    fn buses(&self) -> BTreeSet<u8> {
        self.keys.iter().map(|(bus, _)| *bus).collect()
    }

    fn ensure_root(&mut self, bus: u8, identity: &RootHubIdentity) {
        if self.roots.contains_key(&bus) {
            return;
        }
        debug!("Synthesizing root hub for bus {}", bus);
        let slot = self.push(root_hub_for_bus(identity, bus));
        self.roots.insert(bus, slot);
    }

    fn record_mut(&mut self, slot: usize) -> Option<&mut Record> {
        self.slots[slot].as_mut()
    }

    fn is_root(&self, slot: usize) -> bool {
        self.keys[slot].1 == ROOT_HUB_ADDRESS
    }

    /// Copy ports and speeds from the hints, then wire up hinted edges.
    ///
    /// Returns the number of edges made.
    fn apply_hints(&mut self, hints: &HierarchyHints) -> usize {
        for node in hints.iter() {
            let Some(&slot) = self.index.get(&node.key()) else {
                continue;
            };
            let is_root = self.is_root(slot);
            let Some(record) = self.record_mut(slot) else {
                continue;
            };
            if !is_root {
                record.port = node.port;
            }
            if let Some(token) = &node.speed {
                record.speed = Speed::from_tree_token(token);
            }
        }

        let mut edges = 0;
        for node in hints.iter() {
            let Some(parent_key) = node.parent else {
                continue;
            };
            let Some(&child) = self.index.get(&node.key()) else {
                continue;
            };
            let parent = match self.index.get(&parent_key) {
                Some(&parent) => parent,
                None => {
                    debug!(
                        "Hint parent {:?} of {:?} not found, using bus root",
                        parent_key,
                        node.key()
                    );
                    match self.roots.get(&node.bus) {
                        Some(&root) => root,
                        None => continue,
                    }
                }
            };
            if self.attach(child, parent) {
                edges += 1;
            }
        }
        edges
    }

    /// Port fallback: port `N` means "behind the device at address `N`"
    fn attach_by_port(&mut self) {
        for slot in 0..self.slots.len() {
            if self.is_root(slot) || self.parent[slot].is_some() {
                continue;
            }
            let Some(port) = self.slots[slot].as_ref().map(|r| r.port) else {
                continue;
            };
            if port == 0 {
                continue;
            }
            let bus = self.keys[slot].0;
            let target = self
                .index
                .get(&(bus, port))
                .copied()
                .filter(|&parent| parent != slot);

            let attached = match target {
                Some(parent) => self.attach(slot, parent),
                None => false,
            };
            if !attached {
                if let Some(&root) = self.roots.get(&bus) {
                    debug!(
                        "No parent at bus {} address {}, attaching {:?} to bus root",
                        bus, port, self.keys[slot]
                    );
                    self.attach(slot, root);
                }
            }
        }
    }

    /// Anything not yet placed goes under its bus root
    fn attach_orphans(&mut self) {
        for slot in 0..self.slots.len() {
            if self.is_root(slot) || self.parent[slot].is_some() {
                continue;
            }
            let bus = self.keys[slot].0;
            if let Some(&root) = self.roots.get(&bus) {
                debug!("Attaching orphan {:?} to bus root", self.keys[slot]);
                self.attach(slot, root);
            }
        }
    }

    /// Make `parent` the parent of `child`.
    ///
    /// Refused when the child is a root hub, already has a parent, lives on
    /// another bus, or is an ancestor of `parent`.
    fn attach(&mut self, child: usize, parent: usize) -> bool {
        if child == parent || self.is_root(child) {
            return false;
        }
        if self.parent[child].is_some() {
            debug!("{:?} already attached, ignoring extra edge", self.keys[child]);
            return false;
        }
        if self.keys[child].0 != self.keys[parent].0 {
            return false;
        }

        let mut ancestor = Some(parent);
        while let Some(slot) = ancestor {
            if slot == child {
                debug!(
                    "Refusing edge {:?} -> {:?}: would form a cycle",
                    self.keys[parent], self.keys[child]
                );
                return false;
            }
            ancestor = self.parent[slot];
        }

        self.parent[child] = Some(parent);
        self.children[parent].push(child);
        true
    }

    fn into_forest(mut self) -> Vec<Record> {
        let roots: Vec<usize> = self.roots.values().copied().collect();
        roots
            .into_iter()
            .filter_map(|root| self.take_subtree(root))
            .collect()
    }

    fn take_subtree(&mut self, slot: usize) -> Option<Record> {
        let mut record = self.slots[slot].take()?;
        let children = std::mem::take(&mut self.children[slot]);
        for child in children {
            if let Some(subtree) = self.take_subtree(child) {
                record.add_child(subtree);
            }
        }
        Some(record)
    }
}
