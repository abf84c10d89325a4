//! `lsusb -t` hierarchy hint adapter
//!
//! `lsusb -t` prints the physical tree but none of the vendor/product
//! details, so it never yields records of its own. Instead it produces
//! [`HierarchyHints`]: per `(bus, device)` the port, link speed and parent
//! device, which the reconstructor uses to wire up the flat `lsusb` list.
//!
//! ```text
//! /:  Bus 001.Port 001: Dev 001, Class=root_hub, Driver=xhci_hcd/12p, 480M
//!     |__ Port 003: Dev 002, If 0, Class=Hub, Driver=hub/4p, 480M
//!         |__ Port 001: Dev 004, If 0, Class=Human Interface Device, Driver=usbhid, 12M
//! ```

use crate::record::DeviceKey;
use std::collections::{BTreeSet, HashMap};
use tracing::trace;

/// Leading spaces per nesting level
pub const INDENT_UNIT: usize = 4;

/// One device position recovered from the tree text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintNode {
    pub bus: u8,
    pub port: u8,
    pub device: u8,
    /// Raw speed token such as `480M`
    pub speed: Option<String>,
    /// Key of the parent device, `None` for bus roots
    pub parent: Option<DeviceKey>,
}

impl HintNode {
    pub fn key(&self) -> DeviceKey {
        (self.bus, self.device)
    }
}

/// Hint nodes keyed by `(bus, device)`, in the order they were printed
#[derive(Debug, Clone, Default)]
pub struct HierarchyHints {
    nodes: Vec<HintNode>,
    index: HashMap<DeviceKey, usize>,
}

impl HierarchyHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; the first node seen for a key wins.
    ///
    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, node: HintNode) -> bool {
        let key = node.key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn get(&self, key: DeviceKey) -> Option<&HintNode> {
        self.index.get(&key).map(|&i| &self.nodes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &HintNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every bus number mentioned by a node
    pub fn buses(&self) -> BTreeSet<u8> {
        self.nodes.iter().map(|node| node.bus).collect()
    }
}

/// Parse `lsusb -t` output
pub fn parse_hint_tree(output: &str) -> HierarchyHints {
    let mut hints = HierarchyHints::new();
    let mut current_bus: Option<u8> = None;
    let mut stack: Vec<DeviceKey> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start_matches(' ').len();
        let level = indent / INDENT_UNIT;

        if let Some((bus, port, device)) = parse_root(line) {
            current_bus = Some(bus);
            let node = HintNode {
                bus,
                port,
                device,
                speed: speed_token(line),
                parent: None,
            };
            stack.clear();
            stack.push(node.key());
            hints.insert(node);
        } else if let Some((port, device)) = parse_child(line) {
            let Some(bus) = current_bus else {
                trace!("Skipping lsusb -t line before any bus root: {:?}", line);
                continue;
            };

            stack.truncate(level);
            let node = HintNode {
                bus,
                port,
                device,
                speed: speed_token(line),
                parent: stack.last().copied(),
            };
            let key = node.key();

            // Interface lines repeat the device; the first one is indexed,
            // but every repeat still becomes the parent for deeper lines.
            hints.insert(node);
            if level >= stack.len() {
                stack.push(key);
            } else {
                stack[level] = key;
            }
        } else {
            trace!("Skipping unrecognized lsusb -t line: {:?}", line);
        }
    }

    hints
}

/// `Bus N.Port N: Dev N`
fn parse_root(line: &str) -> Option<(u8, u8, u8)> {
    let (bus, rest) = number_after(line, "Bus ")?;
    let (port, rest) = number_after(rest.strip_prefix(".")?, "Port ")?;
    let (device, _) = number_after(rest.strip_prefix(": ")?, "Dev ")?;
    Some((bus, port, device))
}

/// `Port N: Dev N`
fn parse_child(line: &str) -> Option<(u8, u8)> {
    let (port, rest) = number_after(line, "Port ")?;
    let (device, _) = number_after(rest.strip_prefix(": ")?, "Dev ")?;
    Some((port, device))
}

/// Find `label` and parse the decimal number right after it
fn number_after<'a>(s: &'a str, label: &str) -> Option<(u8, &'a str)> {
    let start = s.find(label)? + label.len();
    let tail = &s[start..];
    let end = tail
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(tail.len());
    let value = tail[..end].parse().ok()?;
    Some((value, &tail[end..]))
}

/// Trailing speed field, e.g. `480M` or `1.5M`
fn speed_token(line: &str) -> Option<String> {
    let (_, last) = line.trim_end().rsplit_once(',')?;
    let token = last.trim();
    let number = token.strip_suffix('M')?;
    let valid = !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit() || c == '.')
        && number.starts_with(|c: char| c.is_ascii_digit());
    valid.then(|| token.to_string())
}
