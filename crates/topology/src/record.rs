//! Device record model
//!
//! A [`Record`] is one USB device or hub as reported by a discovery backend.
//! Records start out flat; the reconstructor fills in `children` to turn the
//! set into a forest with one root hub per bus.

use crate::speed::Speed;
use serde::{Deserialize, Serialize};

/// Address reserved for a bus's root hub
pub const ROOT_HUB_ADDRESS: u8 = 1;

/// `(bus, address)` pair identifying a device within one snapshot
pub type DeviceKey = (u8, u8);

/// One USB device or hub at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// Manufacturer name (may be empty)
    #[serde(default)]
    pub vendor_name: String,
    /// Product name (may be empty)
    #[serde(default)]
    pub product_name: String,
    /// Bus number (one per host controller)
    pub bus: u8,
    /// Port on the parent hub, 0 when unknown or for root hubs
    #[serde(default)]
    pub port: u8,
    /// Device address on the bus
    pub address: u8,
    #[serde(default, skip_serializing_if = "is_none_or_empty")]
    pub serial: Option<String>,
    #[serde(default)]
    pub speed: Speed,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subclass: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    /// Maximum power draw, e.g. `500mA`
    #[serde(default, skip_serializing_if = "is_none_or_empty")]
    pub max_power: Option<String>,
    /// Devices attached downstream of this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Record>,
}

fn is_none_or_empty(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

impl Record {
    pub fn new(bus: u8, address: u8, vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
            bus,
            address,
            ..Self::default()
        }
    }

    pub fn key(&self) -> DeviceKey {
        (self.bus, self.address)
    }

    pub fn is_root_hub(&self) -> bool {
        self.address == ROOT_HUB_ADDRESS
    }

    pub fn add_child(&mut self, child: Record) {
        self.children.push(child);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Product name, falling back to vendor name, then a placeholder
    pub fn display_name(&self) -> &str {
        if !self.product_name.is_empty() {
            &self.product_name
        } else if !self.vendor_name.is_empty() {
            &self.vendor_name
        } else {
            "Unknown Device"
        }
    }

    /// `vvvv:pppp` in lowercase hex
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    /// Number of records in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Record::subtree_len).sum::<usize>()
    }

    /// Depth-first iterator over this record and all descendants
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
