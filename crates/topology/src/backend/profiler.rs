//! macOS `system_profiler SPUSBDataType -json` adapter
//!
//! Unlike the Linux text sources, system_profiler already reports the tree:
//! each controller carries its devices under `_items`, recursively. The
//! adapter therefore returns finished root records, one per controller,
//! numbered as buses from 1 in document order.

use super::BackendKind;
use crate::class::classify;
use crate::error::{DiscoveryError, Result};
use crate::reconstruct::{RootHubIdentity, root_hub_for_bus};
use crate::record::{ROOT_HUB_ADDRESS, Record};
use crate::speed::Speed;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProfilerDocument {
    #[serde(rename = "SPUSBDataType", alias = "SPUSBHostDataType", default)]
    controllers: Vec<ProfilerEntry>,
}

/// Controllers and devices share one shape
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfilerEntry {
    #[serde(rename = "_name")]
    name: String,
    vendor_id: Option<String>,
    product_id: Option<String>,
    manufacturer: Option<String>,
    serial_num: Option<String>,
    device_speed: Option<String>,
    location_id: Option<String>,
    current_available: Option<String>,
    current_required: Option<String>,
    bus_power_used: Option<String>,
    #[serde(rename = "_items")]
    items: Vec<ProfilerEntry>,
}

/// Parse the JSON document into one root record per controller
pub fn parse_profiler_json(json: &str) -> Result<Vec<Record>> {
    let document: ProfilerDocument = serde_json::from_str(json)
        .map_err(|e| DiscoveryError::malformed(BackendKind::SystemProfiler, e.to_string()))?;

    let roots = document
        .controllers
        .iter()
        .enumerate()
        .map(|(i, controller)| {
            let bus = u8::try_from(i + 1).unwrap_or(u8::MAX);
            let mut root = controller_record(controller, bus);
            attach_items(&mut root, &controller.items, 1);
            root
        })
        .collect();

    Ok(roots)
}

fn controller_record(controller: &ProfilerEntry, bus: u8) -> Record {
    let mut root = root_hub_for_bus(&RootHubIdentity::APPLE, bus);

    if let Some(vid) = controller.vendor_id.as_deref().and_then(parse_hex_id) {
        root.vendor_id = vid;
    }
    root.product_id = controller
        .product_id
        .as_deref()
        .and_then(parse_hex_id)
        .unwrap_or(if is_usb3_name(&controller.name) {
            0x0003
        } else {
            0x0002
        });
    if let Some(manufacturer) = controller.manufacturer.as_deref().filter(|m| !m.is_empty()) {
        root.vendor_name = manufacturer.to_string();
    }
    if !controller.name.is_empty() {
        root.product_name = controller.name.clone();
    }
    root.speed = controller
        .device_speed
        .as_deref()
        .map(Speed::from_profiler)
        .unwrap_or(Speed::Unknown);
    root.max_power = controller.current_available.clone();
    root
}

fn attach_items(parent: &mut Record, items: &[ProfilerEntry], depth: u32) {
    for item in items {
        let mut device = device_record(item, parent.bus, depth);
        attach_items(&mut device, &item.items, depth + 1);
        parent.add_child(device);
    }
}

fn device_record(item: &ProfilerEntry, bus: u8, depth: u32) -> Record {
    let location = item.location_id.as_deref().map(parse_location);
    let (port, address) = location
        .map(|(loc, address)| (port_at_depth(loc, depth), address))
        .unwrap_or((0, 0));
    // Address 1 belongs to the controller root emitted for this bus
    let address = if address == ROOT_HUB_ADDRESS { 0 } else { address };

    Record {
        vendor_id: item.vendor_id.as_deref().and_then(parse_hex_id).unwrap_or(0),
        product_id: item.product_id.as_deref().and_then(parse_hex_id).unwrap_or(0),
        vendor_name: item.manufacturer.clone().unwrap_or_default(),
        product_name: item.name.clone(),
        bus,
        port,
        address,
        serial: item.serial_num.clone().filter(|s| !s.is_empty()),
        speed: item
            .device_speed
            .as_deref()
            .map(Speed::from_profiler)
            .unwrap_or(Speed::Unknown),
        class: classify(&item.name).to_string(),
        subclass: String::new(),
        protocol: String::new(),
        max_power: item.current_required.clone().or_else(|| {
            item.bus_power_used
                .as_deref()
                .map(|ma| format!("{}mA", ma.trim()))
        }),
        children: Vec::new(),
    }
}

fn is_usb3_name(name: &str) -> bool {
    name.contains("3.") || name.contains("USB 3")
}

/// Parse `0x05ac`, `0x05ac  (Apple Inc.)` or `05ac`
fn parse_hex_id(value: &str) -> Option<u16> {
    let token = value.split_whitespace().next()?;
    let token = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u16::from_str_radix(token, 16).ok()
}

/// Split `0x14100000 / 2` into the location word and the device address
fn parse_location(value: &str) -> (u32, u8) {
    let (loc, address) = value.split_once('/').unwrap_or((value, ""));
    let loc = loc.trim();
    let loc = loc.strip_prefix("0x").unwrap_or(loc);
    (
        u32::from_str_radix(loc, 16).unwrap_or(0),
        address.trim().parse().unwrap_or(0),
    )
}

/// The location word holds the bus in its top byte followed by one port
/// nibble per hub tier
fn port_at_depth(location: u32, depth: u32) -> u8 {
    if depth == 0 || depth > 6 {
        return 0;
    }
    ((location >> (24 - 4 * depth)) & 0xf) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "SPUSBDataType": [
        {
          "_name": "USB 3.1 Bus",
          "host_controller": "AppleT8112USBXHCI",
          "_items": [
            {
              "_name": "USB2.0 Hub",
              "vendor_id": "0x05e3  (Genesys Logic, Inc.)",
              "product_id": "0x0610",
              "manufacturer": "GenesysLogic",
              "device_speed": "high_speed",
              "location_id": "0x01100000 / 1",
              "_items": [
                {
                  "_name": "USB Keyboard",
                  "vendor_id": "0x04d9",
                  "product_id": "0x0169",
                  "serial_num": "",
                  "device_speed": "low_speed",
                  "location_id": "0x01130000 / 3",
                  "current_required": "100"
                }
              ]
            }
          ]
        },
        { "_name": "USB 2.0 Bus" }
      ]
    }"#;

    #[test]
    fn test_parse_controllers_as_buses() {
        let roots = parse_profiler_json(SAMPLE).unwrap();
        assert_eq!(roots.len(), 2);

        let first = &roots[0];
        assert_eq!(first.bus, 1);
        assert_eq!(first.address, 1);
        assert_eq!(first.vendor_id, 0x05ac);
        assert_eq!(first.product_id, 0x0003);
        assert_eq!(first.vendor_name, "Apple Inc.");
        assert_eq!(first.product_name, "USB 3.1 Bus");
        assert_eq!(first.class, "Hub");
        assert_eq!(first.speed, Speed::Unknown);

        let second = &roots[1];
        assert_eq!(second.bus, 2);
        assert_eq!(second.product_id, 0x0002);
        assert!(!second.has_children());
    }

    #[test]
    fn test_nested_items() {
        let roots = parse_profiler_json(SAMPLE).unwrap();
        let hub = &roots[0].children[0];
        assert_eq!(hub.vendor_id, 0x05e3);
        assert_eq!(hub.vendor_name, "GenesysLogic");
        assert_eq!(hub.speed, Speed::High);
        assert_eq!(hub.class, "Hub");
        assert_eq!(hub.port, 1);
        assert_eq!(hub.address, 0);
        assert!(!hub.is_root_hub());

        let keyboard = &hub.children[0];
        assert_eq!(keyboard.bus, 1);
        assert_eq!(keyboard.port, 3);
        assert_eq!(keyboard.address, 3);
        assert_eq!(keyboard.speed, Speed::Low);
        assert_eq!(keyboard.class, "HID");
        assert_eq!(keyboard.serial, None);
        assert_eq!(keyboard.max_power.as_deref(), Some("100"));
    }

    #[test]
    fn test_only_controllers_are_root_hubs() {
        let roots = parse_profiler_json(SAMPLE).unwrap();
        for root in &roots {
            assert!(root.is_root_hub());
            assert!(root.iter().skip(1).all(|r| !r.is_root_hub()));
        }
    }

    #[test]
    fn test_malformed_document() {
        let err = parse_profiler_json("{not json").unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_profiler_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_id() {
        assert_eq!(parse_hex_id("0x05ac"), Some(0x05ac));
        assert_eq!(parse_hex_id("0x05e3  (Genesys Logic, Inc.)"), Some(0x05e3));
        assert_eq!(parse_hex_id("1d6b"), Some(0x1d6b));
        assert_eq!(parse_hex_id("apple_vendor_id"), None);
    }
}
