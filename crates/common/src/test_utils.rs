//! Test utilities for usbtree
//!
//! Provides record builders and captured backend output for testing across
//! crates.
//!
//! # Example
//!
//! ```
//! use common::test_utils::create_mock_record;
//!
//! # fn main() {
//! let record = create_mock_record(1, 2, 0x1234, 0x5678);
//! assert_eq!(record.vendor_id, 0x1234);
//! # }
//! ```

use topology::{DeviceKey, Record, Speed, UsbDescriptor};

/// `lsusb` output from a laptop with one external hub
pub const SAMPLE_LSUSB: &str = "\
Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub
Bus 001 Device 004: ID 05ac:027e Apple Inc. Internal Keyboard
Bus 001 Device 003: ID 8087:0026 Intel Corp. AX201 Bluetooth
Bus 001 Device 002: ID 05e3:0610 Genesys Logic, Inc. Hub
Bus 001 Device 005: ID 046d:c52b Logitech, Inc. Unifying Receiver
Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
";

/// `lsusb -t` output matching [`SAMPLE_LSUSB`]
pub const SAMPLE_LSUSB_TREE: &str = "\
/:  Bus 002.Port 001: Dev 001, Class=root_hub, Driver=xhci_hcd/4p, 5000M
/:  Bus 001.Port 001: Dev 001, Class=root_hub, Driver=xhci_hcd/12p, 480M
    |__ Port 003: Dev 002, If 0, Class=Hub, Driver=hub/4p, 480M
        |__ Port 001: Dev 004, If 0, Class=Human Interface Device, Driver=usbhid, 12M
        |__ Port 001: Dev 004, If 1, Class=Human Interface Device, Driver=usbhid, 12M
        |__ Port 004: Dev 005, If 0, Class=Human Interface Device, Driver=usbhid, 12M
    |__ Port 010: Dev 003, If 0, Class=Wireless, Driver=btusb, 12M
    |__ Port 010: Dev 003, If 1, Class=Wireless, Driver=btusb, 12M
";

/// Trimmed `system_profiler SPUSBDataType -json` output
pub const SAMPLE_SYSTEM_PROFILER_JSON: &str = r#"{
  "SPUSBDataType" : [
    {
      "_name" : "USB 3.1 Bus",
      "host_controller" : "AppleUSBXHCITR",
      "_items" : [
        {
          "_name" : "USB3.0 Hub",
          "vendor_id" : "0x05e3  (Genesys Logic, Inc.)",
          "product_id" : "0x0626",
          "manufacturer" : "GenesysLogic",
          "device_speed" : "super_speed",
          "location_id" : "0x00100000 / 1",
          "_items" : [
            {
              "_name" : "Extreme SSD",
              "vendor_id" : "0x0781",
              "product_id" : "0x558c",
              "manufacturer" : "SanDisk",
              "serial_num" : "31393430",
              "device_speed" : "super_speed_10gbps",
              "location_id" : "0x00140000 / 4",
              "bus_power_used" : "896"
            }
          ]
        }
      ]
    },
    {
      "_name" : "USB 2.0 Bus",
      "_items" : [
        {
          "_name" : "FaceTime HD Camera",
          "vendor_id" : "apple_vendor_id",
          "product_id" : "0x8514",
          "manufacturer" : "Apple Inc.",
          "device_speed" : "high_speed",
          "location_id" : "0x20100000 / 2"
        }
      ]
    }
  ]
}"#;

/// Create a bare record for testing
///
/// # Arguments
/// * `bus` - Bus number
/// * `address` - Device address on the bus
/// * `vendor_id` - USB Vendor ID
/// * `product_id` - USB Product ID
pub fn create_mock_record(bus: u8, address: u8, vendor_id: u16, product_id: u16) -> Record {
    let mut record = Record::new(bus, address, vendor_id, product_id);
    record.vendor_name = format!("Test Manufacturer {}", address);
    record.product_name = format!("Test Product {}", address);
    record
}

/// Create a record plugged into `port`
pub fn create_mock_record_on_port(bus: u8, address: u8, port: u8) -> Record {
    let mut record = create_mock_record(bus, address, 0x1000 + u16::from(address), 0x2000);
    record.port = port;
    record
}

/// Create a discovered (not synthesized) Linux root hub record
pub fn create_mock_root_hub(bus: u8) -> Record {
    let mut record = Record::new(bus, 1, 0x1d6b, 0x0002);
    record.vendor_name = "Linux Foundation".to_string();
    record.product_name = "2.0 root hub".to_string();
    record.speed = Speed::High;
    record.class = "Hub".to_string();
    record
}

/// Create a list of records on bus 1, addresses 2..
///
/// # Example
/// ```
/// use common::test_utils::create_mock_device_list;
///
/// let devices = create_mock_device_list(5);
/// assert_eq!(devices.len(), 5);
/// assert_eq!(devices[0].address, 2);
/// ```
pub fn create_mock_device_list(count: u8) -> Vec<Record> {
    (0..count)
        .map(|i| create_mock_record(1, i + 2, 0x1000 + u16::from(i), 0x2000 + u16::from(i)))
        .collect()
}

/// Create a libusb-style descriptor for testing
pub fn create_mock_descriptor(
    bus: u8,
    address: u8,
    port: u8,
    vendor_id: u16,
    product_id: u16,
) -> UsbDescriptor {
    UsbDescriptor {
        vendor_id,
        product_id,
        bus,
        address,
        port,
        speed_code: 3,
        manufacturer: Some(format!("Test Manufacturer {}", address)),
        product: Some(format!("Test Product {}", address)),
        serial_number: Some(format!("SN{:06}", address)),
        max_power_ma: Some(100),
        ..UsbDescriptor::default()
    }
}

/// Create a descriptor with a specific USB class
pub fn create_mock_descriptor_with_class(
    bus: u8,
    address: u8,
    port: u8,
    class: u8,
    subclass: u8,
    protocol: u8,
) -> UsbDescriptor {
    UsbDescriptor {
        class_code: class,
        subclass_code: subclass,
        protocol_code: protocol,
        ..create_mock_descriptor(bus, address, port, 0x1234, 0x5678)
    }
}

/// Create a hub descriptor
pub fn create_mock_hub_descriptor(bus: u8, address: u8, port: u8) -> UsbDescriptor {
    create_mock_descriptor_with_class(bus, address, port, 0x09, 0x00, 0x01)
}

/// Create a HID descriptor (keyboard/mouse)
pub fn create_mock_hid_descriptor(bus: u8, address: u8, port: u8) -> UsbDescriptor {
    create_mock_descriptor_with_class(bus, address, port, 0x03, 0x01, 0x01)
}

/// Create a mass storage descriptor
pub fn create_mock_mass_storage_descriptor(bus: u8, address: u8, port: u8) -> UsbDescriptor {
    create_mock_descriptor_with_class(bus, address, port, 0x08, 0x06, 0x50)
}

/// Every `(parent, child)` edge in a forest, depth-first
pub fn forest_edges(roots: &[Record]) -> Vec<(DeviceKey, DeviceKey)> {
    let mut edges = Vec::new();
    for root in roots {
        for record in root.iter() {
            for child in &record.children {
                edges.push((record.key(), child.key()));
            }
        }
    }
    edges
}

/// Every key in a forest, depth-first
pub fn forest_keys(roots: &[Record]) -> Vec<DeviceKey> {
    roots
        .iter()
        .flat_map(|root| root.iter().map(Record::key))
        .collect()
}
