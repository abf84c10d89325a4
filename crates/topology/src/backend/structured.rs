//! Structured enumeration adapter
//!
//! Maps libusb-style device descriptors onto records. The host binary reads
//! the descriptors (see the `cli` crate's libusb strategy); this module only
//! translates codes into labels.

use crate::class::class_name;
use crate::record::Record;
use crate::speed::Speed;

/// Low-level descriptor data for one enumerated device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsbDescriptor {
    pub vendor_id: u16,
    pub product_id: u16,
    pub bus: u8,
    pub address: u8,
    /// Port on the parent hub (0 if unknown)
    pub port: u8,
    /// libusb speed code (`LIBUSB_SPEED_*`)
    pub speed_code: u8,
    pub class_code: u8,
    pub subclass_code: u8,
    pub protocol_code: u8,
    /// Manufacturer string descriptor (if it could be read)
    pub manufacturer: Option<String>,
    /// Product string descriptor (if it could be read)
    pub product: Option<String>,
    /// Serial number string descriptor (if it could be read)
    pub serial_number: Option<String>,
    /// Max power of the first configuration that declares one, in mA
    pub max_power_ma: Option<u16>,
}

impl From<&UsbDescriptor> for Record {
    fn from(desc: &UsbDescriptor) -> Self {
        Record {
            vendor_id: desc.vendor_id,
            product_id: desc.product_id,
            vendor_name: desc.manufacturer.clone().unwrap_or_default(),
            product_name: desc.product.clone().unwrap_or_default(),
            bus: desc.bus,
            port: desc.port,
            address: desc.address,
            serial: desc.serial_number.clone().filter(|s| !s.is_empty()),
            speed: Speed::from_code(desc.speed_code),
            class: class_name(desc.class_code),
            subclass: format!("{:02x}", desc.subclass_code),
            protocol: format!("{:02x}", desc.protocol_code),
            max_power: desc
                .max_power_ma
                .filter(|ma| *ma > 0)
                .map(|ma| format!("{}mA", ma)),
            children: Vec::new(),
        }
    }
}

/// Convert descriptors to flat records, one per descriptor, in input order
pub fn records_from_descriptors(descriptors: &[UsbDescriptor]) -> Vec<Record> {
    descriptors.iter().map(Record::from).collect()
}
