//! libusb strategy
//!
//! Enumerates devices through `rusb` and reads their descriptors. Each
//! device is opened briefly to read its string descriptors, which is where
//! permission problems show up: if any device refuses access the whole
//! backend reports access denied so that a text backend with readable names
//! is tried instead.
//!
//! libusb also knows every device's parent, so the hierarchy is passed along
//! as hints rather than left to port matching.

use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, UsbContext};
use topology::backend::records_from_descriptors;
use topology::{
    BackendKind, Discovery, DiscoveryError, DiscoveryStrategy, HierarchyHints, HintNode, Result,
    UsbDescriptor,
};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct LibusbStrategy;

impl LibusbStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl DiscoveryStrategy for LibusbStrategy {
    fn kind(&self) -> BackendKind {
        BackendKind::Libusb
    }

    fn discover(&self) -> Result<Discovery> {
        let context = Context::new().map_err(|e| map_error(e, "failed to initialize libusb"))?;
        let devices = context
            .devices()
            .map_err(|e| map_error(e, "failed to list devices"))?;

        let mut descriptors = Vec::with_capacity(devices.len());
        let mut hints = HierarchyHints::new();
        let mut denied = 0usize;

        for device in devices.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    warn!(
                        "Skipping bus {} device {}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    continue;
                }
            };

            let strings = match device.open() {
                Ok(handle) => read_string_descriptors(&descriptor, &handle),
                Err(rusb::Error::Access) => {
                    denied += 1;
                    (None, None, None)
                }
                Err(e) => {
                    debug!(
                        "Could not open bus {} device {}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    (None, None, None)
                }
            };

            hints.insert(hint_for(&device));
            descriptors.push(read_descriptor(&device, &descriptor, strings));
        }

        if denied > 0 {
            return Err(DiscoveryError::access_denied(
                BackendKind::Libusb,
                format!("could not open {} of {} device(s)", denied, devices.len()),
            ));
        }

        Ok(Discovery::Flat {
            records: records_from_descriptors(&descriptors),
            hints: Some(hints),
        })
    }
}

type Strings = (Option<String>, Option<String>, Option<String>);

fn read_descriptor<T: UsbContext>(
    device: &Device<T>,
    descriptor: &DeviceDescriptor,
    (manufacturer, product, serial_number): Strings,
) -> UsbDescriptor {
    UsbDescriptor {
        vendor_id: descriptor.vendor_id(),
        product_id: descriptor.product_id(),
        bus: device.bus_number(),
        address: device.address(),
        port: device.port_number(),
        speed_code: speed_code(device.speed()),
        class_code: descriptor.class_code(),
        subclass_code: descriptor.sub_class_code(),
        protocol_code: descriptor.protocol_code(),
        manufacturer,
        product,
        serial_number,
        max_power_ma: max_power(device, descriptor),
    }
}

/// Read string descriptors from device
fn read_string_descriptors<T: UsbContext>(
    descriptor: &DeviceDescriptor,
    handle: &DeviceHandle<T>,
) -> Strings {
    let manufacturer = descriptor
        .manufacturer_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    let product = descriptor
        .product_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    let serial_number = descriptor
        .serial_number_string_index()
        .and_then(|idx| handle.read_string_descriptor_ascii(idx).ok());

    (manufacturer, product, serial_number)
}

/// First non-zero max power across the device's configurations, in mA
fn max_power<T: UsbContext>(device: &Device<T>, descriptor: &DeviceDescriptor) -> Option<u16> {
    (0..descriptor.num_configurations())
        .filter_map(|index| device.config_descriptor(index).ok())
        .map(|config| config.max_power())
        .find(|ma| *ma > 0)
}

fn hint_for<T: UsbContext>(device: &Device<T>) -> HintNode {
    HintNode {
        bus: device.bus_number(),
        port: device.port_number(),
        device: device.address(),
        speed: None,
        parent: device
            .get_parent()
            .map(|parent| (parent.bus_number(), parent.address())),
    }
}

/// Map rusb device speed to the libusb speed code
fn speed_code(speed: rusb::Speed) -> u8 {
    match speed {
        rusb::Speed::Low => 1,
        rusb::Speed::Full => 2,
        rusb::Speed::High => 3,
        rusb::Speed::Super => 4,
        rusb::Speed::SuperPlus => 5,
        _ => 0,
    }
}

fn map_error(error: rusb::Error, what: &str) -> DiscoveryError {
    let reason = format!("{}: {}", what, error);
    match error {
        rusb::Error::Access => DiscoveryError::access_denied(BackendKind::Libusb, reason),
        _ => DiscoveryError::unavailable(BackendKind::Libusb, reason),
    }
}
