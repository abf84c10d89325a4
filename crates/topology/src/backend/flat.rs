//! `lsusb` flat listing adapter
//!
//! Parses lines of the form
//!
//! ```text
//! Bus 001 Device 002: ID 05ac:027e Apple Inc. Internal Keyboard
//! ```
//!
//! Ports are unknown at this stage; they arrive later from the `lsusb -t`
//! hints. Lines that do not match the pattern are skipped.

use crate::class::classify;
use crate::record::{DeviceKey, Record};
use crate::reconstruct::LINUX_FOUNDATION_VENDOR_ID;
use crate::speed::Speed;
use std::collections::HashMap;
use tracing::trace;

/// Vendor names that contain spaces, so "first word is the vendor" would
/// cut them short
pub const KNOWN_VENDOR_PREFIXES: &[&str] = &[
    "Linux Foundation",
    "VIA Labs, Inc.",
    "Terminus Technology Inc.",
    "Anker Innovations Limited.",
    "Valve Software",
    "ASIX Electronics Corp.",
    "Intel Corp.",
    "Micro Star International",
    "Genesys Logic, Inc.",
    "SteelSeries ApS",
    "KYE Systems Corp.",
    "Apple Inc.",
    "Apple, Inc.",
    "Logitech, Inc.",
    "Realtek Semiconductor Corp.",
    "Texas Instruments, Inc.",
    "Future Technology Devices International, Ltd",
    "Microsoft Corp.",
    "Samsung Electronics Co., Ltd",
    "SanDisk Corp.",
    "Western Digital Technologies, Inc.",
    "Chicony Electronics Co., Ltd",
    "Cypress Semiconductor Corp.",
    "Silicon Labs",
    "Elan Microelectronics Corp.",
    "Synaptics, Inc.",
];

/// Fixed speeds of the virtual root hubs the Linux kernel reports
const ROOT_HUB_SPEEDS: &[(u16, Speed)] = &[
    (0x0001, Speed::Full),
    (0x0002, Speed::High),
    (0x0003, Speed::Super),
];

/// Parse full `lsusb` output into flat records.
///
/// Duplicate `(bus, address)` lines collapse into one record: the later
/// line wins but keeps the position of the first.
pub fn parse_device_list(output: &str) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::new();
    let mut index: HashMap<DeviceKey, usize> = HashMap::new();

    for line in output.lines() {
        let Some(record) = parse_line(line) else {
            if !line.trim().is_empty() {
                trace!("Skipping unrecognized lsusb line: {:?}", line);
            }
            continue;
        };

        match index.get(&record.key()) {
            Some(&slot) => records[slot] = record,
            None => {
                index.insert(record.key(), records.len());
                records.push(record);
            }
        }
    }

    records
}

/// Parse a single `lsusb` line
pub fn parse_line(line: &str) -> Option<Record> {
    let rest = line.trim().strip_prefix("Bus ")?;
    let (bus, rest) = take_number(rest, 3, 10)?;
    let rest = rest.strip_prefix(" Device ")?;
    let (address, rest) = take_number(rest, 3, 10)?;
    let rest = rest.strip_prefix(": ID ")?;
    let (vendor_id, rest) = take_number(rest, 4, 16)?;
    let rest = rest.strip_prefix(':')?;
    let (product_id, rest) = take_number(rest, 4, 16)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let (vendor_name, product_name) = split_description(rest.trim());
    let mut record = Record::new(
        u8::try_from(bus).ok()?,
        u8::try_from(address).ok()?,
        u16::try_from(vendor_id).ok()?,
        u16::try_from(product_id).ok()?,
    );
    record.class = classify(&product_name).to_string();
    record.speed = root_hub_speed(record.vendor_id, record.product_id);
    record.vendor_name = vendor_name;
    record.product_name = product_name;
    Some(record)
}

/// Split an `lsusb` description into vendor and product names.
///
/// The longest matching entry of [`KNOWN_VENDOR_PREFIXES`] wins; otherwise
/// the first word is taken as the vendor.
pub fn split_description(description: &str) -> (String, String) {
    let description = description.trim();
    if description.is_empty() {
        return (String::new(), String::new());
    }

    let known = KNOWN_VENDOR_PREFIXES
        .iter()
        .filter(|prefix| {
            description
                .strip_prefix(**prefix)
                .is_some_and(|tail| tail.is_empty() || tail.starts_with(' '))
        })
        .max_by_key(|prefix| prefix.len());

    match known {
        Some(prefix) => (
            (*prefix).to_string(),
            description[prefix.len()..].trim().to_string(),
        ),
        None => match description.split_once(' ') {
            Some((vendor, product)) => (vendor.to_string(), product.trim().to_string()),
            None => (description.to_string(), String::new()),
        },
    }
}

fn root_hub_speed(vendor_id: u16, product_id: u16) -> Speed {
    if vendor_id != LINUX_FOUNDATION_VENDOR_ID {
        return Speed::Unknown;
    }
    ROOT_HUB_SPEEDS
        .iter()
        .find(|(pid, _)| *pid == product_id)
        .map(|(_, speed)| speed.clone())
        .unwrap_or(Speed::Unknown)
}

/// Take exactly `width` digits in `radix` from the front of `s`
fn take_number(s: &str, width: usize, radix: u32) -> Option<(u32, &str)> {
    let digits = s.get(..width)?;
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let value = u32::from_str_radix(digits, radix).ok()?;
    Some((value, &s[width..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_known_vendor() {
        let record =
            parse_line("Bus 001 Device 002: ID 05ac:027e Apple Inc. Internal Keyboard").unwrap();
        assert_eq!(record.bus, 1);
        assert_eq!(record.address, 2);
        assert_eq!(record.port, 0);
        assert_eq!(record.id_string(), "05ac:027e");
        assert_eq!(record.vendor_name, "Apple Inc.");
        assert_eq!(record.product_name, "Internal Keyboard");
        assert_eq!(record.class, "HID");
        assert_eq!(record.speed, Speed::Unknown);
    }

    #[test]
    fn test_parse_line_first_word_vendor() {
        let record = parse_line("Bus 003 Device 004: ID 1050:0407 Yubico.com Yubikey 4/5 OTP+U2F+CCID")
            .unwrap();
        assert_eq!(record.vendor_name, "Yubico.com");
        assert_eq!(record.product_name, "Yubikey 4/5 OTP+U2F+CCID");
        assert_eq!(record.class, "Device");
    }

    #[test]
    fn test_root_hub_speed() {
        let usb2 = parse_line("Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub")
            .unwrap();
        assert_eq!(usb2.vendor_name, "Linux Foundation");
        assert_eq!(usb2.product_name, "2.0 root hub");
        assert_eq!(usb2.speed, Speed::High);
        assert_eq!(usb2.class, "Hub");

        let usb3 = parse_line("Bus 002 Device 001: ID 1d6b:0003 Linux Foundation 3.0 root hub")
            .unwrap();
        assert_eq!(usb3.speed, Speed::Super);

        // Same product ID from another vendor gets no fixed speed
        let other = parse_line("Bus 002 Device 003: ID 0bda:0002 Realtek Semiconductor Corp. Hub")
            .unwrap();
        assert_eq!(other.speed, Speed::Unknown);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let (vendor, product) = split_description("Apple Inc. Internal Keyboard");
        assert_eq!(vendor, "Apple Inc.");
        assert_eq!(product, "Internal Keyboard");

        // Prefix must end on a word boundary
        let (vendor, product) = split_description("Intel Corp.X Widget");
        assert_eq!(vendor, "Intel");
        assert_eq!(product, "Corp.X Widget");

        let (vendor, product) = split_description("Linux Foundation");
        assert_eq!(vendor, "Linux Foundation");
        assert_eq!(product, "");
    }

    #[test]
    fn test_empty_and_single_word_descriptions() {
        assert_eq!(split_description(""), (String::new(), String::new()));
        assert_eq!(
            split_description("Unknown"),
            ("Unknown".to_string(), String::new())
        );
        let record = parse_line("Bus 001 Device 005: ID abcd:1234").unwrap();
        assert!(record.vendor_name.is_empty());
        assert_eq!(record.class, "Device");
    }

    #[test]
    fn test_malformed_lines_skipped() {
        assert!(parse_line("").is_none());
        assert!(parse_line("Bus 1 Device 2: ID 05ac:027e Apple").is_none());
        assert!(parse_line("Bus 001 Device 002: ID 05ac027e Apple").is_none());
        assert!(parse_line("Bus 001 Device 002: ID 05ac:zzzz Apple").is_none());
        assert!(parse_line("Couldn't open device, some information will be missing").is_none());
    }

    #[test]
    fn test_duplicates_collapse() {
        let output = "\
Bus 001 Device 002: ID 046d:c52b Logitech, Inc. Unifying Receiver
Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
Bus 001 Device 002: ID 046d:c534 Logitech, Inc. Nano Receiver
";
        let records = parse_device_list(output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, 2);
        assert_eq!(records[0].product_name, "Nano Receiver");
        assert_eq!(records[1].address, 1);
    }
}
