//! Device class labels
//!
//! Two lookups live here: the numeric USB class code table used when a
//! backend reports `bDeviceClass`, and the keyword classifier used when only
//! a product name is available.

/// USB-IF base class codes
const CLASS_NAMES: &[(u8, &str)] = &[
    (0x00, "Device"),
    (0x01, "Audio"),
    (0x02, "Communications"),
    (0x03, "HID"),
    (0x05, "Physical"),
    (0x06, "Image"),
    (0x07, "Printer"),
    (0x08, "Mass Storage"),
    (0x09, "Hub"),
    (0x0a, "CDC Data"),
    (0x0b, "Smart Card"),
    (0x0d, "Content Security"),
    (0x0e, "Video"),
    (0x0f, "Personal Healthcare"),
    (0x10, "Audio/Video"),
    (0xdc, "Diagnostic"),
    (0xe0, "Wireless"),
    (0xef, "Miscellaneous"),
    (0xfe, "Application Specific"),
    (0xff, "Vendor Specific"),
];

/// Product-name keywords and the class they imply.
///
/// Order matters: the first keyword found in the lowercased product name
/// wins, so "USB Hub Keyboard" is a Hub.
pub const KEYWORD_CLASSES: &[(&str, &str)] = &[
    ("hub", "Hub"),
    ("keyboard", "HID"),
    ("mouse", "HID"),
    ("trackpad", "HID"),
    ("controller", "HID"),
    ("camera", "Video"),
    ("facetime", "Video"),
    ("audio", "Audio"),
    ("headphone", "Audio"),
    ("headset", "Audio"),
    ("speaker", "Audio"),
    ("arctis", "Audio"),
    ("ethernet", "Communications"),
    ("network", "Communications"),
    ("ax88179", "Communications"),
    ("bluetooth", "Wireless"),
    ("ax200", "Wireless"),
    ("storage", "Mass Storage"),
    ("disk", "Mass Storage"),
    ("jtag", "Communications"),
    ("serial", "Communications"),
];

/// Label used when no keyword matches
pub const DEFAULT_CLASS: &str = "Device";

/// Name a USB class code, e.g. `0x03` -> `HID`, `0x42` -> `Class 42`
pub fn class_name(code: u8) -> String {
    CLASS_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Class {:02x}", code))
}

/// Guess a class label from a product name
pub fn classify(product_name: &str) -> &'static str {
    let lower = product_name.to_lowercase();
    KEYWORD_CLASSES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_known() {
        assert_eq!(class_name(0x00), "Device");
        assert_eq!(class_name(0x03), "HID");
        assert_eq!(class_name(0x08), "Mass Storage");
        assert_eq!(class_name(0x09), "Hub");
        assert_eq!(class_name(0x0e), "Video");
        assert_eq!(class_name(0xe0), "Wireless");
        assert_eq!(class_name(0xff), "Vendor Specific");
    }

    #[test]
    fn test_class_name_unmapped() {
        assert_eq!(class_name(0x42), "Class 42");
        assert_eq!(class_name(0x04), "Class 04");
    }

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("Internal Keyboard"), "HID");
        assert_eq!(classify("USB Optical Mouse"), "HID");
        assert_eq!(classify("Xbox Wireless Controller"), "HID");
        assert_eq!(classify("FaceTime HD Camera"), "Video");
        assert_eq!(classify("Arctis 7"), "Audio");
        assert_eq!(classify("AX88179 Gigabit Ethernet"), "Communications");
        assert_eq!(classify("AX200 Bluetooth"), "Wireless");
        assert_eq!(classify("Portable Disk"), "Mass Storage");
        assert_eq!(classify("FT2232C JTAG"), "Communications");
    }

    #[test]
    fn test_classify_first_match_wins() {
        // "hub" precedes "keyboard" in the table
        assert_eq!(classify("Keyboard Hub"), "Hub");
        // "controller" precedes "audio"
        assert_eq!(classify("Audio Controller"), "HID");
    }

    #[test]
    fn test_classify_default() {
        assert_eq!(classify(""), "Device");
        assert_eq!(classify("Unifying Receiver"), "Device");
    }
}
