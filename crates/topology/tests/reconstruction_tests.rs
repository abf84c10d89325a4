//! Topology reconstruction integration tests
//!
//! Covers the full path from backend output to forest:
//! - lsusb + lsusb -t hint merging
//! - libusb descriptors with the port fallback
//! - system_profiler documents
//! - backend selection and the placeholder root hubs
//! - filtering and JSON round-trips
//!
//! Run with: `cargo test -p topology --test reconstruction_tests`

use common::test_utils::{
    SAMPLE_LSUSB, SAMPLE_LSUSB_TREE, SAMPLE_SYSTEM_PROFILER_JSON, create_mock_descriptor,
    create_mock_hid_descriptor, create_mock_hub_descriptor, create_mock_record,
    create_mock_record_on_port, create_mock_root_hub, forest_edges, forest_keys,
};
use topology::backend::{
    parse_device_list, parse_hint_tree, parse_profiler_json, records_from_descriptors,
};
use topology::{
    BackendKind, Discovery, DiscoveryError, DiscoveryStrategy, Origin, Reconstructor, Record,
    RootHubIdentity, Selector, Speed, filter_forest,
};

fn linux() -> Reconstructor {
    Reconstructor::new(RootHubIdentity::LINUX)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_port_fallback_attaches_to_root_hub() {
    let mut root = Record::new(1, 1, 0x1d6b, 0x0002);
    root.class = "Hub".to_string();
    let mut receiver = Record::new(1, 2, 0x046d, 0xc52b);
    receiver.port = 1;
    receiver.product_name = "USB Receiver".to_string();

    let forest = linux().reconstruct(vec![root, receiver], None);

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id_string(), "1d6b:0002");
    assert_eq!(forest[0].children.len(), 1);
    assert_eq!(forest[0].children[0].product_name, "USB Receiver");
    assert_eq!(forest[0].children[0].id_string(), "046d:c52b");
}

#[test]
fn test_lsusb_line_with_multi_word_vendor() {
    let records =
        parse_device_list("Bus 001 Device 002: ID 05ac:027e Apple Inc. Internal Keyboard\n");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].vendor_name, "Apple Inc.");
    assert_eq!(records[0].product_name, "Internal Keyboard");
    assert_eq!(records[0].class, "HID");
}

#[test]
fn test_no_backend_succeeds_yields_default_root_hubs() {
    struct Denied(BackendKind);

    impl DiscoveryStrategy for Denied {
        fn kind(&self) -> BackendKind {
            self.0
        }

        fn discover(&self) -> topology::Result<Discovery> {
            Err(DiscoveryError::access_denied(self.0, "permission denied"))
        }
    }

    let snapshot = Selector::new(linux())
        .with_strategy(Denied(BackendKind::Libusb))
        .with_strategy(Denied(BackendKind::Lsusb))
        .select()
        .unwrap();

    assert_eq!(snapshot.origin, Origin::Synthesized);
    assert!(snapshot.is_synthesized());
    let buses: Vec<u8> = snapshot.roots.iter().map(|r| r.bus).collect();
    assert_eq!(buses, vec![1, 2]);
    assert!(snapshot.roots.iter().all(|r| r.is_root_hub() && !r.has_children()));
    assert_eq!(snapshot.roots[0].speed, Speed::High);
}

#[test]
fn test_hint_sets_port_speed_and_parent() {
    let hints = parse_hint_tree("Bus 1.Port 1: Dev 1\n    Port 2: Dev 3, 480M\n");
    let records = vec![create_mock_root_hub(1), create_mock_record(1, 3, 0x0bda, 0x8153)];

    let forest = linux().reconstruct(records, Some(&hints));

    assert_eq!(forest.len(), 1);
    let dev3 = &forest[0].children[0];
    assert_eq!(dev3.address, 3);
    assert_eq!(dev3.port, 2);
    assert_eq!(dev3.speed, Speed::High);
    assert_eq!(dev3.speed.label(), "High (480 Mbps)");
}

#[test]
fn test_filter_keeps_only_path_to_match() {
    let mut hub = create_mock_record(1, 2, 0x05e3, 0x0610);
    let mut apple = create_mock_record(1, 3, 0x05ac, 0x1234);
    apple.vendor_name = "Apple Inc.".to_string();
    let mut keyboard = create_mock_record(1, 4, 0x05ac, 0x027e);
    keyboard.vendor_name = "Apple Inc. Keyboard".to_string();
    hub.add_child(apple);
    hub.add_child(keyboard);

    let mut root = create_mock_root_hub(1);
    root.add_child(hub);
    root.add_child(create_mock_record(1, 5, 0x046d, 0xc52b));
    let other_bus = create_mock_root_hub(2);

    let filtered = filter_forest(vec![root, other_bus], "Apple Inc.");

    assert_eq!(filtered.len(), 1);
    assert_eq!(forest_keys(&filtered), vec![(1, 1), (1, 2), (1, 3)]);
}

// ============================================================================
// lsusb + lsusb -t
// ============================================================================

#[test]
fn test_lsusb_with_tree_hints() {
    let records = parse_device_list(SAMPLE_LSUSB);
    let hints = parse_hint_tree(SAMPLE_LSUSB_TREE);
    let forest = linux().reconstruct(records, Some(&hints));

    assert_eq!(forest.len(), 2);
    let bus1 = &forest[0];
    let bus2 = &forest[1];
    assert_eq!(bus1.bus, 1);
    assert_eq!(bus2.bus, 2);
    assert!(!bus2.has_children());
    assert_eq!(bus2.speed, Speed::Super);

    assert_eq!(
        forest_edges(&forest),
        vec![
            ((1, 1), (1, 2)),
            ((1, 1), (1, 3)),
            ((1, 2), (1, 4)),
            ((1, 2), (1, 5)),
        ]
    );

    let hub = &bus1.children[0];
    assert_eq!(hub.product_name, "Hub");
    assert_eq!(hub.vendor_name, "Genesys Logic, Inc.");
    assert_eq!(hub.port, 3);
    assert_eq!(hub.speed, Speed::High);

    let keyboard = &hub.children[0];
    assert_eq!(keyboard.vendor_name, "Apple Inc.");
    assert_eq!(keyboard.port, 1);
    assert_eq!(keyboard.speed, Speed::Full);

    let bluetooth = &bus1.children[1];
    assert_eq!(bluetooth.port, 10);
    assert_eq!(bluetooth.class, "Wireless");
}

#[test]
fn test_lsusb_without_hints_hangs_everything_off_root() {
    let forest = linux().reconstruct(parse_device_list(SAMPLE_LSUSB), None);

    assert_eq!(forest.len(), 2);
    // Ports are all unknown, so every device is an orphan of its bus root
    let addresses: Vec<u8> = forest[0].children.iter().map(|r| r.address).collect();
    assert_eq!(addresses, vec![4, 3, 2, 5]);
}

#[test]
fn test_hint_for_unknown_parent_goes_to_root() {
    let tree = "\
/:  Bus 001.Port 001: Dev 001, Class=root_hub, Driver=xhci_hcd/12p, 480M
    |__ Port 003: Dev 009, If 0, Class=Hub, Driver=hub/4p, 480M
        |__ Port 001: Dev 004, If 0, Class=Human Interface Device, Driver=usbhid, 12M
";
    // Dev 9 is in the tree but not in the device list
    let records = vec![create_mock_root_hub(1), create_mock_record(1, 4, 0x05ac, 0x027e)];
    let forest = linux().reconstruct(records, Some(&parse_hint_tree(tree)));

    assert_eq!(forest_edges(&forest), vec![((1, 1), (1, 4))]);
    assert_eq!(forest[0].children[0].speed, Speed::Full);
}

#[test]
fn test_hint_only_bus_gets_root_hub() {
    let hints = parse_hint_tree(SAMPLE_LSUSB_TREE);
    let records = vec![create_mock_record(1, 2, 0x05e3, 0x0610)];
    let forest = linux().reconstruct(records, Some(&hints));

    let buses: Vec<u8> = forest.iter().map(|r| r.bus).collect();
    assert_eq!(buses, vec![1, 2]);
    assert_eq!(forest[1].vendor_name, "Linux Foundation");
    assert_eq!(forest[1].product_name, "USB 2.0 Root Hub");
    // Root hub speed comes from the hint, not the bus-number default
    assert_eq!(forest[1].speed, Speed::Super);
}

// ============================================================================
// libusb descriptors
// ============================================================================

#[test]
fn test_descriptors_without_root_hubs() {
    let descriptors = vec![
        create_mock_hub_descriptor(1, 2, 1),
        create_mock_hid_descriptor(1, 3, 2),
        create_mock_descriptor(3, 2, 4, 0x0781, 0x5581),
    ];
    let forest = linux().reconstruct(records_from_descriptors(&descriptors), None);

    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].id_string(), "1d6b:0002");
    assert_eq!(forest[1].id_string(), "1d6b:0003");
    assert_eq!(forest[1].speed, Speed::Super);

    let hub = &forest[0].children[0];
    assert_eq!(hub.class, "Hub");
    assert_eq!(hub.children[0].class, "HID");
    assert_eq!(hub.children[0].subclass, "01");

    // Port 4 on bus 3 has no device at address 4
    assert_eq!(forest[1].children[0].address, 2);
}

#[test]
fn test_apple_identity_for_synthesized_roots() {
    let forest = Reconstructor::new(RootHubIdentity::APPLE)
        .reconstruct(vec![create_mock_record_on_port(4, 2, 1)], None);
    assert_eq!(forest[0].id_string(), "05ac:0003");
    assert_eq!(forest[0].vendor_name, "Apple Inc.");
}

#[test]
fn test_empty_hub_bus_is_kept() {
    let forest = linux().reconstruct(vec![create_mock_root_hub(5)], None);
    assert_eq!(forest.len(), 1);
    assert!(!forest[0].has_children());
}

// ============================================================================
// system_profiler
// ============================================================================

#[test]
fn test_system_profiler_forest() {
    let forest = parse_profiler_json(SAMPLE_SYSTEM_PROFILER_JSON).unwrap();
    assert_eq!(forest.len(), 2);

    let ssd = &forest[0].children[0].children[0];
    assert_eq!(ssd.product_name, "Extreme SSD");
    assert_eq!(ssd.serial.as_deref(), Some("31393430"));
    assert_eq!(ssd.speed, Speed::SuperPlus);
    assert_eq!(ssd.port, 4);
    assert_eq!(ssd.address, 4);
    assert_eq!(ssd.max_power.as_deref(), Some("896mA"));

    let camera = &forest[1].children[0];
    assert_eq!(camera.bus, 2);
    assert_eq!(camera.vendor_id, 0);
    assert_eq!(camera.class, "Video");
}

#[test]
fn test_system_profiler_hub_is_not_a_root_hub() {
    let forest = parse_profiler_json(SAMPLE_SYSTEM_PROFILER_JSON).unwrap();

    // The external hub reports "/ 1" in its location_id
    let hub = &forest[0].children[0];
    assert_eq!(hub.address, 0);

    for root in &forest {
        assert_eq!(root.address, 1);
        assert!(root.iter().skip(1).all(|r| !r.is_root_hub()));
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_json_roundtrip_preserves_forest() {
    let forest = linux().reconstruct(
        parse_device_list(SAMPLE_LSUSB),
        Some(&parse_hint_tree(SAMPLE_LSUSB_TREE)),
    );

    let json = serde_json::to_string_pretty(&forest).unwrap();
    let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, forest);
}

#[test]
fn test_json_shape() {
    let mut root = create_mock_root_hub(1);
    let mut child = create_mock_record_on_port(1, 2, 1);
    child.serial = Some("ABC123".to_string());
    root.add_child(child);

    let value = serde_json::to_value(vec![root]).unwrap();
    let root = &value[0];
    assert_eq!(root["speed"], "High (480 Mbps)");
    assert_eq!(root["class"], "Hub");
    assert!(root.get("serial").is_none());
    assert!(root.get("subclass").is_none());

    let child = &root["children"][0];
    assert_eq!(child["serial"], "ABC123");
    assert_eq!(child["port"], 1);
    assert!(child.get("children").is_none());
}
