//! USB topology reconstruction for usbtree
//!
//! This crate turns the output of the host's USB discovery backends (libusb
//! descriptors, `lsusb`, `lsusb -t`, `system_profiler`) into a forest of
//! [`Record`]s with one root hub per bus. It performs no I/O: the binary
//! crate runs the commands and feeds their output in.
//!
//! # Example
//!
//! ```
//! use topology::backend::{parse_device_list, parse_hint_tree};
//! use topology::{Reconstructor, RootHubIdentity};
//!
//! let list = "\
//! Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
//! Bus 001 Device 003: ID 046d:c52b Logitech, Inc. Unifying Receiver
//! ";
//! let tree = "\
//! /:  Bus 001.Port 001: Dev 001, Class=root_hub, Driver=xhci_hcd/12p, 480M
//!     |__ Port 002: Dev 003, If 0, Class=Human Interface Device, Driver=usbhid, 12M
//! ";
//!
//! let records = parse_device_list(list);
//! let hints = parse_hint_tree(tree);
//! let forest = Reconstructor::new(RootHubIdentity::LINUX).reconstruct(records, Some(&hints));
//!
//! assert_eq!(forest.len(), 1);
//! assert_eq!(forest[0].children[0].product_name, "Unifying Receiver");
//! assert_eq!(forest[0].children[0].port, 2);
//! ```

pub mod backend;
pub mod class;
pub mod error;
pub mod filter;
pub mod reconstruct;
pub mod record;
pub mod selector;
pub mod speed;

pub use backend::{BackendKind, HierarchyHints, HintNode, UsbDescriptor};
pub use class::{class_name, classify};
pub use error::{DiscoveryError, Result};
pub use filter::filter_forest;
pub use reconstruct::{Reconstructor, RootHubIdentity, default_root_hubs, root_hub_for_bus};
pub use record::{DeviceKey, ROOT_HUB_ADDRESS, Record};
pub use selector::{Discovery, DiscoveryStrategy, Origin, Selector, Snapshot};
pub use speed::Speed;
