//! Common utilities for usbtree
//!
//! This crate provides shared functionality for the usbtree binary and the
//! topology tests: the top-level error type, logging setup, and fixtures
//! for tests.

pub mod error;
pub mod logging;
pub mod test_utils;

pub use error::{Error, Result};
pub use logging::setup_logging;
