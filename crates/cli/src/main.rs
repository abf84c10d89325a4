//! usbtree
//!
//! Displays the devices attached to the host's USB controllers as a tree,
//! following the physical hub and port layout.

mod config;
mod discovery;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use common::setup_logging;
use config::Config;
use render::{RenderOptions, TreeRenderer};
use std::io::{self, Write};
use std::path::PathBuf;
use topology::filter_forest;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "usbtree")]
#[command(author, version, about = "Display USB devices in a tree view")]
#[command(long_about = "
Displays connected USB devices in a hierarchical tree that follows the
physical hub and port layout. Works on Linux and macOS.

Devices are discovered through libusb when possible, falling back to
lsusb (Linux) or system_profiler (macOS) when libusb cannot open them.

EXAMPLES:
    # Show the device tree
    usbtree

    # Show serial numbers, speeds, power and bus locations
    usbtree --verbose

    # Only the branches leading to one vendor's devices
    usbtree --filter \"Logitech, Inc.\"

    # Machine-readable output
    usbtree --json

CONFIGURATION:
    usbtree looks for configuration files in the following order:
    1. Path specified with --config
    2. ~/.config/usbtree/config.toml
    3. /etc/usbtree/config.toml
    4. Built-in defaults
")]
struct Args {
    /// Output in JSON format
    #[arg(short, long)]
    json: bool,

    /// Show detailed device information
    #[arg(short, long)]
    verbose: bool,

    /// Only show devices whose vendor or product name is exactly NAME
    #[arg(short, long, value_name = "NAME")]
    filter: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = Config::default();
        let path = Config::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        Config::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        Config::load_or_default()
    };

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.general.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;
    debug!("usbtree v{}", env!("CARGO_PKG_VERSION"));

    let snapshot = discovery::build_selector(&config.discovery)
        .select()
        .context("Failed to get USB devices")?;

    let placeholder = snapshot.is_synthesized();
    let roots = match args.filter.as_deref().filter(|f| !f.is_empty()) {
        Some(name) => filter_forest(snapshot.roots, name),
        None => snapshot.roots,
    };

    let stdout = io::stdout();
    if args.json || config.output.json {
        render::write_json(&roots, stdout.lock())?;
    } else {
        let options = RenderOptions {
            verbose: args.verbose || config.output.verbose,
            placeholder,
        };
        let mut out = stdout.lock();
        out.write_all(TreeRenderer::new(options).render(&roots).as_bytes())
            .context("Failed to write output")?;
    }

    Ok(())
}
