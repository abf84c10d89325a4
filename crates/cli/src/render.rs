//! Plain-text and JSON rendering of the device forest

use anyhow::{Context, Result};
use std::io::Write;
use topology::Record;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

const PLACEHOLDER_NOTE: &str =
    "Note: no USB devices could be enumerated; the root hubs above are placeholders";

/// Rendering options, passed explicitly from flags and config
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Show serial, speed, power and location under each device
    pub verbose: bool,
    /// The roots were synthesized rather than detected
    pub placeholder: bool,
}

/// Box-drawing tree renderer
pub struct TreeRenderer {
    options: RenderOptions,
}

impl TreeRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render the whole forest, header included
    pub fn render(&self, roots: &[Record]) -> String {
        if roots.is_empty() {
            return "No USB devices found\n".to_string();
        }

        let mut lines = vec!["USB Device Tree:".to_string(), String::new()];
        for (i, root) in roots.iter().enumerate() {
            self.render_record(root, "", i + 1 == roots.len(), &mut lines);
        }
        if self.options.placeholder {
            lines.push(String::new());
            lines.push(PLACEHOLDER_NOTE.to_string());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn render_record(
        &self,
        record: &Record,
        prefix: &str,
        is_last: bool,
        lines: &mut Vec<String>,
    ) {
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{}{}{}", prefix, connector, device_line(record)));

        let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
        if self.options.verbose {
            lines.extend(detail_lines(record, &child_prefix));
        }

        for (i, child) in record.children.iter().enumerate() {
            self.render_record(child, &child_prefix, i + 1 == record.children.len(), lines);
        }
    }
}

/// `Name [vvvv:pppp] (Class)`; the generic "Device" class is left out
fn device_line(record: &Record) -> String {
    let mut line = format!("{} [{}]", record.display_name(), record.id_string());
    if !record.class.is_empty() && record.class != "Device" {
        line.push_str(&format!(" ({})", record.class));
    }
    line
}

fn detail_lines(record: &Record, prefix: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(serial) = record.serial.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("{}├─ Serial: {}", prefix, serial));
    }
    if record.speed.is_known() {
        lines.push(format!("{}├─ Speed: {}", prefix, record.speed));
    }
    if let Some(power) = &record.max_power {
        lines.push(format!("{}├─ Max Power: {}", prefix, power));
    }
    lines.push(format!(
        "{}└─ Bus {}, Port {}, Address {}",
        prefix, record.bus, record.port, record.address
    ));
    lines
}

/// Pretty-printed JSON array of the root records
pub fn write_json<W: Write>(roots: &[Record], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, roots).context("Failed to serialize devices")?;
    writeln!(writer).context("Failed to write output")?;
    Ok(())
}
