use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use dirbundle_core::{BundleReport, SkippedFile};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::cli_args::FormatOutputOpts;

// --- Public Output Functions ---

/// Prints one diagnostic line per skipped file to stderr.
pub fn report_skipped_files(skipped: &[SkippedFile], quiet: bool) {
    if skipped.is_empty() || quiet {
        return;
    }
    for file in skipped {
        eprintln!("{} {}", "⚠️".yellow(), file.diagnostic());
    }
}

pub fn print_bundle_summary(report: &BundleReport, output_path: &Path, quiet: bool) {
    if quiet {
        return;
    }
    println!(
        "{} Bundle saved to: {} ({} files, {}{})",
        "✅".green(),
        output_path.display().to_string().blue(),
        report.files_written.to_string().cyan(),
        readable_size(report.bytes_written).cyan(),
        if report.skipped.is_empty() {
            String::new()
        } else {
            format!(", {} skipped", report.skipped.len())
                .yellow()
                .to_string()
        }
    );
}

pub fn print_structured<T: Serialize>(data: &T, format_opts: &FormatOutputOpts) -> Result<()> {
    let format = format_opts.format.as_deref().unwrap_or("json").to_lowercase();
    let content = match format.as_str() {
        "yaml" | "yml" => serde_yml::to_string(data).context("Failed to serialize to YAML")?,
        _ => serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?,
    };
    write_to_stdout(&content)
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn readable_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}
