use crate::build_config;
use crate::cli_args::DebugArgs;
use crate::output::print_structured;
use anyhow::{Context, Result};
use colored::*;
use dirbundle_core::{self as core, BundleConfig};
use log;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    effective_config: &'a BundleConfig,
    /// Output path that `generate` leaves out when writing to a file inside the root.
    hidden_when_writing: Option<String>,
    files_to_include: Vec<String>,
    tree: Vec<String>,
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let config = build_config(&args.scan, args.output.as_ref(), true)
        .context("Failed to build configuration for debug command")?;

    log::debug!("Debug: planning file list...");
    let files = core::plan_files_for(&config).context("Failed to plan files for debug")?;
    log::debug!("Debug: rendering tree...");
    let tree = core::render_tree_for(&config).context("Failed to render tree for debug")?;

    let debug_data = DebugInfo {
        effective_config: &config,
        hidden_when_writing: config
            .output_path_in_root()
            .map(|p| p.to_string_lossy().into_owned()),
        files_to_include: files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
        tree: tree.lines().to_vec(),
    };

    if args.format_output.format.is_none() {
        print_debug_info_pretty(&debug_data);
        Ok(())
    } else {
        log::debug!(
            "Debug: printing structured output (format: {:?})...",
            args.format_output.format
        );
        print_structured(&debug_data, &args.format_output)
    }
}

fn print_debug_info_pretty(debug_info: &DebugInfo) {
    let config = debug_info.effective_config;
    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    println!("{:<16} {}", "Root:".bold(), config.root_dir.display().to_string().cyan());
    println!("{:<16} {}", "Output:".bold(), config.output_file.display().to_string().cyan());
    println!(
        "{:<16} {}",
        "Tree header:".bold(),
        if config.emit_tree { "enabled".green() } else { "disabled".yellow() }
    );
    print_pattern_list("Excluded dirs:", &config.exclude_dirs);
    print_pattern_list("Excluded files:", &config.exclude_files);
    if let Some(hidden) = &debug_info.hidden_when_writing {
        println!("{:<16} {}", "Hidden on write:".bold(), hidden.dimmed());
    }

    println!("{}", "\n--- Files Included ---".green().bold().underline());
    if debug_info.files_to_include.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        for path in &debug_info.files_to_include {
            println!("- {}", path.cyan());
        }
    }

    println!("{}", "\n--- Directory Tree ---".green().bold().underline());
    for line in &debug_info.tree {
        println!("{}", line);
    }

    println!("{}", "\n--- End Debug Info ---".green().bold());
}

fn print_pattern_list(label: &str, patterns: &[String]) {
    let rendered = if patterns.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        patterns.join(", ").yellow().to_string()
    };
    println!("{:<16} {}", label.bold(), rendered);
}
