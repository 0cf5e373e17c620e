mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::PathBuf;
use std::process;

use cli_args::{Cli, Commands, ScanOpts};
use dirbundle_core::{AppError, BundleConfig};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            // Quiet mode still reports failures; only the log level changes.
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            log::debug!("Application failed: {:?}", e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::Glob(_)) => 1,
        Some(AppError::InvalidArgument(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::OutputWrite(_)) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::DirCreation { .. }) => 2,
        Some(_) => 1,
        None => 1,
    }
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(Commands::Generate(args)) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Some(Commands::Tree(args)) => {
            log::debug!("Executing 'tree' command...");
            commands::tree::handle_tree_command(args)?;
        }
        Some(Commands::Debug(args)) => {
            log::debug!("Executing 'debug' command...");
            commands::debug::handle_debug_command(args)?;
        }
        Some(Commands::Completion(args)) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args, quiet)?;
        }
    }
    Ok(())
}

/// Turns scan options into the immutable config every command runs against.
pub fn build_config(
    scan: &ScanOpts,
    cli_output: Option<&PathBuf>,
    emit_tree: bool,
) -> Result<BundleConfig> {
    let root_dir = BundleConfig::determine_root_dir(scan.root_dir.as_ref())
        .context("Failed to determine root directory")?;
    let output_file = BundleConfig::resolve_output_path(cli_output)
        .context("Failed to resolve output path")?;

    let mut config = BundleConfig::new(root_dir, output_file);
    if scan.no_default_excludes {
        log::debug!("Built-in exclusions disabled.");
        config = config.without_default_excludes();
    }
    let config = config
        .with_exclude_dirs(scan.exclude_dirs.iter().cloned())
        .with_exclude_files(scan.exclude_files.iter().cloned())
        .with_tree(emit_tree);

    log::trace!("Effective config: {:?}", config);
    Ok(config)
}
