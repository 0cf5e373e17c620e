use crate::build_config;
use crate::cli_args::GenerateArgs;
use crate::output;
use anyhow::{Context, Result};
use dirbundle_core::{self as core, BundleConfig, BundleReport};
use log;
use std::io::{self, BufWriter, Write};

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let config = build_config(&args.scan, args.output.as_ref(), !args.no_tree)
        .context("Failed to build configuration")?;
    log::info!(
        "Bundling {} into {}",
        config.root_dir.display(),
        if args.stdout {
            "stdout".to_string()
        } else {
            config.output_file.display().to_string()
        }
    );

    if args.stdout {
        let report = write_to_stdout(&config)?;
        output::report_skipped_files(&report.skipped, quiet);
        log::info!("Bundle written to stdout ({} files).", report.files_written);
    } else {
        let report = core::run_bundle(&config).with_context(|| {
            format!("Failed to write bundle to {}", config.output_file.display())
        })?;
        output::report_skipped_files(&report.skipped, quiet);
        output::print_bundle_summary(&report, &config.output_file, quiet);
    }
    Ok(())
}

fn write_to_stdout(config: &BundleConfig) -> Result<BundleReport> {
    let stdout = io::stdout();
    let mut handle = BufWriter::new(stdout.lock());
    let report =
        core::write_bundle(config, &mut handle).context("Failed to write bundle to stdout")?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(report)
}
