use crate::build_config;
use crate::cli_args::TreeArgs;
use crate::output::write_to_stdout;
use anyhow::{Context, Result};
use dirbundle_core as core;
use log;

pub fn handle_tree_command(args: TreeArgs) -> Result<()> {
    let config = build_config(&args.scan, None, true)
        .context("Failed to build configuration for tree command")?;

    log::debug!("Tree: rendering {}", config.root_dir.display());
    let tree = core::render_tree_for(&config).context("Failed to render directory tree")?;
    write_to_stdout(&tree.to_string())
}
