use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ScanOpts {
    #[arg(
        long,
        help = "Directory to bundle (default: $DIRBUNDLE_ROOT or current dir).",
        help_heading = "Scan Setup",
        value_name = "PATH"
    )]
    pub root_dir: Option<PathBuf>,

    #[arg(long = "exclude-dir", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add a glob matched against directory names; matches are pruned.", help_heading = "Exclusions")]
    pub exclude_dirs: Vec<String>,

    #[arg(long = "exclude-file", visible_alias = "exclude-ext", value_name = "PATTERN", action = clap::ArgAction::Append, help = "Add a glob matched against whole file names (e.g. '*.log', 'LICENSE').", help_heading = "Exclusions")]
    pub exclude_files: Vec<String>,

    #[arg(
        long,
        help = "Drop the built-in exclusions (.git, .idea, __pycache__, *.log, *.pyc, ...).",
        help_heading = "Exclusions"
    )]
    pub no_default_excludes: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Print structured output instead of text.", value_name = "FORMAT", value_parser = ["json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bundle a directory tree and its text files into one document.",
    long_about = "dirbundle renders the directory tree of a project and concatenates the text of \nevery non-excluded file below it into a single document, ready to share with \na reviewer or an AI model.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  dirbundle generate -o bundle.txt --exclude-dir target\n  dirbundle tree --exclude-file '*.lock'\n  dirbundle debug -f json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Write the directory tree and file contents to one document."
    )]
    Generate(GenerateArgs),

    #[command(visible_alias = "t", about = "Print only the filtered directory tree.")]
    Tree(TreeArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration and planned file inclusions."
    )]
    Debug(DebugArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub scan: ScanOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Destination file; parent directories are created [default: giveAi.txt].",
        help_heading = "Output Control",
        conflicts_with = "stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Write the document to standard output instead of a file.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,

    #[arg(
        long,
        help = "Leave out the directory tree header.",
        help_heading = "Output Control"
    )]
    pub no_tree: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[clap(flatten)]
    pub scan: ScanOpts,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub scan: ScanOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Destination file to plan for [default: giveAi.txt].",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}
