pub mod aggregate;
pub mod bundle;
pub mod config;
pub mod error;
pub mod filter;
pub mod tree;

pub use aggregate::{AggregateReport, SkipReason, SkippedFile, aggregate_files, plan_files};
pub use bundle::{BundleReport, plan_files_for, render_tree_for, run_bundle, write_bundle};
pub use config::BundleConfig;
pub use error::{AppError, Result};
pub use filter::ExclusionRules;
pub use tree::{DirectoryTree, render_tree, render_tree_excluding};
