use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log traversal details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count the commits each of two references has that the other lacks.
    BranchCompare(BranchCompareArgs),
    /// List the tags found in the history of a tag, most recent first.
    TagHistory(TagHistoryArgs),
}

#[derive(Args)]
pub struct BranchCompareArgs {
    pub repo_path: PathBuf,
    pub base: String,
    pub other: String,
}

#[derive(Args)]
pub struct TagHistoryArgs {
    pub repo_path: PathBuf,
    pub tag: String,
    /// Maximum number of ancestor tags to report [default: `LINEAGE_DEPTH` or 10]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub depth: Option<u64>,
}
