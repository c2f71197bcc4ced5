//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

use crate::config::RawSettings;

/// Normalized diff of the numeric datasets in two HDF5 files
#[derive(Parser, Debug)]
#[command(name = "h5ndiff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File name of the first HDF5 file
    #[arg(value_hint = ValueHint::FilePath, required_unless_present_any = ["show_config", "completions"])]
    pub file1: Option<PathBuf>,

    /// File name of the second HDF5 file
    #[arg(value_hint = ValueHint::FilePath, required_unless_present_any = ["show_config", "completions"])]
    pub file2: Option<PathBuf>,

    /// Print difference if (|a-b| > PRECISION)
    #[arg(short, long, allow_negative_numbers = true)]
    pub precision: Option<f64>,

    /// Also compare datasets that only file2 lists
    #[arg(short, long)]
    pub symmetric: bool,

    /// Worker threads (0: one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Do not warn about datasets missing on one side
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with status 1 if any dataset differs or fails
    #[arg(short, long)]
    pub exit_code: bool,

    /// Additional config file
    #[arg(short, long, value_hint = ValueHint::FilePath, env = "H5NDIFF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,
}

impl Cli {
    /// Settings given on the command line; flags that are off leave lower layers alone.
    pub fn overrides(&self) -> RawSettings {
        RawSettings {
            precision: self.precision,
            symmetric: self.symmetric.then_some(true),
            report_missing: self.quiet.then_some(false),
            fail_on_diff: self.exit_code.then_some(true),
            jobs: self.jobs,
            max_depth: None,
        }
    }
}
