pub mod report;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for phantomqa
#[derive(Parser, Debug)]
#[command(name = "phantomqa")]
#[command(about = "Image-quality metrics from MRI phantom scans")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write a PNG overlay of every ROI into this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub overlay_dir: Option<PathBuf>,

    /// JSON file overriding workflow settings
    #[cfg(feature = "json")]
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

/// QA workflow to run
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Single-slice check on the slice nearest isocenter
    Weekly {
        /// Directory containing the slices of one series
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,
    },
    /// Per-orientation image/noise check
    NemaBody {
        /// Directory of named scan subfolders or named files
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,
    },
    /// Combined-view and per-element torso coil check
    Torso {
        /// Directory searched recursively for DICOM files
        #[arg(value_name = "DIRECTORY")]
        directory: PathBuf,
    },
}

impl Command {
    pub fn directory(&self) -> &PathBuf {
        match self {
            Command::Weekly { directory }
            | Command::NemaBody { directory }
            | Command::Torso { directory } => directory,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}
