use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "novelsub",
    about = "Subtitle generation and TTS timing synchronization for novel-to-audio pipelines",
    version,
    after_help = "\x1b[1mExamples:\x1b[0m
  novelsub init ./my-novel                          Create novelsub.toml and a sample script
  novelsub generate script.json -p ./my-novel       Render SRT from a script
  novelsub generate script.yaml --format vtt        Render WebVTT with default settings
  novelsub sync tts.json --mode hybrid --format both  Sync with TTS timings, write SRT + VTT
  novelsub check out.srt                            Check a subtitle file's structure
  novelsub preview subtitle_1700000000000_ab12cd34.srt --offset 2 --speed 1.5"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a novelsub.toml and an example script
    Init {
        /// Project directory to initialize
        path: PathBuf,
    },
    /// Generate subtitles from a script, estimating timing from reading speed
    Generate {
        /// Script file (.json, .yaml or .yml) with a list of segments
        input: PathBuf,

        /// Project directory holding novelsub.toml (defaults are used when absent)
        #[arg(long, short = 'p', default_value = ".")]
        project: PathBuf,

        /// Subtitle format: srt or vtt (overrides novelsub.toml)
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// File encoding: utf-8 or utf-16 (overrides novelsub.toml)
        #[arg(long)]
        encoding: Option<String>,

        /// Output directory (overrides novelsub.toml)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate subtitles synchronized with TTS-reported audio timings
    Sync {
        /// TTS results file (.json, .yaml or .yml)
        input: PathBuf,

        /// Project directory holding novelsub.toml (defaults are used when absent)
        #[arg(long, short = 'p', default_value = ".")]
        project: PathBuf,

        /// Sync mode: accurate, estimated or hybrid (overrides novelsub.toml)
        #[arg(long, short = 'm')]
        mode: Option<String>,

        /// Subtitle format: srt, vtt or both
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Seconds added to every reported start time
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<f64>,

        /// Output directory (overrides novelsub.toml)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print the result and validation report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a subtitle file is well formed
    Check {
        /// Path to an .srt or .vtt file
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a stored subtitle file with a time offset and playback speed applied
    Preview {
        /// File name in the output directory
        filename: String,

        /// Project directory holding novelsub.toml
        #[arg(long, short = 'p', default_value = ".")]
        project: PathBuf,

        /// Seconds to shift every cue by (may be negative)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,

        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Print the cues as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage subtitle files in the output directory
    Files {
        #[command(subcommand)]
        action: FilesAction,

        /// Project directory holding novelsub.toml
        #[arg(long, short = 'p', default_value = ".", global = true)]
        project: PathBuf,
    },
    /// Generate subtitles for several scripts concurrently
    Batch {
        /// Script files (.json, .yaml or .yml)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Project directory holding novelsub.toml
        #[arg(long, short = 'p', default_value = ".")]
        project: PathBuf,

        /// Maximum scripts processed at once (default: 4)
        #[arg(long)]
        parallel: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum FilesAction {
    /// List subtitle files, newest first
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show counts and sizes of stored subtitle files
    Stats,
    /// Delete a subtitle file
    Delete {
        /// File name in the output directory
        filename: String,
    },
}
