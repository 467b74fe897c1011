use crate::constants::API_KEYS_ENV;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tiny-squeeze",
    about = "Batch image compression through the Tinify API with automatic API key rotation",
    long_about = "tiny-squeeze compresses jpg, png, gif and webp images in place using the Tinify \
                  (TinyPNG) API. Several API keys can be supplied; when a key approaches its free \
                  monthly allowance of 500 compressions the next one takes over.",
    version,
    after_help = "EXAMPLES:\n  \
    tiny-squeeze compress --dir ./assets -k KEY1,KEY2\n  \
    COMPRESS_IMAGE_API_KEYS=KEY1,KEY2 tiny-squeeze compress\n  \
    tiny-squeeze scan ./assets\n  \
    tiny-squeeze usage -k KEY1 -k KEY2"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print the final report")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Log key rotation and per-file sizes"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress images in place",
        long_about = "Compress every image under --dir, or, without --dir, every image staged in git \
                      (added, copied, modified or renamed). Files are overwritten in place, one at a \
                      time. Exits non-zero if any file failed or the run stopped early."
    )]
    Compress {
        #[arg(
            short = 'd',
            long,
            help = "Directory to compress (relative to --root or absolute)",
            long_help = "Directory whose images are compressed, recursively. \
                         When omitted, the images staged in git are compressed instead."
        )]
        dir: Option<PathBuf>,

        #[arg(
            short = 'k',
            long = "api-key",
            env = API_KEYS_ENV,
            value_delimiter = ',',
            hide_env_values = true,
            help = "Tinify API key; repeat or comma-separate for rotation"
        )]
        api_keys: Vec<String>,

        #[arg(short = 'r', long, help = "Project root (default: current directory)")]
        root: Option<PathBuf>,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    #[command(
        about = "List the images `compress --dir` would process",
        long_about = "Recursively list jpg, png, gif and webp files under a directory, relative \
                      to the project root. Does not contact the Tinify API."
    )]
    Scan {
        #[arg(help = "Directory to scan (relative to --root or absolute)")]
        dir: PathBuf,

        #[arg(short = 'r', long, help = "Project root (default: current directory)")]
        root: Option<PathBuf>,
    },

    #[command(
        about = "Show how much free allowance each API key has left",
        long_about = "Validate each API key and print the number of compressions the Tinify API \
                      has counted for it this month, and what remains of the free allowance."
    )]
    Usage {
        #[arg(
            short = 'k',
            long = "api-key",
            env = API_KEYS_ENV,
            value_delimiter = ',',
            hide_env_values = true,
            help = "Tinify API key; repeat or comma-separate"
        )]
        api_keys: Vec<String>,
    },
}
