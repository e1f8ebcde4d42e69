//! CLI argument definitions for matwatch.

use clap::{Parser, Subcommand};
use matwatch_core::PseudoColorMode;
use matwatch_core::config::timing::DEFAULT_POLL_INTERVAL_MS;

#[derive(Parser)]
#[command(name = "matwatch")]
#[command(about = "Live matrix viewer for a paused or running process", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a matrix header and report its geometry
    Inspect {
        /// Target process ID
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        /// Header address (hex, e.g., 0x7FF6A1B2C3D0)
        #[arg(long)]
        address: String,
        /// Decode through a JSON field layout instead of fixed offsets
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the value of one pixel
    Pixel {
        /// Target process ID
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        /// Header address (hex)
        #[arg(long)]
        address: String,
        /// Decode through a JSON field layout instead of fixed offsets
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        /// Column
        #[arg(long, allow_negative_numbers = true)]
        x: i64,
        /// Row
        #[arg(long, allow_negative_numbers = true)]
        y: i64,
    },
    /// Poll a matrix and report every refresh
    Watch {
        /// Target process ID
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        /// Header address (hex)
        #[arg(long)]
        address: String,
        /// Decode through a JSON field layout instead of fixed offsets
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        /// Delay between refreshes in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
        interval_ms: u64,
        /// Stop after this many refreshes
        #[arg(long)]
        polls: Option<u64>,
        /// Skip the content checksum when the header is unchanged
        #[arg(long)]
        no_content: bool,
    },
    /// Capture one frame as raw BGR24 plus a JSON sidecar
    Capture {
        /// Target process ID
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        /// Header address (hex)
        #[arg(long)]
        address: String,
        /// Decode through a JSON field layout instead of fixed offsets
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        /// Output file path (raw bytes; the sidecar gets a .json suffix)
        #[arg(short, long)]
        output: String,
    },
    /// Render a color bar for a pseudo-color mode
    Colorbar {
        /// Color map (gray, jet, hot, cool, hsv, rainbow)
        #[arg(long, default_value = "jet")]
        mode: PseudoColorMode,
        /// Bar width in pixels
        #[arg(long, default_value = "256")]
        width: usize,
        /// Bar height in pixels
        #[arg(long, default_value = "16")]
        height: usize,
        /// Output file path (raw BGR24, width * 3 bytes per row)
        #[arg(short, long)]
        output: String,
    },
}
