mod cli;
mod cli_utils;
mod commands;
mod shutdown;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use commands::hex_utils::parse_hex_address;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matwatch=info,matwatch_core=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match args.command {
        Command::Inspect {
            pid,
            address,
            layout,
            json,
        } => commands::inspect::run(pid, parse_hex_address(&address)?, layout.as_deref(), json),
        Command::Pixel {
            pid,
            address,
            layout,
            x,
            y,
        } => commands::pixel::run(pid, parse_hex_address(&address)?, layout.as_deref(), x, y),
        Command::Watch {
            pid,
            address,
            layout,
            interval_ms,
            polls,
            no_content,
        } => commands::watch::run(
            pid,
            parse_hex_address(&address)?,
            layout.as_deref(),
            interval_ms,
            polls,
            !no_content,
        ),
        Command::Capture {
            pid,
            address,
            layout,
            output,
        } => commands::capture::run(pid, parse_hex_address(&address)?, layout.as_deref(), &output),
        Command::Colorbar {
            mode,
            width,
            height,
            output,
        } => commands::colorbar::run(mode, width, height, &output),
    }
}
