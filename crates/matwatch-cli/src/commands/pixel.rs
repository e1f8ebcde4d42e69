//! Pixel query command implementation.

use anyhow::{Result, bail};
use matwatch_core::{Refresh, SessionOptions};

use crate::cli_utils::open_session;

/// Run the pixel command
pub fn run(pid: u32, address: u64, layout: Option<&str>, x: i64, y: i64) -> Result<()> {
    let options = SessionOptions {
        check_content: false,
        ..SessionOptions::default()
    };
    let mut session = open_session(pid, address, layout, options)?;

    if matches!(session.refresh()?, Refresh::Absent) {
        bail!("No matrix at 0x{:X}", address);
    }

    let value = session.pixel_value(x, y);
    if value.is_empty() {
        bail!(
            "({}, {}) lies outside the {}x{} frame",
            x,
            y,
            session.width(),
            session.height()
        );
    }

    println!("{} ({}, {}): {}", session.type_description(), x, y, value);
    Ok(())
}
