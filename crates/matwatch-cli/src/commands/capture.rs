//! Capture command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use matwatch_core::{Refresh, SessionOptions};

use crate::cli_utils::open_session;

/// Run the capture command
pub fn run(pid: u32, address: u64, layout: Option<&str>, output: &str) -> Result<()> {
    let mut session = open_session(pid, address, layout, SessionOptions::default())?;

    let sample = match session.refresh()? {
        Refresh::Absent => bail!("No matrix at 0x{:X}", address),
        Refresh::Stale(sample) | Refresh::Ready(sample) => sample,
    };
    let Some(display) = &sample.display else {
        bail!(
            "Matrix at 0x{:X} is empty ({}x{})",
            address,
            sample.width,
            sample.height
        );
    };

    fs::write(output, display.bytes()).with_context(|| format!("writing {}", output))?;

    let sidecar = sidecar_path(output);
    let summary = serde_json::to_string_pretty(&sample.summary())?;
    fs::write(&sidecar, summary).with_context(|| format!("writing {}", sidecar.display()))?;

    println!(
        "Captured {}x{} {} ({} bytes, step {}) to {}",
        display.width,
        display.height,
        sample.type_description(),
        display.bytes().len(),
        display.step,
        output
    );
    println!("Geometry written to {}", sidecar.display());
    Ok(())
}

/// `frame.bgr` -> `frame.bgr.json`
fn sidecar_path(output: &str) -> PathBuf {
    let mut name = Path::new(output).as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}
