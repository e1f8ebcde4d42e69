//! Color bar command implementation.

use std::fs;

use anyhow::{Context, Result, bail};
use matwatch_core::{Colorizer, PseudoColorMode};

/// Run the colorbar command
pub fn run(mode: PseudoColorMode, width: usize, height: usize, output: &str) -> Result<()> {
    if width == 0 || height == 0 {
        bail!("Color bar needs a non-zero size, got {}x{}", width, height);
    }

    let colorizer = Colorizer::default();
    let bar = colorizer.color_bar(mode, width, height)?;
    fs::write(output, &bar).with_context(|| format!("writing {}", output))?;

    println!(
        "Wrote {} color bar {}x{} ({} mapper) to {}",
        mode,
        width,
        height,
        colorizer.factory_name(),
        output
    );
    Ok(())
}
