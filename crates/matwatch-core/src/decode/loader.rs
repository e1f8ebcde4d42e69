use std::fs;
use std::path::Path;

use tracing::info;

use crate::decode::LayoutTable;
use crate::error::Result;

/// Load a field layout table from a JSON file.
pub fn load_layout(path: impl AsRef<Path>) -> Result<LayoutTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let table: LayoutTable = serde_json::from_str(&content)?;
    info!(
        "Loaded layout for {} ({} fields) from {}",
        table.type_name,
        table.fields.len(),
        path.display()
    );
    Ok(table)
}

/// Write a field layout table as pretty JSON.
pub fn save_layout(path: impl AsRef<Path>, table: &LayoutTable) -> Result<()> {
    let content = serde_json::to_string_pretty(table)?;
    fs::write(path, content)?;
    Ok(())
}
