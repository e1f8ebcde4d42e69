//! Address parsing for command-line arguments.

use anyhow::{Result, anyhow};

/// Parse a hex address with or without a `0x` prefix.
pub fn parse_hex_address(text: &str) -> Result<u64> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits = digits.replace('_', "").replace('`', "");
    if digits.is_empty() {
        return Err(anyhow!("Empty address"));
    }
    u64::from_str_radix(&digits, 16).map_err(|e| anyhow!("Invalid hex address '{}': {}", text, e))
}
