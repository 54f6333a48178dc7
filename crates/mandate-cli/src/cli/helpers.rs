use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mandate_core::Mandate;

pub fn read_mandate(path: &Path) -> Result<Mandate> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read mandate: {}", path.display()))?;
    Ok(Mandate::from_slice(&bytes)?)
}

/// Write pretty JSON to `out`, or stdout when absent.
pub fn write_mandate(mandate: &Mandate, out: Option<&Path>) -> Result<()> {
    let mut bytes = mandate.to_vec_pretty()?;
    bytes.push(b'\n');
    match out {
        Some(path) => fs::write(path, &bytes)
            .with_context(|| format!("failed to write mandate: {}", path.display())),
        None => {
            print!("{}", String::from_utf8_lossy(&bytes));
            Ok(())
        }
    }
}

/// Parse an RFC 3339 timestamp or a `+<duration>` offset from now.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    if let Some(offset) = input.strip_prefix('+') {
        let std = humantime::parse_duration(offset)
            .with_context(|| format!("invalid duration: {offset}"))?;
        let delta = chrono::Duration::from_std(std).context("duration out of range")?;
        return Ok(Utc::now() + delta);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid RFC 3339 timestamp: {input}"))
}
