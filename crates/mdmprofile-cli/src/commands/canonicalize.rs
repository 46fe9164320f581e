//! Canonicalize command implementation.

use mdmprofile_canonical::Canonicalizer;

use super::read_input;
use crate::output::format_json;

pub fn run(input: Option<String>, report: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(input)?;

    let result = Canonicalizer::new()
        .canonicalize_bytes(text.as_bytes())
        .map_err(|e| format!("Canonicalization failed: {}", e))?;

    print!("{}", String::from_utf8_lossy(&result.bytes));
    if report {
        eprintln!("{}", format_json(&result.report));
    }
    Ok(())
}
