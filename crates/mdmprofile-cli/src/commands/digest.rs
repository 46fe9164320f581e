//! Digest command implementation.

use mdmprofile_canonical::{decode_value, Digest};

use super::read_input;
use crate::output::format_json;

pub fn run(input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(input)?;
    let value = decode_value(text.as_bytes()).map_err(|e| format!("Invalid plist: {}", e))?;
    let digest = Digest::of_value(&value)?;
    println!("{}", format_json(&digest));
    Ok(())
}
