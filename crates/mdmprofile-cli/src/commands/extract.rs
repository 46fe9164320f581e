//! Extract command implementation.

use mdmprofile_canonical::{decode_value, extract_payloads, parse_profile, Digest};
use serde_json::json;

use super::read_input;
use crate::output::format_json;

pub fn run(input: Option<String>, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_input(input)?;
    let profile =
        parse_profile(text.as_bytes()).map_err(|e| format!("Invalid profile: {}", e))?;
    let payloads = extract_payloads(&profile)?;

    if json_output {
        let mut entries = Vec::with_capacity(payloads.len());
        for payload in &payloads {
            let digest = Digest::of_value(&decode_value(payload.as_bytes())?)?;
            entries.push(json!({ "digest": digest, "plist": payload }));
        }
        println!("{}", format_json(&entries));
    } else {
        for payload in &payloads {
            print!("{}", payload);
        }
    }
    Ok(())
}
