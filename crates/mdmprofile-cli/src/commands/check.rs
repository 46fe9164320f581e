//! Check command implementation.

use mdmprofile_canonical::{
    check_indentation, parse_profile, validate_distribution, validate_level,
    validate_payload_count,
};

pub fn run(
    input: String,
    level: Option<String>,
    distribution_method: Option<String>,
    self_service: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&input)
        .map_err(|e| format!("Failed to read file {}: {}", input, e))?;

    if let Some(method) = &distribution_method {
        if let Some(warning) = validate_distribution(method, self_service)? {
            eprintln!("Warning: {}", warning);
        }
    }

    let profile = parse_profile(text.as_bytes()).map_err(|e| format!("Invalid profile: {}", e))?;
    validate_payload_count(&profile)?;
    if let Some(level) = &level {
        validate_level(&profile, level)?;
    }
    check_indentation(&text)?;

    tracing::info!(op = "check", input = %input, payloads = profile.payloads().len(), "profile checks passed");
    println!("OK: {}", input);
    Ok(())
}
