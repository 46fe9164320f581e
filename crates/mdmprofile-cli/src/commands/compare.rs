//! Compare command implementation.

use mdmprofile_canonical::{Comparator, ComparatorConfig, Document};

use crate::output::{format_json, print_decisions};

fn read_document(path: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file {}: {}", path, e))?;
    let document: Document =
        serde_json::from_str(&text).map_err(|e| format!("Invalid JSON in {}: {}", path, e))?;
    Ok(document)
}

pub fn run(
    old: String,
    new: String,
    config: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read file {}: {}", path, e))?;
            serde_json::from_str::<ComparatorConfig>(&text)
                .map_err(|e| format!("Invalid config {}: {}", path, e))?
        }
        None => ComparatorConfig::default(),
    };
    let comparator = Comparator::from_config(&config);

    let old_doc = read_document(&old)?;
    let new_doc = read_document(&new)?;
    let outcome = comparator.suppress(&old_doc, &new_doc);
    tracing::info!(op = "compare", suppressed = ?outcome.suppressed, "comparison complete");

    if json_output {
        println!("{}", format_json(&outcome));
    } else {
        print_decisions(&outcome);
    }
    Ok(())
}
