//! Subcommand implementations.

pub mod canonicalize;
pub mod check;
pub mod compare;
pub mod digest;
pub mod extract;

use std::io::{self, Read};

/// Reads a file, or stdin when no path is given.
pub(crate) fn read_input(input: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(path) = input {
        Ok(std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?)
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
