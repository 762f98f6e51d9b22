use anyhow::{Context, Result};
use std::env;
use std::fs;
use tracing_subscriber::EnvFilter;

// Usage:
//   turnpike_parser <input_statement> [output_json]
// Accepts .csv, .xlsx or .xls input. If output_json is omitted or "-",
// prints the normalized records to stdout.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let input_path = args.get(1).map(String::as_str).unwrap_or("statement.csv");
    let output_path = args.get(2).map(String::as_str).unwrap_or("-");

    let bytes = fs::read(input_path).with_context(|| format!("Reading {}", input_path))?;
    let records = turnpike_parser::parse_statement(input_path, &bytes)
        .with_context(|| format!("Normalizing {}", input_path))?;

    let json = serde_json::to_string_pretty(&records)?;
    if output_path == "-" {
        println!("{}", json);
    } else {
        fs::write(output_path, json).with_context(|| format!("Writing {}", output_path))?;
        eprintln!("Wrote {} record(s) to {}", records.len(), output_path);
    }

    Ok(())
}
