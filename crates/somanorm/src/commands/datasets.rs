//! List available datasets

use anyhow::Result;
use serde_json::json;
use somanorm_loader::{DatasetFetcher, DatasetLoader, ManifestEntry};

use super::common::{OutputFormat, print_json};

pub async fn datasets<F: DatasetFetcher>(loader: &DatasetLoader<F>, format: OutputFormat) -> Result<()> {
    let (population, models) = tokio::join!(loader.population_list(), loader.model_list());

    if format == OutputFormat::Json {
        return print_json(&json!({ "population": population, "models": models }));
    }

    println!("Population datasets");
    println!("===================");
    print_entries(&population);
    println!();
    println!("Model datasets");
    println!("==============");
    print_entries(&models);

    Ok(())
}

fn print_entries(entries: &[ManifestEntry]) {
    if entries.is_empty() {
        println!("  (none)");
        return;
    }
    for entry in entries {
        println!("  {} - {} ({})", entry.id, entry.name, entry.file);
        if let Some(description) = &entry.description {
            println!("      {}", description);
        }
        let mut details = Vec::new();
        if let Some(year) = &entry.year {
            details.push(format!("year {}", year));
        }
        if let Some(n) = &entry.sample_size {
            details.push(format!("n = {}", n));
        }
        if !entry.sources.is_empty() {
            details.push(entry.sources.join("; "));
        }
        if !details.is_empty() {
            println!("      {}", details.join(", "));
        }
    }
}
