use crate::output::{print_json, print_table};
use handoff_core::{archive, paths};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let docs = archive::list(root)?;

    if json {
        return print_json(&docs);
    }

    if docs.is_empty() {
        println!(
            "No continuation documents in {}. Create one with: handoff run",
            paths::handoffs_dir(root).display()
        );
        return Ok(());
    }

    let rows: Vec<Vec<String>> = docs
        .iter()
        .map(|d| {
            vec![
                d.name.clone(),
                d.generated_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format!("{:.1} KB", d.size as f64 / 1024.0),
            ]
        })
        .collect();
    print_table(&["DOCUMENT", "GENERATED", "SIZE"], rows);
    Ok(())
}
