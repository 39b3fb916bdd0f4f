use crate::output::print_json;
use anyhow::Context;
use handoff_core::archive;
use std::path::Path;

pub fn run(root: &Path, file: Option<&str>, latest: bool, json: bool) -> anyhow::Result<()> {
    let path = if latest {
        archive::latest(root)?.path
    } else {
        archive::resolve(root, file)?
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if json {
        print_json(&serde_json::json!({
            "path": path,
            "content": text,
        }))
    } else {
        print!("{text}");
        Ok(())
    }
}
