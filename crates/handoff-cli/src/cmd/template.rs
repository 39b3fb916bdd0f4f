use crate::output::print_json;
use handoff_core::document::ContinuationDocument;
use handoff_core::types::Section;

/// The empty document: every section and sub-label, no content.
pub fn run(json: bool) -> anyhow::Result<()> {
    let now = chrono::Local::now().naive_local();
    let doc = ContinuationDocument::new(now, None);
    if json {
        let sections: Vec<serde_json::Value> = Section::all()
            .iter()
            .map(|s| {
                serde_json::json!({
                    "key": s.as_str(),
                    "title": s.title(),
                    "labels": s.labels(),
                })
            })
            .collect();
        print_json(&sections)
    } else {
        print!("{}", doc.render());
        Ok(())
    }
}
