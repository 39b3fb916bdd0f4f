use crate::error::{HandoffError, Result};
use crate::paths;
use crate::types::{Confidence, Section};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DOCUMENT_TITLE: &str = "# AI Continuation Document";

/// Upper bound on same-minute documents before persistence gives up.
const MAX_SAME_MINUTE: u32 = 99;

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMarker {
    /// Inferred, not observed.
    Speculative,
    /// Outside the recent window of the session.
    Earlier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    pub marker: Option<ItemMarker>,
}

impl Item {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marker: None,
        }
    }

    pub fn marked(text: impl Into<String>, marker: ItemMarker) -> Self {
        Self {
            text: text.into(),
            marker: Some(marker),
        }
    }

    fn render(&self) -> String {
        let text = one_line(&self.text);
        match self.marker {
            None => format!("- {text}"),
            Some(ItemMarker::Speculative) => format!("- (speculative) {text}"),
            Some(ItemMarker::Earlier) => format!("- {text} (earlier)"),
        }
    }
}

/// Join the lines of session text with spaces so nothing it carries can
/// start a markdown header of its own.
fn one_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// ContinuationDocument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SectionBody {
    pub section: Section,
    /// One entry per fixed sub-label, in label order.
    pub fields: Vec<(&'static str, Vec<Item>)>,
}

/// The eight-section handoff artifact. Sections and sub-labels are fixed at
/// construction; content can only be added under an existing label.
#[derive(Debug, Clone)]
pub struct ContinuationDocument {
    pub generated_at: NaiveDateTime,
    pub project: Option<String>,
    pub directive: Option<String>,
    sections: Vec<SectionBody>,
    confidence: BTreeMap<Section, Confidence>,
}

impl ContinuationDocument {
    pub fn new(generated_at: NaiveDateTime, project: Option<String>) -> Self {
        let sections = Section::all()
            .iter()
            .map(|&section| SectionBody {
                section,
                fields: section.labels().iter().map(|&l| (l, Vec::new())).collect(),
            })
            .collect();
        Self {
            generated_at,
            project,
            directive: None,
            sections,
            confidence: BTreeMap::new(),
        }
    }

    pub fn sections(&self) -> &[SectionBody] {
        &self.sections
    }

    /// Add an item under `label`. Returns false when the label is not one of
    /// the section's fixed labels.
    pub fn push(&mut self, section: Section, label: &str, item: Item) -> bool {
        let Some(canonical) = section.canonical_label(label) else {
            return false;
        };
        let Some(body) = self.sections.iter_mut().find(|b| b.section == section) else {
            return false;
        };
        match body.fields.iter_mut().find(|(l, _)| *l == canonical) {
            Some((_, items)) => {
                items.push(item);
                true
            }
            None => false,
        }
    }

    pub fn items(&self, section: Section, label: &str) -> &[Item] {
        self.sections
            .iter()
            .find(|b| b.section == section)
            .and_then(|b| b.fields.iter().find(|(l, _)| l.eq_ignore_ascii_case(label)))
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_confidence(&mut self, section: Section, level: Confidence) {
        if section != Section::Confidence {
            self.confidence.insert(section, level);
        }
    }

    /// Rated sections without an explicit level default to LOW.
    pub fn confidence(&self, section: Section) -> Confidence {
        self.confidence
            .get(&section)
            .copied()
            .unwrap_or(Confidence::Low)
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self) -> String {
        let mut doc = String::new();
        doc.push_str(DOCUMENT_TITLE);
        doc.push_str("\n\n");
        let project = self
            .project
            .as_deref()
            .map(one_line)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        doc.push_str(&format!("**Project:** {project}\n"));
        doc.push_str(&format!(
            "**Generated:** {}\n",
            self.generated_at.format("%Y-%m-%d %H:%M")
        ));
        match self.directive.as_deref() {
            Some(d) => doc.push_str(&format!("**Next directive:** {}\n", one_line(d))),
            None => doc.push_str("**Next directive:** none given\n"),
        }

        for body in &self.sections {
            doc.push_str(&format!("\n## {}\n", body.section.title()));
            if body.section == Section::Confidence {
                doc.push('\n');
                for &rated in Section::rated() {
                    doc.push_str(&format!(
                        "- {}: {}\n",
                        rated.title(),
                        self.confidence(rated)
                    ));
                }
                continue;
            }
            for (label, items) in &body.fields {
                doc.push_str(&format!("\n### {label}\n\n"));
                if items.is_empty() {
                    doc.push_str(&format!("_{}_\n", body.section.empty_marker()));
                } else {
                    for item in items {
                        doc.push_str(&item.render());
                        doc.push('\n');
                    }
                }
            }
        }
        doc
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the document under `docs/handoffs/`, creating the directory if
    /// needed. Never replaces an existing document: a same-minute collision
    /// gets a numeric suffix.
    pub fn persist(&self, root: &Path) -> Result<PathBuf> {
        let dir = paths::handoffs_dir(root);
        let body = self.render();
        let mut n = 1;
        loop {
            let name = if n == 1 {
                paths::document_filename(self.generated_at)
            } else {
                paths::document_filename_numbered(self.generated_at, n)
            };
            let path = dir.join(name);
            match crate::io::write_new(&path, body.as_bytes()) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "continuation document written");
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && n < MAX_SAME_MINUTE => {
                    n += 1;
                }
                Err(source) => {
                    return Err(HandoffError::Persist {
                        path: path.display().to_string(),
                        source,
                    })
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
