//! Session state handed to the document generator.
//!
//! The generator never owns or inspects the live conversation. It reads a
//! sequence of timestamped observations through [`SessionContext`], each one
//! tagged with the document section and sub-label it belongs to. The CLI
//! loads these from a JSON snapshot written by the assistant:
//!
//! ```json
//! {
//!   "project": "billing-service",
//!   "entries": [
//!     {
//!       "at": "2026-10-19T13:40:00Z",
//!       "section": "recent_work",
//!       "label": "What Changed",
//!       "text": "Added retry to the invoice webhook",
//!       "verified": true
//!     }
//!   ]
//! }
//! ```

use crate::error::{HandoffError, Result};
use crate::types::Section;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only view of the accumulated session.
pub trait SessionContext {
    fn project_name(&self) -> Option<&str>;

    /// Observations in any order.
    fn entries(&self) -> &[SessionEntry];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub at: DateTime<Utc>,
    pub section: Section,
    pub label: String,
    pub text: String,
    /// Directly confirmed during this session (ran it, read it, user said so).
    #[serde(default)]
    pub verified: bool,
    /// Inferred rather than observed.
    #[serde(default)]
    pub speculative: bool,
}

impl SessionEntry {
    pub fn new(
        at: DateTime<Utc>,
        section: Section,
        label: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            at,
            section,
            label: label.into(),
            text: text.into(),
            verified: false,
            speculative: false,
        }
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }

    pub fn speculative(mut self) -> Self {
        self.speculative = true;
        self
    }
}

/// A serialized session, as produced by the assistant before a handoff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub entries: Vec<SessionEntry>,
}

impl SessionSnapshot {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| HandoffError::InvalidSession(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

impl SessionContext for SessionSnapshot {
    fn project_name(&self) -> Option<&str> {
        self.project.as_deref()
    }

    fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_from_json_defaults_flags() {
        let snap = SessionSnapshot::from_json(
            r#"{
                "project": "billing",
                "entries": [
                    {"at": "2026-10-19T13:40:00Z", "section": "recent_work",
                     "label": "What Changed", "text": "added retries"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(snap.project_name(), Some("billing"));
        assert_eq!(snap.entries().len(), 1);
        let e = &snap.entries()[0];
        assert_eq!(e.section, Section::RecentWork);
        assert!(!e.verified);
        assert!(!e.speculative);
    }

    #[test]
    fn empty_object_is_empty_session() {
        let snap = SessionSnapshot::from_json("{}").unwrap();
        assert!(snap.project_name().is_none());
        assert!(snap.entries().is_empty());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = SessionSnapshot::from_json(
            r#"{"entries": [{"at": "2026-10-19T13:40:00Z", "section": "summary",
                "label": "x", "text": "y"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, HandoffError::InvalidSession(_)));
    }
}
