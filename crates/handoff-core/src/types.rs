use crate::error::HandoffError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ContinuationMethod
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContinuationMethod {
    #[default]
    Ask,
    Compact,
    Handoff,
}

impl ContinuationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ContinuationMethod::Ask => "ask",
            ContinuationMethod::Compact => "compact",
            ContinuationMethod::Handoff => "handoff",
        }
    }
}

impl fmt::Display for ContinuationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContinuationMethod {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ask" => Ok(ContinuationMethod::Ask),
            "compact" => Ok(ContinuationMethod::Compact),
            "handoff" => Ok(ContinuationMethod::Handoff),
            _ => Err(HandoffError::InvalidMethod(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// HandoffMode
// ---------------------------------------------------------------------------

/// How the resume prompt reaches the next session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandoffMode {
    #[default]
    Clipboard,
    AutoPaste,
}

impl HandoffMode {
    pub fn as_str(self) -> &'static str {
        match self {
            HandoffMode::Clipboard => "clipboard",
            HandoffMode::AutoPaste => "auto-paste",
        }
    }

    /// Map an invocation flag to the mode it selects.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "--clipboard" => Some(HandoffMode::Clipboard),
            "--auto" | "--auto-paste" => Some(HandoffMode::AutoPaste),
            _ => None,
        }
    }
}

impl fmt::Display for HandoffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HandoffMode {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clipboard" => Ok(HandoffMode::Clipboard),
            "auto-paste" | "auto" => Ok(HandoffMode::AutoPaste),
            _ => Err(HandoffError::InvalidMode(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigScope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigScope {
    Project,
    Global,
}

impl ConfigScope {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigScope::Project => "project",
            ConfigScope::Global => "global",
        }
    }
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfigScope {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(ConfigScope::Project),
            "global" => Ok(ConfigScope::Global),
            _ => Err(HandoffError::InvalidScope(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Confidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            _ => Err(HandoffError::InvalidConfidence(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// The eight sections of a continuation document, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ProjectIdentity,
    CurrentState,
    Architecture,
    RecentWork,
    WhatCouldGoWrong,
    HowToThink,
    DoNotTouch,
    Confidence,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::ProjectIdentity,
            Section::CurrentState,
            Section::Architecture,
            Section::RecentWork,
            Section::WhatCouldGoWrong,
            Section::HowToThink,
            Section::DoNotTouch,
            Section::Confidence,
        ]
    }

    /// Sections that receive a confidence rating (every section but the last).
    pub fn rated() -> &'static [Section] {
        &Section::all()[..7]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::ProjectIdentity => "project_identity",
            Section::CurrentState => "current_state",
            Section::Architecture => "architecture",
            Section::RecentWork => "recent_work",
            Section::WhatCouldGoWrong => "what_could_go_wrong",
            Section::HowToThink => "how_to_think",
            Section::DoNotTouch => "do_not_touch",
            Section::Confidence => "confidence",
        }
    }

    /// Header text as it appears in the document. Downstream parsers key on it.
    pub fn title(self) -> &'static str {
        match self {
            Section::ProjectIdentity => "Project Identity",
            Section::CurrentState => "Current System State",
            Section::Architecture => "Architecture & Technical Map",
            Section::RecentWork => "Recent Work",
            Section::WhatCouldGoWrong => "What Could Go Wrong",
            Section::HowToThink => "How to Think About This Project",
            Section::DoNotTouch => "Do Not Touch List",
            Section::Confidence => "Confidence & Freshness",
        }
    }

    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Section::ProjectIdentity => &["What It Is", "Who It's For", "Tech Stack", "Current Phase"],
            Section::CurrentState => &["Working", "Partially Working", "Broken", "Not Started"],
            Section::Architecture => &[
                "Key Files",
                "Data Flow",
                "External Dependencies",
                "Conventions",
            ],
            Section::RecentWork => &["What Changed", "Why (Decisions & Tradeoffs)", "Open Threads"],
            Section::WhatCouldGoWrong => &["Known Issues", "Fragile Areas", "Assumptions"],
            Section::HowToThink => &["Mental Model", "Priorities", "User Preferences"],
            Section::DoNotTouch => &["Protected Files", "Settled Decisions"],
            Section::Confidence => &[],
        }
    }

    /// Marker written under a sub-label that has no content.
    pub fn empty_marker(self) -> &'static str {
        match self {
            Section::RecentWork => "Not yet started.",
            _ => "Unknown (not captured in this session).",
        }
    }

    pub fn from_title(title: &str) -> Option<Section> {
        Section::all()
            .iter()
            .copied()
            .find(|s| s.title().eq_ignore_ascii_case(title.trim()))
    }

    /// Resolve a label against this section's fixed labels, ignoring case.
    pub fn canonical_label(self, label: &str) -> Option<&'static str> {
        self.labels()
            .iter()
            .copied()
            .find(|l| l.eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for Section {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::all()
            .iter()
            .copied()
            .find(|sec| sec.as_str() == s)
            .or_else(|| Section::from_title(s))
            .ok_or_else(|| HandoffError::UnknownSection(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
