//! Trends across the archive of continuation documents: how often handoffs
//! happen, which sections get rated well, and which risks and bugs keep
//! coming up.

use crate::archive;
use crate::error::Result;
use crate::types::{Confidence, Section};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Words that mark a Current System State bullet as a bug report.
const BUG_KEYWORDS: &[&str] = &[
    "broken",
    "bug",
    "issue",
    "error",
    "doesnt work",
    "doesn't work",
];

pub const TIMELINE_LIMIT: usize = 20;
pub const ISSUES_PER_KIND: usize = 10;

// ---------------------------------------------------------------------------
// Parsed documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub name: String,
    pub path: PathBuf,
    /// Filename timestamp, falling back to modification time.
    pub when: NaiveDateTime,
    /// `## ` sections in document order: (title, body).
    pub sections: Vec<(String, String)>,
}

impl ParsedDocument {
    pub fn parse(name: &str, path: &Path, text: &str, modified: NaiveDateTime) -> Self {
        let mut sections: Vec<(String, String)> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        for line in text.lines() {
            if let Some(title) = line.strip_prefix("## ") {
                if let Some((t, body)) = current.take() {
                    sections.push((t, body.join("\n").trim().to_string()));
                }
                current = Some((title.trim().to_string(), Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }
        if let Some((t, body)) = current {
            sections.push((t, body.join("\n").trim().to_string()));
        }

        Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            when: crate::paths::parse_filename_timestamp(name).unwrap_or(modified),
            sections,
        }
    }

    pub fn section(&self, title: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, body)| body.as_str())
    }

    /// First content line of Project Identity, for one-line listings.
    pub fn description(&self) -> String {
        let Some(body) = self.section(Section::ProjectIdentity.title()) else {
            return "No description".to_string();
        };
        body.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| l.trim_start_matches(['-', '*']).trim())
            .find(|l| !l.is_empty())
            .unwrap_or("No description")
            .to_string()
    }

    /// Per-section confidence. Levels listed in Confidence & Freshness win;
    /// other sections fall back to inline markers in their own body.
    pub fn confidence(&self) -> Vec<(String, Confidence)> {
        let mut rated: Vec<(String, Confidence)> = Vec::new();
        if let Some(body) = self.section(Section::Confidence.title()) {
            for line in body.lines() {
                let line = line.trim().trim_start_matches(['-', '*']).trim();
                let Some((name, level)) = line.rsplit_once(':') else {
                    continue;
                };
                if let Ok(level) = level.trim().parse::<Confidence>() {
                    rated.push((name.trim().to_string(), level));
                }
            }
        }
        for (title, body) in &self.sections {
            if title == Section::Confidence.title() || rated.iter().any(|(n, _)| n == title) {
                continue;
            }
            if let Some(level) = inline_confidence(body) {
                rated.push((title.clone(), level));
            }
        }
        rated
    }

    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        if let Some(body) = self.section(Section::WhatCouldGoWrong.title()) {
            for text in bullets(body) {
                issues.push(self.issue(IssueKind::Risk, text));
            }
        }
        if let Some(body) = self.section(Section::CurrentState.title()) {
            let mut under_broken = false;
            for line in body.lines() {
                if let Some(label) = line.strip_prefix("### ") {
                    under_broken = label.trim().eq_ignore_ascii_case("Broken");
                    continue;
                }
                let Some(text) = bullet(line) else {
                    continue;
                };
                let lower = text.to_lowercase();
                if under_broken || BUG_KEYWORDS.iter().any(|k| lower.contains(k)) {
                    issues.push(self.issue(IssueKind::Bug, text));
                }
            }
        }
        issues
    }

    fn issue(&self, kind: IssueKind, description: &str) -> Issue {
        Issue {
            kind,
            description: description.to_string(),
            document: self.name.clone(),
            when: self.when,
        }
    }
}

fn inline_confidence(body: &str) -> Option<Confidence> {
    let lower = body.to_lowercase();
    if body.contains('✅') || lower.contains("high confidence") {
        Some(Confidence::High)
    } else if body.contains('❓') || lower.contains("low confidence") {
        Some(Confidence::Low)
    } else if body.contains('⚠') || lower.contains("medium confidence") {
        Some(Confidence::Medium)
    } else {
        None
    }
}

fn bullet(line: &str) -> Option<&str> {
    let line = line.trim();
    let rest = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some(rest)
}

fn bullets(body: &str) -> impl Iterator<Item = &str> {
    body.lines().filter_map(bullet)
}

/// Read every archived document under `root`, newest first.
pub fn load(root: &Path) -> Result<Vec<ParsedDocument>> {
    let mut docs = Vec::new();
    for entry in archive::list(root)? {
        let text = std::fs::read_to_string(&entry.path)?;
        let modified = entry
            .modified
            .map(|m| DateTime::<Local>::from(m).naive_local())
            .unwrap_or_default();
        docs.push(ParsedDocument::parse(&entry.name, &entry.path, &text, modified));
    }
    Ok(docs)
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Risk,
    Bug,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Risk => "risk",
            IssueKind::Bug => "bug",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub description: String,
    pub document: String,
    pub when: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl LevelCounts {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    fn add(&mut self, level: Confidence) {
        match level {
            Confidence::High => self.high += 1,
            Confidence::Medium => self.medium += 1,
            Confidence::Low => self.low += 1,
        }
    }

    /// Percentage of `n` in the total, 0 when nothing was counted.
    pub fn percent(&self, n: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => n as f64 * 100.0 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionConfidence {
    pub section: String,
    #[serde(flatten)]
    pub counts: LevelCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub section: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub when: NaiveDateTime,
    pub document: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total_documents: usize,
    pub time_span: Option<TimeSpan>,
    /// Newest first.
    pub timeline: Vec<TimelineEntry>,
    /// Newest first.
    pub issues: Vec<Issue>,
    /// In order of first appearance.
    pub confidence_trends: Vec<SectionConfidence>,
    /// Most frequent first.
    pub section_frequency: Vec<SectionCount>,
}

impl Analytics {
    /// Documents per day over the span; `None` for spans under a day.
    pub fn frequency(&self) -> Option<f64> {
        let span = self.time_span.as_ref()?;
        (span.duration_days > 0).then(|| self.total_documents as f64 / span.duration_days as f64)
    }

    pub fn issue_counts(&self) -> Vec<(IssueKind, usize)> {
        [IssueKind::Risk, IssueKind::Bug]
            .into_iter()
            .map(|k| (k, self.issues.iter().filter(|i| i.kind == k).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

pub fn analyze(docs: &[ParsedDocument]) -> Analytics {
    let mut timeline: Vec<TimelineEntry> = docs
        .iter()
        .map(|d| TimelineEntry {
            when: d.when,
            document: d.name.clone(),
            description: d.description(),
        })
        .collect();
    timeline.sort_by(|a, b| b.when.cmp(&a.when));

    let mut issues: Vec<Issue> = docs.iter().flat_map(ParsedDocument::issues).collect();
    issues.sort_by(|a, b| b.when.cmp(&a.when));

    let mut confidence_trends: Vec<SectionConfidence> = Vec::new();
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for doc in docs {
        for (section, level) in doc.confidence() {
            match confidence_trends.iter_mut().find(|c| c.section == section) {
                Some(c) => c.counts.add(level),
                None => {
                    let mut counts = LevelCounts::default();
                    counts.add(level);
                    confidence_trends.push(SectionConfidence { section, counts });
                }
            }
        }
        for (title, _) in &doc.sections {
            *frequency.entry(title.clone()).or_default() += 1;
        }
    }

    let mut section_frequency: Vec<SectionCount> = frequency
        .into_iter()
        .map(|(section, count)| SectionCount { section, count })
        .collect();
    section_frequency.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.section.cmp(&b.section)));

    let time_span = match (
        docs.iter().map(|d| d.when).min(),
        docs.iter().map(|d| d.when).max(),
    ) {
        (Some(start), Some(end)) => Some(TimeSpan {
            start,
            end,
            duration_days: (end - start).num_days(),
        }),
        _ => None,
    };

    Analytics {
        total_documents: docs.len(),
        time_span,
        timeline,
        issues,
        confidence_trends,
        section_frequency,
    }
}

/// First `max` characters of `s`.
pub fn clip(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// HTML report
// ---------------------------------------------------------------------------

const REPORT_STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 40px; background: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
h1 { color: #2563eb; border-bottom: 2px solid #2563eb; padding-bottom: 10px; }
h2 { color: #1e40af; margin-top: 30px; }
.metric { display: inline-block; margin: 15px 30px 15px 0; }
.metric-value { font-size: 32px; font-weight: bold; color: #2563eb; }
.metric-label { font-size: 14px; color: #6b7280; text-transform: uppercase; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #e5e7eb; }
th { background: #f9fafb; font-weight: 600; }
.confidence-high { color: #059669; }
.confidence-medium { color: #d97706; }
.confidence-low { color: #dc2626; }
.issue-bug { border-left: 3px solid #dc2626; }
.issue-risk { border-left: 3px solid #d97706; }
.timestamp { color: #6b7280; font-size: 12px; }
";

const REPORT_ISSUE_LIMIT: usize = 50;
const REPORT_TIMELINE_LIMIT: usize = 30;

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn metric(html: &mut String, value: impl std::fmt::Display, label: &str) {
    html.push_str(&format!(
        "<div class=\"metric\"><div class=\"metric-value\">{value}</div><div class=\"metric-label\">{label}</div></div>\n"
    ));
}

pub fn render_html(data: &Analytics, generated_at: NaiveDateTime) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Handoff Analytics Report</title>\n<style>\n");
    html.push_str(REPORT_STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");
    html.push_str("<h1>Handoff Analytics Report</h1>\n");
    html.push_str(&format!(
        "<p class=\"timestamp\">Generated: {}</p>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    html.push_str("<h2>Overview</h2>\n");
    metric(&mut html, data.total_documents, "Total Handoffs");
    metric(&mut html, data.issues.len(), "Issues Found");
    if let Some(span) = &data.time_span {
        metric(&mut html, span.duration_days, "Days Active");
    }

    html.push_str("<h2>Most Common Sections</h2>\n<table>\n<tr><th>Section</th><th>Frequency</th></tr>\n");
    for s in &data.section_frequency {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&s.section),
            s.count
        ));
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Confidence Trends</h2>\n<table>\n<tr><th>Section</th><th>High</th><th>Medium</th><th>Low</th></tr>\n");
    for c in data.confidence_trends.iter().filter(|c| c.counts.total() > 0) {
        html.push_str(&format!(
            "<tr><td>{}</td><td class=\"confidence-high\">{}</td><td class=\"confidence-medium\">{}</td><td class=\"confidence-low\">{}</td></tr>\n",
            escape_html(&c.section),
            c.counts.high,
            c.counts.medium,
            c.counts.low
        ));
    }
    html.push_str("</table>\n");

    if !data.issues.is_empty() {
        html.push_str("<h2>Issues</h2>\n<table>\n<tr><th>Type</th><th>Description</th><th>Found</th></tr>\n");
        for issue in data.issues.iter().take(REPORT_ISSUE_LIMIT) {
            html.push_str(&format!(
                "<tr class=\"issue-{kind}\"><td>{kind}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(clip(&issue.description, 80)),
                issue.when.format("%Y-%m-%d"),
                kind = issue.kind.as_str(),
            ));
        }
        html.push_str("</table>\n");
    }

    html.push_str("<h2>Timeline</h2>\n<table>\n<tr><th>When</th><th>Handoff</th></tr>\n");
    for entry in data.timeline.iter().take(REPORT_TIMELINE_LIMIT) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            entry.when.format("%Y-%m-%d %H:%M"),
            escape_html(clip(&entry.description, 60))
        ));
    }
    html.push_str("</table>\n</div>\n</body>\n</html>\n");
    html
}
