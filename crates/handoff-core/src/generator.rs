//! Build a [`ContinuationDocument`] from session observations.
//!
//! Sections other than Recent Work draw on the whole session, listing
//! verified observations first and inferred ones last. Recent Work is
//! recency weighted: entries in the final third of the session's time span
//! lead, newest first, and only a few older entries trail behind them.

use crate::document::{ContinuationDocument, Item, ItemMarker};
use crate::session::{SessionContext, SessionEntry};
use crate::types::{Confidence, Section};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Older Recent Work entries kept after the recent ones.
pub const MAX_EARLIER_RECENT_WORK: usize = 3;

/// Divisor applied to the session span to size the recent window.
const RECENT_WINDOW_DIVISOR: i32 = 3;

/// Start of the recent window: the last third of the span between the
/// first and last observation. `None` for an empty session.
pub fn recent_cutoff(entries: &[SessionEntry]) -> Option<DateTime<Utc>> {
    let first = entries.iter().map(|e| e.at).min()?;
    let last = entries.iter().map(|e| e.at).max()?;
    Some(last - (last - first) / RECENT_WINDOW_DIVISOR)
}

/// Rate how freshly a section's content was confirmed.
pub fn rate(entries: &[&SessionEntry], cutoff: Option<DateTime<Utc>>) -> Confidence {
    let is_recent = |e: &SessionEntry| cutoff.is_some_and(|c| e.at >= c);
    if entries.is_empty() {
        Confidence::Low
    } else if entries.iter().any(|e| e.verified && is_recent(e)) {
        Confidence::High
    } else if entries.iter().any(|e| e.verified || is_recent(e)) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn generate(
    ctx: &dyn SessionContext,
    directive: Option<&str>,
    generated_at: NaiveDateTime,
) -> ContinuationDocument {
    let mut doc = ContinuationDocument::new(generated_at, ctx.project_name().map(str::to_string));
    doc.directive = directive.map(str::to_string);

    let entries = ctx.entries();
    let cutoff = recent_cutoff(entries);

    for &section in Section::rated() {
        let mut usable: Vec<&SessionEntry> = Vec::new();
        for e in entries.iter().filter(|e| e.section == section) {
            if section.canonical_label(&e.label).is_some() {
                usable.push(e);
            } else {
                tracing::warn!(
                    section = section.as_str(),
                    label = %e.label,
                    "dropping entry with unknown sub-label"
                );
            }
        }

        doc.set_confidence(section, rate(&usable, cutoff));

        let items = if section == Section::RecentWork {
            recent_work_items(usable, cutoff)
        } else {
            whole_history_items(usable)
        };
        for (label, item) in items {
            doc.push(section, label, item);
        }
    }

    let ignored = entries
        .iter()
        .filter(|e| e.section == Section::Confidence)
        .count();
    if ignored > 0 {
        tracing::warn!(ignored, "confidence entries are computed, not supplied; ignoring");
    }

    doc
}

fn marker_for(e: &SessionEntry) -> Option<ItemMarker> {
    e.speculative.then_some(ItemMarker::Speculative)
}

/// Explicit facts before inference; within each group, chronological.
fn whole_history_items(mut entries: Vec<&SessionEntry>) -> Vec<(&str, Item)> {
    entries.sort_by_key(|e| (e.speculative, !e.verified, e.at));
    entries
        .into_iter()
        .map(|e| {
            let item = Item {
                text: e.text.clone(),
                marker: marker_for(e),
            };
            (e.label.as_str(), item)
        })
        .collect()
}

fn recent_work_items(
    entries: Vec<&SessionEntry>,
    cutoff: Option<DateTime<Utc>>,
) -> Vec<(&str, Item)> {
    let (mut recent, mut earlier): (Vec<&SessionEntry>, Vec<&SessionEntry>) = entries
        .into_iter()
        .partition(|e| cutoff.is_some_and(|c| e.at >= c));
    recent.sort_by(|a, b| b.at.cmp(&a.at));
    earlier.sort_by(|a, b| b.at.cmp(&a.at));

    let dropped = earlier.len().saturating_sub(MAX_EARLIER_RECENT_WORK);
    if dropped > 0 {
        tracing::debug!(dropped, "older recent-work entries left out");
    }

    let recent_items = recent.into_iter().map(|e| {
        let item = Item {
            text: e.text.clone(),
            marker: marker_for(e),
        };
        (e.label.as_str(), item)
    });
    let earlier_items = earlier
        .into_iter()
        .take(MAX_EARLIER_RECENT_WORK)
        .map(|e| {
            let marker = marker_for(e).unwrap_or(ItemMarker::Earlier);
            (e.label.as_str(), Item::marked(e.text.clone(), marker))
        });
    recent_items.chain(earlier_items).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
