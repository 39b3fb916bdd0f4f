use crate::output::{print_banner, print_json};
use anyhow::Context;
use clap::ValueEnum;
use handoff_core::analytics::{
    self, clip, Analytics, IssueKind, ISSUES_PER_KIND, TIMELINE_LIMIT,
};
use handoff_core::paths;
use std::path::{Path, PathBuf};

const RULE: usize = 70;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AnalyticsView {
    /// Totals, time span, section frequency, issue counts
    Summary,
    /// The most recent handoffs, one line each
    Timeline,
    /// High/medium/low counts per section
    Confidence,
    /// Risks and bugs pulled from the documents
    Issues,
    /// Write the HTML report
    Report,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Html,
}

pub fn run(
    root: &Path,
    view: Option<AnalyticsView>,
    export: Option<ExportFormat>,
    out: Option<&Path>,
    open: bool,
    json: bool,
) -> anyhow::Result<()> {
    let docs = analytics::load(root).context("failed to read continuation documents")?;
    if docs.is_empty() {
        anyhow::bail!(
            "no continuation documents found in {}; create one with: handoff run",
            paths::handoffs_dir(root).display()
        );
    }
    let data = analytics::analyze(&docs);

    match (export, view) {
        (Some(ExportFormat::Json), _) => export_json(root, &data, out),
        (Some(ExportFormat::Html), _) | (None, Some(AnalyticsView::Report)) => {
            write_report(root, &data, out, open)
        }
        (None, _) if json => print_json(&data),
        (None, Some(AnalyticsView::Timeline)) => {
            print_timeline(&data);
            Ok(())
        }
        (None, Some(AnalyticsView::Confidence)) => {
            print_confidence(&data);
            Ok(())
        }
        (None, Some(AnalyticsView::Issues)) => {
            print_issues(&data);
            Ok(())
        }
        (None, Some(AnalyticsView::Summary) | None) => {
            print_summary(&data);
            Ok(())
        }
    }
}

fn output_path(root: &Path, out: Option<&Path>, default_name: &str) -> PathBuf {
    out.map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(default_name))
}

fn export_json(root: &Path, data: &Analytics, out: Option<&Path>) -> anyhow::Result<()> {
    let path = output_path(root, out, "handoff-analytics.json");
    let body = serde_json::to_string_pretty(data)?;
    handoff_core::io::atomic_write(&path, body.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("JSON export saved: {}", path.display());
    Ok(())
}

fn write_report(root: &Path, data: &Analytics, out: Option<&Path>, open: bool) -> anyhow::Result<()> {
    let path = output_path(root, out, "handoff-report.html");
    let html = analytics::render_html(data, chrono::Local::now().naive_local());
    handoff_core::io::atomic_write(&path, html.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("HTML report generated: {}", path.display());
    if open {
        open::that(&path).with_context(|| format!("failed to open {}", path.display()))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Text views
// ---------------------------------------------------------------------------

fn print_summary(data: &Analytics) {
    print_banner("Handoff Analytics Summary", RULE);
    println!("Total handoffs:        {}", data.total_documents);
    println!("Total issues found:    {}", data.issues.len());
    if let Some(span) = &data.time_span {
        println!(
            "Time span:             {} to {}",
            span.start.format("%Y-%m-%d"),
            span.end.format("%Y-%m-%d")
        );
        println!("Duration:              {} days", span.duration_days);
    }
    if let Some(freq) = data.frequency() {
        println!("Frequency:             {freq:.2} handoffs/day");
    }

    print_banner("Most Common Sections", RULE);
    for s in data.section_frequency.iter().take(10) {
        println!(
            "  {:<30} {} ({})",
            clip(&s.section, 30),
            "█".repeat(s.count * 2),
            s.count
        );
    }

    print_banner("Issues Summary", RULE);
    for (kind, count) in data.issue_counts() {
        println!("  {:<15} {count}", capitalize(kind.as_str()));
    }
}

fn print_timeline(data: &Analytics) {
    print_banner("Project Timeline", RULE);
    for (i, entry) in data.timeline.iter().take(TIMELINE_LIMIT).enumerate() {
        println!(
            "{:2}. [{}] {}",
            i + 1,
            entry.when.format("%Y-%m-%d %H:%M"),
            clip(&entry.description, 50)
        );
    }
    if data.timeline.len() > TIMELINE_LIMIT {
        println!("\n... and {} more", data.timeline.len() - TIMELINE_LIMIT);
    }
}

fn print_confidence(data: &Analytics) {
    if data.confidence_trends.is_empty() {
        println!("No confidence data found.");
        return;
    }
    print_banner("Confidence Trends by Section", RULE);
    for c in data.confidence_trends.iter().filter(|c| c.counts.total() > 0) {
        let counts = &c.counts;
        println!("{}:", c.section);
        println!("  High:   {:>3} ({:>5.1}%)", counts.high, counts.percent(counts.high));
        println!("  Medium: {:>3} ({:>5.1}%)", counts.medium, counts.percent(counts.medium));
        println!("  Low:    {:>3} ({:>5.1}%)", counts.low, counts.percent(counts.low));
        println!();
    }
}

fn print_issues(data: &Analytics) {
    if data.issues.is_empty() {
        println!("No issues found.");
        return;
    }
    print_banner(&format!("Issues Extracted ({} total)", data.issues.len()), RULE);
    for kind in [IssueKind::Risk, IssueKind::Bug] {
        let issues: Vec<_> = data.issues_of(kind).collect();
        if issues.is_empty() {
            continue;
        }
        println!("\n{} ({})", kind.as_str().to_uppercase(), issues.len());
        println!("{}", "-".repeat(RULE));
        for issue in issues.iter().take(ISSUES_PER_KIND) {
            println!(
                "  [{}] {}",
                issue.when.format("%Y-%m-%d"),
                clip(&issue.description, 70)
            );
        }
        if issues.len() > ISSUES_PER_KIND {
            println!("  ... and {} more", issues.len() - ISSUES_PER_KIND);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
