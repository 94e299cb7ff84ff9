//! CLI output formatting for every command.
//!
//! # Entity Display Contract
//!
//! Every employee follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + name + id
//! 2. **Context lines**: indented `Location:`, `Job title:`, `Badges:`, `Photo:`
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! 001 Alice Smith [1]
//!     Location: NYC
//!     Job title: Engineer
//!     Badges: Coffee Snob, Bug Squasher
//!     Photo: https://.../employee_pic/0a1b2c3d4e5f6071.png?expires=...
//! ```
//!
//! ## Save
//!
//! ```text
//! Created employee 7 (Alice Smith)
//!     Photo: employee_pic/0a1b2c3d4e5f6071.png
//! ```
//!
//! ## Normalize
//!
//! ```text
//! 001 portrait.jpg → out/portrait.png (90x120 at 15,20)
//! 002 broken.png
//!     Failed: Decode failed: ...
//! Normalized 1 photo, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::context::RequestContext;
use crate::directory::{PhotoOutcome, SaveOutcome};
use crate::types::EmployeeView;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn employee_context(view: &EmployeeView, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let employee = &view.employee;
    let mut lines = vec![
        format!("{}Location: {}", pad, employee.location),
        format!("{}Job title: {}", pad, employee.job_title),
    ];
    if !view.badges.is_empty() {
        let labels: Vec<&str> = view.badges.iter().map(|b| b.label).collect();
        lines.push(format!("{}Badges: {}", pad, labels.join(", ")));
    }
    match (&view.photo_url, &employee.object_key) {
        (Some(url), _) => lines.push(format!("{}Photo: {}", pad, url)),
        (None, Some(key)) => lines.push(format!("{}Photo: {} (no URL)", pad, key)),
        (None, None) => {}
    }
    lines
}

// ============================================================================
// Employees
// ============================================================================

pub fn format_employee_list(views: &[EmployeeView]) -> Vec<String> {
    if views.is_empty() {
        return vec!["No employees".to_string()];
    }
    let mut lines = Vec::new();
    for (i, view) in views.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            view.employee.full_name,
            view.employee.id
        ));
        lines.extend(employee_context(view, 1));
    }
    lines
}

pub fn print_employee_list(views: &[EmployeeView]) {
    for line in format_employee_list(views) {
        println!("{}", line);
    }
}

pub fn format_employee(view: &EmployeeView) -> Vec<String> {
    let mut lines = vec![format!("{} [{}]", view.employee.full_name, view.employee.id)];
    lines.extend(employee_context(view, 1));
    lines
}

pub fn print_employee(view: &EmployeeView) {
    for line in format_employee(view) {
        println!("{}", line);
    }
}

pub fn format_save_outcome(outcome: &SaveOutcome, full_name: &str) -> Vec<String> {
    let verb = if outcome.created { "Created" } else { "Updated" };
    let mut lines = vec![format!("{} employee {} ({})", verb, outcome.id, full_name)];
    match &outcome.photo {
        PhotoOutcome::NotProvided => {}
        PhotoOutcome::Stored { key } => lines.push(format!("{}Photo: {}", indent(1), key)),
        PhotoOutcome::Rejected { reason } => {
            lines.push(format!("{}Photo discarded: {}", indent(1), reason))
        }
    }
    lines
}

pub fn print_save_outcome(outcome: &SaveOutcome, full_name: &str) {
    for line in format_save_outcome(outcome, full_name) {
        println!("{}", line);
    }
}

// ============================================================================
// Normalize
// ============================================================================

pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Normalized {
            index,
            source,
            output,
            placement,
        } => vec![format!(
            "{} {} → {} ({}x{} at {},{})",
            format_index(*index),
            file_name(source),
            output.display(),
            placement.width,
            placement.height,
            placement.x,
            placement.y
        )],
        BatchEvent::Failed {
            index,
            source,
            reason,
        } => vec![
            format!("{} {}", format_index(*index), file_name(source)),
            format!("{}Failed: {}", indent(1), reason),
        ],
    }
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    format!(
        "Normalized {}, {} failed",
        plural(summary.normalized, "photo"),
        summary.failed
    )
}

// ============================================================================
// Export / info
// ============================================================================

/// Pages relative to the export root, one per line.
pub fn format_export(written: &[PathBuf], out: &Path) -> Vec<String> {
    let mut lines: Vec<String> = written
        .iter()
        .map(|p| p.strip_prefix(out).unwrap_or(p).display().to_string())
        .collect();
    lines.push(format!(
        "Exported {} to {}",
        plural(written.len(), "page"),
        out.display()
    ));
    lines
}

pub fn format_info(ctx: &RequestContext) -> Vec<String> {
    vec![
        format!("instance_id: {}", ctx.instance_id),
        format!("availability_zone: {}", ctx.availability_zone),
    ]
}
