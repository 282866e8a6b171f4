//! Output rendering for check, sources, and strip commands.
//!
//! Supports `human` (default), `github` (workflow annotations) and `json`
//! outputs. Line composers are pure so they can be tested without
//! capturing stdout.

use crate::config::OutputMode;
use crate::models::{CheckReport, Diagnostic, Severity, Verified};
use crate::strip::{OverlaySources, StrippedSource};
use crate::utils::{colors_enabled, note_prefix};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(mode: OutputMode) -> bool {
    mode != OutputMode::Json && colors_enabled()
}

/// Print a check report in the requested format.
pub fn print_check(report: &CheckReport, mode: OutputMode) {
    match mode {
        OutputMode::Json => println!("{:#}", compose_check_json(report)),
        OutputMode::Github => {
            let color = use_colors(mode);
            for v in &report.verified {
                println!("{}", format_verified(v, color));
            }
            for d in &report.diagnostics {
                println!("{}", format_annotation(d));
            }
        }
        OutputMode::Human => {
            let color = use_colors(mode);
            for v in &report.verified {
                println!("{}", format_verified(v, color));
            }
            for d in &report.diagnostics {
                println!("{}", format_human(d, color));
            }
            let summary = format!(
                "— Summary — errors={} warnings={} overlays={} checked={}",
                report.summary.errors,
                report.summary.warnings,
                report.summary.entries,
                report.summary.additions
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{summary}");
            }
        }
    }
}

/// Print overlays with their sources.
pub fn print_sources(list: &[OverlaySources], mode: OutputMode) {
    if mode == OutputMode::Json {
        println!("{:#}", json!({ "overlays": list }));
        return;
    }
    let color = use_colors(mode);
    for overlay in list {
        println!("Overlay name: {}", overlay.name);
        println!("Sources: ");
        for s in &overlay.sources {
            if !s.insecure {
                println!("    {}", s.source.url);
            } else if color {
                println!("    {} {}", s.source.url, "(insecure)".red().bold());
            } else {
                println!("    {} (insecure)", s.source.url);
            }
        }
    }
}

/// Report removed links on stderr; stdout carries the document.
pub fn print_stripped(removed: &[StrippedSource], file: &str) {
    for r in removed {
        eprintln!(
            "{} {}:{} removed {} from \"{}\"",
            note_prefix(),
            file,
            r.span.start,
            r.url,
            r.overlay
        );
    }
}

/// `✖ <file>:<line> - <title> - <message>`
pub fn format_human(d: &Diagnostic, color: bool) -> String {
    let location = format!("{}:{}", d.file, d.span.start);
    match (d.severity, color) {
        (Severity::Error, true) => format!(
            "{} {} - {} - {}",
            "✖".red(),
            location.bold(),
            d.title.red().bold(),
            d.message
        ),
        (Severity::Warning, true) => format!(
            "{} {} - {} - {}",
            "▲".yellow(),
            location.bold(),
            d.title.yellow().bold(),
            d.message
        ),
        (Severity::Error, false) => format!("✖ {} - {} - {}", location, d.title, d.message),
        (Severity::Warning, false) => format!("▲ {} - {} - {}", location, d.title, d.message),
    }
}

/// `::error file=..,line=..,endLine=..,title=..::message`
pub fn format_annotation(d: &Diagnostic) -> String {
    format!(
        "::{} file={},line={},endLine={},title={}::{}",
        d.severity.as_str(),
        escape_property(&d.file),
        d.span.start,
        d.span.end,
        escape_property(&d.title),
        escape_data(&d.message)
    )
}

pub fn format_verified(v: &Verified, color: bool) -> String {
    let line = format!("✓ repo=\"{}\" <{}>", v.name, v.email);
    if color {
        line.green().to_string()
    } else {
        line
    }
}

/// Compose the JSON form of a report (pure, for tests).
pub fn compose_check_json(report: &CheckReport) -> JsonVal {
    json!({
        "file": report.file,
        "ok": report.ok(),
        "diagnostics": report.diagnostics,
        "verified": report.verified,
        "summary": report.summary,
    })
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
