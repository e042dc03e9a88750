//! Crash report printed when a solver run panics.
//!
//! The report names the solver, phase and cluster count recorded by the
//! panicking thread, plus the progress of the current candidate batch.

use super::context::{get_current_context, get_progress, SolverContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RULE: &str =
    "--------------------------------------------------------------------------------";

pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("{}", crash_report(info));
    }));
}

fn crash_report(info: &PanicHookInfo<'_>) -> String {
    let context = get_current_context();
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
    let mut report = render_report(
        &panic_message(info),
        location.as_deref(),
        &context,
        get_progress(),
    );

    if let Some(metadata) = Span::current().metadata() {
        report.push_str(&format!("  span:      {}\n", metadata.name()));
    }
    if std::env::var("RUST_BACKTRACE").is_ok() {
        report.push_str(&format!("{}\n{}\n", RULE, std::backtrace::Backtrace::capture()));
    } else {
        report.push_str("Run with RUST_BACKTRACE=1 for a stack trace\n");
    }
    report
}

fn render_report(
    message: &str,
    location: Option<&str>,
    context: &SolverContext,
    (evaluated, total): (usize, usize),
) -> String {
    let mut lines = vec![
        RULE.to_string(),
        format!("servicemap {} crashed on {}", VERSION, std::env::consts::OS),
        format!("  time:      {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")),
        format!("  panic:     {}", truncate(message, 200)),
    ];
    if let Some(location) = location {
        lines.push(format!("  location:  {}", location));
    }

    lines.push(format!("  solver:    {}", context.solver.unwrap_or("(none)")));
    match context.phase {
        Some(phase) => lines.push(format!("  phase:     {}", phase)),
        None => lines.push("  phase:     (not set, crashed outside a solver run)".to_string()),
    }
    if let Some(count) = context.cluster_count {
        lines.push(format!("  clusters:  {}", count));
    }
    if total > 0 {
        lines.push(format!(
            "  progress:  {} / {} candidates ({}%)",
            evaluated,
            total,
            evaluated * 100 / total
        ));
    }
    lines.push(RULE.to_string());

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
