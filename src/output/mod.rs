use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::present;
use crate::registry::{questions, QuestionKind};
use crate::scoring::CanonicalResult;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Format a normalized result for plain (non-TUI) output: score line,
/// STEM badge line, then the breakdown as scaled bars.
pub fn format_result(result: &CanonicalResult, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let score = format!("{:.0}%", result.self_discipline_percent);
    let badge = present::stem_label(result.stem_fit_probability);
    let probability = format!("{:.0}%", result.stem_fit_probability * 100.0);

    if use_colors {
        lines.push(format!(
            "Self-discipline score: {}",
            score.bold()
        ));
        lines.push(format!(
            "STEM fit: {} - {} [{}]",
            probability.bold(),
            result.stem_fit_label,
            badge.cyan()
        ));
    } else {
        lines.push(format!("Self-discipline score: {}", score));
        lines.push(format!(
            "STEM fit: {} - {} [{}]",
            probability, result.stem_fit_label, badge
        ));
    }

    lines.push(String::new());
    lines.push(format_breakdown(result, use_colors));

    lines.join("\n")
}

fn format_breakdown(result: &CanonicalResult, use_colors: bool) -> String {
    let bars = present::breakdown_bars(result);
    if bars.is_empty() {
        return "No breakdown data returned.".to_string();
    }

    // Bar track width: fit within the terminal, leave room for the
    // "  Name        ####  99%" framing.
    let name_width = bars.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let track_width = get_terminal_width()
        .map(|w| w.saturating_sub(name_width + 12).clamp(10, 40))
        .unwrap_or(20);

    let mut lines = vec!["Breakdown:".to_string()];
    for (name, value) in &bars {
        let filled = (*value as usize * track_width) / 100;
        let bar: String = "█".repeat(filled) + &"░".repeat(track_width - filled);
        let line = if use_colors {
            format!(
                "  {:<width$}  {}  {:>3}%",
                name,
                bar.magenta(),
                value,
                width = name_width
            )
        } else {
            format!(
                "  {:<width$}  {}  {:>3}%",
                name,
                bar,
                value,
                width = name_width
            )
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Format the question catalog, one block per section, for the
/// `questions` subcommand. The ids are the keys expected in an answers
/// file.
pub fn format_questions(use_colors: bool) -> String {
    let mut lines = Vec::new();
    let mut current_section = "";

    for q in questions() {
        if q.section != current_section {
            if !current_section.is_empty() {
                lines.push(String::new());
            }
            current_section = q.section;
            if use_colors {
                lines.push(format!("{}", q.section.bold()));
            } else {
                lines.push(q.section.to_string());
            }
        }

        let constraint = match q.kind {
            QuestionKind::Choice { options } => format!("one of: {}", options.join(" | ")),
            QuestionKind::Scale { min, max } => format!("integer {}-{}", min, max),
            QuestionKind::Number { min, max, .. } => format!("number {}-{}", min, max),
        };

        if use_colors {
            lines.push(format!("  {}: {} ({})", q.id.cyan(), q.label, constraint));
        } else {
            lines.push(format!("  {}: {} ({})", q.id, q.label, constraint));
        }
    }

    lines.join("\n")
}
