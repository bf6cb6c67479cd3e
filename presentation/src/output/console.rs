//! Console formatting helpers for mirror output

use colored::Colorize;
use mirror_domain::{CompletedResponse, HistoryEntry, IntentResult};
use serde::Serialize;
use std::time::Duration;

/// Column gap used by [`ConsoleFormatter::side_by_side`]
const GUTTER: &str = "  |  ";

/// Formats mirror output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Force colored output on or off for the whole process
    pub fn set_color_enabled(enabled: bool) {
        colored::control::set_override(enabled);
    }

    /// `[MIRRORING] analysis (45%)` or `[DIRECT] factual_lookup (95%)`
    pub fn intent_label(result: &IntentResult) -> String {
        let route = if result.should_mirror {
            "MIRRORING"
        } else {
            "DIRECT"
        };
        format!(
            "[{}] {} ({}%)",
            route,
            result.category,
            result.confidence_percent()
        )
    }

    pub fn intent_line(result: &IntentResult) -> String {
        let label = Self::intent_label(result);
        let label = if result.should_mirror {
            label.yellow().bold()
        } else {
            label.green().bold()
        };
        format!("{}  {}", label, result.reason.dimmed())
    }

    pub fn brain_heading(role: &str, brain_id: &str) -> String {
        format!("{} ({})", role, brain_id)
    }

    pub fn synthesis_heading(judge_id: &str, agreement: Option<u8>) -> String {
        match agreement {
            Some(score) => format!("SYNTHESIS ({}) — agreement {}%", judge_id, score),
            None => format!("SYNTHESIS ({})", judge_id),
        }
    }

    /// Latency and token counts, e.g. `1.2s · 12 in / 40 out tokens`
    pub fn response_stats(
        response: &CompletedResponse,
        latency: Option<Duration>,
        show_latency: bool,
        show_token_counts: bool,
    ) -> Option<String> {
        let mut parts = Vec::new();
        if show_latency && let Some(latency) = latency {
            parts.push(format!("{:.1}s", latency.as_secs_f64()));
        }
        if show_token_counts {
            match (response.input_tokens, response.output_tokens) {
                (None, None) => {}
                (input, output) => parts.push(format!(
                    "{} in / {} out tokens",
                    input.map_or("?".to_string(), |n| n.to_string()),
                    output.map_or("?".to_string(), |n| n.to_string()),
                )),
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" · "))
        }
    }

    /// Greedy word wrap that keeps explicit line breaks
    pub fn wrap(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();

        for paragraph in text.trim_end().lines() {
            let mut line = String::new();
            let mut line_len = 0;
            for word in paragraph.split_whitespace() {
                let word_len = word.chars().count();
                if line_len > 0 && line_len + 1 + word_len > width {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                if line_len > 0 {
                    line.push(' ');
                    line_len += 1;
                }
                line.push_str(word);
                line_len += word_len;
            }
            lines.push(line);
        }
        lines
    }

    /// Two titled columns of wrapped text fitting in `width`
    pub fn side_by_side(
        left_title: &str,
        left: &str,
        right_title: &str,
        right: &str,
        width: usize,
    ) -> String {
        let column = width.saturating_sub(GUTTER.len()).max(20) / 2;
        let left_lines = Self::wrap(left, column);
        let right_lines = Self::wrap(right, column);
        let rows = left_lines.len().max(right_lines.len());

        let mut output = String::new();
        output.push_str(&format!(
            "{}{}{}\n",
            Self::pad(left_title, column).cyan().bold(),
            GUTTER,
            right_title.magenta().bold()
        ));
        output.push_str(&format!(
            "{}{}{}\n",
            "-".repeat(column),
            GUTTER,
            "-".repeat(column)
        ));
        for row in 0..rows {
            let l = left_lines.get(row).map(String::as_str).unwrap_or("");
            let r = right_lines.get(row).map(String::as_str).unwrap_or("");
            output.push_str(format!("{}{}{}", Self::pad(l, column), GUTTER, r).trim_end());
            output.push('\n');
        }
        output
    }

    fn pad(text: &str, width: usize) -> String {
        let len = text.chars().count();
        if len >= width {
            text.to_string()
        } else {
            format!("{}{}", text, " ".repeat(width - len))
        }
    }

    /// Tab-separated table with a header row
    pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut output = headers.join("\t");
        output.push('\n');
        for row in rows {
            output.push_str(&row.join("\t"));
            output.push('\n');
        }
        output
    }

    pub fn history_table(entries: &[HistoryEntry]) -> String {
        let rows: Vec<Vec<String>> = entries
            .iter()
            .map(|e| {
                vec![
                    e.id.clone(),
                    e.created_at.to_rfc3339(),
                    e.question_preview(80),
                ]
            })
            .collect();
        Self::table(&["ID", "CREATED", "QUESTION"], &rows)
    }

    /// Format as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    pub fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
