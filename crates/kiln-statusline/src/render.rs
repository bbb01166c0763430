use owo_colors::{OwoColorize, Style};
use serde::Serialize;

/// Everything the status line shows, already resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    pub model: String,
    pub path: String,
    /// Output style, omitted when it is the default one.
    pub style: Option<String>,
    pub turns: usize,
    pub context_length: u64,
    pub cost_usd: f64,
    pub lines_added: i64,
    pub lines_removed: i64,
    pub over_budget: bool,
}

const SEP: &str = " | ";

/// Render a report as one line. `color` toggles ANSI styling.
pub fn render(report: &StatusReport, color: bool) -> String {
    let paint = |text: &str, style: Style| -> String {
        if color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    };

    let mut parts = Vec::with_capacity(6);
    parts.push(paint(&report.model, Style::new().cyan().bold()));

    let mut location = paint(&report.path, Style::new().blue());
    if let Some(style) = &report.style {
        location.push(' ');
        location.push_str(&paint(&format!("[{style}]"), Style::new().magenta()));
    }
    parts.push(location);

    let noun = if report.turns == 1 { "turn" } else { "turns" };
    parts.push(paint(
        &format!("{} {noun}", report.turns),
        Style::new().white(),
    ));
    parts.push(paint(
        &format!("{} ctx", format_tokens(report.context_length)),
        context_style(report.context_length),
    ));
    parts.push(paint(
        &format!("${:.2}", report.cost_usd),
        Style::new().yellow(),
    ));

    if report.lines_added != 0 || report.lines_removed != 0 {
        parts.push(format!(
            "{} {}",
            paint(&format!("+{}", report.lines_added), Style::new().green()),
            paint(&format!("-{}", report.lines_removed), Style::new().red()),
        ));
    }

    if report.over_budget {
        parts.push(paint(">200k", Style::new().red().bold()));
    }

    parts.join(SEP)
}

fn context_style(tokens: u64) -> Style {
    match tokens {
        0..=99_999 => Style::new().green(),
        100_000..=159_999 => Style::new().yellow(),
        _ => Style::new().red(),
    }
}

/// `950`, `45.2k`, `1.3M`. Rounds half up to one decimal, then picks the
/// unit, so values just under a million read `1.0M`.
pub fn format_tokens(n: u64) -> String {
    if n < 1_000 {
        return n.to_string();
    }
    let k_tenths = n.saturating_add(50) / 100;
    if k_tenths < 10_000 {
        return format!("{}.{}k", k_tenths / 10, k_tenths % 10);
    }
    let m_tenths = n.saturating_add(50_000) / 100_000;
    format!("{}.{}M", m_tenths / 10, m_tenths % 10)
}
