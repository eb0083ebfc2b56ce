//! Startup banner: the slogan in figlet block letters over a metadata line.

use crossterm::style::Stylize;
use figlet_rs::FIGfont;
use tracing::debug;

use super::settings;

/// Block-letter rows for `slogan`, without styling. Falls back to the plain
/// slogan when the font cannot render it.
pub fn banner_lines(slogan: &str) -> Vec<String> {
    let figure = FIGfont::standard()
        .map_err(|err| debug!(error = %err, "figlet font unavailable"))
        .ok()
        .and_then(|font| font.convert(slogan).map(|figure| figure.to_string()));
    let Some(text) = figure else {
        return vec![slogan.to_string()];
    };
    let mut lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return vec![slogan.to_string()];
    }
    lines
}

/// Print the banner for `slogan` to stdout, followed by `metadata`.
pub fn render_banner(color: bool, slogan: &str, metadata: &str) {
    println!();
    for line in banner_lines(slogan) {
        if color {
            println!(
                "{}{}",
                settings::INDENT_1,
                line.as_str().with(settings::COLOR_BANNER_SLOGAN).bold()
            );
        } else {
            println!("{}{line}", settings::INDENT_1);
        }
    }
    if color {
        println!(
            "{}{}",
            settings::INDENT_1,
            metadata.with(settings::COLOR_BANNER_META)
        );
    } else {
        println!("{}{metadata}", settings::INDENT_1);
    }
    println!();
}
