//! Hardcoded labels, glyphs, and colours for console output.

use crossterm::style::Color;

pub const INDENT_1: &str = "  ";

pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

pub const GLYPH_SECTION_BULLET: &str = "•";

pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;
pub const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
pub const COLOR_ACTIVITY_TEXT: Color = Color::Grey;
pub const COLOR_BANNER_SLOGAN: Color = Color::Green;
pub const COLOR_BANNER_META: Color = Color::DarkGrey;
