//! Terminal-facing output.
//!
//! Orchestration code talks to [`RenderSink`] so tests can capture status
//! lines without touching stderr. [`Renderer`] is the terminal implementation.

pub mod banner;
pub mod render;
pub mod settings;

pub use banner::{banner_lines, render_banner};
pub use render::{RenderSink, Renderer};
