//! Snapshot rendering module
//!
//! Renderers only ever see a `Snapshot`; they never touch the live match.

pub mod json;
pub mod text;

pub use json::JsonRenderer;
pub use text::TextRenderer;

use crate::sim::Snapshot;

/// Draws one snapshot per call
pub trait Renderer {
    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        (**self).render(snapshot)
    }
}
