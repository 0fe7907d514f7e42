//! Renderer abstraction
//!
//! Both renderers consume the same inputs: the static layout once, then an
//! interpolated [`Frame`] per tick. They only ever see shared borrows of
//! playback state.

use crate::canvas::{CanvasRenderer, PaintCommand};
use crate::scene::{Scene3DCommand, SceneRenderer};
use lotview_core::Grid;
use lotview_playback::Frame;

/// What a single render call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Snapshot index of the rendered frame.
    pub index: usize,
    /// Entities visible in the frame.
    pub entities: usize,
    /// Commands emitted for the frame.
    pub commands: usize,
    /// Retained nodes created (always 0 for immediate-mode renderers).
    pub added: usize,
    /// Retained nodes removed (always 0 for immediate-mode renderers).
    pub removed: usize,
}

/// A renderer fed once per tick.
pub trait RendererAdapter {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Install the static layout. Called once per session.
    fn set_layout(&mut self, grid: &Grid);

    /// Produce the visual frame for `frame`.
    ///
    /// Rendering the same frame twice yields the same output.
    fn render(&mut self, frame: &Frame) -> RenderSummary;
}

/// Borrowed view of the last frame a [`Renderer`] produced.
#[derive(Clone, Copy, Debug)]
pub enum RenderOutput<'a> {
    Canvas2D(&'a [PaintCommand]),
    Scene3D(&'a [Scene3DCommand]),
}

/// The available renderers.
#[derive(Debug)]
pub enum Renderer {
    Canvas2D(CanvasRenderer),
    Scene3D(SceneRenderer),
}

impl Renderer {
    pub fn output(&self) -> RenderOutput<'_> {
        match self {
            Renderer::Canvas2D(r) => RenderOutput::Canvas2D(r.commands()),
            Renderer::Scene3D(r) => RenderOutput::Scene3D(r.commands()),
        }
    }
}

impl From<CanvasRenderer> for Renderer {
    fn from(renderer: CanvasRenderer) -> Self {
        Renderer::Canvas2D(renderer)
    }
}

impl From<SceneRenderer> for Renderer {
    fn from(renderer: SceneRenderer) -> Self {
        Renderer::Scene3D(renderer)
    }
}

impl RendererAdapter for Renderer {
    fn name(&self) -> &'static str {
        match self {
            Renderer::Canvas2D(r) => r.name(),
            Renderer::Scene3D(r) => r.name(),
        }
    }

    fn set_layout(&mut self, grid: &Grid) {
        match self {
            Renderer::Canvas2D(r) => r.set_layout(grid),
            Renderer::Scene3D(r) => r.set_layout(grid),
        }
    }

    fn render(&mut self, frame: &Frame) -> RenderSummary {
        match self {
            Renderer::Canvas2D(r) => r.render(frame),
            Renderer::Scene3D(r) => r.render(frame),
        }
    }
}
