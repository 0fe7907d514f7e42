//! Lotview Render
//!
//! Two renderers fed from one playback session:
//!
//! - **Canvas2D**: immediate mode, a full paint command list per frame
//! - **Scene3D**: retained mode, a keyed node arena synchronised by set difference
//!
//! Both implement [`RendererAdapter`]; [`Renderer`] dispatches between them and
//! [`PlaybackDriver`] ties a renderer to a session and a frame scheduler.

pub mod adapter;
pub mod canvas;
pub mod driver;
pub mod overlay;
pub mod palette;
pub mod scene;

pub use adapter::{RenderOutput, RenderSummary, Renderer, RendererAdapter};
pub use canvas::{CanvasConfig, CanvasRenderer, PaintCommand, PaintContext, StrokeStyle};
pub use driver::{DriverStats, PlaybackDriver};
pub use overlay::stats_lines;
pub use scene::{
    grid_to_world, Camera, CameraProjection, CarNode, NodeKey, Scene3DCommand,
    SceneConfig, SceneRenderer, Tile,
};
