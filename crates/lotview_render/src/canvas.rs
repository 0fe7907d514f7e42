//! Immediate-mode 2D canvas renderer
//!
//! Every call rebuilds the full paint command list: background, grid cells,
//! one disc per vehicle with a heading tick and label, then the stats
//! overlay. Nothing is retained between frames except the cell layout.

use crate::adapter::{RenderSummary, RendererAdapter};
use crate::overlay::stats_lines;
use crate::palette;
use lotview_core::{Color, Grid, Point, Rect};
use lotview_playback::Frame;

/// Stroke style
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// A paint command for the host canvas
#[derive(Clone, Debug, PartialEq)]
pub enum PaintCommand {
    Clear {
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        style: StrokeStyle,
    },
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        style: StrokeStyle,
    },
    Line {
        from: Point,
        to: Point,
        style: StrokeStyle,
    },
    DrawText {
        text: String,
        position: Point,
        size: f32,
        color: Color,
    },
}

/// Records paint commands in call order
#[derive(Debug, Default)]
pub struct PaintContext {
    commands: Vec<PaintCommand>,
}

impl PaintContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded commands
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Take ownership of recorded commands
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self, color: Color) {
        self.commands.push(PaintCommand::Clear { color });
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(PaintCommand::FillRect { rect, color });
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands.push(PaintCommand::StrokeRect {
            rect,
            style: StrokeStyle { color, width },
        });
    }

    pub fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands.push(PaintCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    pub fn stroke_circle(&mut self, center: Point, radius: f32, color: Color, width: f32) {
        self.commands.push(PaintCommand::StrokeCircle {
            center,
            radius,
            style: StrokeStyle { color, width },
        });
    }

    pub fn line(&mut self, from: Point, to: Point, color: Color, width: f32) {
        self.commands.push(PaintCommand::Line {
            from,
            to,
            style: StrokeStyle { color, width },
        });
    }

    pub fn draw_text(&mut self, text: impl Into<String>, position: Point, size: f32, color: Color) {
        self.commands.push(PaintCommand::DrawText {
            text: text.into(),
            position,
            size,
            color,
        });
    }
}

/// Pixel layout of the canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasConfig {
    /// Edge length of one grid cell, in pixels
    pub cell_size: f32,
    /// Blank border around the grid, in pixels
    pub margin: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            cell_size: 32.0,
            margin: 10.0,
        }
    }
}

const LABEL_SIZE: f32 = 8.0;
const OVERLAY_SIZE: f32 = 12.0;
const OVERLAY_LINE_HEIGHT: f32 = 16.0;

/// 2D renderer producing a fresh [`PaintCommand`] list per frame
#[derive(Debug)]
pub struct CanvasRenderer {
    config: CanvasConfig,
    grid_width: u32,
    grid_height: u32,
    cells: Vec<(Rect, Color)>,
    ctx: PaintContext,
    last: Vec<PaintCommand>,
}

impl CanvasRenderer {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            grid_width: 0,
            grid_height: 0,
            cells: Vec::new(),
            ctx: PaintContext::new(),
            last: Vec::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Commands produced by the most recent [`RendererAdapter::render`] call
    pub fn commands(&self) -> &[PaintCommand] {
        &self.last
    }

    /// Pixel centre of a grid-space position
    pub fn grid_to_pixel(&self, p: Point) -> Point {
        let cell = self.config.cell_size;
        Point::new(
            self.config.margin + p.x * cell + cell / 2.0,
            self.config.margin + p.y * cell + cell / 2.0,
        )
    }

    /// Inverse of [`CanvasRenderer::grid_to_pixel`]
    pub fn pixel_to_grid(&self, p: Point) -> Point {
        let cell = self.config.cell_size;
        Point::new(
            (p.x - self.config.margin - cell / 2.0) / cell,
            (p.y - self.config.margin - cell / 2.0) / cell,
        )
    }

    /// Radius of a vehicle disc, in pixels
    pub fn car_radius(&self) -> f32 {
        (self.config.cell_size * 0.35).floor().max(10.0)
    }

    /// Canvas size needed for the grid plus margins, in pixels
    pub fn grid_extent(&self) -> (f32, f32) {
        let cell = self.config.cell_size;
        let margin = self.config.margin;
        (
            margin * 2.0 + self.grid_width as f32 * cell,
            margin * 2.0 + self.grid_height as f32 * cell,
        )
    }

    fn draw_cells(&mut self) {
        let outline = Color::from_hex(palette::CELL_OUTLINE);
        for (rect, color) in &self.cells {
            self.ctx.fill_rect(*rect, *color);
            self.ctx.stroke_rect(*rect, outline, 1.0);
        }
    }

    fn draw_vehicles(&mut self, frame: &Frame) {
        let radius = self.car_radius();
        for entity in &frame.poses {
            let center = self.grid_to_pixel(entity.pose.position());
            self.ctx
                .fill_circle(center, radius, palette::entity_color(entity.class));
            self.ctx.stroke_circle(center, radius, Color::BLACK, 1.0);

            // Canvas y grows downward like grid y, so the heading maps directly
            if let Some(heading) = entity.pose.heading {
                let tip = center.offset_polar(heading, radius);
                self.ctx.line(center, tip, Color::BLACK, 2.0);
            }

            self.ctx
                .draw_text(entity.id.as_str(), center, LABEL_SIZE, Color::WHITE);
        }
    }

    fn draw_overlay(&mut self, frame: &Frame) {
        let (_, grid_bottom) = self.grid_extent();
        for (i, line) in stats_lines(frame).into_iter().enumerate() {
            let position = Point::new(
                self.config.margin,
                grid_bottom + OVERLAY_LINE_HEIGHT * (i as f32 + 1.0),
            );
            self.ctx.draw_text(line, position, OVERLAY_SIZE, Color::BLACK);
        }
    }
}

impl Default for CanvasRenderer {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl RendererAdapter for CanvasRenderer {
    fn name(&self) -> &'static str {
        "canvas2d"
    }

    fn set_layout(&mut self, grid: &Grid) {
        let cell = self.config.cell_size;
        let margin = self.config.margin;
        self.grid_width = grid.width();
        self.grid_height = grid.height();
        self.cells = grid
            .cells()
            .map(|c| {
                let rect = Rect::new(
                    margin + c.x as f32 * cell,
                    margin + c.y as f32 * cell,
                    cell,
                    cell,
                );
                (rect, palette::cell_color(c.cell_type))
            })
            .collect();
    }

    fn render(&mut self, frame: &Frame) -> RenderSummary {
        self.ctx.clear(Color::from_hex(palette::BACKGROUND));
        self.draw_cells();
        self.draw_vehicles(frame);
        self.draw_overlay(frame);

        self.last = self.ctx.take_commands();
        tracing::trace!(
            index = frame.index,
            commands = self.last.len(),
            "canvas frame"
        );

        RenderSummary {
            index: frame.index,
            entities: frame.poses.len(),
            commands: self.last.len(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotview_core::{AggregateCounters, Cell, CellType, EntityClass, EntityId};
    use lotview_playback::{EntityPose, InterpolatedPose};

    fn grid() -> Grid {
        Grid::from_cells(
            3,
            2,
            vec![
                Cell::new(0, 0, CellType::Entry),
                Cell::new(1, 0, CellType::Road),
                Cell::new(2, 0, CellType::Parking),
            ],
        )
    }

    fn frame(poses: Vec<EntityPose>) -> Frame {
        Frame {
            index: 0,
            snapshot_count: 2,
            t: 0,
            progress: 0.5,
            poses,
            stats: AggregateCounters::default(),
        }
    }

    fn car(id: &str, x: f32, y: f32, heading: Option<f32>) -> EntityPose {
        EntityPose {
            id: EntityId::from(id),
            class: EntityClass::Arriving,
            pose: InterpolatedPose { x, y, heading },
        }
    }

    fn count(commands: &[PaintCommand], pred: impl Fn(&PaintCommand) -> bool) -> usize {
        commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_full_rebuild_each_frame() {
        let mut canvas = CanvasRenderer::default();
        canvas.set_layout(&grid());

        let summary = canvas.render(&frame(vec![car("c1", 1.0, 0.0, Some(0.0))]));
        let cmds = canvas.commands();

        assert!(matches!(cmds[0], PaintCommand::Clear { .. }));
        assert_eq!(count(cmds, |c| matches!(c, PaintCommand::FillRect { .. })), 6);
        assert_eq!(count(cmds, |c| matches!(c, PaintCommand::FillCircle { .. })), 1);
        assert_eq!(count(cmds, |c| matches!(c, PaintCommand::Line { .. })), 1);
        assert_eq!(summary.commands, cmds.len());
        assert_eq!(summary.entities, 1);
    }

    #[test]
    fn test_same_frame_same_output() {
        let mut canvas = CanvasRenderer::default();
        canvas.set_layout(&grid());
        let f = frame(vec![car("c1", 0.5, 1.0, Some(1.0)), car("c2", 2.0, 0.0, None)]);

        canvas.render(&f);
        let first = canvas.commands().to_vec();
        canvas.render(&f);
        assert_eq!(canvas.commands(), first.as_slice());
    }

    #[test]
    fn test_vanished_entity_is_not_drawn() {
        let mut canvas = CanvasRenderer::default();
        canvas.set_layout(&grid());

        canvas.render(&frame(vec![car("c1", 0.0, 0.0, None), car("c2", 1.0, 0.0, None)]));
        canvas.render(&frame(vec![car("c2", 1.0, 0.0, None)]));

        let labels: Vec<&str> = canvas
            .commands()
            .iter()
            .filter_map(|c| match c {
                PaintCommand::DrawText { text, size, .. } if *size == LABEL_SIZE => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["c2"]);
    }

    #[test]
    fn test_no_heading_tick_without_heading() {
        let mut canvas = CanvasRenderer::default();
        canvas.set_layout(&grid());
        canvas.render(&frame(vec![car("c1", 0.0, 0.0, None)]));
        assert_eq!(
            count(canvas.commands(), |c| matches!(c, PaintCommand::Line { .. })),
            0
        );
    }

    #[test]
    fn test_pixel_mapping_and_radius() {
        let canvas = CanvasRenderer::default();
        assert_eq!(canvas.grid_to_pixel(Point::new(0.0, 0.0)), Point::new(26.0, 26.0));
        assert_eq!(canvas.grid_to_pixel(Point::new(2.0, 1.0)), Point::new(90.0, 58.0));
        assert_eq!(canvas.pixel_to_grid(Point::new(90.0, 58.0)), Point::new(2.0, 1.0));
        assert_eq!(canvas.car_radius(), 11.0);

        let small = CanvasRenderer::new(CanvasConfig {
            cell_size: 16.0,
            margin: 0.0,
        });
        assert_eq!(small.car_radius(), 10.0);
    }

    #[test]
    fn test_heading_tick_points_down_for_downward_motion() {
        let mut canvas = CanvasRenderer::default();
        canvas.set_layout(&grid());
        let down = 1.0f32.atan2(0.0);
        canvas.render(&frame(vec![car("c1", 0.0, 0.0, Some(down))]));

        let (from, to) = canvas
            .commands()
            .iter()
            .find_map(|c| match c {
                PaintCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .unwrap();
        assert!((to.x - from.x).abs() < 1e-4);
        assert!(to.y > from.y);
    }
}
