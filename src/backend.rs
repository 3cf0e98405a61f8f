//! The 2-D output contract the compositor replays into.
//!
//! A backend receives primitives that are already projected, clipped, shaded
//! and sorted back to front. It only has to paint them in the order given;
//! it never sees depth.

use crate::color::Rgba;
use crate::math::vec2::Vec2;

/// A 2-D drawing surface.
///
/// A frame is bracketed by [`clear`](DrawBackend::clear) and
/// [`present`](DrawBackend::present). Points are in device pixels with the
/// origin at the top-left corner and y growing downward.
pub trait DrawBackend {
    fn clear(&mut self, background: Rgba);

    /// Fills a convex polygon.
    fn draw_polygon(&mut self, color: Rgba, points: &[Vec2]);

    /// Strokes an open polyline through `points`.
    fn draw_line(&mut self, color: Rgba, points: &[Vec2]);

    /// Marks each of `points`.
    fn draw_point(&mut self, color: Rgba, points: &[Vec2]);

    fn present(&mut self);
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    Polygon { color: Rgba, points: Vec<Vec2> },
    Line { color: Rgba, points: Vec<Vec2> },
    Point { color: Rgba, points: Vec<Vec2> },
    Present,
}

/// Backend that records every call as a [`DrawCommand`] instead of drawing.
///
/// The recorded list is a device-independent picture: it can be inspected,
/// replayed into another backend, or written out by a plotter.
#[derive(Debug, Clone, Default)]
pub struct MetafileBackend {
    commands: Vec<DrawCommand>,
}

impl MetafileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drawing commands only, without the clear/present brackets.
    pub fn drawn(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| !matches!(c, DrawCommand::Clear(_) | DrawCommand::Present))
    }

    pub fn polygon_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count()
    }

    pub fn clear_recording(&mut self) {
        self.commands.clear();
    }

    /// Replays the recording into another backend.
    pub fn replay(&self, target: &mut dyn DrawBackend) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => target.clear(*color),
                DrawCommand::Polygon { color, points } => target.draw_polygon(*color, points),
                DrawCommand::Line { color, points } => target.draw_line(*color, points),
                DrawCommand::Point { color, points } => target.draw_point(*color, points),
                DrawCommand::Present => target.present(),
            }
        }
    }
}

impl DrawBackend for MetafileBackend {
    fn clear(&mut self, background: Rgba) {
        self.commands.push(DrawCommand::Clear(background));
    }

    fn draw_polygon(&mut self, color: Rgba, points: &[Vec2]) {
        self.commands.push(DrawCommand::Polygon {
            color,
            points: points.to_vec(),
        });
    }

    fn draw_line(&mut self, color: Rgba, points: &[Vec2]) {
        self.commands.push(DrawCommand::Line {
            color,
            points: points.to_vec(),
        });
    }

    fn draw_point(&mut self, color: Rgba, points: &[Vec2]) {
        self.commands.push(DrawCommand::Point {
            color,
            points: points.to_vec(),
        });
    }

    fn present(&mut self) {
        self.commands.push(DrawCommand::Present);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut meta = MetafileBackend::new();
        meta.clear(Rgba::BLACK);
        meta.draw_line(Rgba::WHITE, &[Vec2::ZERO, Vec2::new(1.0, 1.0)]);
        meta.present();

        assert_eq!(meta.commands().len(), 3);
        assert_eq!(meta.drawn().count(), 1);
        assert_eq!(meta.commands()[2], DrawCommand::Present);
    }

    #[test]
    fn replay_reproduces_recording() {
        let mut meta = MetafileBackend::new();
        meta.clear(Rgba::BLACK);
        meta.draw_polygon(
            Rgba::WHITE,
            &[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        );
        meta.present();

        let mut copy = MetafileBackend::new();
        meta.replay(&mut copy);
        assert_eq!(copy.commands(), meta.commands());
        assert_eq!(copy.polygon_count(), 1);
    }
}
