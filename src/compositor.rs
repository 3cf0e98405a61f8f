//! Painter's-algorithm compositing.
//!
//! The compositor collects every surviving primitive of a frame into the
//! [`GeometryStore`], then sorts the sort keys by depth and replays the
//! primitives back to front into a [`DrawBackend`]. Nearer primitives are
//! painted later and cover farther ones. Mutually interpenetrating
//! primitives cannot be ordered correctly by a single mean depth; that is a
//! known limitation of the technique.
//!
//! ```text
//! Idle --begin_frame--> Accumulating --composite--> Sorting --> Replaying --> Idle
//! ```

use crate::backend::DrawBackend;
use crate::color::Rgba;
use crate::error::RenderError;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::primitive::PrimitiveKind;
use crate::store::{GeometryStore, PrimitiveId, PrimitiveRecord, COORDS_PER_VERTEX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Idle,
    Accumulating,
    Sorting,
    Replaying,
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Primitives handed to the pipeline.
    pub submitted: usize,
    /// Dropped because too little survived clipping.
    pub clipped: usize,
    /// Dropped by backface culling.
    pub culled: usize,
    /// Dropped because they had too few vertices to begin with.
    pub malformed: usize,
    /// Replayed to the backend.
    pub drawn: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Compositor {
    state: FrameState,
    stats: FrameStats,
    points: Vec<Vec2>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_accumulating(&self) -> bool {
        self.state == FrameState::Accumulating
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn stats_mut(&mut self) -> &mut FrameStats {
        &mut self.stats
    }

    /// Starts a new frame, emptying the store.
    pub fn begin_frame(&mut self, store: &mut GeometryStore) -> Result<(), RenderError> {
        if self.state != FrameState::Idle {
            return Err(RenderError::FrameInProgress);
        }
        store.reset_frame();
        self.stats = FrameStats::default();
        self.state = FrameState::Accumulating;
        Ok(())
    }

    /// Appends one clipped, shaded primitive with its device-space vertices.
    ///
    /// `depth` is the primitive's sort depth: larger (less negative) values
    /// are nearer the eye and painted later.
    pub fn accumulate(
        &mut self,
        store: &mut GeometryStore,
        kind: PrimitiveKind,
        device_points: &[Vec3],
        color: Rgba,
        depth: f32,
    ) -> Result<PrimitiveId, RenderError> {
        if self.state != FrameState::Accumulating {
            return Err(RenderError::NoFrameInProgress);
        }

        // Allocate every slot first, then fill through fresh lookups.
        let id = store.allocate_primitive();
        let coords = store.allocate_coords(device_points.len());
        let color_id = store.allocate_color();

        for (slot, point) in store
            .coords_mut(coords, device_points.len())
            .chunks_exact_mut(COORDS_PER_VERTEX)
            .zip(device_points)
        {
            slot.copy_from_slice(&[point.x, point.y, point.z]);
        }
        *store.color_mut(color_id) = color;
        *store.primitive_mut(id) = PrimitiveRecord {
            kind,
            coords,
            vertex_count: device_points.len(),
            color: color_id,
        };
        store.sort_key_mut(id).depth = depth;

        Ok(id)
    }

    /// Sorts the frame's primitives back to front and replays them.
    ///
    /// The backend is cleared to `background` first and presented last.
    pub fn composite(
        &mut self,
        store: &mut GeometryStore,
        background: Rgba,
        backend: &mut dyn DrawBackend,
    ) -> Result<FrameStats, RenderError> {
        if self.state != FrameState::Accumulating {
            return Err(RenderError::NoFrameInProgress);
        }

        self.state = FrameState::Sorting;
        // Stable: equal depths keep submission order.
        store
            .sort_keys_mut()
            .sort_by(|a, b| a.depth.total_cmp(&b.depth));

        self.state = FrameState::Replaying;
        backend.clear(background);
        for key in store.sort_keys() {
            let record = store.primitive(key.primitive);
            let color = store.color(record.color);

            self.points.clear();
            self.points.extend(
                store
                    .coords(record.coords, record.vertex_count)
                    .chunks_exact(COORDS_PER_VERTEX)
                    .map(|xyz| Vec2::new(xyz[0], xyz[1])),
            );

            match record.kind {
                PrimitiveKind::Polygon => backend.draw_polygon(color, &self.points),
                PrimitiveKind::LineStrip => backend.draw_line(color, &self.points),
                PrimitiveKind::PointSet => backend.draw_point(color, &self.points),
            }
            self.stats.drawn += 1;
        }
        backend.present();

        self.state = FrameState::Idle;
        log::trace!("composited frame: {:?}", self.stats);
        Ok(self.stats)
    }

    /// Abandons the current frame without drawing it.
    pub fn abort_frame(&mut self) {
        self.state = FrameState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCommand, MetafileBackend};

    fn point_at(x: f32) -> [Vec3; 1] {
        [Vec3::new(x, 0.0, 0.0)]
    }

    #[test]
    fn replays_in_increasing_depth_order() {
        let mut store = GeometryStore::default();
        let mut compositor = Compositor::new();
        compositor.begin_frame(&mut store).unwrap();

        // Depths 0..8 in a scrambled order; x records the depth.
        for depth in [5, 2, 7, 0, 3, 6, 1, 4] {
            compositor
                .accumulate(
                    &mut store,
                    PrimitiveKind::PointSet,
                    &point_at(depth as f32),
                    Rgba::WHITE,
                    depth as f32,
                )
                .unwrap();
        }

        let mut meta = MetafileBackend::new();
        let stats = compositor
            .composite(&mut store, Rgba::BLACK, &mut meta)
            .unwrap();

        let order: Vec<f32> = meta
            .drawn()
            .map(|c| match c {
                DrawCommand::Point { points, .. } => points[0].x,
                other => panic!("unexpected command {:?}", other),
            })
            .collect();
        assert_eq!(order, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(stats.drawn, 8);
        assert_eq!(compositor.state(), FrameState::Idle);
    }

    #[test]
    fn farthest_is_painted_first() {
        let mut store = GeometryStore::default();
        let mut compositor = Compositor::new();
        compositor.begin_frame(&mut store).unwrap();
        compositor
            .accumulate(&mut store, PrimitiveKind::PointSet, &point_at(1.0), Rgba::WHITE, -2.0)
            .unwrap();
        compositor
            .accumulate(&mut store, PrimitiveKind::PointSet, &point_at(2.0), Rgba::WHITE, -20.0)
            .unwrap();

        let mut meta = MetafileBackend::new();
        compositor.composite(&mut store, Rgba::BLACK, &mut meta).unwrap();
        let first = meta.drawn().next();
        match first {
            Some(DrawCommand::Point { points, .. }) => assert_eq!(points[0].x, 2.0),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn dispatches_by_kind_and_brackets_frame() {
        let mut store = GeometryStore::default();
        let mut compositor = Compositor::new();
        compositor.begin_frame(&mut store).unwrap();
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        compositor
            .accumulate(&mut store, PrimitiveKind::Polygon, &tri, Rgba::WHITE, -3.0)
            .unwrap();
        compositor
            .accumulate(&mut store, PrimitiveKind::LineStrip, &tri[..2], Rgba::WHITE, -2.0)
            .unwrap();

        let mut meta = MetafileBackend::new();
        compositor.composite(&mut store, Rgba::BLACK, &mut meta).unwrap();

        let commands = meta.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], DrawCommand::Clear(Rgba::BLACK));
        assert!(matches!(commands[1], DrawCommand::Polygon { ref points, .. } if points.len() == 3));
        assert!(matches!(commands[2], DrawCommand::Line { ref points, .. } if points.len() == 2));
        assert_eq!(commands[3], DrawCommand::Present);
    }

    #[test]
    fn state_machine_rejects_misuse() {
        let mut store = GeometryStore::default();
        let mut compositor = Compositor::new();
        let mut meta = MetafileBackend::new();

        assert_eq!(
            compositor.composite(&mut store, Rgba::BLACK, &mut meta),
            Err(RenderError::NoFrameInProgress)
        );
        assert_eq!(
            compositor
                .accumulate(&mut store, PrimitiveKind::PointSet, &point_at(0.0), Rgba::WHITE, 0.0)
                .unwrap_err(),
            RenderError::NoFrameInProgress
        );

        compositor.begin_frame(&mut store).unwrap();
        assert_eq!(
            compositor.begin_frame(&mut store),
            Err(RenderError::FrameInProgress)
        );
    }

    #[test]
    fn next_frame_starts_empty() {
        let mut store = GeometryStore::default();
        let mut compositor = Compositor::new();
        let mut meta = MetafileBackend::new();

        compositor.begin_frame(&mut store).unwrap();
        compositor
            .accumulate(&mut store, PrimitiveKind::PointSet, &point_at(0.0), Rgba::WHITE, 0.0)
            .unwrap();
        compositor.composite(&mut store, Rgba::BLACK, &mut meta).unwrap();

        compositor.begin_frame(&mut store).unwrap();
        assert_eq!(store.primitive_count(), 0);
        let stats = compositor.composite(&mut store, Rgba::BLACK, &mut meta).unwrap();
        assert_eq!(stats.drawn, 0);
    }
}
