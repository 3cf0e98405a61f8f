//! Growable per-frame geometry storage.
//!
//! Every buffer the pipeline writes during a frame lives in a [`Pool`]: a
//! slot arena with a fill cursor. Allocation hands out monotonically
//! increasing indices, doubling the backing storage when it runs out. Callers
//! only ever hold indices, so a growth event never invalidates anything they
//! kept; storage is looked up again on every access.
//!
//! Capacity is kept between frames as a working-set cache. [`GeometryStore::reset_frame`]
//! only rewinds the cursors.

use crate::color::Rgba;
use crate::light::LightEntry;
use crate::primitive::PrimitiveKind;

/// Number of scalars stored per vertex in the coordinate pool (x, y, z).
pub const COORDS_PER_VERTEX: usize = 3;

/// Handle to a primitive descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub usize);

/// Offset of the first scalar of a coordinate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordOffset(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub usize);

/// Painter's-algorithm ordering key: one per live primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortKey {
    pub primitive: PrimitiveId,
    /// Mean eye-space z of the primitive's surviving vertices.
    pub depth: f32,
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            primitive: PrimitiveId(0),
            depth: 0.0,
        }
    }
}

/// Where a primitive's data lives in the other pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimitiveRecord {
    pub kind: PrimitiveKind,
    pub coords: CoordOffset,
    pub vertex_count: usize,
    pub color: ColorId,
}

impl Default for PrimitiveRecord {
    fn default() -> Self {
        Self {
            kind: PrimitiveKind::PointSet,
            coords: CoordOffset(0),
            vertex_count: 0,
            color: ColorId(0),
        }
    }
}

/// A slot arena with amortized doubling growth.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    name: &'static str,
    slots: Vec<T>,
    fill: usize,
}

impl<T: Copy + Default> Pool<T> {
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        let mut pool = Self {
            name,
            slots: Vec::new(),
            fill: 0,
        };
        pool.grow_to(capacity.max(1));
        pool
    }

    /// Reserves `count` contiguous slots and returns the index of the first.
    pub fn allocate(&mut self, count: usize) -> usize {
        let start = self.fill;
        let needed = start + count;
        if needed > self.slots.len() {
            let mut capacity = self.slots.len().max(1);
            while capacity < needed {
                capacity *= 2;
            }
            log::debug!(
                "{} pool growing from {} to {} slots",
                self.name,
                self.slots.len(),
                capacity
            );
            self.grow_to(capacity);
        }
        self.fill = needed;
        start
    }

    /// Reallocates the backing store. Heap exhaustion is unrecoverable.
    fn grow_to(&mut self, capacity: usize) {
        let additional = capacity.saturating_sub(self.slots.len());
        if let Err(err) = self.slots.try_reserve_exact(additional) {
            log::error!(
                "out of memory growing {} pool to {} slots: {}",
                self.name,
                capacity,
                err
            );
            std::process::abort();
        }
        self.slots.resize(capacity, T::default());
    }

    pub fn get(&self, index: usize) -> &T {
        &self.live()[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut T {
        &mut self.slots[..self.fill][index]
    }

    pub fn slice(&self, start: usize, count: usize) -> &[T] {
        &self.live()[start..start + count]
    }

    pub fn slice_mut(&mut self, start: usize, count: usize) -> &mut [T] {
        &mut self.slots[..self.fill][start..start + count]
    }

    /// The slots handed out since the last reset.
    pub fn live(&self) -> &[T] {
        &self.slots[..self.fill]
    }

    pub fn live_mut(&mut self) -> &mut [T] {
        &mut self.slots[..self.fill]
    }

    pub fn len(&self) -> usize {
        self.fill
    }

    pub fn is_empty(&self) -> bool {
        self.fill == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn reset(&mut self) {
        self.fill = 0;
    }
}

/// Initial pool sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCapacity {
    pub primitives: usize,
    /// In vertices; the scalar pool holds three times as many entries.
    pub vertices: usize,
    pub colors: usize,
    pub lights: usize,
}

impl Default for StoreCapacity {
    fn default() -> Self {
        Self {
            primitives: 256,
            vertices: 1024,
            colors: 256,
            lights: 8,
        }
    }
}

/// The pipeline's per-renderer buffers: sort keys, primitive descriptors,
/// coordinate scalars, colors and the light table.
#[derive(Debug, Clone)]
pub struct GeometryStore {
    sort_keys: Pool<SortKey>,
    primitives: Pool<PrimitiveRecord>,
    coords: Pool<f32>,
    colors: Pool<Rgba>,
    lights: Pool<LightEntry>,
}

impl Default for GeometryStore {
    fn default() -> Self {
        Self::new(StoreCapacity::default())
    }
}

impl GeometryStore {
    pub fn new(capacity: StoreCapacity) -> Self {
        Self {
            sort_keys: Pool::with_capacity("sort key", capacity.primitives),
            primitives: Pool::with_capacity("primitive", capacity.primitives),
            coords: Pool::with_capacity("coordinate", capacity.vertices * COORDS_PER_VERTEX),
            colors: Pool::with_capacity("color", capacity.colors),
            lights: Pool::with_capacity("light", capacity.lights),
        }
    }

    // ============ Allocation ============

    /// Reserves the next primitive descriptor together with its sort key slot.
    pub fn allocate_primitive(&mut self) -> PrimitiveId {
        let id = self.primitives.allocate(1);
        let key = self.sort_keys.allocate(1);
        debug_assert_eq!(id, key);
        *self.sort_keys.get_mut(key) = SortKey {
            primitive: PrimitiveId(id),
            depth: 0.0,
        };
        PrimitiveId(id)
    }

    /// Reserves room for `vertex_count` vertices worth of xyz scalars.
    pub fn allocate_coords(&mut self, vertex_count: usize) -> CoordOffset {
        CoordOffset(self.coords.allocate(vertex_count * COORDS_PER_VERTEX))
    }

    pub fn allocate_color(&mut self) -> ColorId {
        ColorId(self.colors.allocate(1))
    }

    pub fn allocate_light(&mut self) -> LightId {
        LightId(self.lights.allocate(1))
    }

    /// Rewinds every fill cursor. Capacity is retained.
    pub fn reset_frame(&mut self) {
        self.sort_keys.reset();
        self.primitives.reset();
        self.coords.reset();
        self.colors.reset();
        self.lights.reset();
    }

    // ============ Access ============

    pub fn primitive(&self, id: PrimitiveId) -> &PrimitiveRecord {
        self.primitives.get(id.0)
    }

    pub fn primitive_mut(&mut self, id: PrimitiveId) -> &mut PrimitiveRecord {
        self.primitives.get_mut(id.0)
    }

    /// Sort key of a primitive. Only meaningful before the keys are sorted.
    pub fn sort_key_mut(&mut self, id: PrimitiveId) -> &mut SortKey {
        self.sort_keys.get_mut(id.0)
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        self.sort_keys.live()
    }

    pub fn sort_keys_mut(&mut self) -> &mut [SortKey] {
        self.sort_keys.live_mut()
    }

    pub fn coords(&self, offset: CoordOffset, vertex_count: usize) -> &[f32] {
        self.coords.slice(offset.0, vertex_count * COORDS_PER_VERTEX)
    }

    pub fn coords_mut(&mut self, offset: CoordOffset, vertex_count: usize) -> &mut [f32] {
        self.coords
            .slice_mut(offset.0, vertex_count * COORDS_PER_VERTEX)
    }

    pub fn color(&self, id: ColorId) -> Rgba {
        *self.colors.get(id.0)
    }

    pub fn color_mut(&mut self, id: ColorId) -> &mut Rgba {
        self.colors.get_mut(id.0)
    }

    pub fn light(&self, id: LightId) -> &LightEntry {
        self.lights.get(id.0)
    }

    pub fn light_mut(&mut self, id: LightId) -> &mut LightEntry {
        self.lights.get_mut(id.0)
    }

    pub fn lights(&self) -> &[LightEntry] {
        self.lights.live()
    }

    // ============ Statistics ============

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.coords.len() / COORDS_PER_VERTEX
    }

    pub fn primitive_capacity(&self) -> usize {
        self.primitives.capacity()
    }

    pub fn vertex_capacity(&self) -> usize {
        self.coords.capacity() / COORDS_PER_VERTEX
    }

    pub fn color_capacity(&self) -> usize {
        self.colors.capacity()
    }

    pub fn light_capacity(&self) -> usize {
        self.lights.capacity()
    }
}
