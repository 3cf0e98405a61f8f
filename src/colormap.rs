//! Scalar-to-color mapping for value-carrying vertex lists.

use crate::color::Rgba;

/// Maps a scalar in `[min, max]` onto evenly spaced color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    min: f32,
    max: f32,
    stops: Vec<Rgba>,
}

impl Default for ColorMap {
    /// Blue-to-red ramp over [0, 1].
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            stops: vec![Rgba::rgb(0.0, 0.0, 1.0), Rgba::rgb(1.0, 0.0, 0.0)],
        }
    }
}

impl ColorMap {
    /// Builds a map. A degenerate range (`max <= min`) or an empty stop list
    /// is reported here; such a map yields its first stop for every value.
    pub fn new(min: f32, max: f32, stops: Vec<Rgba>) -> Self {
        let stops = if stops.is_empty() {
            log::warn!("color map built without stops, using white");
            vec![Rgba::WHITE]
        } else {
            stops
        };
        if !(max > min) {
            log::warn!("degenerate color map range [{}, {}]", min, max);
        }
        Self { min, max, stops }
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }

    pub fn map(&self, value: f32) -> Rgba {
        if self.is_degenerate() || self.stops.len() == 1 || !value.is_finite() {
            return self.stops[0];
        }

        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let segments = (self.stops.len() - 1) as f32;
        let position = t * segments;
        let index = (position.floor() as usize).min(self.stops.len() - 2);
        let local = position - index as f32;
        self.stops[index].lerp(self.stops[index + 1], local)
    }
}
