//! Flat-color scan conversion of polygons, polylines and points.
//!
//! Polygons are convex by contract; they are split into a triangle fan and
//! each triangle is filled scanline by scanline using flat-top/flat-bottom
//! decomposition:
//!
//! ```text
//!        v0                   v0
//!        /\                   /\
//!       /  \                 /  \
//!      /    \       =>      /----\<- split at v1.y
//!     /      \             v1   split
//!    /________\             \    /
//!   v1        v2             \  /
//!                             \/
//!                             v2
//! ```

use std::ops::Range;

use super::framebuffer::FrameBuffer;
use crate::color::Rgba;
use crate::math::vec2::Vec2;

/// Fills a convex polygon as a fan around its first vertex.
pub fn fill_polygon(buffer: &mut FrameBuffer, points: &[Vec2], color: Rgba) {
    if points.len() < 3 {
        return;
    }
    let apex = points[0];
    for pair in points[1..].windows(2) {
        fill_triangle(buffer, [apex, pair[0], pair[1]], color);
    }
}

pub fn fill_triangle(buffer: &mut FrameBuffer, points: [Vec2; 3], color: Rgba) {
    let [mut v0, mut v1, mut v2] = points;

    // Sort by y, top to bottom.
    if v1.y < v0.y {
        std::mem::swap(&mut v0, &mut v1);
    }
    if v2.y < v1.y {
        std::mem::swap(&mut v1, &mut v2);
    }
    if v1.y < v0.y {
        std::mem::swap(&mut v0, &mut v1);
    }

    if (v2.y - v0.y).abs() < f32::EPSILON {
        return;
    }
    if (v1.y - v2.y).abs() < f32::EPSILON {
        fill_flat_bottom(buffer, v0, v1, v2, color);
        return;
    }
    if (v0.y - v1.y).abs() < f32::EPSILON {
        fill_flat_top(buffer, v0, v1, v2, color);
        return;
    }

    let t = (v1.y - v0.y) / (v2.y - v0.y);
    let split = Vec2::new(v0.x + (v2.x - v0.x) * t, v1.y);
    fill_flat_bottom(buffer, v0, v1, split, color);
    fill_flat_top(buffer, v1, split, v2, color);
}

/// `v1` and `v2` share a y below the apex `v0`.
fn fill_flat_bottom(buffer: &mut FrameBuffer, v0: Vec2, v1: Vec2, v2: Vec2, color: Rgba) {
    let height = v1.y - v0.y;
    if height.abs() < f32::EPSILON {
        return;
    }
    let inv_slope_1 = (v1.x - v0.x) / height;
    let inv_slope_2 = (v2.x - v0.x) / height;

    // Bottom row is left to the flat-top half sharing it.
    for y in row_range(buffer, v0.y, v1.y) {
        let dy = y as f32 - v0.y;
        fill_span(
            buffer,
            y,
            v0.x + inv_slope_1 * dy,
            v0.x + inv_slope_2 * dy,
            color,
        );
    }
}

/// `v0` and `v1` share a y above the apex `v2`.
fn fill_flat_top(buffer: &mut FrameBuffer, v0: Vec2, v1: Vec2, v2: Vec2, color: Rgba) {
    let height = v2.y - v0.y;
    if height.abs() < f32::EPSILON {
        return;
    }
    let inv_slope_1 = (v2.x - v0.x) / height;
    let inv_slope_2 = (v2.x - v1.x) / height;

    for y in row_range(buffer, v0.y, v2.y) {
        let dy = y as f32 - v0.y;
        fill_span(
            buffer,
            y,
            v0.x + inv_slope_1 * dy,
            v1.x + inv_slope_2 * dy,
            color,
        );
    }
}

/// Rows `ceil(top)..ceil(bottom)` that fall inside the buffer.
fn row_range(buffer: &FrameBuffer, top: f32, bottom: f32) -> Range<i32> {
    let first = top.ceil().max(0.0);
    let last = bottom.ceil().min(buffer.height() as f32);
    first as i32..last as i32
}

#[inline]
fn fill_span(buffer: &mut FrameBuffer, y: i32, xa: f32, xb: f32, color: Rgba) {
    let (left, right) = if xa < xb { (xa, xb) } else { (xb, xa) };
    let first = left.ceil().max(0.0) as i32;
    let last = right.ceil().min(buffer.width() as f32) as i32;
    for x in first..last {
        buffer.blend_pixel(x, y, color);
    }
}

/// Strokes consecutive segments through `points`.
pub fn draw_polyline(buffer: &mut FrameBuffer, points: &[Vec2], color: Rgba) {
    if let [only] = points {
        buffer.blend_pixel(only.x as i32, only.y as i32, color);
        return;
    }
    for pair in points.windows(2) {
        if let Some([x0, y0, x1, y1]) = clip_segment(buffer, pair[0], pair[1]) {
            draw_line_bresenham(buffer, x0, y0, x1, y1, color);
        }
    }
}

const CLIP_SNAP: f64 = 1.0e-4;

/// Liang-Barsky clip of the segment `a`-`b` against the pixel rectangle,
/// returning integer endpoints inside it. Worked in `f64` so segments with
/// far off-screen endpoints still land on the right pixels.
fn clip_segment(buffer: &FrameBuffer, a: Vec2, b: Vec2) -> Option<[i32; 4]> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    let max_x = f64::from(buffer.width()) - 1.0;
    let max_y = f64::from(buffer.height()) - 1.0;
    let (ax, ay) = (f64::from(a.x), f64::from(a.y));
    let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);

    let mut enter = 0.0_f64;
    let mut leave = 1.0_f64;
    for (p, q) in [(-dx, ax), (dx, max_x - ax), (-dy, ay), (dy, max_y - ay)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            enter = enter.max(t);
        } else {
            leave = leave.min(t);
        }
        if enter > leave {
            return None;
        }
    }

    let pixel = |t: f64, origin: f64, delta: f64, max: f64| {
        let mut v = origin + delta * t;
        // Cut points sit on a pixel edge; keep rounding error from truncating
        // them one pixel short.
        if t > 0.0 && t < 1.0 {
            v += CLIP_SNAP;
        }
        v.clamp(0.0, max) as i32
    };
    Some([
        pixel(enter, ax, dx, max_x),
        pixel(enter, ay, dy, max_y),
        pixel(leave, ax, dx, max_x),
        pixel(leave, ay, dy, max_y),
    ])
}

/// Bresenham's line: integer stepping along the major axis, with an error
/// term deciding when to also step along the minor axis.
pub fn draw_line_bresenham(
    buffer: &mut FrameBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Rgba,
) {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let x_incr_direction = if x0 < x1 { 1 } else { -1 };
    let y_incr_direction = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        buffer.blend_pixel(x, y, color);
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += x_incr_direction;
        }
        if e2 < dx {
            err += dx;
            y += y_incr_direction;
        }
    }
}

/// Paints a `size`-pixel square centered on each point.
pub fn draw_dots(buffer: &mut FrameBuffer, points: &[Vec2], size: u32, color: Rgba) {
    let size = size.max(1) as i32;
    let half = size / 2;
    let reach = size as f32;
    let (width, height) = (buffer.width() as f32, buffer.height() as f32);
    for p in points {
        if !(p.x > -reach && p.x < width + reach && p.y > -reach && p.y < height + reach) {
            continue;
        }
        let (cx, cy) = (p.x as i32, p.y as i32);
        for dy in 0..size {
            for dx in 0..size {
                buffer.blend_pixel(cx - half + dx, cy - half + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: u32 = 0xFFFFFFFF;

    fn lit(buffer: &FrameBuffer) -> usize {
        buffer.pixels().iter().filter(|&&p| p == WHITE).count()
    }

    #[test]
    fn square_fills_its_area() {
        let mut fb = FrameBuffer::new(20, 20);
        let square = [
            Vec2::new(2.0, 2.0),
            Vec2::new(12.0, 2.0),
            Vec2::new(12.0, 12.0),
            Vec2::new(2.0, 12.0),
        ];
        fill_polygon(&mut fb, &square, Rgba::WHITE);
        assert_eq!(lit(&fb), 100);
        assert_eq!(fb.get_pixel(7, 7), Some(WHITE));
        assert_eq!(fb.get_pixel(12, 12), Some(Rgba::BLACK.to_argb()));
    }

    #[test]
    fn general_triangle_is_split_without_gaps() {
        let mut fb = FrameBuffer::new(32, 32);
        fill_triangle(
            &mut fb,
            [Vec2::new(16.0, 0.0), Vec2::new(0.0, 20.0), Vec2::new(30.0, 30.0)],
            Rgba::WHITE,
        );
        // Every row between the top and bottom vertex has some coverage.
        for y in 1..29 {
            assert!((0..32).any(|x| fb.get_pixel(x, y) == Some(WHITE)), "row {}", y);
        }
    }

    #[test]
    fn zero_height_triangle_draws_nothing() {
        let mut fb = FrameBuffer::new(8, 8);
        fill_triangle(
            &mut fb,
            [Vec2::new(0.0, 3.0), Vec2::new(4.0, 3.0), Vec2::new(7.0, 3.0)],
            Rgba::WHITE,
        );
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn horizontal_line_covers_both_endpoints() {
        let mut fb = FrameBuffer::new(10, 3);
        draw_polyline(&mut fb, &[Vec2::new(1.0, 1.0), Vec2::new(8.0, 1.0)], Rgba::WHITE);
        assert_eq!(lit(&fb), 8);
    }

    #[test]
    fn diagonal_line_steps_both_axes() {
        let mut fb = FrameBuffer::new(5, 5);
        draw_line_bresenham(&mut fb, 4, 4, 0, 0, Rgba::WHITE);
        for i in 0..5 {
            assert_eq!(fb.get_pixel(i, i), Some(WHITE));
        }
    }

    #[test]
    fn dots_are_squares() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_dots(&mut fb, &[Vec2::new(5.0, 5.0)], 3, Rgba::WHITE);
        assert_eq!(lit(&fb), 9);
        assert_eq!(fb.get_pixel(4, 4), Some(WHITE));
        assert_eq!(fb.get_pixel(6, 6), Some(WHITE));
    }

    #[test]
    fn far_off_screen_line_is_clipped_to_buffer() {
        let mut fb = FrameBuffer::new(20, 10);
        draw_polyline(
            &mut fb,
            &[Vec2::new(-1.0e9, 5.0), Vec2::new(1.0e9, 5.0)],
            Rgba::WHITE,
        );
        assert_eq!(lit(&fb), 20);
        assert!((0..20).all(|x| fb.get_pixel(x, 5) == Some(WHITE)));
    }

    #[test]
    fn line_missing_buffer_draws_nothing() {
        let mut fb = FrameBuffer::new(20, 10);
        draw_polyline(
            &mut fb,
            &[Vec2::new(-1.0e9, -3.0), Vec2::new(1.0e9, -3.0)],
            Rgba::WHITE,
        );
        draw_polyline(
            &mut fb,
            &[Vec2::new(f32::MAX, 0.0), Vec2::new(f32::MAX, 9.0)],
            Rgba::WHITE,
        );
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn diagonal_line_entering_buffer_keeps_its_slope() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_polyline(
            &mut fb,
            &[Vec2::new(-1.0e6, -1.0e6), Vec2::new(1.0e6, 1.0e6)],
            Rgba::WHITE,
        );
        for i in 0..10 {
            assert_eq!(fb.get_pixel(i, i), Some(WHITE), "pixel {}", i);
        }
        assert_eq!(lit(&fb), 10);
    }

    #[test]
    fn huge_triangle_fills_only_the_buffer() {
        let mut fb = FrameBuffer::new(10, 10);
        fill_triangle(
            &mut fb,
            [
                Vec2::new(5.0, -1.0e7),
                Vec2::new(-1.0e7, 1.0e7),
                Vec2::new(1.0e7, 1.0e7),
            ],
            Rgba::WHITE,
        );
        assert_eq!(lit(&fb), 100);
    }

    #[test]
    fn distant_dots_are_skipped() {
        let mut fb = FrameBuffer::new(10, 10);
        draw_dots(
            &mut fb,
            &[Vec2::new(f32::MAX, f32::MAX), Vec2::new(-1.0e9, 5.0)],
            3,
            Rgba::WHITE,
        );
        assert_eq!(lit(&fb), 0);
    }
}
