use std::path::Path;

use super::framebuffer::FrameBuffer;
use super::rasterizer;
use crate::backend::DrawBackend;
use crate::color::Rgba;
use crate::math::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Edge length of the square drawn for each point.
    pub point_size: u32,
    /// Stroke polygon edges in `outline_color` after filling.
    pub outline_polygons: bool,
    pub outline_color: Rgba,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            point_size: 3,
            outline_polygons: false,
            outline_color: Rgba::BLACK,
        }
    }
}

/// Software raster backend drawing into an owned [`FrameBuffer`].
pub struct RasterBackend {
    framebuffer: FrameBuffer,
    options: RasterOptions,
    frames_presented: u64,
    outline: Vec<Vec2>,
}

impl RasterBackend {
    pub fn new(width: u32, height: u32, options: RasterOptions) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height),
            options,
            frames_presented: 0,
            outline: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer.resize(width, height);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn options(&self) -> &RasterOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: RasterOptions) {
        self.options = options;
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn to_image(&self) -> image::RgbaImage {
        self.framebuffer.to_image()
    }

    /// Writes the last presented frame as an image file; the format follows
    /// the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        let path = path.as_ref();
        self.to_image().save(path)?;
        log::info!(
            "wrote {}x{} frame to {}",
            self.framebuffer.width(),
            self.framebuffer.height(),
            path.display()
        );
        Ok(())
    }
}

impl DrawBackend for RasterBackend {
    fn clear(&mut self, background: Rgba) {
        self.framebuffer.clear(background.to_argb());
    }

    fn draw_polygon(&mut self, color: Rgba, points: &[Vec2]) {
        rasterizer::fill_polygon(&mut self.framebuffer, points, color);
        if self.options.outline_polygons && !points.is_empty() {
            self.outline.clear();
            self.outline.extend_from_slice(points);
            self.outline.push(points[0]);
            rasterizer::draw_polyline(&mut self.framebuffer, &self.outline, self.options.outline_color);
        }
    }

    fn draw_line(&mut self, color: Rgba, points: &[Vec2]) {
        rasterizer::draw_polyline(&mut self.framebuffer, points, color);
    }

    fn draw_point(&mut self, color: Rgba, points: &[Vec2]) {
        rasterizer::draw_dots(&mut self.framebuffer, points, self.options.point_size, color);
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_draws_cover_earlier_ones() {
        let mut raster = RasterBackend::new(10, 10, RasterOptions::default());
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        raster.clear(Rgba::BLACK);
        raster.draw_polygon(Rgba::rgb(1.0, 0.0, 0.0), &square);
        raster.draw_polygon(Rgba::rgb(0.0, 0.0, 1.0), &square);
        raster.present();

        assert_eq!(
            raster.framebuffer().get_pixel(5, 5),
            Some(Rgba::rgb(0.0, 0.0, 1.0).to_argb())
        );
        assert_eq!(raster.frames_presented(), 1);
    }

    #[test]
    fn outline_strokes_polygon_edges() {
        let options = RasterOptions {
            outline_polygons: true,
            outline_color: Rgba::WHITE,
            ..RasterOptions::default()
        };
        let mut raster = RasterBackend::new(10, 10, options);
        raster.clear(Rgba::BLACK);
        raster.draw_polygon(
            Rgba::rgb(1.0, 0.0, 0.0),
            &[
                Vec2::new(1.0, 1.0),
                Vec2::new(8.0, 1.0),
                Vec2::new(8.0, 8.0),
                Vec2::new(1.0, 8.0),
            ],
        );
        let fb = raster.framebuffer();
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::WHITE.to_argb()));
        assert_eq!(fb.get_pixel(1, 5), Some(Rgba::WHITE.to_argb()));
        assert_eq!(fb.get_pixel(4, 4), Some(Rgba::rgb(1.0, 0.0, 0.0).to_argb()));
    }

    #[test]
    fn clear_sets_background() {
        let mut raster = RasterBackend::new(3, 3, RasterOptions::default());
        raster.clear(Rgba::WHITE);
        let img = raster.to_image();
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
