//! The raster surface draw styles paint on.
//!
//! A thin layer of 2-D primitives over an `image::RgbaImage`. Everything is
//! clipped to the image, so callers may pass coordinates outside it freely.
//! Pixel centers sit at `(x + 0.5, y + 0.5)`.

use image::{Rgba, RgbaImage};

use crate::visual::{palette::Color, Viewport};

pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.viewport().is_empty()
    }

    /// Reallocate for a new size. Content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width() != width || self.height() != height {
            self.image = RgbaImage::new(width, height);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width() && y < self.height() {
            Some(self.image.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: Color) {
        let px = Rgba([color.r, color.g, color.b, 255]);
        for pixel in self.image.pixels_mut() {
            *pixel = px;
        }
    }

    /// Blend the whole surface toward `color` by `amount` (a translucent wash).
    pub fn fade(&mut self, color: Color, amount: f32) {
        let a = amount.clamp(0.0, 1.0);
        for pixel in self.image.pixels_mut() {
            blend_into(pixel, color, a);
        }
    }

    /// Alpha-blend `color` over one pixel, scaled by `coverage`.
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        let alpha = (color.a * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        blend_into(self.image.get_pixel_mut(x as u32, y as u32), color, alpha);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let (x0, x1) = self.span_x(x, x + w);
        let (y0, y1) = self.span_y(y, y + h);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    /// Rectangle with rounded corners filled with a vertical gradient running
    /// from `top` at its top edge to `bottom` at its bottom edge.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_rounded_rect_gradient(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        top: Color,
        bottom: Color,
    ) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let r = radius.clamp(0.0, w.min(h) / 2.0);
        let (y0, y1) = self.span_y(y, y + h);
        for py in y0..y1 {
            let cy = py as f32 + 0.5;
            let t = (cy - y) / h;
            let color = top.lerp(bottom, t);

            // Horizontal inset produced by the corner arcs on this row
            let from_edge = (cy - y).min(y + h - cy);
            let inset = if from_edge < r {
                let dy = r - from_edge;
                r - (r * r - dy * dy).max(0.0).sqrt()
            } else {
                0.0
            };

            let (x0, x1) = self.span_x(x + inset, x + w - inset);
            for px in x0..x1 {
                self.blend(px, py, color, 1.0);
            }
        }
    }

    /// Filled disc with a one-pixel soft edge.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let (x0, x1) = self.span_x(cx - radius - 1.0, cx + radius + 1.0);
        let (y0, y1) = self.span_y(cy - radius - 1.0, cy + radius + 1.0);
        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let dy = py as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, color, coverage);
                }
            }
        }
    }

    /// Straight line stepped one pixel at a time along its major axis.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color, width: f32) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let half = width / 2.0;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + dx * t;
            let y = y0 + dy * t;
            if half <= 0.75 {
                self.blend(x.floor() as i32, y.floor() as i32, color, 1.0);
            } else {
                self.fill_circle(x, y, half, color);
            }
        }
    }

    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], color: Color, width: f32) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            self.draw_line(a.0, a.1, b.0, b.1, color, width);
        }
    }

    /// Fill everything below a polyline (x ascending) down to the bottom
    /// edge, with a vertical gradient spanning the full surface height.
    pub fn fill_under_curve(&mut self, points: &[(f32, f32)], top: Color, bottom: Color) {
        if points.len() < 2 {
            return;
        }
        let height = self.height() as f32;
        let mut segment = 0;
        for px in 0..self.width() as i32 {
            let cx = px as f32 + 0.5;
            if cx < points[0].0 || cx > points[points.len() - 1].0 {
                continue;
            }
            while segment + 2 < points.len() && cx > points[segment + 1].0 {
                segment += 1;
            }
            let (ax, ay) = points[segment];
            let (bx, by) = points[segment + 1];
            let t = if bx > ax { (cx - ax) / (bx - ax) } else { 0.0 };
            let curve_y = ay + (by - ay) * t;

            let (y0, y1) = self.span_y(curve_y, height);
            for py in y0..y1 {
                let color = top.lerp(bottom, (py as f32 + 0.5) / height);
                self.blend(px, py, color, 1.0);
            }
        }
    }

    /// Pixel columns whose centers fall in `[from, to)`, clipped.
    fn span_x(&self, from: f32, to: f32) -> (i32, i32) {
        clip_span(from, to, self.width())
    }

    fn span_y(&self, from: f32, to: f32) -> (i32, i32) {
        clip_span(from, to, self.height())
    }
}

fn clip_span(from: f32, to: f32, limit: u32) -> (i32, i32) {
    if !(from.is_finite() && to.is_finite()) {
        return (0, 0);
    }
    let start = (from - 0.5).ceil().max(0.0) as i32;
    let end = ((to - 0.5).ceil().max(0.0) as i32).min(limit as i32);
    (start.min(end), end)
}

#[inline]
fn blend_into(pixel: &mut Rgba<u8>, color: Color, alpha: f32) {
    let mix = |dst: u8, src: u8| (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8;
    pixel.0 = [
        mix(pixel.0[0], color.r),
        mix(pixel.0[1], color.g),
        mix(pixel.0[2], color.b),
        255,
    ];
}
