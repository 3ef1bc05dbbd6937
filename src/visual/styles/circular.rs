use std::f32::consts::{FRAC_PI_2, TAU};

use crate::visual::{
    canvas::Canvas,
    palette::bin_color,
    styles::{level, FrameParams},
};

/// Longest ray, as a fraction of the smaller viewport dimension.
const RAY_FRACTION: f32 = 0.4;
const RAY_WIDTH: f32 = 2.0;

/// Rays from the center, one per bin, evenly around the circle starting at
/// twelve o'clock. Each ray ends in a dot.
pub fn draw(canvas: &mut Canvas, snapshot: &[u8], frame: &FrameParams) {
    let count = snapshot.len();
    if count == 0 {
        return;
    }
    let viewport = canvas.viewport();
    let (cx, cy) = viewport.center();
    let max_length = viewport.min_dimension() * RAY_FRACTION;

    for (i, &value) in snapshot.iter().enumerate() {
        let (x, y) = ray_end(i, count, level(value) * max_length, cx, cy);
        let color = bin_color(i, count).rotate_hue(frame.hue_offset);

        canvas.draw_line(cx, cy, x, y, color.with_alpha(0.7), RAY_WIDTH);
        canvas.fill_circle(x, y, 1.5 + level(value) * 2.5, color);
    }
}

/// Endpoint of bin `index`'s ray of the given length.
pub fn ray_end(index: usize, count: usize, length: f32, cx: f32, cy: f32) -> (f32, f32) {
    let angle = index as f32 / count.max(1) as f32 * TAU - FRAC_PI_2;
    (cx + angle.cos() * length, cy + angle.sin() * length)
}
