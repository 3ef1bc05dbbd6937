use std::ops::Range;

use crate::visual::{
    canvas::Canvas,
    palette::bin_color,
    styles::{level, FrameParams},
};

/// Share of each slot left empty between neighbouring bars.
const GAP_FRACTION: f32 = 0.2;
const MAX_CORNER_RADIUS: f32 = 4.0;

/// One rounded bar per bin, bottom-aligned, height proportional to the
/// bin's magnitude up to `max_bar_fraction` of the surface height.
///
/// A surface narrower than the bin count gets one bar per pixel column
/// instead, each showing the loudest of the adjacent bins it covers.
pub fn draw(canvas: &mut Canvas, snapshot: &[u8], frame: &FrameParams) {
    let count = snapshot.len();
    let bars = count.min(canvas.width() as usize);
    if bars == 0 {
        return;
    }
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let max_height = height * frame.config.max_bar_fraction;

    let slot = width / bars as f32;
    let gap = if slot >= 2.0 { slot * GAP_FRACTION } else { 0.0 };
    let bar_width = slot - gap;
    let radius = (bar_width / 2.0).min(MAX_CORNER_RADIUS);

    for bar in 0..bars {
        let bins = bin_group(bar, bars, count);
        let value = snapshot[bins.clone()].iter().copied().max().unwrap_or(0);
        let bar_height = level(value) * max_height;
        if bar_height <= 0.0 {
            continue;
        }
        let x = bar as f32 * slot + gap / 2.0;
        let y = height - bar_height;

        let color = bin_color(bins.start, count).rotate_hue(frame.hue_offset);
        let top = color;
        let bottom = color.darken(0.35);
        canvas.fill_rounded_rect_gradient(x, y, bar_width, bar_height, radius, top, bottom);
    }
}

/// Bins shown by bar `bar` of `bars`. Groups tile `0..count` without gaps.
fn bin_group(bar: usize, bars: usize, count: usize) -> Range<usize> {
    (bar * count / bars)..((bar + 1) * count / bars)
}

/// Height in pixels of the bar drawn for `value`.
pub fn bar_height(value: u8, canvas_height: u32, max_fraction: f32) -> f32 {
    level(value) * canvas_height as f32 * max_fraction
}
