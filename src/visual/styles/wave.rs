use crate::visual::{
    canvas::Canvas,
    palette::{bin_color, Color},
    styles::{level, FrameParams},
};

/// Largest displacement from the center line, as a fraction of height.
const AMPLITUDE_FRACTION: f32 = 0.4;

/// A single undulating line across the surface. Each bin displaces its point
/// by `magnitude * sin(i * wave_step + phase)`; the area beneath is filled
/// with a gradient and the line itself stroked on top.
pub fn draw(canvas: &mut Canvas, snapshot: &[u8], frame: &FrameParams) {
    let points = curve(
        snapshot,
        canvas.width() as f32,
        canvas.height() as f32,
        frame.config.wave_step,
        frame.phase,
    );
    if points.len() < 2 {
        return;
    }

    let first = bin_color(0, snapshot.len()).rotate_hue(frame.hue_offset);
    let last = bin_color(snapshot.len() - 1, snapshot.len()).rotate_hue(frame.hue_offset);
    canvas.fill_under_curve(&points, first.with_alpha(0.55), last.with_alpha(0.1));
    canvas.stroke_polyline(&points, Color::rgb(0xf5, 0xf6, 0xfa), 2.0);
}

/// Curve points for a snapshot, x ascending from 0 to `width`.
pub fn curve(snapshot: &[u8], width: f32, height: f32, step: f32, phase: f32) -> Vec<(f32, f32)> {
    let count = snapshot.len();
    if count == 0 {
        return Vec::new();
    }
    let spacing = if count > 1 { width / (count - 1) as f32 } else { 0.0 };
    let center = height / 2.0;
    let amplitude = height * AMPLITUDE_FRACTION;

    snapshot
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let displacement = level(value) * amplitude * (i as f32 * step + phase).sin();
            (i as f32 * spacing, center - displacement)
        })
        .collect()
}
