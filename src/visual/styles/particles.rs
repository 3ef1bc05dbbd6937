use crate::visual::{canvas::Canvas, particles::ParticleField};

/// Line width of particle links.
const LINK_WIDTH: f32 = 1.0;

/// Mean snapshot level scaled by `scale` and clamped to [0, 1].
pub fn intensity(snapshot: &[u8], scale: f32) -> f32 {
    if snapshot.is_empty() {
        return 0.0;
    }
    let sum: u32 = snapshot.iter().map(|&v| v as u32).sum();
    let mean = sum as f32 / snapshot.len() as f32;
    (mean / 255.0 * scale).clamp(0.0, 1.0)
}

/// Link threshold in pixels at the given intensity.
pub fn link_threshold(field: &ParticleField, intensity: f32) -> f32 {
    field.params().link_distance * (1.0 + intensity)
}

/// Opacity of a link between two particles `distance` apart; zero at or
/// beyond `threshold`.
pub fn link_opacity(distance: f32, threshold: f32, intensity: f32) -> f32 {
    if threshold <= 0.0 || distance >= threshold {
        return 0.0;
    }
    (1.0 - distance / threshold) * (0.15 + 0.85 * intensity.clamp(0.0, 1.0))
}

/// Draw the (already stepped) field: links between close pairs first, then
/// the particles themselves.
pub fn draw(canvas: &mut Canvas, field: &ParticleField, intensity: f32) {
    let threshold = link_threshold(field, intensity);
    let particles = field.particles();

    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let distance = a.position.distance(b.position);
            let opacity = link_opacity(distance, threshold, intensity);
            if opacity > 0.0 {
                let color = a.color.lerp(b.color, 0.5).with_alpha(opacity);
                canvas.draw_line(
                    a.position.x,
                    a.position.y,
                    b.position.x,
                    b.position.y,
                    color,
                    LINK_WIDTH,
                );
            }
        }
    }

    let alpha = 0.4 + 0.6 * intensity.clamp(0.0, 1.0);
    for particle in particles {
        let radius = field.draw_radius(particle, intensity);
        canvas.fill_circle(
            particle.position.x,
            particle.position.y,
            radius,
            particle.color.with_alpha(alpha),
        );
    }
}
