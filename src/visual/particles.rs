use glam::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::ParticleConfig,
    visual::{palette::Color, Viewport},
};

/*
Particle Field
==============

A fixed population of independent point masses drifting across the
viewport. The only coupling between particles and the audio is one scalar,
the intensity in [0, 1]:

  step      position += velocity * (1 + intensity * reactivity)
  wrap      leave one edge, re-enter at the opposite edge (a torus)
  draw      radius = base_radius * (1 + intensity * size_factor)

There are no forces between particles. Proximity only matters to the
renderer, which links close pairs with a line.

The population is created once, wholesale, and replaced wholesale on
regeneration. Stepping never adds or removes particles.
*/

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Color,
}

pub struct ParticleField {
    particles: Vec<Particle>,
    viewport: Viewport,
    params: ParticleConfig,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(viewport: Viewport, params: ParticleConfig) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        let mut field = Self {
            particles: Vec::with_capacity(params.count),
            viewport,
            params,
            rng,
        };
        field.regenerate(viewport);
        field
    }

    /// Replace the whole population with fresh particles for `viewport`.
    pub fn regenerate(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let width = viewport.width as f32;
        let height = viewport.height as f32;
        let params = &self.params;
        let rng = &mut self.rng;

        self.particles = (0..params.count)
            .map(|_| {
                let position = Vec2::new(
                    random_coordinate(rng, width),
                    random_coordinate(rng, height),
                );
                let velocity = Vec2::new(
                    random_between(rng, -params.speed, params.speed),
                    random_between(rng, -params.speed, params.speed),
                );
                let radius = random_between(rng, params.radius_min, params.radius_max);
                let hue = random_between(rng, params.hue_min, params.hue_max);
                Particle {
                    position,
                    velocity,
                    radius,
                    color: Color::from_hsl(hue, 0.8, 0.6),
                }
            })
            .collect();
    }

    /// Advance every particle one frame under audio intensity `intensity`.
    pub fn step(&mut self, intensity: f32) {
        if self.viewport.is_empty() {
            return;
        }
        let boost = 1.0 + intensity.clamp(0.0, 1.0) * self.params.reactivity;
        let width = self.viewport.width as f32;
        let height = self.viewport.height as f32;

        for particle in &mut self.particles {
            particle.position += particle.velocity * boost;
            particle.position.x = wrap(particle.position.x, width);
            particle.position.y = wrap(particle.position.y, height);
        }
    }

    /// Radius to draw `particle` with. The stored base radius is unchanged.
    pub fn draw_radius(&self, particle: &Particle, intensity: f32) -> f32 {
        particle.radius * (1.0 + intensity.clamp(0.0, 1.0) * self.params.size_factor)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn params(&self) -> &ParticleConfig {
        &self.params
    }
}

fn random_coordinate(rng: &mut StdRng, bound: f32) -> f32 {
    if bound > 0.0 {
        rng.gen_range(0.0..bound)
    } else {
        0.0
    }
}

/// Uniform in `[low, high]` with either bound order. Degenerate or
/// non-finite bounds give the lower finite bound, or 0.
fn random_between(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    match (low.is_finite(), high.is_finite()) {
        (true, true) if low < high => rng.gen_range(low..=high),
        (true, _) => low,
        (false, true) => high,
        (false, false) => 0.0,
    }
}

/// Toroidal wrap into `[0, bound)`. Non-finite positions restart at 0.
fn wrap(value: f32, bound: f32) -> f32 {
    let wrapped = value.rem_euclid(bound);
    if wrapped.is_finite() && wrapped < bound {
        wrapped
    } else {
        0.0
    }
}
