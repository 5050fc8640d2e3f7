//! Advected particles and their lifecycle.
//!
//! A particle never dies in the usual sense. When it outlives its budget or
//! drifts out of the margined view box it is reseeded in place: new position
//! inside the current view window, fresh lifetime, age zero.
//!
//! | State | Event | Result |
//! |-------|-------|--------|
//! | `age <= life`, inside box | advance | moved, `age += 1` |
//! | `age > life` after increment | advance | reseeded, move discarded |
//! | outside margined box | advance | reseeded |

use crate::canvas::{Canvas, Color};
use crate::field::VectorField;
use crate::viewport::{Bounds, ViewTransform};
use glam::Vec2;
use rand::Rng;
use std::ops::Range;

/// Lifetime budget in frames, sampled uniformly per (re)seed.
pub const LIFE_RANGE: Range<u32> = 50..250;

/// Integration step per frame before the speed multiplier.
pub const BASE_STEP: f32 = 0.01;

/// Screen radius of a drawn particle.
pub const PARTICLE_RADIUS: f32 = 1.2;

/// Fill used when speed colouring is off.
pub const PLAIN_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.8);

/// Map flow speed to a particle colour: fast is red, slow is blue.
pub fn speed_color(speed: f32) -> Color {
    let hue = (240.0 - speed * 40.0).max(0.0);
    Color::hsla(hue, 0.8, 0.6, 0.8)
}

/// A single advected tracer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World position.
    pub position: Vec2,
    /// Frames since the last (re)seed.
    pub age: u32,
    /// Frames this particle may live before reseeding.
    pub life: u32,
}

impl Particle {
    /// Create a particle seeded inside the view window.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, view: &ViewTransform) -> Self {
        let mut p = Self {
            position: Vec2::ZERO,
            age: 0,
            life: 0,
        };
        p.reset(rng, view);
        p
    }

    /// Reseed in place: uniform position over the visible window, new life.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, view: &ViewTransform) {
        let extent = view.world_extent();
        let jitter = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5);
        self.position = view.center + jitter * extent;
        self.life = rng.gen_range(LIFE_RANGE);
        self.age = 0;
    }

    /// Advance one frame with explicit Euler.
    ///
    /// Returns `true` when the particle was reseeded.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        field: &VectorField,
        step: f32,
        view: &ViewTransform,
        rng: &mut R,
    ) -> bool {
        let velocity = field.at(self.position);
        let next = self.position + velocity * step;

        self.age += 1;
        if self.age > self.life {
            self.reset(rng, view);
            return true;
        }

        self.position = next;
        if !view.contains_margined(self.position) {
            self.reset(rng, view);
            return true;
        }
        false
    }

    /// Colour for this particle under the given field.
    pub fn color(&self, field: &VectorField, color_by_speed: bool) -> Color {
        if color_by_speed {
            speed_color(field.speed(self.position))
        } else {
            PLAIN_COLOR
        }
    }

    /// Draw as a small filled circle.
    pub fn draw(&self, field: &VectorField, view: &ViewTransform, color_by_speed: bool, canvas: &mut impl Canvas) {
        let screen = view.world_to_screen(self.position);
        canvas.fill_circle(screen, PARTICLE_RADIUS, self.color(field, color_by_speed));
    }
}

/// The ordered particle collection.
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` freshly seeded particles.
    pub fn with_count<R: Rng + ?Sized>(count: usize, rng: &mut R, view: &ViewTransform) -> Self {
        let mut set = Self::new();
        set.resize(count, rng, view);
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Grow by appending new particles or shrink by truncation.
    ///
    /// Surviving particles keep their state untouched.
    pub fn resize<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R, view: &ViewTransform) {
        if count > self.particles.len() {
            let missing = count - self.particles.len();
            self.particles.reserve(missing);
            for _ in 0..missing {
                self.particles.push(Particle::spawn(rng, view));
            }
        } else {
            self.particles.truncate(count);
        }
    }

    /// Reseed every particle in place.
    pub fn reset_all<R: Rng + ?Sized>(&mut self, rng: &mut R, view: &ViewTransform) {
        for p in &mut self.particles {
            p.reset(rng, view);
        }
    }

    /// Advance every particle once. Returns how many were reseeded.
    pub fn advance_all<R: Rng + ?Sized>(
        &mut self,
        field: &VectorField,
        step: f32,
        view: &ViewTransform,
        rng: &mut R,
    ) -> usize {
        let mut reseeded = 0;
        for p in &mut self.particles {
            if p.advance(field, step, view, rng) {
                reseeded += 1;
            }
        }
        reseeded
    }

    pub fn draw_all(&self, field: &VectorField, view: &ViewTransform, color_by_speed: bool, canvas: &mut impl Canvas) {
        for p in &self.particles {
            p.draw(field, view, color_by_speed, canvas);
        }
    }

    /// World bounding box of all particles.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.particles.iter().map(|p| p.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn view() -> ViewTransform {
        ViewTransform {
            size: Vec2::new(800.0, 600.0),
            center: Vec2::new(0.5, -0.25),
            scale: 100.0,
        }
    }

    #[test]
    fn test_spawn_inside_visible_window() {
        let mut rng = SmallRng::seed_from_u64(1);
        let v = view();
        for _ in 0..1000 {
            let p = Particle::spawn(&mut rng, &v);
            let offset = (p.position - v.center).abs();
            assert!(offset.x <= 4.0 && offset.y <= 3.0);
            assert!(LIFE_RANGE.contains(&p.life));
            assert_eq!(p.age, 0);
        }
    }

    #[test]
    fn test_euler_step() {
        let mut rng = SmallRng::seed_from_u64(2);
        let v = view();
        let field = VectorField::standard(0.6);
        let mut p = Particle {
            position: Vec2::new(1.0, 0.0),
            age: 0,
            life: 100,
        };
        let reseeded = p.advance(&field, BASE_STEP * 3.0, &v, &mut rng);
        assert!(!reseeded);
        assert_eq!(p.age, 1);
        assert!((p.position - Vec2::new(1.0, -0.03)).length() < 1e-6);
    }

    #[test]
    fn test_expired_particle_reseeds() {
        let mut rng = SmallRng::seed_from_u64(3);
        let v = view();
        let field = VectorField::standard(0.6);
        let mut p = Particle {
            position: Vec2::new(1.0, 0.0),
            age: 80,
            life: 80,
        };
        assert!(p.advance(&field, 0.03, &v, &mut rng));
        assert_eq!(p.age, 0);
        assert!(v.contains_margined(p.position));
    }

    #[test]
    fn test_escaped_particle_reseeds() {
        let mut rng = SmallRng::seed_from_u64(4);
        let v = view();
        let field = VectorField::standard(0.0);
        let mut p = Particle {
            position: Vec2::new(5.2, 0.0),
            age: 0,
            life: 200,
        };
        // x stays at 5.2, inside the margined range [-4.3, 5.3]
        assert!(!p.advance(&field, 0.03, &v, &mut rng));

        p.position = Vec2::new(50.0, 0.0);
        assert!(p.advance(&field, 0.03, &v, &mut rng));
        assert_eq!(p.age, 0);
        assert!(v.contains_margined(p.position));
    }

    #[test]
    fn test_speed_color_hue() {
        assert_eq!(speed_color(0.0), Color::hsla(240.0, 0.8, 0.6, 0.8));
        assert_eq!(speed_color(100.0), Color::hsla(0.0, 0.8, 0.6, 0.8));
    }

    #[test]
    fn test_resize_keeps_prefix() {
        let mut rng = SmallRng::seed_from_u64(5);
        let v = view();
        let mut set = ParticleSet::with_count(10, &mut rng, &v);
        let before: Vec<Particle> = set.as_slice().to_vec();

        set.resize(25, &mut rng, &v);
        assert_eq!(set.len(), 25);
        assert_eq!(&set.as_slice()[..10], &before[..]);

        set.resize(4, &mut rng, &v);
        assert_eq!(set.len(), 4);
        assert_eq!(set.as_slice(), &before[..4]);
    }

    #[test]
    fn test_bounds_of_empty_set() {
        assert!(ParticleSet::new().bounds().is_none());
    }
}
