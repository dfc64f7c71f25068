use cgmath::Vector2;
use rand::Rng;

use crate::canvas::{Canvas, Rgba};
use crate::config::TrailConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailParticle {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub size: f32,
    pub opacity: f32,
}

pub struct TrailField {
    particles: Vec<TrailParticle>,
    fade: f32,
    color: Rgba,
}

impl TrailField {
    pub fn new(config: &TrailConfig) -> Self {
        Self {
            particles: Vec::new(),
            fade: config.fade,
            color: config.color,
        }
    }

    /// Emits one spark at `at`.
    pub fn emit<R: Rng>(&mut self, at: Vector2<f32>, rng: &mut R) {
        self.particles.push(TrailParticle {
            position: at,
            velocity: Vector2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            size: rng.gen_range(1.0..4.0),
            opacity: 1.0,
        });
    }

    /// Moves and fades every spark, dropping the ones that have faded out.
    pub fn update(&mut self) {
        let fade = self.fade;
        self.particles.retain_mut(|p| {
            p.position += p.velocity;
            p.opacity -= fade;
            p.opacity > 0.0
        });
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        for p in &self.particles {
            canvas.fill_circle(
                p.position.x,
                p.position.y,
                p.size,
                self.color.with_opacity(p.opacity),
            );
        }
    }

    pub fn particles(&self) -> &[TrailParticle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Nothing left to animate.
    pub fn is_idle(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sparks_fade_out_and_the_trail_goes_idle() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut trail = TrailField::new(&TrailConfig::default());
        assert!(trail.is_idle());

        for i in 0..10 {
            trail.emit(Vector2::new(i as f32, 0.0), &mut rng);
        }
        assert_eq!(trail.len(), 10);

        trail.update();
        assert_eq!(trail.len(), 10);
        assert!(trail.particles().iter().all(|p| p.opacity < 1.0));

        // 1.0 / 0.02 frames, plus slack for float accumulation.
        for _ in 0..55 {
            trail.update();
        }
        assert!(trail.is_idle());
    }

    #[test]
    fn opacity_only_ever_decreases() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut trail = TrailField::new(&TrailConfig::default());
        trail.emit(Vector2::new(10.0, 10.0), &mut rng);
        let mut last = 1.0;
        while !trail.is_idle() {
            trail.update();
            if let Some(p) = trail.particles().first() {
                assert!(p.opacity < last);
                assert!(p.size >= 1.0 && p.size < 4.0);
                last = p.opacity;
            }
        }
    }
}
