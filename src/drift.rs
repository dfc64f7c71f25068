use cgmath::Vector2;
use rand::Rng;
use rayon::prelude::*;

use crate::canvas::{Canvas, Rgba};
use crate::config::DriftConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftParticle {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub size: f32,
    pub color: Rgba,
}

impl DriftParticle {
    fn random<R: Rng>(
        rng: &mut R,
        width: f32,
        height: f32,
        speed: Vector2<f32>,
        color: Rgba,
    ) -> Self {
        Self {
            position: Vector2::new(rng.gen_range(0.0..=width), rng.gen_range(0.0..=height)),
            velocity: Vector2::new(
                rng.gen_range(-speed.x..=speed.x),
                rng.gen_range(-speed.y..=speed.y),
            ),
            size: rng.gen_range(0.5..2.5),
            color,
        }
    }

    fn advance(&mut self, width: f32, height: f32) {
        self.position += self.velocity;
        if self.position.x < 0.0 {
            self.position.x = width;
        }
        if self.position.x > width {
            self.position.x = 0.0;
        }
        if self.position.y < 0.0 {
            self.position.y = height;
        }
        if self.position.y > height {
            self.position.y = 0.0;
        }
    }
}

pub struct DriftField {
    width: f32,
    height: f32,
    pub background: Vec<DriftParticle>,
    pub accents: Vec<DriftParticle>,
}

impl DriftField {
    pub fn seed<R: Rng>(config: &DriftConfig, width: f32, height: f32, rng: &mut R) -> Self {
        let background = (0..config.background_count)
            .map(|_| {
                let alpha = rng.gen_range(0.0..0.1);
                DriftParticle::random(
                    rng,
                    width,
                    height,
                    Vector2::new(0.75, 0.25),
                    config.color.with_opacity(alpha),
                )
            })
            .collect();
        let accents = (0..config.accent_count)
            .map(|_| {
                DriftParticle::random(
                    rng,
                    width,
                    height,
                    Vector2::new(1.5, 0.15),
                    config.color.with_opacity(0.3),
                )
            })
            .collect();

        Self {
            width,
            height,
            background,
            accents,
        }
    }

    pub fn len(&self) -> usize {
        self.background.len() + self.accents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update(&mut self) {
        let (width, height) = (self.width, self.height);
        self.background
            .par_iter_mut()
            .chain(self.accents.par_iter_mut())
            .for_each(|p| p.advance(width, height));
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        for p in self.background.iter().chain(&self.accents) {
            canvas.fill_circle(p.position.x, p.position.y, p.size, p.color);
        }
    }
}
