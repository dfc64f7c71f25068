//! Rest-position strategies for the particle field.

use std::f32::consts::TAU;
use std::sync::Arc;

use cgmath::Vector2;
use rand::Rng;

use crate::config::PlacementConfig;
use crate::mask::AlphaMask;

pub enum Placement {
    Text {
        mask: Arc<AlphaMask>,
        threshold: u8,
        attempts: u32,
    },
    Ring {
        center: Vector2<f32>,
        radius: f32,
        orbit_speed: f32,
    },
}

impl Placement {
    pub fn from_config(
        config: &PlacementConfig,
        mask: Arc<AlphaMask>,
        threshold: u8,
        attempts: u32,
        width: f32,
        height: f32,
    ) -> Self {
        match *config {
            PlacementConfig::Text => Placement::Text {
                mask,
                threshold,
                attempts,
            },
            PlacementConfig::Ring {
                radius_fraction,
                orbit_speed,
            } => Placement::Ring {
                center: Vector2::new(width / 2.0, height / 2.0),
                radius: width.min(height) * radius_fraction,
                orbit_speed,
            },
        }
    }

    /// Picks a spawn point for `slot` of `count` at time `time`.
    ///
    /// Text placement returns `None` when every attempt missed the mask.
    pub fn spawn_point<R: Rng>(
        &self,
        slot: usize,
        count: usize,
        time: f32,
        rng: &mut R,
    ) -> Option<Vector2<f32>> {
        match self {
            Placement::Text {
                mask,
                threshold,
                attempts,
            } => {
                if mask.width() == 0 || mask.height() == 0 {
                    return None;
                }
                (0..*attempts).find_map(|_| {
                    let x = rng.gen_range(0..mask.width());
                    let y = rng.gen_range(0..mask.height());
                    mask.is_covered(x, y, *threshold)
                        .then(|| Vector2::new(x as f32, y as f32))
                })
            }
            Placement::Ring { .. } => self.moving_rest(slot, count, time),
        }
    }

    pub fn moving_rest(&self, slot: usize, count: usize, time: f32) -> Option<Vector2<f32>> {
        match *self {
            Placement::Text { .. } => None,
            Placement::Ring {
                center,
                radius,
                orbit_speed,
            } => {
                let angle = time * orbit_speed + slot as f32 / count.max(1) as f32 * TAU;
                Some(center + Vector2::new(angle.cos(), angle.sin()) * radius)
            }
        }
    }

    /// Whether `point` is a position this placement could have produced for
    /// `slot` at `time`.
    pub fn contains(&self, point: Vector2<f32>, slot: usize, count: usize, time: f32) -> bool {
        match self {
            Placement::Text {
                mask, threshold, ..
            } => {
                point.x >= 0.0
                    && point.y >= 0.0
                    && point.x.fract() == 0.0
                    && point.y.fract() == 0.0
                    && mask.is_covered(point.x as usize, point.y as usize, *threshold)
            }
            Placement::Ring { .. } => self
                .moving_rest(slot, count, time)
                .is_some_and(|rest| (rest.x - point.x).abs() < 1e-3 && (rest.y - point.y).abs() < 1e-3),
        }
    }
}
