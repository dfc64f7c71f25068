use cgmath::prelude::*;
use cgmath::Vector2;
use rand::Rng;
use rayon::prelude::*;

pub mod canvas;
pub mod config;
pub mod drift;
pub mod error;
pub mod mask;
pub mod placement;
pub mod pointer;
pub mod schedule;
pub mod splash;
pub mod trail;

pub use canvas::{Canvas, Rgba};
pub use config::{FieldConfig, PlacementConfig, Shape, SplashConfig};
pub use error::{SplashError, SplashResult};
pub use placement::Placement;
pub use pointer::{InputResponse, PointerEvent, PointerState};
pub use schedule::{FrameHandle, FrameScheduler, ManualScheduler};
pub use splash::Splash;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector2<f32>,
    pub rest_position: Vector2<f32>,
    pub size: f32,
    pub rest_color: Rgba,
    pub displaced_color: Rgba,
    /// Frames left before the slot is respawned. Stays at zero while a
    /// respawn is waiting on a free spawn point.
    pub remaining_life: u32,
    /// Pushed by the pointer on the last update.
    pub displaced: bool,
}

impl Particle {
    pub fn color(&self) -> Rgba {
        if self.displaced {
            self.displaced_color
        } else {
            self.rest_color
        }
    }

    fn step(
        &mut self,
        pointer: Option<Vector2<f32>>,
        radius: f32,
        push: f32,
        ease: f32,
        moving_rest: Option<Vector2<f32>>,
    ) {
        if let Some(pointer) = pointer {
            let delta = pointer - self.position;
            let distance = delta.magnitude();
            if distance < radius {
                // atan2(0, 0) is 0, so a pointer dead on the particle still
                // pushes it a full `push` along -x instead of producing NaN.
                let force = (radius - distance) / radius;
                let angle = delta.y.atan2(delta.x);
                self.position =
                    self.rest_position - Vector2::new(angle.cos(), angle.sin()) * force * push;
                self.displaced = true;
                return;
            }
        }

        if let Some(rest) = moving_rest {
            self.rest_position = rest;
        }
        self.position += (self.rest_position - self.position) * ease;
        self.displaced = false;
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Particles at the reference resolution scaled by the square root of the
/// area ratio, so density looks the same on any viewport.
pub fn particle_count(
    base_count: usize,
    width: f32,
    height: f32,
    reference_width: f32,
    reference_height: f32,
) -> usize {
    let ratio = (width * height) / (reference_width * reference_height);
    if ratio.is_nan() || ratio <= 0.0 {
        return 0;
    }
    (base_count as f32 * ratio.sqrt()).floor() as usize
}

#[derive(Clone, Copy, Debug)]
struct SpawnStyle {
    min_size: f32,
    max_size: f32,
    min_life: u32,
    max_life: u32,
    rest_color: Rgba,
    displaced_color: Rgba,
}

impl SpawnStyle {
    fn spawn<R: Rng>(
        &self,
        placement: &Placement,
        slot: usize,
        count: usize,
        time: f32,
        rng: &mut R,
    ) -> Option<Particle> {
        let point = placement.spawn_point(slot, count, time, rng)?;
        Some(Particle {
            position: point,
            rest_position: point,
            size: rng.gen_range(self.min_size..=self.max_size),
            rest_color: self.rest_color,
            displaced_color: self.displaced_color,
            remaining_life: rng.gen_range(self.min_life..self.max_life),
            displaced: false,
        })
    }
}

pub struct ParticleField {
    pub width: f32,
    pub height: f32,
    pub particles: Vec<Particle>,
    pub interaction_radius: f32,
    pub push_strength: f32,
    pub ease: f32,
    pub shape: Shape,
    placement: Placement,
    style: SpawnStyle,
}

impl ParticleField {
    pub fn empty(config: &FieldConfig, placement: Placement, width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            particles: Vec::new(),
            interaction_radius: config.interaction_radius,
            push_strength: config.push_strength,
            ease: config.ease,
            shape: config.shape,
            placement,
            style: SpawnStyle {
                min_size: config.min_size,
                max_size: config.max_size,
                min_life: config.min_life,
                max_life: config.max_life,
                rest_color: config.rest_color,
                displaced_color: config.displaced_color,
            },
        }
    }

    /// Builds a fresh pool for a `width` x `height` canvas.
    ///
    /// Slots whose spawn sampling fails are left out, so a text mask with no
    /// coverage yields an empty field.
    pub fn seed<R: Rng>(
        config: &FieldConfig,
        placement: Placement,
        width: f32,
        height: f32,
        time: f32,
        rng: &mut R,
    ) -> Self {
        let mut field = Self::empty(config, placement, width, height);
        let count = particle_count(
            config.base_count,
            width,
            height,
            config.reference_width,
            config.reference_height,
        );
        field.particles = (0..count)
            .filter_map(|slot| field.style.spawn(&field.placement, slot, count, time, rng))
            .collect();

        if field.particles.len() < count {
            tracing::debug!(
                requested = count,
                placed = field.particles.len(),
                "dropped particles with no spawn point"
            );
        }
        field
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Advances every particle one frame.
    ///
    /// `pointer` is the active pointer position, `None` when nothing should
    /// be disturbed. Expired slots are respawned in place; a slot whose
    /// respawn finds no spawn point keeps its state and retries next frame.
    pub fn update<R: Rng>(&mut self, pointer: Option<Vector2<f32>>, time: f32, rng: &mut R) {
        let count = self.particles.len();
        let (radius, push, ease) = (self.interaction_radius, self.push_strength, self.ease);
        let placement = &self.placement;

        self.particles
            .par_iter_mut()
            .enumerate()
            .for_each(|(slot, particle)| {
                particle.step(pointer, radius, push, ease, placement.moving_rest(slot, count, time));
            });

        for (slot, particle) in self.particles.iter_mut().enumerate() {
            particle.remaining_life = particle.remaining_life.saturating_sub(1);
            if particle.remaining_life == 0 {
                if let Some(fresh) = self.style.spawn(&self.placement, slot, count, time, rng) {
                    *particle = fresh;
                }
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        for particle in &self.particles {
            let Vector2 { x, y } = particle.position;
            match self.shape {
                Shape::Square => canvas.fill_square(x, y, particle.size, particle.color()),
                Shape::Circle => canvas.fill_circle(x, y, particle.size, particle.color()),
            }
        }
    }
}
