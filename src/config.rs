use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canvas::Rgba;
use crate::error::{SplashError, SplashResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    pub field: FieldConfig,
    pub text: TextConfig,
    pub drift: DriftConfig,
    pub trail: TrailConfig,
    pub background: Rgba,
    /// Fixed RNG seed; entropy is used when unset.
    pub seed: Option<u64>,
    /// TTF/OTF file for the splash text instead of egui's default face.
    pub font_path: Option<PathBuf>,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            text: TextConfig::default(),
            drift: DriftConfig::default(),
            trail: TrailConfig::default(),
            background: Rgba::BLACK,
            seed: None,
            font_path: None,
        }
    }
}

impl SplashConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> SplashResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SplashError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SplashResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| SplashError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> SplashResult<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| SplashError::Parse(e.to_string()))?;
        fs::write(path, content).map_err(|source| SplashError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given; a missing or broken file falls back to the
    /// defaults with a warning.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::info!("using default splash configuration");
            return Self::default();
        };
        match Self::from_toml_file(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded splash configuration");
                config
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "falling back to default configuration");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> SplashResult<()> {
        self.field.validate()?;
        self.text.validate()?;
        self.trail.validate()?;
        Ok(())
    }
}

/// How particle rest positions are chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementConfig {
    /// Sample covered pixels of the rendered text.
    Text,
    /// Spread evenly around a circle centred on the canvas.
    Ring {
        #[serde(default = "default_ring_radius")]
        radius_fraction: f32,
        /// Radians per second; zero keeps the ring still.
        #[serde(default = "default_orbit_speed")]
        orbit_speed: f32,
    },
}

fn default_ring_radius() -> f32 {
    0.4
}

fn default_orbit_speed() -> f32 {
    1.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Square,
    Circle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Particle count at the reference resolution.
    pub base_count: usize,
    pub reference_width: f32,
    pub reference_height: f32,
    pub interaction_radius: f32,
    pub push_strength: f32,
    /// Fraction of the remaining distance to rest covered each frame.
    pub ease: f32,
    pub placement: PlacementConfig,
    pub shape: Shape,
    pub min_size: f32,
    pub max_size: f32,
    /// Lifetimes are drawn from `min_life..max_life` frames.
    pub min_life: u32,
    pub max_life: u32,
    pub rest_color: Rgba,
    pub displaced_color: Rgba,
    /// Mask pixels must be strictly above this alpha to spawn a particle.
    pub alpha_threshold: u8,
    pub spawn_attempts: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            base_count: 15_000,
            reference_width: 1920.0,
            reference_height: 1080.0,
            interaction_radius: 240.0,
            push_strength: 60.0,
            ease: 0.1,
            placement: PlacementConfig::Text,
            shape: Shape::Square,
            min_size: 0.5,
            max_size: 1.5,
            min_life: 50,
            max_life: 150,
            rest_color: Rgba::WHITE,
            displaced_color: Rgba::ORANGE,
            alpha_threshold: 128,
            spawn_attempts: 100,
        }
    }
}

impl FieldConfig {
    /// Faint, small particles orbiting a ring, as used behind the quiz intro.
    pub fn orbit_ring() -> Self {
        Self {
            placement: PlacementConfig::Ring {
                radius_fraction: default_ring_radius(),
                orbit_speed: default_orbit_speed(),
            },
            min_size: 0.2,
            max_size: 0.7,
            rest_color: Rgba::WHITE.with_opacity(0.3),
            displaced_color: Rgba::ORANGE.with_opacity(0.3),
            ..Self::default()
        }
    }

    fn validate(&self) -> SplashResult<()> {
        let fail = |msg: &str| Err(SplashError::Validation(format!("field: {msg}")));
        if !(self.reference_width > 0.0 && self.reference_height > 0.0) {
            return fail("reference resolution must be positive");
        }
        if !(self.interaction_radius > 0.0 && self.interaction_radius.is_finite()) {
            return fail("interaction_radius must be positive");
        }
        if !(self.push_strength.is_finite() && self.push_strength >= 0.0) {
            return fail("push_strength must be finite and non-negative");
        }
        if !(self.ease > 0.0 && self.ease <= 1.0) {
            return fail("ease must be in (0, 1]");
        }
        if !(self.min_size > 0.0 && self.max_size >= self.min_size && self.max_size.is_finite()) {
            return fail("sizes must satisfy 0 < min_size <= max_size");
        }
        if self.min_life == 0 || self.max_life <= self.min_life {
            return fail("lifetimes must satisfy 0 < min_life < max_life");
        }
        if self.spawn_attempts == 0 {
            return fail("spawn_attempts must be at least 1");
        }
        if let PlacementConfig::Ring {
            radius_fraction,
            orbit_speed,
        } = self.placement
        {
            if !(radius_fraction > 0.0) {
                return fail("ring radius_fraction must be positive");
            }
            if !orbit_speed.is_finite() {
                return fail("ring orbit_speed must be finite");
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub lines: Vec<String>,
    pub narrow_font_size: f32,
    pub wide_font_size: f32,
    /// Viewports narrower than this use `narrow_font_size`.
    pub breakpoint: f32,
    /// Draw a faint copy of the text on top of the particles.
    pub overlay: bool,
    pub overlay_spacing: f32,
    pub overlay_opacity: f32,
    pub overlay_color: Rgba,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            lines: vec![
                "Are you a".to_owned(),
                "quantum".to_owned(),
                "safe Bitcoiner?".to_owned(),
            ],
            narrow_font_size: 80.0,
            wide_font_size: 160.0,
            breakpoint: 768.0,
            overlay: false,
            overlay_spacing: 0.8,
            overlay_opacity: 0.1,
            overlay_color: Rgba::ORANGE,
        }
    }
}

impl TextConfig {
    fn validate(&self) -> SplashResult<()> {
        if !(self.narrow_font_size > 0.0 && self.wide_font_size > 0.0) {
            return Err(SplashError::Validation(
                "text: font sizes must be positive".to_owned(),
            ));
        }
        if !(self.overlay_opacity >= 0.0 && self.overlay_opacity <= 1.0) {
            return Err(SplashError::Validation(
                "text: overlay_opacity must be in [0, 1]".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    pub enabled: bool,
    pub background_count: usize,
    pub accent_count: usize,
    pub color: Rgba,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            background_count: 15_000,
            accent_count: 1_000,
            color: Rgba::ORANGE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub enabled: bool,
    /// Opacity lost per frame; a particle is pruned once it reaches zero.
    pub fade: f32,
    pub color: Rgba,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fade: 0.02,
            color: Rgba::ORANGE,
        }
    }
}

impl TrailConfig {
    fn validate(&self) -> SplashResult<()> {
        if !(self.fade > 0.0 && self.fade.is_finite()) {
            return Err(SplashError::Validation(
                "trail: fade must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
