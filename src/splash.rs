use std::sync::Arc;

use ab_glyph::FontArc;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::canvas::Canvas;
use crate::config::{PlacementConfig, SplashConfig};
use crate::drift::DriftField;
use crate::error::SplashResult;
use crate::mask::{AlphaMask, TextLayout, load_font};
use crate::placement::Placement;
use crate::pointer::{InputResponse, PointerEvent, PointerState};
use crate::schedule::{FrameHandle, FrameScheduler};
use crate::trail::TrailField;
use crate::ParticleField;

type ActivateFn = Box<dyn FnMut() + Send>;

pub struct Splash<S: FrameScheduler> {
    config: SplashConfig,
    canvas: Canvas,
    field: ParticleField,
    drift: Option<DriftField>,
    trail: Option<TrailField>,
    overlay: Option<AlphaMask>,
    font: Option<FontArc>,
    pointer: PointerState,
    scheduler: S,
    pending: Option<FrameHandle>,
    on_activate: Option<ActivateFn>,
    rng: StdRng,
    /// Timestamp of the latest frame, in seconds.
    clock: f32,
    frames: u64,
    mounted: bool,
}

impl<S: FrameScheduler> Splash<S> {
    /// Validates `config`, seeds every pool for a `width` x `height` surface
    /// and requests the first frame.
    pub fn mount(config: SplashConfig, width: usize, height: usize, scheduler: S) -> SplashResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let font = match load_font(config.font_path.as_deref()) {
            Ok(font) => Some(font),
            Err(err) => {
                tracing::warn!(%err, "splash text unavailable, continuing without it");
                None
            }
        };
        let trail = config.trail.enabled.then(|| TrailField::new(&config.trail));

        let placeholder = Placement::from_config(
            &config.field.placement,
            Arc::new(AlphaMask::empty(0, 0)),
            config.field.alpha_threshold,
            config.field.spawn_attempts,
            0.0,
            0.0,
        );
        let mut splash = Self {
            field: ParticleField::empty(&config.field, placeholder, 0.0, 0.0),
            canvas: Canvas::new(width, height),
            drift: None,
            trail,
            overlay: None,
            font,
            pointer: PointerState::default(),
            scheduler,
            pending: None,
            on_activate: None,
            rng,
            clock: 0.0,
            frames: 0,
            mounted: true,
            config,
        };
        splash.reseed();
        splash.pending = Some(splash.scheduler.request_frame());

        tracing::info!(
            width,
            height,
            particles = splash.field.len(),
            "splash mounted"
        );
        Ok(splash)
    }

    pub fn on_activate<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_activate = Some(Box::new(callback));
    }

    pub fn handle_input(&mut self, event: PointerEvent) -> InputResponse {
        if !self.mounted {
            return InputResponse::default();
        }

        let mut response = self.pointer.apply(event);
        match event {
            // Sparks are only pruned by rendering, so none are emitted while
            // the surface has no area.
            PointerEvent::MouseMove { x, y } if self.canvas.is_ready() => {
                if let Some(trail) = &mut self.trail {
                    trail.emit(cgmath::Vector2::new(x, y), &mut self.rng);
                }
            }
            PointerEvent::Click => {
                if let Some(callback) = &mut self.on_activate {
                    callback();
                    response.activated = true;
                }
            }
            _ => {}
        }
        response
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if !self.mounted {
            return;
        }
        self.canvas.resize(width, height);
        self.reseed();
        tracing::info!(width, height, particles = self.field.len(), "splash resized");
    }

    /// Runs one frame if `handle` is the outstanding request, then asks for
    /// the next one. Stale or cancelled handles are ignored.
    pub fn frame(&mut self, handle: FrameHandle, now: f32) {
        if !self.mounted || self.pending != Some(handle) {
            return;
        }
        self.pending = None;
        self.clock = now;

        if self.canvas.is_ready() {
            self.render(now);
            self.frames += 1;
        }
        self.pending = Some(self.scheduler.request_frame());
    }

    fn render(&mut self, now: f32) {
        self.canvas.clear(self.config.background);

        if let Some(drift) = &mut self.drift {
            drift.update();
            drift.draw(&mut self.canvas);
        }

        self.field
            .update(self.pointer.active_position(), now, &mut self.rng);
        self.field.draw(&mut self.canvas);

        if let Some(overlay) = &self.overlay {
            let text = &self.config.text;
            self.canvas
                .blend_mask(overlay, text.overlay_color, text.overlay_opacity);
        }

        if let Some(trail) = &mut self.trail {
            trail.update();
            trail.draw(&mut self.canvas);
        }
    }

    /// Cancels the pending frame and drops all simulation state. Input and
    /// frame callbacks are ignored afterwards.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.mounted = false;
        self.on_activate = None;
        self.field.particles.clear();
        self.drift = None;
        self.overlay = None;
        if let Some(trail) = &mut self.trail {
            trail.clear();
        }
        tracing::info!(frames = self.frames, "splash torn down");
    }

    fn reseed(&mut self) {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        let text = &self.config.text;

        let samples_text = self.config.field.placement == PlacementConfig::Text;
        let mask = match &self.font {
            Some(font) if samples_text => {
                let layout = TextLayout::for_viewport(text, width, height, 1.0);
                AlphaMask::from_text(font, &layout, width, height)
            }
            _ => AlphaMask::empty(width, height),
        };
        self.overlay = match (&self.font, text.overlay) {
            (Some(font), true) => {
                let layout = TextLayout::for_viewport(text, width, height, text.overlay_spacing);
                Some(AlphaMask::from_text(font, &layout, width, height))
            }
            _ => None,
        };

        let field_config = &self.config.field;
        let covered = mask.covered_count(field_config.alpha_threshold);
        let placement = Placement::from_config(
            &field_config.placement,
            Arc::new(mask),
            field_config.alpha_threshold,
            field_config.spawn_attempts,
            width as f32,
            height as f32,
        );
        self.field = ParticleField::seed(
            field_config,
            placement,
            width as f32,
            height as f32,
            self.clock,
            &mut self.rng,
        );
        self.drift = self
            .config
            .drift
            .enabled
            .then(|| DriftField::seed(&self.config.drift, width as f32, height as f32, &mut self.rng));

        tracing::debug!(
            width,
            height,
            particles = self.field.len(),
            covered,
            drift = self.drift.as_ref().map_or(0, DriftField::len),
            "pools re-seeded"
        );
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn drift(&self) -> Option<&DriftField> {
        self.drift.as_ref()
    }

    pub fn trail(&self) -> Option<&TrailField> {
        self.trail.as_ref()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn config(&self) -> &SplashConfig {
        &self.config
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

impl<S: FrameScheduler> Drop for Splash<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldConfig;
    use crate::schedule::ManualScheduler;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ring_config() -> SplashConfig {
        SplashConfig {
            field: FieldConfig {
                base_count: 2_000,
                ..FieldConfig::orbit_ring()
            },
            seed: Some(1),
            ..SplashConfig::default()
        }
    }

    #[test]
    fn mount_requests_the_first_frame() {
        let scheduler = ManualScheduler::new();
        let splash = Splash::mount(ring_config(), 640, 480, scheduler.clone()).unwrap();
        assert_eq!(splash.pending_frame(), scheduler.pending());
        assert!(!splash.field().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ring_config();
        config.field.ease = 0.0;
        assert!(Splash::mount(config, 640, 480, ManualScheduler::new()).is_err());
    }

    #[test]
    fn stale_handles_are_ignored() {
        let scheduler = ManualScheduler::new();
        let mut splash = Splash::mount(ring_config(), 320, 240, scheduler.clone()).unwrap();
        let first = scheduler.take_pending().unwrap();
        splash.frame(first, 0.016);
        assert_eq!(splash.frames_rendered(), 1);
        splash.frame(first, 0.032);
        assert_eq!(splash.frames_rendered(), 1);
    }

    #[test]
    fn zero_area_surface_skips_rendering_but_keeps_scheduling() {
        let scheduler = ManualScheduler::new();
        let mut splash = Splash::mount(ring_config(), 0, 0, scheduler.clone()).unwrap();
        assert!(splash.field().is_empty());
        let handle = scheduler.take_pending().unwrap();
        splash.frame(handle, 0.0);
        assert_eq!(splash.frames_rendered(), 0);
        assert!(scheduler.pending().is_some());
    }

    #[test]
    fn click_fires_activation_once_per_click() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut splash = Splash::mount(ring_config(), 320, 240, ManualScheduler::new()).unwrap();
        let counter = Arc::clone(&hits);
        splash.on_activate(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let response = splash.handle_input(PointerEvent::Click);
        assert!(response.activated);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        splash.handle_input(PointerEvent::MouseMove { x: 1.0, y: 1.0 });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        splash.handle_input(PointerEvent::Click);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        splash.teardown();
        splash.handle_input(PointerEvent::Click);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn mouse_moves_emit_trail_sparks() {
        let scheduler = ManualScheduler::new();
        let mut splash = Splash::mount(ring_config(), 320, 240, scheduler.clone()).unwrap();
        for i in 0..5 {
            splash.handle_input(PointerEvent::MouseMove { x: i as f32, y: 10.0 });
        }
        assert_eq!(splash.trail().map(TrailField::len), Some(5));
    }

    #[test]
    fn zero_area_surface_emits_no_sparks() {
        let scheduler = ManualScheduler::new();
        let mut splash = Splash::mount(ring_config(), 0, 0, scheduler.clone()).unwrap();
        for i in 0..50 {
            splash.handle_input(PointerEvent::MouseMove { x: i as f32, y: 0.0 });
        }
        assert_eq!(splash.trail().map(TrailField::len), Some(0));

        splash.resize(320, 240);
        splash.handle_input(PointerEvent::MouseMove { x: 5.0, y: 5.0 });
        assert_eq!(splash.trail().map(TrailField::len), Some(1));
    }

    #[test]
    fn drift_layer_follows_config() {
        let mut config = ring_config();
        config.drift.enabled = true;
        config.drift.background_count = 40;
        config.drift.accent_count = 4;
        let splash = Splash::mount(config, 320, 240, ManualScheduler::new()).unwrap();
        assert_eq!(splash.drift().map(DriftField::len), Some(44));
    }

    #[test]
    fn frame_paints_an_opaque_background() {
        let scheduler = ManualScheduler::new();
        let mut splash = Splash::mount(ring_config(), 64, 48, scheduler.clone()).unwrap();
        splash.frame(scheduler.take_pending().unwrap(), 0.0);
        assert!(splash.canvas().to_rgba8().chunks(4).all(|p| p[3] == 255));
    }
}
