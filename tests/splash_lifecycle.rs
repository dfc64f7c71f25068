use std::collections::HashSet;

use quantum_splash::config::{DriftConfig, FieldConfig, TextConfig};
use quantum_splash::{ManualScheduler, PointerEvent, Splash, SplashConfig, particle_count};

fn ring_config() -> SplashConfig {
    SplashConfig {
        field: FieldConfig {
            base_count: 3_000,
            ..FieldConfig::orbit_ring()
        },
        seed: Some(2024),
        ..SplashConfig::default()
    }
}

fn step(splash: &mut Splash<ManualScheduler>, scheduler: &ManualScheduler, now: f32) {
    let handle = scheduler.take_pending().expect("a frame should be pending");
    splash.frame(handle, now);
}

#[test]
fn resize_reseeds_with_area_scaled_count() {
    let scheduler = ManualScheduler::new();
    let mut splash = Splash::mount(ring_config(), 1280, 720, scheduler.clone()).unwrap();
    step(&mut splash, &scheduler, 0.016);

    let before = splash.field().len();
    let old_positions: HashSet<(u32, u32)> = splash
        .field()
        .particles
        .iter()
        .map(|p| (p.position.x.to_bits(), p.position.y.to_bits()))
        .collect();

    splash.resize(640, 900);
    let after = splash.field().len();

    let expected = before as f32 * ((640.0 * 900.0) / (1280.0 * 720.0f32)).sqrt();
    assert!((after as f32 - expected).abs() <= 1.5, "{after} vs {expected}");
    assert_eq!(after, particle_count(3_000, 640.0, 900.0, 1920.0, 1080.0));
    assert_eq!(splash.canvas().width(), 640);
    assert_eq!(splash.canvas().height(), 900);

    assert!(splash
        .field()
        .particles
        .iter()
        .all(|p| !old_positions.contains(&(p.position.x.to_bits(), p.position.y.to_bits()))));
}

#[test]
fn touch_end_lets_every_particle_relax() {
    let scheduler = ManualScheduler::new();
    let mut splash = Splash::mount(ring_config(), 800, 600, scheduler.clone()).unwrap();

    let target = splash.field().particles[0].position;
    splash.handle_input(PointerEvent::TouchStart);
    let response = splash.handle_input(PointerEvent::TouchMove {
        x: target.x,
        y: target.y,
    });
    assert!(response.suppress_default);
    step(&mut splash, &scheduler, 0.016);
    assert!(splash.field().particles.iter().any(|p| p.displaced));

    splash.handle_input(PointerEvent::TouchEnd);
    step(&mut splash, &scheduler, 0.032);
    assert!(splash.field().particles.iter().all(|p| !p.displaced));
}

#[test]
fn mouse_leave_releases_particles() {
    let scheduler = ManualScheduler::new();
    let mut splash = Splash::mount(ring_config(), 800, 600, scheduler.clone()).unwrap();
    let target = splash.field().particles[10].position;
    splash.handle_input(PointerEvent::MouseMove {
        x: target.x,
        y: target.y,
    });
    step(&mut splash, &scheduler, 0.016);
    assert!(splash.field().particles.iter().any(|p| p.displaced));

    splash.handle_input(PointerEvent::MouseLeave);
    step(&mut splash, &scheduler, 0.032);
    assert!(splash.field().particles.iter().all(|p| !p.displaced));
}

#[test]
fn teardown_cancels_the_pending_frame() {
    let scheduler = ManualScheduler::new();
    let mut splash = Splash::mount(ring_config(), 400, 300, scheduler.clone()).unwrap();
    step(&mut splash, &scheduler, 0.016);
    let pending = scheduler.pending().unwrap();

    splash.teardown();
    assert!(!splash.is_mounted());
    assert!(scheduler.was_cancelled(pending));
    assert!(scheduler.pending().is_none());
    assert!(splash.field().is_empty());

    // A late callback with the old handle does nothing.
    splash.frame(pending, 0.032);
    assert_eq!(splash.frames_rendered(), 1);
    assert!(scheduler.pending().is_none());
}

#[test]
fn dropping_the_splash_tears_it_down() {
    let scheduler = ManualScheduler::new();
    let splash = Splash::mount(ring_config(), 400, 300, scheduler.clone()).unwrap();
    let pending = scheduler.pending().unwrap();
    drop(splash);
    assert!(scheduler.was_cancelled(pending));
}

#[test]
fn text_placement_forms_the_message() {
    let config = SplashConfig {
        field: FieldConfig {
            base_count: 2_000,
            ..FieldConfig::default()
        },
        text: TextConfig {
            overlay: true,
            ..TextConfig::default()
        },
        drift: DriftConfig {
            enabled: true,
            background_count: 200,
            accent_count: 20,
            ..DriftConfig::default()
        },
        seed: Some(5),
        ..SplashConfig::default()
    };
    let scheduler = ManualScheduler::new();
    let mut splash = Splash::mount(config, 1024, 600, scheduler.clone()).unwrap();
    assert!(!splash.field().is_empty());

    // Every particle starts on a covered pixel of the rendered text.
    let field = splash.field();
    for (slot, p) in field.particles.iter().enumerate() {
        assert!(field.placement().contains(p.position, slot, field.len(), 0.0));
    }

    for frame in 1..=30 {
        step(&mut splash, &scheduler, frame as f32 / 60.0);
    }
    assert_eq!(splash.frames_rendered(), 30);
}
