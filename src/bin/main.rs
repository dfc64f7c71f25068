use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eframe::egui;
use quantum_splash::{FrameHandle, FrameScheduler, PointerEvent, Splash, SplashConfig};

const SOURCE_URL: &str = "https://github.com/jimbrend/quantum-bitcoin-analyzer";

#[derive(Parser, Debug)]
#[command(about = "Interactive particle splash screen")]
struct Args {
    /// TOML file overriding the default splash configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fixed RNG seed for reproducible particle layouts.
    #[arg(long)]
    seed: Option<u64>,
}

/// Frame port backed by egui repaints.
struct RepaintScheduler {
    ctx: egui::Context,
    next_id: u64,
}

impl FrameScheduler for RepaintScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.ctx.request_repaint();
        FrameHandle::new(self.next_id)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        // egui only repaints on request, so dropping the handle is enough.
        tracing::trace!(id = handle.id(), "frame cancelled");
    }
}

struct SplashApp {
    config: SplashConfig,
    splash: Option<Splash<RepaintScheduler>>,
    texture: Option<egui::TextureHandle>,
    activated: Arc<AtomicBool>,
    dismissed: bool,
}

impl SplashApp {
    fn new(config: SplashConfig) -> Self {
        Self {
            config,
            splash: None,
            texture: None,
            activated: Arc::new(AtomicBool::new(false)),
            dismissed: false,
        }
    }

    fn ensure_mounted(&mut self, ctx: &egui::Context, width: usize, height: usize) {
        match &mut self.splash {
            Some(splash) => {
                let canvas = splash.canvas();
                if canvas.width() != width || canvas.height() != height {
                    splash.resize(width, height);
                }
            }
            None => {
                let scheduler = RepaintScheduler {
                    ctx: ctx.clone(),
                    next_id: 0,
                };
                match Splash::mount(self.config.clone(), width, height, scheduler) {
                    Ok(mut splash) => {
                        let activated = Arc::clone(&self.activated);
                        splash.on_activate(move || activated.store(true, Ordering::SeqCst));
                        self.splash = Some(splash);
                    }
                    Err(err) => {
                        tracing::error!(%err, "could not start splash, skipping it");
                        self.dismissed = true;
                    }
                }
            }
        }
    }

    fn forward_input(&mut self, ctx: &egui::Context, origin: egui::Pos2, clicked: bool) {
        let Some(splash) = &mut self.splash else {
            return;
        };
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            let pointer = match event {
                egui::Event::PointerMoved(pos) => Some(PointerEvent::MouseMove {
                    x: pos.x - origin.x,
                    y: pos.y - origin.y,
                }),
                egui::Event::PointerGone => Some(PointerEvent::MouseLeave),
                egui::Event::Touch { phase, pos, .. } => match phase {
                    egui::TouchPhase::Start => Some(PointerEvent::TouchStart),
                    egui::TouchPhase::Move => Some(PointerEvent::TouchMove {
                        x: pos.x - origin.x,
                        y: pos.y - origin.y,
                    }),
                    egui::TouchPhase::End | egui::TouchPhase::Cancel => Some(PointerEvent::TouchEnd),
                },
                _ => None,
            };
            if let Some(pointer) = pointer {
                splash.handle_input(pointer);
            }
        }
        if clicked {
            splash.handle_input(PointerEvent::Click);
        }
    }

    fn paint_splash(&mut self, ui: &mut egui::Ui, rect: egui::Rect, now: f32) {
        let Some(splash) = &mut self.splash else {
            return;
        };
        if let Some(handle) = splash.pending_frame() {
            splash.frame(handle, now);
        }

        let canvas = splash.canvas();
        if !canvas.is_ready() {
            return;
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [canvas.width(), canvas.height()],
            &canvas.to_rgba8(),
        );
        let texture = match self.texture.take() {
            Some(mut texture) => {
                texture.set(image, egui::TextureOptions::NEAREST);
                texture
            }
            None => ui
                .ctx()
                .load_texture("splash-canvas", image, egui::TextureOptions::NEAREST),
        };

        ui.painter().image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
        self.texture = Some(texture);
    }

    fn dismiss(&mut self) {
        if let Some(mut splash) = self.splash.take() {
            splash.teardown();
        }
        self.texture = None;
        self.dismissed = true;
        tracing::info!("splash dismissed");
    }

    fn render_info_panel(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.heading("Are you a quantum safe Bitcoiner?");
            ui.add_space(12.0);
            ui.label("Always remember: never give out your seed phrase.");
            ui.add_space(8.0);
            ui.hyperlink_to("Source code for this project", SOURCE_URL);
        });
    }
}

impl eframe::App for SplashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.dismissed && self.activated.load(Ordering::SeqCst) {
            self.dismiss();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                if self.dismissed {
                    Self::render_info_panel(ui);
                    return;
                }

                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click());
                let width = rect.width().round().max(0.0) as usize;
                let height = rect.height().round().max(0.0) as usize;

                self.ensure_mounted(ctx, width, height);
                self.forward_input(ctx, rect.min, response.clicked());
                let now = ctx.input(|i| i.time) as f32;
                self.paint_splash(ui, rect, now);
            });
    }
}

fn main() -> anyhow::Result<()> {
    quantum_splash::init_logging();
    let args = Args::parse();

    let mut config = SplashConfig::load_or_default(args.config.as_deref());
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    eframe::run_native(
        "Quantum Safe Bitcoiner",
        eframe::NativeOptions {
            renderer: eframe::Renderer::Wgpu,
            initial_window_size: Some(egui::vec2(1280.0, 800.0)),
            ..Default::default()
        },
        Box::new(|_cc| Box::new(SplashApp::new(config))),
    )
    .map_err(|e| anyhow::anyhow!("failed to open splash window: {e:?}"))
}
