use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use fb_presenter::cli::Cli;
use fb_presenter::core::{SurfaceRenderer, WgpuTextureDevice};
use fb_presenter::demo::DemoSource;
use fb_presenter::{DisplaySink, Presenter, PresenterConfig};

const SOURCE_INTERVAL: Duration = Duration::from_millis(16);
const STATS_INTERVAL: f32 = 5.0;

type SharedPresenter = Arc<Presenter<WgpuTextureDevice>>;

/// Drives a `DemoSource` from its own thread, like a guest display would
fn spawn_source(presenter: SharedPresenter, running: Arc<AtomicBool>) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("framebuffer-source".into())
        .spawn(move || {
            let mut source = DemoSource::new();
            while running.load(Ordering::Relaxed) {
                source.step(presenter.as_ref(), presenter.content_size());
                std::thread::sleep(SOURCE_INTERVAL);
            }
            log::debug!("framebuffer source stopped after {} steps", source.frame());
        })
}

struct App {
    cli: Cli,
    config: PresenterConfig,
    window: Option<Arc<Window>>,
    renderer: Option<SurfaceRenderer>,
    presenter: Option<SharedPresenter>,
    source: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
    last_stats: Instant,
}

impl App {
    fn new(cli: Cli, config: PresenterConfig) -> Self {
        Self {
            cli,
            config,
            window: None,
            renderer: None,
            presenter: None,
            source: None,
            running: Arc::new(AtomicBool::new(true)),
            last_stats: Instant::now(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("fb-presenter")
                    .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
            )?,
        );

        let renderer = pollster::block_on(SurfaceRenderer::for_window(window.clone(), &self.config))?;
        let device = WgpuTextureDevice::new(renderer.gpu().clone(), self.config.pixel_format);
        let presenter = Arc::new(Presenter::new(device, &self.config));

        let size = window.inner_size();
        presenter.set_scale_factor(window.scale_factor() as f32);
        presenter.resize(size.width, size.height);
        presenter.set_chrome(self.cli.title_height, self.cli.blurred);

        self.source = Some(spawn_source(presenter.clone(), self.running.clone())?);
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.presenter = Some(presenter);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(source) = self.source.take() {
            if source.join().is_err() {
                log::error!("framebuffer source thread panicked");
            }
        }
        if let Some(presenter) = &self.presenter {
            presenter.release();
            log::info!("final stats: {:?}", presenter.stats());
        }
    }

    fn log_stats(&mut self) {
        if self.last_stats.elapsed().as_secs_f32() < STATS_INTERVAL {
            return;
        }
        self.last_stats = Instant::now();
        if let Some(presenter) = &self.presenter {
            match serde_json::to_string(&presenter.stats()) {
                Ok(json) => log::info!("stats {}", json),
                Err(e) => log::warn!("failed to encode stats: {}", e),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("failed to initialise presenter: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(presenter) = &self.presenter {
                    presenter.resize(size.width, size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(presenter) = &self.presenter {
                    presenter.set_scale_factor(scale_factor as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(presenter), Some(renderer)) = (&self.presenter, &mut self.renderer) {
                    if let Err(e) = presenter.render_frame(renderer) {
                        log::warn!("frame failed: {}", e);
                    }
                }
                self.log_stats();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PresenterConfig::from_file(path)?,
        None => PresenterConfig::default(),
    };
    if cli.no_vsync {
        config.vsync = false;
    }

    let event_loop = EventLoop::new().context("creating event loop")?;
    let mut app = App::new(cli, config);

    log::info!("fb-presenter running, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
