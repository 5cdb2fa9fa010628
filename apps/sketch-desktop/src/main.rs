use anyhow::{Context, Result};
use clap::Parser;
use sketch_common::HostSize;
use sketch_input::HostEvent;
use sketch_render::{FrameClock, StopHandle, SystemClock};
use sketch_render_wgpu::WgpuRenderer;
use sketch_stage::{Controller, Demo, SketchConfig, build_controller};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "sketch-desktop", about = "Viewport and shader stage demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Demo to run (viewport | shader)
    #[arg(long, default_value = "viewport")]
    demo: Demo,

    /// Matcap image for the shader demo
    #[arg(long)]
    matcap: Option<PathBuf>,

    /// Directory with stage.vert.wgsl / stage.frag.wgsl overriding the built-in shaders
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// YAML file with `viewport:` / `shader:` settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame-rate cap (0 = vsync only)
    #[arg(long, default_value = "0")]
    fps: u32,
}

/// Keep the container's logical size across a scale-factor change.
///
/// Returns the size to hand the controller and the physical inner size to
/// request from the window.
fn rescale(current: HostSize, scale_factor: f64) -> (HostSize, PhysicalSize<u32>) {
    let physical = LogicalSize::new(current.width, current.height).to_physical(scale_factor);
    let size = HostSize::new(current.width, current.height, scale_factor as f32);
    (size, physical)
}

/// Container size as the controllers see it: logical pixels plus the scale factor.
fn host_size(window: &Window) -> HostSize {
    let scale = window.scale_factor();
    let logical: LogicalSize<f64> = window.inner_size().to_logical(scale);
    HostSize::new(
        logical.width.round() as u32,
        logical.height.round() as u32,
        scale as f32,
    )
}

struct SketchApp {
    demo: Demo,
    config: SketchConfig,
    fps: u32,
    window: Option<Arc<Window>>,
    controller: Option<Box<dyn Controller>>,
    clock: SystemClock,
    stop: StopHandle,
    failure: Option<anyhow::Error>,
}

impl SketchApp {
    fn new(demo: Demo, config: SketchConfig, fps: u32) -> Self {
        Self {
            demo,
            config,
            fps,
            window: None,
            controller: None,
            clock: SystemClock::with_fps_cap(fps),
            stop: StopHandle::new(),
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(format!("sketch: {}", self.demo))
            .with_inner_size(LogicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = host_size(&window);
        let target = window.clone();
        let controller = build_controller(self.demo, &self.config, size, |options| {
            pollster::block_on(WgpuRenderer::new(target, size.width, size.height, options))
        })
        .with_context(|| format!("failed to start the {} demo", self.demo))?;

        tracing::info!(
            "{} demo running at {}x{} @{:.1}x",
            controller.name(),
            size.width,
            size.height,
            size.device_pixel_ratio
        );

        self.clock = SystemClock::with_fps_cap(self.fps);
        self.controller = Some(controller);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn dispatch(&mut self, event: HostEvent) {
        if let Some(controller) = &mut self.controller {
            tracing::trace!("{} event for {}", event.kind(), controller.name());
            controller.handle_event(&event);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.stop.is_stopped() {
            return;
        }
        let Some(controller) = &mut self.controller else {
            return;
        };

        let tick = self.clock.next_frame();
        if let Err(e) = controller.frame(tick) {
            if e.is_fatal() {
                tracing::error!("frame {} failed: {e}", tick.index);
                self.stop.stop();
                event_loop.exit();
                return;
            }
            tracing::warn!("frame {} skipped: {e}", tick.index);
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for SketchApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.dispatch(HostEvent::CloseRequested);
                self.stop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(window) = &self.window {
                    let scale = window.scale_factor();
                    let logical: LogicalSize<f64> =
                        PhysicalSize::new(width, height).to_logical(scale);
                    self.dispatch(HostEvent::resized(
                        logical.width.round() as u32,
                        logical.height.round() as u32,
                        scale as f32,
                    ));
                }
            }
            WindowEvent::ScaleFactorChanged {
                scale_factor,
                mut inner_size_writer,
            } => {
                // The window still reports its old inner size here.
                if let Some(controller) = &self.controller {
                    let (size, physical) = rescale(controller.size(), scale_factor);
                    if let Err(e) = inner_size_writer.request_inner_size(physical) {
                        tracing::warn!("could not keep window size on scale change: {e}");
                    }
                    self.dispatch(HostEvent::Resized(size));
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    let logical: LogicalPosition<f64> = position.to_logical(window.scale_factor());
                    self.dispatch(HostEvent::pointer(logical.x as f32, logical.y as f32));
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => SketchConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SketchConfig::default(),
    };
    if let Some(matcap) = cli.matcap {
        config.shader.matcap_path = matcap;
    }
    if let Some(dir) = cli.shader_dir {
        config.shader.shader_dir = Some(dir);
    }

    tracing::info!("sketch-desktop starting ({} demo)", cli.demo);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = SketchApp::new(cli.demo, config, cli.fps);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_keeps_logical_size() {
        let (size, physical) = rescale(HostSize::new(1280, 720, 1.0), 2.0);
        assert_eq!(size, HostSize::new(1280, 720, 2.0));
        assert_eq!(physical, PhysicalSize::new(2560, 1440));

        let (size, physical) = rescale(HostSize::new(1280, 720, 2.0), 1.5);
        assert_eq!((size.width, size.height), (1280, 720));
        assert_eq!(size.device_pixel_ratio, 1.5);
        assert_eq!(physical, PhysicalSize::new(1920, 1080));
    }
}
