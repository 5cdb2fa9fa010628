use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use sketch_common::HostSize;
use sketch_input::HostEvent;
use sketch_render::{
    DebugTextRenderer, FixedStepClock, FrameLoop, RenderError, RendererOptions, Scene,
};
use sketch_stage::{
    Controller, Demo, ShaderStageController, SketchConfig, StageError, ViewportController,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sketch-cli", about = "Headless runner for the sketch demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drive a demo for a number of frames and print the final scene report
    Run {
        /// Demo to run (viewport | shader)
        #[arg(long, default_value = "viewport")]
        demo: Demo,
        /// Number of frames to render
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Container width in logical pixels
        #[arg(long, default_value = "800")]
        width: u32,
        /// Container height in logical pixels
        #[arg(long, default_value = "600")]
        height: u32,
        /// Device pixel ratio reported by the host
        #[arg(long, default_value = "1.0")]
        dpr: f32,
        /// Resize the container before the first frame, e.g. 1024x768
        #[arg(long, value_parser = parse_size)]
        resize: Option<(u32, u32)>,
        /// Pointer position in logical pixels, e.g. 400,300
        #[arg(long, value_parser = parse_point)]
        pointer: Option<(f32, f32)>,
        /// Matcap image for the shader demo
        #[arg(long)]
        matcap: Option<PathBuf>,
        /// Directory with stage.vert.wgsl / stage.frag.wgsl
        #[arg(long)]
        shader_dir: Option<PathBuf>,
        /// YAML file with `viewport:` / `shader:` settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print a JSON summary instead of the text report
        #[arg(long)]
        json: bool,
    },
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w = w.trim().parse().map_err(|e| format!("bad width `{w}`: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("bad height `{h}`: {e}"))?;
    Ok((w, h))
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{s}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok((x, y))
}

/// Host events to replay before the first frame.
fn setup_events(
    size: HostSize,
    resize: Option<(u32, u32)>,
    pointer: Option<(f32, f32)>,
) -> Vec<HostEvent> {
    let mut events = Vec::new();
    if let Some((width, height)) = resize {
        events.push(HostEvent::resized(width, height, size.device_pixel_ratio));
    }
    if let Some((x, y)) = pointer {
        events.push(HostEvent::pointer(x, y));
    }
    events
}

/// Run `frames` fixed-step frames; returns how many completed.
fn drive(
    controller: &mut dyn Controller,
    events: &[HostEvent],
    frames: u64,
) -> Result<u64, StageError> {
    for event in events {
        controller.handle_event(event);
    }
    let mut frame_loop = FrameLoop::new(FixedStepClock::sixty_hz()).with_max_frames(frames);
    frame_loop.run(|tick| controller.frame(tick))
}

fn summary(
    demo: Demo,
    frames: u64,
    controller: &dyn Controller,
    renderer: &DebugTextRenderer,
) -> serde_json::Value {
    let size = controller.size();
    json!({
        "demo": demo.as_str(),
        "frames": frames,
        "container": size,
        "drawing_buffer": {
            "width": renderer.size().0,
            "height": renderer.size().1,
            "pixel_ratio": renderer.pixel_ratio(),
        },
        "camera": controller.camera().describe(),
        "meshes": meshes_json(controller.scene()),
    })
}

fn meshes_json(scene: &Scene) -> serde_json::Value {
    scene
        .meshes()
        .iter()
        .map(|mesh| {
            json!({
                "name": mesh.name,
                "geometry": mesh.geometry,
                "material": mesh.material.describe(),
                "rotation": [mesh.rotation.x, mesh.rotation.y, mesh.rotation.z],
            })
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("sketch-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", sketch_common::crate_info());
            println!("input: {}", sketch_input::crate_info());
            println!("render: {}", sketch_render::crate_info());
            println!("stage: {}", sketch_stage::crate_info());
            let demos: Vec<&str> = Demo::ALL.iter().map(Demo::as_str).collect();
            println!("demos: {}", demos.join(", "));
        }
        Commands::Run {
            demo,
            frames,
            width,
            height,
            dpr,
            resize,
            pointer,
            matcap,
            shader_dir,
            config,
            json,
        } => {
            let mut config = match &config {
                Some(path) => SketchConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => SketchConfig::default(),
            };
            if let Some(matcap) = matcap {
                config.shader.matcap_path = matcap;
            }
            if let Some(dir) = shader_dir {
                config.shader.shader_dir = Some(dir);
            }

            let size = HostSize::new(width, height, dpr);
            let events = setup_events(size, resize, pointer);
            let make_renderer = |options: &RendererOptions| -> Result<_, RenderError> {
                Ok(DebugTextRenderer::new(*options))
            };

            tracing::info!("running {demo} demo for {frames} frames at {width}x{height} @{dpr}x");

            let (rendered, output) = match demo {
                Demo::Viewport => {
                    let mut controller =
                        ViewportController::new(config.viewport, size, make_renderer)
                            .context("failed to start the viewport demo")?;
                    let rendered = drive(&mut controller, &events, frames)?;
                    let output = if json {
                        summary(demo, rendered, &controller, controller.renderer()).to_string()
                    } else {
                        controller.renderer().last_report().to_string()
                    };
                    (rendered, output)
                }
                Demo::Shader => {
                    let mut controller =
                        ShaderStageController::new(config.shader, size, make_renderer)
                            .context("failed to start the shader demo")?;
                    let rendered = drive(&mut controller, &events, frames)?;
                    let output = if json {
                        let mut value =
                            summary(demo, rendered, &controller, controller.renderer());
                        let u = controller.uniforms();
                        value["uniforms"] = json!({
                            "time": u.time,
                            "resolution": u.resolution.to_array(),
                            "mouse": u.mouse.to_array(),
                        });
                        value.to_string()
                    } else {
                        controller.renderer().last_report().to_string()
                    };
                    (rendered, output)
                }
            };

            tracing::debug!("rendered {rendered} frames");
            print!("{output}");
            if json {
                println!();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sizes_and_points() {
        assert_eq!(parse_size("1024x768"), Ok((1024, 768)));
        assert!(parse_size("1024").is_err());
        assert_eq!(parse_point("400, 300"), Ok((400.0, 300.0)));
        assert!(parse_point("400;300").is_err());
    }

    #[test]
    fn resize_precedes_pointer() {
        let size = HostSize::new(800, 600, 2.0);
        let events = setup_events(size, Some((1024, 768)), Some((10.0, 20.0)));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], HostEvent::resized(1024, 768, 2.0));
        assert_eq!(events[1], HostEvent::pointer(10.0, 20.0));
    }
}
