use crate::{ShaderStageController, SketchConfig, StageError, ViewportController};
use sketch_common::HostSize;
use sketch_input::HostEvent;
use sketch_render::{Camera, FrameTick, RenderError, Renderer, RendererOptions, Scene};
use std::fmt;
use std::str::FromStr;

/// A self-contained demo: owns its render surface, scene and camera.
///
/// Lifecycle: construct (configures the surface and builds the scene), then
/// the host routes events through `handle_event` and calls `frame` once per
/// scheduled frame until it stops.
pub trait Controller {
    fn name(&self) -> &'static str;

    /// React to a host event. Events the demo does not listen to are ignored.
    fn handle_event(&mut self, event: &HostEvent);

    /// Advance the animation by one frame and render it.
    fn frame(&mut self, tick: FrameTick) -> Result<(), StageError>;

    fn scene(&self) -> &Scene;

    fn camera(&self) -> &dyn Camera;

    /// The container size as of the last resize.
    fn size(&self) -> HostSize;
}

/// Which demo to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Demo {
    /// Rotating normal-shaded cube, perspective camera.
    #[default]
    Viewport,
    /// Full-screen shader plane with pointer-reactive uniforms.
    Shader,
}

impl Demo {
    pub const ALL: [Demo; 2] = [Demo::Viewport, Demo::Shader];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewport => "viewport",
            Self::Shader => "shader",
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Demo {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "viewport" | "cube" => Ok(Self::Viewport),
            "shader" | "stage" => Ok(Self::Shader),
            other => Err(StageError::UnknownDemo(other.to_string())),
        }
    }
}

/// Entry point: construct the chosen demo against `container`, creating its
/// render surface through `make_renderer`.
pub fn build_controller<R, F>(
    demo: Demo,
    config: &SketchConfig,
    container: HostSize,
    make_renderer: F,
) -> Result<Box<dyn Controller>, StageError>
where
    R: Renderer + 'static,
    F: FnOnce(&RendererOptions) -> Result<R, RenderError>,
{
    let controller: Box<dyn Controller> = match demo {
        Demo::Viewport => Box::new(ViewportController::new(
            config.viewport.clone(),
            container,
            make_renderer,
        )?),
        Demo::Shader => Box::new(ShaderStageController::new(
            config.shader.clone(),
            container,
            make_renderer,
        )?),
    };
    Ok(controller)
}
