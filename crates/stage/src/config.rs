//! Typed configuration for both demos, with the defaults the demos ship with.
//!
//! Every field has a default, so a YAML file only needs the keys it changes:
//!
//! ```yaml
//! viewport:
//!   rotation_step: 0.02
//! shader:
//!   matcap_path: assets/matcap.png
//!   clear_color: [0.1, 0.1, 0.1, 1.0]
//! ```

use crate::StageError;
use serde::{Deserialize, Serialize};
use sketch_render::{ColorSpace, RendererOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance from the origin along +Z.
    pub camera_z: f32,
    /// Cube edge length.
    pub cube_size: f32,
    /// Radians added to the cube's X and Y rotation every frame.
    pub rotation_step: f32,
    pub antialias: bool,
    pub clear_color: [f64; 4],
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near: 0.01,
            far: 10.0,
            camera_z: 1.0,
            cube_size: 0.2,
            rotation_step: 0.01,
            antialias: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl ViewportConfig {
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            antialias: self.antialias,
            clear_color: self.clear_color,
            output: ColorSpace::Srgb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderStageConfig {
    /// Matte-capture image sampled by the fragment shader.
    pub matcap_path: PathBuf,
    /// Directory holding `stage.vert.wgsl` / `stage.frag.wgsl`. When unset the
    /// shaders built into the binary are used.
    pub shader_dir: Option<PathBuf>,
    /// Aspect ratio (height / width) the shader content is corrected to.
    pub image_aspect: f32,
    pub camera_z: f32,
    pub near: f32,
    pub far: f32,
    pub antialias: bool,
    pub output: ColorSpace,
    pub clear_color: [f64; 4],
}

impl Default for ShaderStageConfig {
    fn default() -> Self {
        Self {
            matcap_path: PathBuf::from("assets/matcap.png"),
            shader_dir: None,
            image_aspect: 1.0,
            camera_z: 2.0,
            near: -1000.0,
            far: 1000.0,
            antialias: true,
            output: ColorSpace::Srgb,
            clear_color: [0.933, 0.933, 0.933, 1.0],
        }
    }
}

impl ShaderStageConfig {
    pub fn renderer_options(&self) -> RendererOptions {
        RendererOptions {
            antialias: self.antialias,
            clear_color: self.clear_color,
            output: self.output,
        }
    }
}

/// Configuration for both demos, as loaded from a YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub viewport: ViewportConfig,
    pub shader: ShaderStageConfig,
}

impl SketchConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, StageError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StageError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| StageError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, StageError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_defaults() {
        let c = ViewportConfig::default();
        assert_eq!(c.fov_degrees, 70.0);
        assert_eq!(c.near, 0.01);
        assert_eq!(c.far, 10.0);
        assert_eq!(c.camera_z, 1.0);
        assert_eq!(c.cube_size, 0.2);
        assert_eq!(c.rotation_step, 0.01);
        assert!(c.renderer_options().antialias);
    }

    #[test]
    fn shader_defaults() {
        let c = ShaderStageConfig::default();
        assert_eq!(c.matcap_path, PathBuf::from("assets/matcap.png"));
        assert_eq!(c.image_aspect, 1.0);
        assert!(c.shader_dir.is_none());
        let options = c.renderer_options();
        assert!(options.antialias);
        assert_eq!(options.output, ColorSpace::Srgb);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "viewport:\n  rotation_step: 0.02\nshader:\n  output: linear\n";
        let config = SketchConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.viewport.rotation_step, 0.02);
        assert_eq!(config.viewport.fov_degrees, 70.0);
        assert_eq!(config.shader.output, ColorSpace::Linear);
        assert_eq!(config.shader.camera_z, 2.0);
    }

    #[test]
    fn yaml_round_trip() {
        let mut config = SketchConfig::default();
        config.shader.shader_dir = Some(PathBuf::from("shaders"));
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SketchConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = SketchConfig::from_yaml_str("viewport: [1, 2").unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sketch.yaml");
        std::fs::write(&path, "viewport:\n  cube_size: 0.5\n").unwrap();
        let config = SketchConfig::load(&path).unwrap();
        assert_eq!(config.viewport.cube_size, 0.5);

        let err = SketchConfig::load(tmp.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, StageError::ConfigIo { .. }));
    }
}
