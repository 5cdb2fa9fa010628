use crate::RenderError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Decoded RGBA8 image, uploaded to the GPU once by the renderer.
#[derive(Clone, PartialEq)]
pub struct Texture {
    /// Where the pixels came from, for logs and reports.
    pub source: String,
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("source", &self.source)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Texture {
    /// Load and decode an image file (PNG or JPEG) into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(source) => RenderError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => RenderError::Texture {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!("loaded texture {} ({width}x{height})", path.display());
        Self::from_rgba(path.display().to_string(), width, height, rgba.into_raw())
    }

    /// Wrap raw RGBA8 pixels.
    pub fn from_rgba(
        source: impl Into<String>,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected || expected == 0 {
            return Err(RenderError::TextureSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            source: source.into(),
            width,
            height,
            pixels,
        })
    }

    /// A 1x1 texture of a single color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            source: format!("solid#{:02x}{:02x}{:02x}{:02x}", rgba[0], rgba[1], rgba[2], rgba[3]),
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// WGSL sources for the two programmable stages of a shader material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub label: String,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(
        label: impl Into<String>,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read `<stem>.vert.wgsl` and `<stem>.frag.wgsl` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>, stem: &str) -> Result<Self, RenderError> {
        let dir = dir.as_ref();
        let read = |path: PathBuf| {
            std::fs::read_to_string(&path).map_err(|source| RenderError::Io { path, source })
        };
        let vertex = read(dir.join(format!("{stem}.vert.wgsl")))?;
        let fragment = read(dir.join(format!("{stem}.frag.wgsl")))?;
        Ok(Self::new(stem, vertex, fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_checks_length() {
        assert!(Texture::from_rgba("t", 2, 2, vec![0; 16]).is_ok());
        let err = Texture::from_rgba("t", 2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, RenderError::TextureSize { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn solid_is_one_pixel() {
        let t = Texture::solid([255, 0, 128, 255]);
        assert_eq!((t.width, t.height), (1, 1));
        assert_eq!(t.pixels(), &[255, 0, 128, 255]);
        assert_eq!(t.source, "solid#ff0080ff");
    }

    #[test]
    fn load_decodes_png() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("matcap.png");
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let tex = Texture::load(&path).unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(&tex.pixels()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Texture::load(tmp.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn shader_sources_from_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("stage.vert.wgsl"), "// vs").unwrap();
        std::fs::write(tmp.path().join("stage.frag.wgsl"), "// fs").unwrap();
        let sources = ShaderSources::from_dir(tmp.path(), "stage").unwrap();
        assert_eq!(sources.label, "stage");
        assert_eq!(sources.vertex, "// vs");
        assert_eq!(sources.fragment, "// fs");
    }

    #[test]
    fn shader_sources_missing_stage() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("stage.vert.wgsl"), "// vs").unwrap();
        let err = ShaderSources::from_dir(tmp.path(), "stage").unwrap_err();
        assert!(matches!(err, RenderError::Io { path, .. } if path.ends_with("stage.frag.wgsl")));
    }
}
