use std::path::PathBuf;

/// Errors from building or drawing a frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("graphics device unavailable: {0}")]
    Device(String),
    #[error("surface error: {0}")]
    Surface(String),
    #[error("graphics device out of memory")]
    OutOfMemory,
    #[error("shader `{label}` failed to compile: {message}")]
    Shader { label: String, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture data is {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

impl RenderError {
    /// Whether the render loop can keep going after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Surface(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_surface_errors_are_recoverable() {
        assert!(!RenderError::Surface("timeout".into()).is_fatal());

        assert!(RenderError::OutOfMemory.is_fatal());
        assert!(RenderError::Device("no adapter".into()).is_fatal());
        assert!(
            RenderError::Shader {
                label: "stage".into(),
                message: "bad token".into(),
            }
            .is_fatal()
        );
        assert!(
            RenderError::Io {
                path: PathBuf::from("missing.png"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .is_fatal()
        );
        assert!(
            RenderError::TextureSize {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15,
            }
            .is_fatal()
        );
    }
}
