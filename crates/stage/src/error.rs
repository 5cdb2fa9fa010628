use sketch_common::HostSize;
use sketch_render::RenderError;
use std::path::PathBuf;

/// Errors from constructing or running a demo controller.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("container has no area: {0:?}")]
    InvalidContainer(HostSize),
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("unknown demo `{0}` (expected `viewport` or `shader`)")]
    UnknownDemo(String),
}

impl StageError {
    /// Whether the animation loop must stop after this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Render(err) => err.is_fatal(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_errors_keep_their_severity() {
        assert!(!StageError::from(RenderError::Surface("outdated".into())).is_fatal());
        assert!(StageError::from(RenderError::OutOfMemory).is_fatal());
    }

    #[test]
    fn setup_errors_are_fatal() {
        assert!(StageError::InvalidContainer(HostSize::new(0, 600, 1.0)).is_fatal());
        assert!(StageError::UnknownDemo("teapot".into()).is_fatal());
        assert!(
            StageError::ConfigIo {
                path: PathBuf::from("sketch.yaml"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .is_fatal()
        );
    }
}
