use sketch_common::HostSize;

/// An event produced by the host window and routed to the active controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// The container changed size or pixel density.
    Resized(HostSize),
    /// The pointer moved to a logical pixel position inside the container.
    PointerMoved { x: f32, y: f32 },
    /// The host asked the demo to shut down.
    CloseRequested,
}

impl HostEvent {
    pub fn resized(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self::Resized(HostSize::new(width, height, device_pixel_ratio))
    }

    pub fn pointer(x: f32, y: f32) -> Self {
        Self::PointerMoved { x, y }
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resized(_) => "resize",
            Self::PointerMoved { .. } => "pointer-move",
            Self::CloseRequested => "close",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resized_carries_host_size() {
        let e = HostEvent::resized(1024, 768, 2.0);
        assert_eq!(e, HostEvent::Resized(HostSize::new(1024, 768, 2.0)));
        assert_eq!(e.kind(), "resize");
    }

    #[test]
    fn pointer_event_kind() {
        let e = HostEvent::pointer(10.0, 20.0);
        assert!(matches!(e, HostEvent::PointerMoved { x, y } if x == 10.0 && y == 20.0));
        assert_eq!(e.kind(), "pointer-move");
        assert_eq!(HostEvent::CloseRequested.kind(), "close");
    }
}
