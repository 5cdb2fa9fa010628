use serde::{Deserialize, Serialize};

/// Upper bound applied to the host's device pixel ratio before sizing a
/// render surface.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Clamp a device pixel ratio to `(0, MAX_PIXEL_RATIO]`.
///
/// Non-finite or non-positive ratios fall back to 1.0.
pub fn clamp_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return 1.0;
    }
    device_pixel_ratio.min(MAX_PIXEL_RATIO)
}

/// Dimensions of the element (window or container) a demo renders into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostSize {
    /// Logical width in pixels.
    pub width: u32,
    /// Logical height in pixels.
    pub height: u32,
    /// Raw device pixel ratio reported by the host.
    pub device_pixel_ratio: f32,
}

impl Default for HostSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            device_pixel_ratio: 1.0,
        }
    }
}

impl HostSize {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// True when either dimension is zero (e.g. a minimized window).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height. Returns 1.0 for empty sizes.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// Device pixel ratio clamped to [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f32 {
        clamp_pixel_ratio(self.device_pixel_ratio)
    }

    /// Drawing-buffer size: logical size scaled by the clamped pixel ratio.
    pub fn physical(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            (self.width as f32 * ratio).round() as u32,
            (self.height as f32 * ratio).round() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        assert_eq!(HostSize::new(100, 100, 3.0).pixel_ratio(), 2.0);
        assert_eq!(HostSize::new(100, 100, 1.5).pixel_ratio(), 1.5);
        assert_eq!(clamp_pixel_ratio(2.0), 2.0);
    }

    #[test]
    fn bogus_pixel_ratio_falls_back_to_one() {
        assert_eq!(clamp_pixel_ratio(0.0), 1.0);
        assert_eq!(clamp_pixel_ratio(-2.0), 1.0);
        assert_eq!(clamp_pixel_ratio(f32::NAN), 1.0);
    }

    #[test]
    fn aspect_and_physical_size() {
        let size = HostSize::new(1024, 768, 2.5);
        assert!((size.aspect() - 1024.0 / 768.0).abs() < 1e-6);
        assert_eq!(size.physical(), (2048, 1536));
    }

    #[test]
    fn empty_size_has_unit_aspect() {
        let size = HostSize::new(0, 600, 1.0);
        assert!(size.is_empty());
        assert_eq!(size.aspect(), 1.0);
    }

    #[test]
    fn host_size_serde_round_trip() {
        let size = HostSize::new(640, 480, 2.0);
        let json = serde_json::to_string(&size).unwrap();
        let back: HostSize = serde_json::from_str(&json).unwrap();
        assert_eq!(size, back);
    }
}
