use glam::Vec2;
use sketch_common::HostSize;

/// Map a pointer position in logical pixels to the normalized mouse space
/// used by shader uniforms.
///
/// The container center maps to the origin, edges to ±0.5. Y points up, so the
/// top edge is +0.5 and the bottom edge -0.5.
pub fn normalize_pointer(x: f32, y: f32, size: HostSize) -> Vec2 {
    if size.is_empty() {
        tracing::debug!("pointer moved over an empty container; ignoring");
        return Vec2::ZERO;
    }
    Vec2::new(
        x / size.width as f32 - 0.5,
        -(y / size.height as f32) + 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn center_maps_to_origin() {
        let size = HostSize::new(800, 600, 1.0);
        assert!(close(normalize_pointer(400.0, 300.0, size), Vec2::ZERO));
    }

    #[test]
    fn corners_map_to_half_extents() {
        let size = HostSize::new(800, 600, 1.0);
        assert!(close(normalize_pointer(0.0, 0.0, size), Vec2::new(-0.5, 0.5)));
        assert!(close(normalize_pointer(800.0, 600.0, size), Vec2::new(0.5, -0.5)));
    }

    #[test]
    fn matches_formula_across_positions() {
        let size = HostSize::new(1280, 720, 2.0);
        for (px, py) in [(0.0, 0.0), (13.0, 700.0), (640.0, 1.5), (1279.0, 359.0)] {
            let expected = Vec2::new(px / 1280.0 - 0.5, -(py / 720.0) + 0.5);
            assert!(close(normalize_pointer(px, py, size), expected));
        }
    }

    #[test]
    fn empty_container_yields_origin() {
        let size = HostSize::new(0, 0, 1.0);
        assert_eq!(normalize_pointer(5.0, 5.0, size), Vec2::ZERO);
    }
}
