use glam::{Mat4, Vec2};

use crate::physics::Aabb;

/// 2D orthographic view. Directional lights span its bounds and positional
/// lights outside it are culled.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub position: Vec2,
    /// Visible world extent at zoom 1.
    pub size: Vec2,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            zoom: 1.0,
        }
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(f32::EPSILON);
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    /// World-space rectangle currently visible.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.size * 0.5 * self.zoom)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let b = self.bounds();
        Mat4::orthographic_rh_gl(b.min.x, b.max.x, b.min.y, b.max.y, -1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_zoom_and_pan() {
        let mut view = Viewport::new(Vec2::ZERO, Vec2::new(40.0, 20.0));
        assert_eq!(view.bounds().min, Vec2::new(-20.0, -10.0));

        view.set_zoom(0.5);
        view.pan(Vec2::new(5.0, 0.0));
        let b = view.bounds();
        assert_eq!(b.min, Vec2::new(-5.0, -5.0));
        assert_eq!(b.max, Vec2::new(15.0, 5.0));
    }

    #[test]
    fn projection_maps_bounds_to_clip_space() {
        let mut view = Viewport::new(Vec2::new(10.0, 0.0), Vec2::new(40.0, 20.0));
        view.set_zoom(2.0);
        let proj = view.projection_matrix();
        let min = proj.project_point3(view.bounds().min.extend(0.0));
        let max = proj.project_point3(view.bounds().max.extend(0.0));
        assert!((min.x + 1.0).abs() < 1e-5 && (min.y + 1.0).abs() < 1e-5);
        assert!((max.x - 1.0).abs() < 1e-5 && (max.y - 1.0).abs() < 1e-5);
    }
}
