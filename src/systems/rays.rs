//! Ray generation and occlusion.

use glam::Vec2;

use crate::error::{LightError, Result};
use crate::physics::{Aabb, PhysicsQuery, RayFilter};

/// Fewest rays a light can be built with.
pub const MIN_RAYS: usize = 3;

/// Axis offsets below this squared length are replaced by a unit offset.
const DEGENERATE_AXIS_SQ: f32 = 0.1;
const SNAP_EPSILON: f32 = 1e-6;

/// Per-light ray scratch. Lengths are fixed at construction and reused
/// every frame.
#[derive(Clone, Debug)]
pub struct RayBuffers {
    pub start: Vec<Vec2>,
    pub end: Vec<Vec2>,
    /// Hit fraction per ray, 1 when unoccluded.
    pub fraction: Vec<f32>,
}

impl RayBuffers {
    pub fn new(ray_num: usize) -> Result<Self> {
        if ray_num < MIN_RAYS {
            log::warn!("rejecting light with {ray_num} rays");
            return Err(LightError::TooFewRays {
                requested: ray_num,
                min: MIN_RAYS,
            });
        }
        Ok(Self {
            start: vec![Vec2::ZERO; ray_num],
            end: vec![Vec2::ZERO; ray_num],
            fraction: vec![1.0; ray_num],
        })
    }

    pub fn len(&self) -> usize {
        self.end.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end.is_empty()
    }

    /// Fan of rays from `origin`. `directions` holds one unit vector per ray
    /// (see [`radial_directions`]).
    pub fn radial(&mut self, origin: Vec2, distance: f32, directions: &[Vec2]) {
        for (i, dir) in directions.iter().enumerate().take(self.len()) {
            self.start[i] = origin;
            self.end[i] = origin + *dir * distance;
            self.fraction[i] = 1.0;
        }
    }

    /// Parallel rays covering `bounds`, travelling along `dir` (cos, sin).
    ///
    /// Ray offsets snap to a grid twice the ray spacing so scrolling the
    /// view does not make the edges crawl.
    pub fn parallel(&mut self, bounds: Aabb, dir: Vec2) {
        let size_of_screen = bounds.width().max(bounds.height());

        let mut axis = dir * size_of_screen;
        if axis.x * axis.x < DEGENERATE_AXIS_SQ && axis.y * axis.y < DEGENERATE_AXIS_SQ {
            axis = Vec2::ONE;
        }

        let width_offset = size_of_screen * -dir.y;
        let height_offset = size_of_screen * dir.x;
        let center = bounds.center();
        let mut x = center.x - width_offset;
        let mut y = center.y - height_offset;

        let steps = (self.len() - 1) as f32;
        let portion_x = 2.0 * width_offset / steps;
        if portion_x.abs() > SNAP_EPSILON {
            x = (x / (portion_x * 2.0)).floor() * portion_x * 2.0;
        }
        let portion_y = 2.0 * height_offset / steps;
        if portion_y.abs() > SNAP_EPSILON {
            y = (y / (portion_y * 2.0)).ceil() * portion_y * 2.0;
        }

        for i in 0..self.len() {
            let stepped = Vec2::new(i as f32 * portion_x + x, i as f32 * portion_y + y);
            self.start[i] = stepped - axis;
            self.end[i] = stepped + axis;
            self.fraction[i] = 1.0;
        }
    }
}

/// Unit directions for a radial fan: `ray_num - 1` equal steps over the full
/// circle starting at `offset_deg`, so the last ray repeats the first angle.
pub fn radial_directions(ray_num: usize, offset_deg: f32, out: &mut Vec<Vec2>) {
    out.clear();
    if ray_num < 2 {
        return;
    }
    let step = 360.0 / (ray_num - 1) as f32;
    out.extend((0..ray_num).map(|i| Vec2::from_angle((offset_deg + step * i as f32).to_radians())));
}

/// Clip every ray at its nearest hit.
pub fn cast_rays<P: PhysicsQuery>(physics: &P, rays: &mut RayBuffers, filter: &RayFilter) {
    for i in 0..rays.len() {
        if rays.start[i].distance_squared(rays.end[i]) <= f32::EPSILON {
            continue;
        }
        if let Some(hit) = physics.raycast_nearest(rays.start[i], rays.end[i], filter) {
            rays.end[i] = hit.point;
            rays.fraction[i] = hit.fraction;
        }
    }
}
