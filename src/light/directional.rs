use glam::Vec2;

use super::{LightContext, LightCore, LightSource};
use crate::components::Color;
use crate::config::LightingConfig;
use crate::error::Result;
use crate::physics::PhysicsQuery;
use crate::renderer::mesh::Topology;
use crate::systems::containment::polygon_contains;
use crate::systems::dynamic_shadow::ShadowProjection;
use crate::systems::visibility::{build_parallel_soft_mesh, build_ribbon_mesh};

/// Light from a source at infinite distance: parallel rays across the whole
/// view.
pub struct DirectionalLight {
    core: LightCore,
    /// Degrees. -90 shines straight down.
    direction: f32,
    /// (cos, sin) of `direction`.
    dir: Vec2,
    /// Sun elevation in degrees, `None` when below the horizon.
    elevation: Option<f32>,
}

impl DirectionalLight {
    pub fn new(
        ray_num: usize,
        color: Color,
        direction: f32,
        config: &LightingConfig,
    ) -> Result<Self> {
        let core = LightCore::new(ray_num, color, Topology::TriangleStrip, config)?;
        let mut light = Self {
            core,
            direction: 0.0,
            dir: Vec2::X,
            elevation: Some(0.0),
        };
        light.set_direction(direction);
        Ok(light)
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn set_direction(&mut self, degrees: f32) {
        self.direction = degrees;
        self.dir = Vec2::from_angle(degrees.to_radians());
        self.core.dirty = true;
    }

    pub fn elevation(&self) -> Option<f32> {
        self.elevation
    }

    /// Sun elevation in degrees, for pseudo-3D shadows.
    ///
    /// Negative values clamp to 0 and the angle wraps at 360. Past 180 the
    /// sun has set and no shadows are cast; between 90 and 180 the angle is
    /// folded back by 90.
    pub fn set_height(&mut self, degrees: f32) {
        self.elevation = if degrees < 0.0 {
            Some(0.0)
        } else {
            let degrees = degrees % 360.0;
            if degrees > 180.0 {
                None
            } else if degrees > 90.0 {
                Some(degrees - 90.0)
            } else {
                Some(degrees)
            }
        };
    }
}

impl LightSource for DirectionalLight {
    fn core(&self) -> &LightCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LightCore {
        &mut self.core
    }

    fn update<P: PhysicsQuery>(&mut self, ctx: &LightContext<'_, P>) {
        if !self.core.active {
            return;
        }
        let bounds = ctx.viewport;

        // Shadows follow the view every frame, static or not.
        match (ctx.physics, self.elevation) {
            (Some(physics), Some(elevation)) if ctx.config.pseudo3d => {
                let projection = ShadowProjection::Directional {
                    dir: self.dir,
                    elevation,
                    reach: bounds.width().max(bounds.height()),
                };
                self.core.rebuild_shadows(physics, bounds, projection, ctx.config);
            }
            _ => self.core.clear_shadows(),
        }

        if !self.core.take_rebuild() {
            return;
        }

        self.core.rays.parallel(bounds, self.dir);
        self.core.cast(ctx, None);

        let core = &mut self.core;
        build_ribbon_mesh(&mut core.light_mesh, &core.rays, core.color_bits);
        if core.wants_soft_mesh(ctx.config) {
            build_parallel_soft_mesh(
                &mut core.soft_mesh,
                &core.rays,
                self.dir,
                core.color_bits,
                core.soft_length,
            );
        } else {
            core.soft_mesh.clear();
        }
    }

    /// Inside the outline of the ray ribbon: clipped ends in ray order, then
    /// starts back to the first.
    fn contains(&self, point: Vec2) -> bool {
        let rays = &self.core.rays;
        polygon_contains(
            rays.end.iter().chain(rays.start.iter().rev()).copied(),
            point,
        )
    }
}
