use glam::Vec2;

use super::{LightContext, LightCore, LightSource};
use crate::components::Color;
use crate::config::LightingConfig;
use crate::error::Result;
use crate::physics::{Aabb, BodyId, PhysicsQuery};
use crate::renderer::mesh::Topology;
use crate::systems::containment::polygon_contains;
use crate::systems::dynamic_shadow::ShadowProjection;
use crate::systems::rays::radial_directions;
use crate::systems::visibility::{build_fan_mesh, build_radial_soft_mesh};

/// Smallest reach a point light can be given.
pub const MIN_DISTANCE: f32 = 0.01;

#[derive(Clone, Copy, Debug)]
struct Attachment {
    body: BodyId,
    offset: Vec2,
    /// Degrees added to the body angle.
    angle_offset: f32,
}

/// Circular light radiating from a point.
pub struct PointLight {
    core: LightCore,
    position: Vec2,
    distance: f32,
    /// Degrees; angle of the first ray.
    direction: f32,
    height: f32,
    directions: Vec<Vec2>,
    attachment: Option<Attachment>,
    ignore_attached_body: bool,
}

impl PointLight {
    pub fn new(
        ray_num: usize,
        color: Color,
        distance: f32,
        position: Vec2,
        config: &LightingConfig,
    ) -> Result<Self> {
        let core = LightCore::new(ray_num, color, Topology::TriangleFan, config)?;
        Ok(Self {
            core,
            position,
            distance: distance.max(MIN_DISTANCE),
            direction: 0.0,
            height: 0.0,
            directions: Vec::with_capacity(ray_num),
            attachment: None,
            ignore_attached_body: false,
        })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.core.dirty = true;
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Reach of the light, never below [`MIN_DISTANCE`].
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.max(MIN_DISTANCE);
        self.core.dirty = true;
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Height above the ground for pseudo-3D shadows. 0 puts the light on
    /// the ground, where every caster shades the rest of its range.
    pub fn set_height(&mut self, height: f32) {
        self.height = height;
        self.core.dirty = true;
    }

    /// Follow `body` each update, `offset` in body-local space. The ray fan
    /// turns with the body, shifted by `angle_offset` degrees.
    pub fn attach_to_body(&mut self, body: BodyId, offset: Vec2, angle_offset: f32) {
        self.attachment = Some(Attachment {
            body,
            offset,
            angle_offset,
        });
        self.core.dirty = true;
    }

    pub fn detach(&mut self) {
        self.attachment = None;
        self.core.dirty = true;
    }

    pub fn attached_body(&self) -> Option<BodyId> {
        self.attachment.map(|a| a.body)
    }

    /// Let rays pass through the body this light is attached to.
    pub fn set_ignore_attached_body(&mut self, ignore: bool) {
        self.ignore_attached_body = ignore;
        self.core.dirty = true;
    }

    fn follow_body<P: PhysicsQuery>(&mut self, physics: &P) {
        let Some(attachment) = self.attachment else {
            return;
        };
        let Some(body) = physics.body_transform(attachment.body) else {
            log::debug!("light attached to missing body {:?}", attachment.body);
            return;
        };
        let position = body.world_point(attachment.offset);
        let direction = body.angle.to_degrees() + attachment.angle_offset;
        if position != self.position || direction != self.direction {
            self.position = position;
            self.direction = direction;
            self.core.dirty = true;
        }
    }

    fn bounds(&self, margin: f32) -> Aabb {
        Aabb::from_center(self.position, Vec2::splat(self.distance + margin))
    }
}

impl LightSource for PointLight {
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
        if let Some(physics) = ctx.physics {
            if !self.core.static_light {
                self.follow_body(physics);
            }
        }
        if self.core.dirty {
            radial_directions(self.core.rays.len(), self.direction, &mut self.directions);
        }

        let reach = self.bounds(self.core.soft_length);
        self.core.culled = ctx.config.culling && !reach.overlaps(&ctx.viewport);
        if self.core.culled {
            return;
        }

        // Shadows track casters every frame, static or not.
        match ctx.physics {
            Some(physics) if ctx.config.pseudo3d => {
                let projection = ShadowProjection::Positional {
                    origin: self.position,
                    height: self.height,
                    range: self.distance,
                };
                self.core.rebuild_shadows(physics, self.bounds(0.0), projection, ctx.config);
            }
            _ => self.core.clear_shadows(),
        }

        if !self.core.take_rebuild() {
            return;
        }

        self.core.rays.radial(self.position, self.distance, &self.directions);
        let ignore = self.attachment.filter(|_| self.ignore_attached_body).map(|a| a.body);
        self.core.cast(ctx, ignore);

        let core = &mut self.core;
        build_fan_mesh(&mut core.light_mesh, self.position, &core.rays, core.color_bits);
        if core.wants_soft_mesh(ctx.config) {
            build_radial_soft_mesh(
                &mut core.soft_mesh,
                &core.rays,
                &self.directions,
                core.color_bits,
                core.soft_length,
            );
        } else {
            core.soft_mesh.clear();
        }
    }

    /// Inside the clipped fan. Anything at or beyond the light's reach is
    /// outside.
    fn contains(&self, point: Vec2) -> bool {
        if self.position.distance_squared(point) >= self.distance * self.distance {
            return false;
        }
        polygon_contains(
            std::iter::once(self.position).chain(self.core.rays.end.iter().copied()),
            point,
        )
    }
}
