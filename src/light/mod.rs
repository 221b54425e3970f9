//! Lights.
//!
//! Each light owns its ray buffers and meshes and is updated once per frame
//! against a read-only [`LightContext`]. [`Light`] is the closed set of
//! light kinds; [`LightSource`] carries the shared API.

mod directional;
mod point;

use glam::Vec2;

use crate::components::{Color, ContactFilter};
use crate::config::LightingConfig;
use crate::error::Result;
use crate::physics::{Aabb, BodyId, FixtureId, PhysicsQuery, RayFilter};
use crate::renderer::mesh::{LightMesh, Topology};
use crate::renderer::LightRenderTarget;
use crate::systems::dynamic_shadow::{
    collect_affected, ShadowBuilder, ShadowMeshPool, ShadowProjection,
};
use crate::systems::rays::{cast_rays, RayBuffers};

pub use directional::DirectionalLight;
pub use point::PointLight;

/// Everything a light reads during `update`. Built once per frame and
/// shared by every light.
pub struct LightContext<'a, P: PhysicsQuery> {
    /// Occluders. Without one, rays stay unclipped and no dynamic shadows
    /// are built.
    pub physics: Option<&'a P>,
    pub config: &'a LightingConfig,
    /// World-space bounds of the current view.
    pub viewport: Aabb,
}

impl<'a, P: PhysicsQuery> LightContext<'a, P> {
    pub fn new(physics: &'a P, config: &'a LightingConfig, viewport: Aabb) -> Self {
        Self {
            physics: Some(physics),
            config,
            viewport,
        }
    }

    pub fn without_physics(config: &'a LightingConfig, viewport: Aabb) -> Self {
        Self {
            physics: None,
            config,
            viewport,
        }
    }

    /// Physics to clip rays against, unless the light sees through
    /// everything or heights replace occlusion.
    fn occluders(&self, xray: bool) -> Option<&'a P> {
        self.physics.filter(|_| !xray && !self.config.pseudo3d)
    }
}

/// State shared by every light kind.
pub struct LightCore {
    rays: RayBuffers,
    color: Color,
    color_bits: f32,
    soft: bool,
    soft_length: f32,
    xray: bool,
    static_light: bool,
    dirty: bool,
    active: bool,
    culled: bool,
    filter: Option<ContactFilter>,
    light_mesh: LightMesh,
    soft_mesh: LightMesh,
    shadows: ShadowMeshPool,
    shadow_builder: ShadowBuilder,
    affected: Vec<FixtureId>,
}

impl LightCore {
    fn new(
        ray_num: usize,
        color: Color,
        topology: Topology,
        config: &LightingConfig,
    ) -> Result<Self> {
        let rays = RayBuffers::new(ray_num)?;
        Ok(Self {
            rays,
            color,
            color_bits: color.to_float_bits(),
            soft: true,
            soft_length: config.soft_shadow_length,
            xray: false,
            static_light: false,
            dirty: true,
            active: true,
            culled: false,
            filter: None,
            light_mesh: LightMesh::with_capacity(topology, ray_num + 1),
            soft_mesh: LightMesh::with_capacity(Topology::TriangleStrip, ray_num * 2),
            shadows: ShadowMeshPool::new(),
            shadow_builder: ShadowBuilder::new(),
            affected: Vec::new(),
        })
    }

    pub fn rays(&self) -> &RayBuffers {
        &self.rays
    }

    pub fn ray_count(&self) -> usize {
        self.rays.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_culled(&self) -> bool {
        self.culled
    }

    /// Casters found by the last affected-set query, one entry per report.
    pub fn affected(&self) -> &[FixtureId] {
        &self.affected
    }

    /// Whether geometry must be rebuilt this frame. Clears the dirty flag.
    fn take_rebuild(&mut self) -> bool {
        if self.static_light && !self.dirty {
            return false;
        }
        self.dirty = false;
        true
    }

    fn cast<P: PhysicsQuery>(&mut self, ctx: &LightContext<'_, P>, ignore_body: Option<BodyId>) {
        if let Some(physics) = ctx.occluders(self.xray) {
            let filter = RayFilter {
                contact_filter: self.filter,
                ignore_body,
            };
            cast_rays(physics, &mut self.rays, &filter);
        }
    }

    fn wants_soft_mesh(&self, config: &LightingConfig) -> bool {
        self.soft && !self.xray && !config.pseudo3d
    }

    /// Query the casters in `bounds` and build one shadow strip per report.
    fn rebuild_shadows<P: PhysicsQuery>(
        &mut self,
        physics: &P,
        bounds: Aabb,
        projection: ShadowProjection,
        config: &LightingConfig,
    ) {
        collect_affected(physics, bounds, self.filter.as_ref(), &mut self.affected);
        self.shadows.begin();
        for &id in &self.affected {
            let mesh = self.shadows.next_slot();
            if let Err(skip) = self.shadow_builder.build(physics, id, projection, config, mesh) {
                log::debug!("no shadow from {id:?}: {skip}");
                self.shadows.release_last();
            }
        }
        self.shadows.finish();
    }

    fn clear_shadows(&mut self) {
        self.affected.clear();
        self.shadows.clear();
    }
}

/// Shared light API. Kinds provide access to their [`LightCore`] plus
/// `update` and `contains`; everything else is common.
pub trait LightSource {
    fn core(&self) -> &LightCore;

    fn core_mut(&mut self) -> &mut LightCore;

    /// Recompute rays and meshes for this frame.
    fn update<P: PhysicsQuery>(&mut self, ctx: &LightContext<'_, P>);

    /// Whether `point` lies in the lit area.
    fn contains(&self, point: Vec2) -> bool;

    fn color(&self) -> Color {
        self.core().color
    }

    fn set_color(&mut self, color: Color) {
        let core = self.core_mut();
        core.color = color;
        core.color_bits = color.to_float_bits();
        core.dirty = true;
    }

    fn is_soft(&self) -> bool {
        self.core().soft
    }

    fn set_soft(&mut self, soft: bool) {
        let core = self.core_mut();
        core.soft = soft;
        core.dirty = true;
    }

    fn softness_length(&self) -> f32 {
        self.core().soft_length
    }

    fn set_softness_length(&mut self, length: f32) {
        let core = self.core_mut();
        core.soft_length = length;
        core.dirty = true;
    }

    fn is_xray(&self) -> bool {
        self.core().xray
    }

    /// An x-ray light ignores every occluder.
    fn set_xray(&mut self, xray: bool) {
        let core = self.core_mut();
        core.xray = xray;
        core.dirty = true;
    }

    fn is_static(&self) -> bool {
        self.core().static_light
    }

    /// Static lights only rebuild after a setter marks them dirty.
    fn set_static(&mut self, static_light: bool) {
        let core = self.core_mut();
        core.static_light = static_light;
        core.dirty = true;
    }

    fn is_active(&self) -> bool {
        self.core().active
    }

    fn set_active(&mut self, active: bool) {
        let core = self.core_mut();
        core.active = active;
        if active {
            core.dirty = true;
        }
    }

    fn set_contact_filter(&mut self, filter: Option<ContactFilter>) {
        let core = self.core_mut();
        core.filter = filter;
        core.dirty = true;
    }

    fn mark_dirty(&mut self) {
        self.core_mut().dirty = true;
    }

    fn light_mesh(&self) -> &LightMesh {
        &self.core().light_mesh
    }

    /// Empty when soft edges are off or not applicable.
    fn soft_mesh(&self) -> &LightMesh {
        &self.core().soft_mesh
    }

    fn shadow_meshes(&self) -> &[LightMesh] {
        self.core().shadows.meshes()
    }

    fn render<T: LightRenderTarget + ?Sized>(&self, target: &mut T) {
        let core = self.core();
        if !core.active || core.culled {
            return;
        }
        target.light_rendered();
        target.draw(&core.light_mesh);
        target.draw(&core.soft_mesh);
    }

    /// Draw the pseudo-3D shadow strips. Switches `target` to shadow
    /// blending first, so call it after every light's `render`.
    fn render_dynamic_shadows<T: LightRenderTarget + ?Sized>(&self, target: &mut T) {
        let core = self.core();
        if !core.active || core.culled || core.shadows.is_empty() {
            return;
        }
        target.shadow_pass();
        for mesh in core.shadows.meshes() {
            target.draw(mesh);
        }
    }

    /// Release every mesh. The light draws nothing until updated again.
    fn dispose(&mut self) {
        let core = self.core_mut();
        core.light_mesh = LightMesh::new(core.light_mesh.topology);
        core.soft_mesh = LightMesh::new(Topology::TriangleStrip);
        core.clear_shadows();
        core.dirty = true;
    }
}

/// Every light kind.
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl Light {
    pub fn as_point(&self) -> Option<&PointLight> {
        match self {
            Light::Point(light) => Some(light),
            Light::Directional(_) => None,
        }
    }

    pub fn as_point_mut(&mut self) -> Option<&mut PointLight> {
        match self {
            Light::Point(light) => Some(light),
            Light::Directional(_) => None,
        }
    }

    pub fn as_directional_mut(&mut self) -> Option<&mut DirectionalLight> {
        match self {
            Light::Directional(light) => Some(light),
            Light::Point(_) => None,
        }
    }
}

impl LightSource for Light {
    fn core(&self) -> &LightCore {
        match self {
            Light::Point(light) => light.core(),
            Light::Directional(light) => light.core(),
        }
    }

    fn core_mut(&mut self) -> &mut LightCore {
        match self {
            Light::Point(light) => light.core_mut(),
            Light::Directional(light) => light.core_mut(),
        }
    }

    fn update<P: PhysicsQuery>(&mut self, ctx: &LightContext<'_, P>) {
        match self {
            Light::Point(light) => light.update(ctx),
            Light::Directional(light) => light.update(ctx),
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        match self {
            Light::Point(light) => light.contains(point),
            Light::Directional(light) => light.contains(point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CasterData, Shape};
    use crate::physics::{FixtureDef, ShadowWorld};
    use crate::renderer::DrawStats;

    fn view() -> Aabb {
        Aabb::new(Vec2::splat(-20.0), Vec2::splat(20.0))
    }

    #[test]
    fn inactive_light_neither_updates_nor_renders() {
        let config = LightingConfig::default();
        let mut light: Light = PointLight::new(16, Color::WHITE, 5.0, Vec2::ZERO, &config)
            .unwrap()
            .into();
        light.set_active(false);
        light.update(&LightContext::<ShadowWorld>::without_physics(&config, view()));

        let mut stats = DrawStats::default();
        light.render(&mut stats);
        assert_eq!(stats.lights_rendered, 0);
        assert!(light.light_mesh().is_empty());
    }

    #[test]
    fn render_counts_each_light_once() {
        let config = LightingConfig::default();
        let ctx = LightContext::<ShadowWorld>::without_physics(&config, view());
        let mut lights: Vec<Light> = vec![
            PointLight::new(16, Color::WHITE, 5.0, Vec2::ZERO, &config).unwrap().into(),
            DirectionalLight::new(16, Color::WHITE, -90.0, &config).unwrap().into(),
        ];
        let mut stats = DrawStats::default();
        for light in &mut lights {
            light.update(&ctx);
            light.render(&mut stats);
        }
        assert_eq!(stats.lights_rendered, 2);
        // Light mesh plus soft edge for each.
        assert_eq!(stats.draw_calls, 4);
    }

    #[test]
    fn xray_and_pseudo3d_drop_the_soft_edge() {
        let config = LightingConfig::default();
        let ctx = LightContext::<ShadowWorld>::without_physics(&config, view());
        let mut light = PointLight::new(16, Color::WHITE, 5.0, Vec2::ZERO, &config).unwrap();
        light.update(&ctx);
        assert!(!light.soft_mesh().is_empty());

        light.set_xray(true);
        light.update(&ctx);
        assert!(light.soft_mesh().is_empty());

        let pseudo = LightingConfig::pseudo3d();
        let ctx = LightContext::<ShadowWorld>::without_physics(&pseudo, view());
        light.set_xray(false);
        light.update(&ctx);
        assert!(light.soft_mesh().is_empty());
    }

    #[test]
    fn dispose_releases_meshes() {
        let mut world = ShadowWorld::new();
        let body = world.create_body(Vec2::new(3.0, 0.0), 0.0);
        world.create_fixture(
            body,
            FixtureDef::new(Shape::rect(Vec2::ONE)).with_caster(CasterData::new(1.0)),
        );

        let config = LightingConfig::pseudo3d();
        let ctx = LightContext::new(&world, &config, view());
        let mut light = PointLight::new(16, Color::WHITE, 8.0, Vec2::ZERO, &config).unwrap();
        light.set_height(2.0);
        light.update(&ctx);
        assert_eq!(light.shadow_meshes().len(), 1);

        let mut stats = DrawStats::default();
        light.render(&mut stats);
        light.render_dynamic_shadows(&mut stats);
        assert_eq!(stats.shadow_passes, 1);
        assert_eq!(stats.draw_calls, 2);

        light.dispose();
        assert!(light.light_mesh().is_empty());
        assert!(light.shadow_meshes().is_empty());
        assert!(light.core().is_dirty());
    }

    #[test]
    fn contact_filter_lets_light_pass_other_categories() {
        let mut world = ShadowWorld::new();
        let body = world.create_body(Vec2::new(3.0, 0.0), 0.0);
        let glass = ContactFilter::new(0x0002, 0xffff, 0);
        world.create_fixture(body, FixtureDef::new(Shape::rect(Vec2::ONE)).with_filter(glass));

        let config = LightingConfig::default();
        let ctx = LightContext::new(&world, &config, view());
        let mut light = PointLight::new(5, Color::WHITE, 8.0, Vec2::ZERO, &config).unwrap();
        light.update(&ctx);
        assert!(light.core().rays().fraction[0] < 1.0);

        light.set_contact_filter(Some(ContactFilter::new(0x0001, 0x0001, 0)));
        light.update(&ctx);
        assert_eq!(light.core().rays().fraction[0], 1.0);
    }
}
