//! Pseudo-3D shadow volumes.
//!
//! Every caster overlapping a light's bounds gets one strip per frame:
//! silhouette vertex (near colour) paired with the same vertex pushed away
//! from the light by its shadow length (far colour). All vertices of one
//! strip carry the caster's blend factor `1 / shadows_dropped`.

use glam::Vec2;
use thiserror::Error;

use super::shadow_length::{shadow_limit, sun_shadow_length};
use super::silhouette::{detect_silhouette, Silhouette};
use crate::components::{CasterData, Color, ContactFilter, Shape};
use crate::config::LightingConfig;
use crate::physics::{Aabb, FixtureId, FixtureView, PhysicsQuery};
use crate::renderer::mesh::{LightMesh, Topology};

/// Why a caster produced no shadow this frame. Never fatal: the caster is
/// skipped and the rest of the affected set is still built.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ShadowSkip {
    #[error("fixture no longer exists")]
    Missing,
    #[error("fixture carries no caster data")]
    NoCasterData,
    #[error("sensor fixtures cast no shadow")]
    Sensor,
    #[error("light is inside circle caster (distance {distance} < radius {radius})")]
    LightInsideCircle { distance: f32, radius: f32 },
}

/// Where shadows are cast from.
#[derive(Clone, Copy, Debug)]
pub enum ShadowProjection {
    /// Light at `origin`, `height` above the ground, reaching `range`.
    Positional { origin: Vec2, height: f32, range: f32 },
    /// Light at infinity travelling along `dir`, `elevation` degrees above
    /// the horizon. Each caster is lit from a virtual origin `reach` units
    /// back along `dir`; shadows are capped at `reach`.
    Directional { dir: Vec2, elevation: f32, reach: f32 },
}

impl ShadowProjection {
    fn origin_for(&self, center: Vec2) -> Vec2 {
        match *self {
            ShadowProjection::Positional { origin, .. } => origin,
            ShadowProjection::Directional { dir, reach, .. } => center - dir * reach,
        }
    }

    fn length(&self, light: Vec2, vertex: Vec2, caster_height: f32) -> f32 {
        match *self {
            ShadowProjection::Positional { height, range, .. } => {
                shadow_limit(light.distance(vertex), caster_height, height, range)
            }
            ShadowProjection::Directional { elevation, reach, .. } => {
                sun_shadow_length(caster_height, elevation, reach)
            }
        }
    }
}

/// Blend factor for a caster, `1 / shadows_dropped`.
pub fn blend_factor(caster: &CasterData) -> f32 {
    if caster.shadows_dropped == 0 {
        log::trace!("caster used before its shadow count was taken, blending at full weight");
        return 1.0;
    }
    1.0 / caster.shadows_dropped as f32
}

/// Packed (near, far) colours of a shadow strip.
pub fn shadow_colors(ambient: Color, interpolate: bool, blend: f32) -> (f32, f32) {
    let near = if interpolate {
        Color::CLEAR.lerp(ambient, 1.0 - blend)
    } else {
        Color::CLEAR
    };
    (near.to_float_bits(), ambient.to_float_bits())
}

/// Rebuild the affected set: every fixture whose proxy overlaps `bounds`.
///
/// Counters of reported casters are zeroed during the query and then
/// incremented once per report, so a fixture reported twice (one report per
/// chain segment, say) ends up with a count of two.
pub fn collect_affected<P: PhysicsQuery>(
    physics: &P,
    bounds: Aabb,
    filter: Option<&ContactFilter>,
    affected: &mut Vec<FixtureId>,
) {
    affected.clear();
    physics.query_region(bounds, &mut |id| {
        if let Some(filter) = filter {
            let collides = physics
                .with_fixture(id, |view| filter.should_collide(&view.filter))
                .unwrap_or(false);
            if !collides {
                return true;
            }
        }
        physics.update_caster(id, |caster| caster.shadows_dropped = 0);
        affected.push(id);
        true
    });
    for id in affected.iter() {
        physics.update_caster(*id, |caster| caster.shadows_dropped += 1);
    }
}

/// Reusable per-light scratch for shadow strips.
#[derive(Default)]
pub struct ShadowBuilder {
    ring: Vec<Vec2>,
    silhouette: Silhouette,
}

impl ShadowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill `mesh` with the shadow strip of one caster. An empty mesh is a
    /// valid result (caster entirely facing the light, or light touching it).
    pub fn build<P: PhysicsQuery>(
        &mut self,
        physics: &P,
        fixture: FixtureId,
        projection: ShadowProjection,
        config: &LightingConfig,
        mesh: &mut LightMesh,
    ) -> Result<(), ShadowSkip> {
        mesh.clear();
        mesh.topology = Topology::TriangleStrip;
        physics
            .with_fixture(fixture, |view| self.build_view(view, projection, config, mesh))
            .unwrap_or(Err(ShadowSkip::Missing))
    }

    fn build_view(
        &mut self,
        view: &FixtureView<'_>,
        projection: ShadowProjection,
        config: &LightingConfig,
        mesh: &mut LightMesh,
    ) -> Result<(), ShadowSkip> {
        if view.sensor {
            return Err(ShadowSkip::Sensor);
        }
        let caster = view.caster.ok_or(ShadowSkip::NoCasterData)?;
        let f = blend_factor(caster);
        let (near, far) = shadow_colors(config.ambient_light, config.shadow_color_interpolation, f);

        let mut emit = |vertex: Vec2, light: Vec2| {
            let l = projection.length(light, vertex, caster.height);
            let end = vertex + (vertex - light).normalize_or_zero() * l;
            mesh.push(vertex, near, f);
            mesh.push(end, far, f);
        };

        match view.shape {
            Shape::Polygon { .. } | Shape::Chain { .. } => {
                let closed = match view.shape {
                    Shape::Chain { looped, .. } => *looped,
                    _ => true,
                };
                view.world_vertices(&mut self.ring);
                let center = view.center();
                let light = projection.origin_for(center);
                detect_silhouette(
                    light,
                    center,
                    &self.ring,
                    closed,
                    |p| view.test_point(p),
                    &mut self.silhouette,
                );
                for &i in &self.silhouette.indices {
                    emit(self.ring[i], light);
                }
            }
            Shape::Circle { radius, offset } => {
                let center = view.body.world_point(*offset);
                let light = projection.origin_for(center);
                let distance = center.distance(light);
                if distance < *radius || distance <= f32::EPSILON {
                    log::warn!(
                        "light at {light} is inside circle caster {:?}, skipping its shadow",
                        view.id
                    );
                    return Err(ShadowSkip::LightInsideCircle {
                        distance,
                        radius: *radius,
                    });
                }

                // Tangent points sit `a` either side of the direction to the
                // light; sample the far arc between them, both included.
                let a = (radius / distance).min(1.0).acos();
                let points = config.circle_approx_points.max(2);
                let step = (std::f32::consts::TAU - 2.0 * a) / (points - 1) as f32;
                let to_light = (light - center).normalize() * *radius;
                for k in 0..points {
                    let rim = Vec2::from_angle(a + step * k as f32).rotate(to_light);
                    emit(center + rim, light);
                }
            }
            Shape::Edge { v1, v2 } => {
                let center = view.center();
                let light = projection.origin_for(center);
                emit(view.body.world_point(*v1), light);
                emit(view.body.world_point(*v2), light);
            }
        }
        Ok(())
    }
}

/// Shadow meshes reused across frames, one slot per affected caster.
#[derive(Default)]
pub struct ShadowMeshPool {
    meshes: Vec<LightMesh>,
    used: usize,
}

impl ShadowMeshPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.used = 0;
    }

    /// Next free slot, allocated on first use.
    pub fn next_slot(&mut self) -> &mut LightMesh {
        if self.used == self.meshes.len() {
            self.meshes.push(LightMesh::new(Topology::TriangleStrip));
        }
        self.used += 1;
        &mut self.meshes[self.used - 1]
    }

    /// Give back the slot handed out last.
    pub fn release_last(&mut self) {
        self.used = self.used.saturating_sub(1);
    }

    /// Drop every mesh past the slots used this frame.
    pub fn finish(&mut self) {
        self.meshes.truncate(self.used);
    }

    pub fn meshes(&self) -> &[LightMesh] {
        &self.meshes[..self.used]
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CasterData;
    use crate::physics::{BodyId, FixtureDef, ShadowWorld};
    use approx::assert_abs_diff_eq;

    fn positional(origin: Vec2, height: f32) -> ShadowProjection {
        ShadowProjection::Positional {
            origin,
            height,
            range: 10.0,
        }
    }

    fn world_with(
        shape: Shape,
        at: Vec2,
        caster: Option<CasterData>,
    ) -> (ShadowWorld, BodyId, FixtureId) {
        let mut world = ShadowWorld::new();
        let body = world.create_body(at, 0.0);
        let mut def = FixtureDef::new(shape);
        def.caster = caster;
        let id = world.create_fixture(body, def).unwrap();
        (world, body, id)
    }

    fn build(
        world: &ShadowWorld,
        id: FixtureId,
        projection: ShadowProjection,
    ) -> (Result<(), ShadowSkip>, LightMesh) {
        let mut mesh = LightMesh::new(Topology::TriangleStrip);
        let mut builder = ShadowBuilder::new();
        let result = builder.build(world, id, projection, &LightingConfig::default(), &mut mesh);
        (result, mesh)
    }

    #[test]
    fn counters_reset_then_counted() {
        let (world, _, id) = world_with(
            Shape::rect(Vec2::ONE),
            Vec2::new(5.0, 0.0),
            Some(CasterData::new(1.0)),
        );
        world.update_caster(id, |c| c.shadows_dropped = 7);

        let mut affected = Vec::new();
        let bounds = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        collect_affected(&world, bounds, None, &mut affected);

        assert_eq!(affected, vec![id]);
        assert_eq!(world.caster(id).unwrap().shadows_dropped, 1);

        collect_affected(&world, bounds, None, &mut affected);
        assert_eq!(world.caster(id).unwrap().shadows_dropped, 1);
    }

    #[test]
    fn filtered_fixtures_are_not_affected() {
        let mut world = ShadowWorld::new();
        let body = world.create_body(Vec2::new(3.0, 0.0), 0.0);
        let def = FixtureDef::new(Shape::rect(Vec2::ONE))
            .with_caster(CasterData::new(1.0))
            .with_filter(ContactFilter::new(0x0002, 0xffff, 0));
        world.create_fixture(body, def);

        let only_first = ContactFilter::new(0x0001, 0x0001, 0);
        let mut affected = Vec::new();
        let bounds = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        collect_affected(&world, bounds, Some(&only_first), &mut affected);
        assert!(affected.is_empty());
    }

    #[test]
    fn square_shadow_from_ground_light() {
        let (world, _, id) = world_with(
            Shape::rect(Vec2::ONE),
            Vec2::new(5.0, 0.0),
            Some(CasterData::new(1.0)),
        );
        world.update_caster(id, |c| c.shadows_dropped = 1);
        let (result, mesh) = build(&world, id, positional(Vec2::ZERO, 0.0));

        assert!(result.is_ok());
        assert_eq!(mesh.len() % 2, 0);
        assert!(!mesh.is_empty());
        for pair in mesh.vertices.chunks(2) {
            let near = pair[0].pos();
            let far = pair[1].pos();
            let expected = 10.0 - near.length();
            assert_abs_diff_eq!(far.distance(near), expected, epsilon = 1e-4);
            assert_abs_diff_eq!(far.length(), 10.0, epsilon = 1e-4);
            assert_eq!(pair[0].s, 1.0);
        }
    }

    #[test]
    fn blend_factor_splits_over_reports() {
        let caster = CasterData {
            shadows_dropped: 4,
            ..CasterData::new(1.0)
        };
        assert_eq!(blend_factor(&caster), 0.25);
        assert_eq!(blend_factor(&CasterData::new(1.0)), 1.0);
    }

    #[test]
    fn interpolated_near_colour_darkens_with_overlap() {
        let ambient = Color::new(0.2, 0.2, 0.2, 1.0);
        let (flat_near, far) = shadow_colors(ambient, false, 0.5);
        assert_eq!(flat_near, Color::CLEAR.to_float_bits());
        assert_eq!(far, ambient.to_float_bits());

        let (near, _) = shadow_colors(ambient, true, 1.0);
        assert_eq!(near, Color::CLEAR.to_float_bits());
        let (near, _) = shadow_colors(ambient, true, 0.5);
        assert_eq!(near, Color::CLEAR.lerp(ambient, 0.5).to_float_bits());
    }

    #[test]
    fn sensors_and_plain_fixtures_are_skipped() {
        let (world, _, plain) = world_with(Shape::rect(Vec2::ONE), Vec2::new(5.0, 0.0), None);
        assert_eq!(
            build(&world, plain, positional(Vec2::ZERO, 0.0)).0,
            Err(ShadowSkip::NoCasterData)
        );

        let mut world = ShadowWorld::new();
        let body = world.create_body(Vec2::new(5.0, 0.0), 0.0);
        let sensor = world
            .create_fixture(
                body,
                FixtureDef::new(Shape::rect(Vec2::ONE)).with_caster(CasterData::new(1.0)).sensor(),
            )
            .unwrap();
        assert_eq!(build(&world, sensor, positional(Vec2::ZERO, 0.0)).0, Err(ShadowSkip::Sensor));
    }

    #[test]
    fn destroyed_fixture_is_missing() {
        let (mut world, _, id) = world_with(
            Shape::rect(Vec2::ONE),
            Vec2::new(5.0, 0.0),
            Some(CasterData::new(1.0)),
        );
        world.destroy_fixture(id);
        assert_eq!(build(&world, id, positional(Vec2::ZERO, 0.0)).0, Err(ShadowSkip::Missing));
    }

    #[test]
    fn circle_far_arc_is_sampled() {
        let (world, _, id) = world_with(
            Shape::circle(1.0),
            Vec2::new(5.0, 0.0),
            Some(CasterData::new(1.0)),
        );
        let (result, mesh) = build(&world, id, positional(Vec2::ZERO, 0.0));
        assert!(result.is_ok());
        let points = LightingConfig::default().circle_approx_points;
        assert_eq!(mesh.len(), 2 * points);

        let a = (1.0f32 / 5.0).acos();
        let first = mesh.vertices[0].pos() - Vec2::new(5.0, 0.0);
        let last = mesh.vertices[mesh.len() - 2].pos() - Vec2::new(5.0, 0.0);
        // Tangent points, `a` either side of the direction back to the light.
        assert_abs_diff_eq!(first.angle_to(-Vec2::X).abs(), a, epsilon = 1e-4);
        assert_abs_diff_eq!(last.angle_to(-Vec2::X).abs(), a, epsilon = 1e-4);
        for v in mesh.vertices.iter().step_by(2) {
            assert_abs_diff_eq!(v.pos().distance(Vec2::new(5.0, 0.0)), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn circle_touching_light_does_not_crash() {
        let (world, _, id) = world_with(
            Shape::circle(1.0),
            Vec2::new(1.0, 0.0),
            Some(CasterData::new(1.0)),
        );
        let (result, mesh) = build(&world, id, positional(Vec2::ZERO, 0.0));
        assert!(result.is_ok());
        assert!(mesh.vertices.iter().all(|v| v.pos().is_finite()));
    }

    #[test]
    fn light_inside_circle_is_skipped() {
        let (world, _, id) = world_with(
            Shape::circle(2.0),
            Vec2::new(1.0, 0.0),
            Some(CasterData::new(1.0)),
        );
        let (result, mesh) = build(&world, id, positional(Vec2::ZERO, 0.0));
        assert!(matches!(result, Err(ShadowSkip::LightInsideCircle { .. })));
        assert!(mesh.is_empty());
    }

    #[test]
    fn edge_projects_both_endpoints() {
        let edge = Shape::Edge {
            v1: Vec2::new(0.0, -1.0),
            v2: Vec2::new(0.0, 1.0),
        };
        let (world, _, id) = world_with(edge, Vec2::new(4.0, 0.0), Some(CasterData::new(1.0)));
        let (result, mesh) = build(&world, id, positional(Vec2::ZERO, 3.0));
        assert!(result.is_ok());
        assert_eq!(mesh.len(), 4);
        // 10 * 1 / (3 - 1) = 5, less than what is left of the range.
        assert_abs_diff_eq!(
            mesh.vertices[0].pos().distance(mesh.vertices[1].pos()),
            5.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn open_chain_strip_follows_its_segments() {
        let chain = Shape::Chain {
            vertices: vec![Vec2::new(-2.0, 0.0), Vec2::new(0.0, 2.0), Vec2::new(2.0, 0.0)],
            looped: false,
        };
        let (world, _, id) = world_with(chain, Vec2::ZERO, Some(CasterData::new(1.0)));
        let (result, mesh) = build(&world, id, positional(Vec2::new(0.0, -5.0), 0.0));
        assert!(result.is_ok());
        let near: Vec<Vec2> = mesh.vertices.chunks(2).map(|pair| pair[0].pos()).collect();
        // The mouth between (-2,0) and (2,0) is open, so those ends are
        // never neighbours in the strip.
        assert_eq!(near, vec![Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0), Vec2::new(-2.0, 0.0)]);
    }

    #[test]
    fn directional_shadow_has_constant_length() {
        let (world, _, id) = world_with(
            Shape::rect(Vec2::ONE),
            Vec2::ZERO,
            Some(CasterData::new(2.0)),
        );
        let projection = ShadowProjection::Directional {
            dir: Vec2::X,
            elevation: 45.0,
            reach: 100.0,
        };
        let (result, mesh) = build(&world, id, projection);
        assert!(result.is_ok());
        assert!(!mesh.is_empty());
        for pair in mesh.vertices.chunks(2) {
            let shift = pair[1].pos() - pair[0].pos();
            assert_abs_diff_eq!(shift.length(), 2.0, epsilon = 1e-2);
            assert!(shift.x > 0.0);
        }
    }

    #[test]
    fn pool_reuses_and_truncates() {
        let mut pool = ShadowMeshPool::new();
        pool.begin();
        for _ in 0..3 {
            pool.next_slot().push(Vec2::ZERO, 0.0, 1.0);
        }
        pool.finish();
        assert_eq!(pool.len(), 3);

        pool.begin();
        pool.next_slot();
        pool.next_slot();
        pool.release_last();
        pool.finish();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.meshes().len(), 1);
    }
}
