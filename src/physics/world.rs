use glam::Vec2;
use hecs::{Entity, EntityBuilder, World};

use super::raycast::{convex_contains, segment_circle, segment_ring, segment_segment};
use super::{Aabb, BodyId, FixtureId, FixtureView, PhysicsQuery, RayFilter, RayHit};
use crate::components::{Body, CasterData, ContactFilter, Fixture, Shape};

/// Everything needed to attach a fixture to a body.
#[derive(Clone, Debug)]
pub struct FixtureDef {
    pub shape: Shape,
    pub sensor: bool,
    pub filter: ContactFilter,
    pub caster: Option<CasterData>,
}

impl FixtureDef {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            sensor: false,
            filter: ContactFilter::default(),
            caster: None,
        }
    }

    pub fn with_caster(mut self, caster: CasterData) -> Self {
        self.caster = Some(caster);
        self
    }

    pub fn with_filter(mut self, filter: ContactFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }
}

/// Bodies and fixtures stored as `hecs` entities. Bodies carry a [`Body`];
/// fixtures carry a [`Fixture`] pointing at their body and, for shadow
/// casters, a [`CasterData`].
#[derive(Default)]
pub struct ShadowWorld {
    world: World,
}

impl ShadowWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_body(&mut self, position: Vec2, angle: f32) -> BodyId {
        BodyId(self.world.spawn((Body::new(position, angle),)))
    }

    /// Returns `false` if the body no longer exists.
    pub fn set_transform(&mut self, body: BodyId, position: Vec2, angle: f32) -> bool {
        match self.world.get::<&mut Body>(body.0) {
            Ok(mut b) => {
                b.position = position;
                b.angle = angle;
                true
            }
            Err(_) => false,
        }
    }

    pub fn body(&self, body: BodyId) -> Option<Body> {
        self.world.get::<&Body>(body.0).ok().map(|b| *b)
    }

    /// Attach a fixture. `None` if `body` does not exist.
    pub fn create_fixture(&mut self, body: BodyId, def: FixtureDef) -> Option<FixtureId> {
        if !self.world.contains(body.0) {
            return None;
        }
        Some(self.spawn_fixture(body, def))
    }

    /// Create a body carrying a single fixture.
    pub fn create_body_with(
        &mut self,
        position: Vec2,
        angle: f32,
        def: FixtureDef,
    ) -> (BodyId, FixtureId) {
        let body = self.create_body(position, angle);
        let fixture = self.spawn_fixture(body, def);
        (body, fixture)
    }

    fn spawn_fixture(&mut self, body: BodyId, def: FixtureDef) -> FixtureId {
        let mut builder = EntityBuilder::new();
        builder.add(Fixture {
            body: body.0,
            shape: def.shape,
            sensor: def.sensor,
            filter: def.filter,
        });
        if let Some(caster) = def.caster {
            builder.add(caster);
        }
        FixtureId(self.world.spawn(builder.build()))
    }

    pub fn destroy_fixture(&mut self, fixture: FixtureId) -> bool {
        self.world.despawn(fixture.0).is_ok()
    }

    /// Removes the body and every fixture attached to it.
    pub fn destroy_body(&mut self, body: BodyId) -> bool {
        let attached: Vec<Entity> = self
            .world
            .query::<&Fixture>()
            .iter()
            .filter(|(_, fixture)| fixture.body == body.0)
            .map(|(entity, _)| entity)
            .collect();
        for entity in attached {
            let _ = self.world.despawn(entity);
        }
        self.world.despawn(body.0).is_ok()
    }

    pub fn caster(&self, fixture: FixtureId) -> Option<CasterData> {
        self.world.get::<&CasterData>(fixture.0).ok().map(|c| (*c).clone())
    }

    pub fn fixture_count(&self) -> usize {
        self.world.query::<&Fixture>().iter().count()
    }
}

/// Cast in body-local space; fractions are invariant under the rigid
/// transform.
fn local_segment_fraction(body: &Body, shape: &Shape, start: Vec2, end: Vec2) -> Option<f32> {
    let inverse = Vec2::from_angle(-body.angle);
    let p1 = inverse.rotate(start - body.position);
    let p2 = inverse.rotate(end - body.position);
    match shape {
        Shape::Polygon { vertices } => {
            if convex_contains(vertices, p1) {
                None
            } else {
                segment_ring(p1, p2, vertices, true)
            }
        }
        Shape::Chain { vertices, looped } => segment_ring(p1, p2, vertices, *looped),
        Shape::Circle { radius, offset } => segment_circle(p1, p2, *offset, *radius),
        Shape::Edge { v1, v2 } => segment_segment(p1, p2, *v1, *v2),
    }
}

/// Broad-phase reports for one fixture: one per chain segment overlapping
/// `bounds`, otherwise at most one.
fn proxy_overlaps(body: &Body, shape: &Shape, bounds: &Aabb) -> usize {
    match shape {
        Shape::Chain { vertices, looped } => {
            let n = vertices.len();
            if n < 2 {
                return 0;
            }
            let segments = if *looped { n } else { n - 1 };
            (0..segments)
                .filter(|&i| {
                    let a = body.world_point(vertices[i]);
                    let b = body.world_point(vertices[(i + 1) % n]);
                    Aabb::new(a, b).overlaps(bounds)
                })
                .count()
        }
        Shape::Polygon { vertices } => {
            let mut points = vertices.iter().map(|v| body.world_point(*v));
            let Some(first) = points.next() else {
                return 0;
            };
            let aabb = points.fold(Aabb::new(first, first), |aabb, p| {
                Aabb::new(aabb.min.min(p), aabb.max.max(p))
            });
            usize::from(aabb.overlaps(bounds))
        }
        Shape::Circle { radius, offset } => {
            let aabb = Aabb::from_center(body.world_point(*offset), Vec2::splat(*radius));
            usize::from(aabb.overlaps(bounds))
        }
        Shape::Edge { v1, v2 } => {
            let aabb = Aabb::new(body.world_point(*v1), body.world_point(*v2));
            usize::from(aabb.overlaps(bounds))
        }
    }
}

impl PhysicsQuery for ShadowWorld {
    fn raycast_nearest(&self, start: Vec2, end: Vec2, filter: &RayFilter) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;

        // Broadphase: brute force over fixtures
        for (entity, fixture) in self.world.query::<&Fixture>().iter() {
            if !filter.accepts(fixture) {
                continue;
            }
            let Ok(body) = self.world.get::<&Body>(fixture.body) else {
                continue;
            };
            let Some(fraction) = local_segment_fraction(&body, &fixture.shape, start, end) else {
                continue;
            };
            let is_closer = best.as_ref().map_or(true, |b| fraction < b.fraction);
            if is_closer {
                best = Some(RayHit {
                    fixture: FixtureId(entity),
                    point: start + (end - start) * fraction,
                    fraction,
                });
            }
        }

        best
    }

    fn query_region(&self, bounds: Aabb, visitor: &mut dyn FnMut(FixtureId) -> bool) {
        let mut reports: Vec<FixtureId> = Vec::new();
        for (entity, fixture) in self.world.query::<&Fixture>().iter() {
            let Ok(body) = self.world.get::<&Body>(fixture.body) else {
                continue;
            };
            let count = proxy_overlaps(&body, &fixture.shape, &bounds);
            reports.extend(std::iter::repeat(FixtureId(entity)).take(count));
        }

        for id in reports {
            if !visitor(id) {
                break;
            }
        }
    }

    fn with_fixture<R>(&self, id: FixtureId, f: impl FnOnce(&FixtureView<'_>) -> R) -> Option<R> {
        let fixture = self.world.get::<&Fixture>(id.0).ok()?;
        let body = self.world.get::<&Body>(fixture.body).ok()?;
        let caster = self.world.get::<&CasterData>(id.0).ok();
        let view = FixtureView {
            id,
            body_id: BodyId(fixture.body),
            body: &*body,
            shape: &fixture.shape,
            sensor: fixture.sensor,
            filter: fixture.filter,
            caster: caster.as_deref(),
        };
        Some(f(&view))
    }

    fn update_caster(&self, id: FixtureId, f: impl FnOnce(&mut CasterData)) -> bool {
        match self.world.get::<&mut CasterData>(id.0) {
            Ok(mut data) => {
                f(&mut data);
                true
            }
            Err(_) => false,
        }
    }

    fn body_transform(&self, id: BodyId) -> Option<Body> {
        self.body(id)
    }
}
