//! Physics collaborator seam.
//!
//! Lights never own or step the physics scene. Everything they need goes
//! through [`PhysicsQuery`]: nearest-hit ray casts, box queries, read access
//! to fixture geometry and the per-caster shadow counters. [`ShadowWorld`] is
//! the in-crate implementation backed by a `hecs::World`.

pub mod raycast;
mod world;

use glam::Vec2;
use hecs::Entity;

use crate::components::{Body, CasterData, ContactFilter, Fixture, Shape};

pub use world::{FixtureDef, ShadowWorld};

/// Handle to a fixture entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FixtureId(pub Entity);

/// Handle to a body entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyId(pub Entity);

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Nearest intersection along a cast segment.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub fixture: FixtureId,
    pub point: Vec2,
    /// Position along the segment, 0 at start and 1 at end.
    pub fraction: f32,
}

/// Per-light restrictions on which fixtures block a ray.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayFilter {
    pub contact_filter: Option<ContactFilter>,
    pub ignore_body: Option<BodyId>,
}

impl RayFilter {
    pub fn accepts(&self, fixture: &Fixture) -> bool {
        if fixture.sensor {
            return false;
        }
        if self.ignore_body == Some(BodyId(fixture.body)) {
            return false;
        }
        match &self.contact_filter {
            Some(filter) => filter.should_collide(&fixture.filter),
            None => true,
        }
    }
}

/// Borrowed view of one fixture for the duration of a query.
pub struct FixtureView<'a> {
    pub id: FixtureId,
    pub body_id: BodyId,
    pub body: &'a Body,
    pub shape: &'a Shape,
    pub sensor: bool,
    pub filter: ContactFilter,
    pub caster: Option<&'a CasterData>,
}

impl FixtureView<'_> {
    pub fn center(&self) -> Vec2 {
        self.body.world_center()
    }

    /// World-space ring of a polygon or chain. Leaves `out` empty for other
    /// shapes.
    pub fn world_vertices(&self, out: &mut Vec<Vec2>) {
        out.clear();
        match self.shape {
            Shape::Polygon { vertices } | Shape::Chain { vertices, .. } => {
                out.extend(vertices.iter().map(|v| self.body.world_point(*v)))
            }
            Shape::Circle { .. } | Shape::Edge { .. } => {}
        }
    }

    /// Point containment, boundary inclusive. Chains and edges have no
    /// interior and always report `false`.
    pub fn test_point(&self, point: Vec2) -> bool {
        match self.shape {
            Shape::Polygon { vertices } => {
                let local = Vec2::from_angle(-self.body.angle).rotate(point - self.body.position);
                raycast::convex_contains(vertices, local)
            }
            Shape::Circle { radius, offset } => {
                let center = self.body.world_point(*offset);
                center.distance_squared(point) <= radius * radius
            }
            Shape::Chain { .. } | Shape::Edge { .. } => false,
        }
    }
}

/// Services a light consumes from the physics scene.
///
/// `query_region` may report the same fixture more than once (one report per
/// broad-phase proxy, e.g. per chain segment). Callers count reports to
/// derive the shadow blend factor.
pub trait PhysicsQuery {
    fn raycast_nearest(&self, start: Vec2, end: Vec2, filter: &RayFilter) -> Option<RayHit>;

    /// Visit fixtures overlapping `bounds`. The visitor returns `false` to stop.
    fn query_region(&self, bounds: Aabb, visitor: &mut dyn FnMut(FixtureId) -> bool);

    /// Run `f` against a borrowed view of the fixture. `None` if the fixture
    /// or its body no longer exists.
    fn with_fixture<R>(&self, id: FixtureId, f: impl FnOnce(&FixtureView<'_>) -> R) -> Option<R>;

    /// Mutate the caster metadata of a fixture. Returns `false` when the
    /// fixture carries none.
    fn update_caster(&self, id: FixtureId, f: impl FnOnce(&mut CasterData)) -> bool;

    /// Current transform of a body, for lights attached to it.
    fn body_transform(&self, id: BodyId) -> Option<Body>;
}
