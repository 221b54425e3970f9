use glam::Vec2;
use hecs::Entity;

/// Rigid-body world transform. Fixtures are expressed in this frame.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub position: Vec2,
    /// Rotation in radians.
    pub angle: f32,
    /// Center of mass, body-local.
    pub local_center: Vec2,
}

impl Body {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self {
            position,
            angle,
            local_center: Vec2::ZERO,
        }
    }

    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.angle).rotate(local)
    }

    pub fn world_center(&self) -> Vec2 {
        self.world_point(self.local_center)
    }
}

/// Collision shape attached to a fixture, in body-local coordinates.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Convex polygon, counter-clockwise.
    Polygon { vertices: Vec<Vec2> },
    /// Polyline; `looped` closes the last vertex back to the first.
    Chain { vertices: Vec<Vec2>, looped: bool },
    Circle { radius: f32, offset: Vec2 },
    Edge { v1: Vec2, v2: Vec2 },
}

impl Shape {
    /// Axis-aligned box, `half_extents` from the body origin.
    pub fn rect(half_extents: Vec2) -> Self {
        let Vec2 { x: hx, y: hy } = half_extents;
        Shape::Polygon {
            vertices: vec![
                Vec2::new(-hx, -hy),
                Vec2::new(hx, -hy),
                Vec2::new(hx, hy),
                Vec2::new(-hx, hy),
            ],
        }
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle {
            radius,
            offset: Vec2::ZERO,
        }
    }
}

/// Collision filtering bits, Box2D semantics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactFilter {
    pub category_bits: u16,
    pub mask_bits: u16,
    pub group_index: i16,
}

impl ContactFilter {
    pub fn new(category_bits: u16, mask_bits: u16, group_index: i16) -> Self {
        Self {
            category_bits,
            mask_bits,
            group_index,
        }
    }

    /// Same group overrides the bits: positive always collides, negative never.
    pub fn should_collide(&self, other: &ContactFilter) -> bool {
        if self.group_index == other.group_index && self.group_index != 0 {
            return self.group_index > 0;
        }
        (self.mask_bits & other.category_bits) != 0 && (self.category_bits & other.mask_bits) != 0
    }
}

impl Default for ContactFilter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xffff,
            group_index: 0,
        }
    }
}

/// A shape attached to a body entity.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub body: Entity,
    pub shape: Shape,
    /// Sensors never block light or cast shadows.
    pub sensor: bool,
    pub filter: ContactFilter,
}

/// Shadow-caster metadata attached to a fixture entity.
#[derive(Clone, Debug, Default)]
pub struct CasterData {
    /// Elevation of the obstacle top.
    pub height: f32,
    /// Lights/queries currently casting through this fixture. Reset when a
    /// light rebuilds its affected set.
    pub shadows_dropped: u32,
    pub tag: Option<u64>,
}

impl CasterData {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            shadows_dropped: 0,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: u64) -> Self {
        self.tag = Some(tag);
        self
    }
}
