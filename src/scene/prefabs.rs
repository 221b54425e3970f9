use glam::Vec2;

use crate::components::{CasterData, Shape};
use crate::physics::{BodyId, FixtureDef, FixtureId, ShadowWorld};

// ---------------------------------------------------------------------------
// Caster factories
// ---------------------------------------------------------------------------

/// Spawn a box caster `height` tall. Returns the body and its fixture.
pub fn spawn_box_caster(
    world: &mut ShadowWorld,
    pos: Vec2,
    half_extents: Vec2,
    angle: f32,
    height: f32,
) -> (BodyId, FixtureId) {
    spawn_caster(world, pos, angle, Shape::rect(half_extents), height)
}

/// Spawn a round pillar.
pub fn spawn_pillar(
    world: &mut ShadowWorld,
    pos: Vec2,
    radius: f32,
    height: f32,
) -> (BodyId, FixtureId) {
    spawn_caster(world, pos, 0.0, Shape::circle(radius), height)
}

/// Spawn a closed wall outline through `points`, given relative to `pos`.
/// Chains report one broad-phase hit per overlapping segment, so their
/// shadows blend as several fragments.
pub fn spawn_wall_loop(
    world: &mut ShadowWorld,
    pos: Vec2,
    points: Vec<Vec2>,
    height: f32,
) -> (BodyId, FixtureId) {
    let shape = Shape::Chain {
        vertices: points,
        looped: true,
    };
    spawn_caster(world, pos, 0.0, shape, height)
}

/// Spawn a thin fence between two points.
pub fn spawn_fence(
    world: &mut ShadowWorld,
    from: Vec2,
    to: Vec2,
    height: f32,
) -> (BodyId, FixtureId) {
    let shape = Shape::Edge { v1: from, v2: to };
    spawn_caster(world, Vec2::ZERO, 0.0, shape, height)
}

/// Spawn a sensor area: never blocks light, never casts a shadow.
pub fn spawn_trigger(
    world: &mut ShadowWorld,
    pos: Vec2,
    half_extents: Vec2,
) -> (BodyId, FixtureId) {
    world.create_body_with(pos, 0.0, FixtureDef::new(Shape::rect(half_extents)).sensor())
}

fn spawn_caster(
    world: &mut ShadowWorld,
    pos: Vec2,
    angle: f32,
    shape: Shape,
    height: f32,
) -> (BodyId, FixtureId) {
    world.create_body_with(pos, angle, FixtureDef::new(shape).with_caster(CasterData::new(height)))
}
