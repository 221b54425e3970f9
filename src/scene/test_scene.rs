use glam::Vec2;

use crate::components::Color;
use crate::config::LightingConfig;
use crate::error::Result;
use crate::light::{DirectionalLight, Light, LightSource, PointLight};
use crate::physics::{BodyId, ShadowWorld};
use crate::scene::prefabs::{
    spawn_box_caster, spawn_fence, spawn_pillar, spawn_trigger, spawn_wall_loop,
};

/// Demo scene: casters in the world plus the lights shining on them.
pub struct DemoScene {
    pub lights: Vec<Light>,
    /// Body the demo drives around each frame; the torch follows it.
    pub mover: BodyId,
}

/// Populate `world` and build the demo lights.
pub fn load_test_scene(
    world: &mut ShadowWorld,
    config: &LightingConfig,
    rays: usize,
    soft: bool,
) -> Result<DemoScene> {
    for &(x, y, h) in &[(6.0_f32, -4.0_f32, 2.0_f32), (-5.0, 3.0, 3.5), (3.0, 7.0, 1.5)] {
        spawn_box_caster(world, Vec2::new(x, y), Vec2::new(1.25, 1.75), 0.3, h);
    }
    spawn_pillar(world, Vec2::new(-6.0, -6.0), 1.0, 4.0);
    spawn_wall_loop(
        world,
        Vec2::new(12.0, 2.0),
        vec![
            Vec2::new(-2.0, -2.0),
            Vec2::new(2.0, -2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(-2.0, 2.0),
        ],
        2.5,
    );
    spawn_fence(world, Vec2::new(-12.0, -3.0), Vec2::new(-12.0, 3.0), 1.0);
    spawn_trigger(world, Vec2::new(0.0, -9.0), Vec2::new(2.0, 1.0));

    let (mover, _) = spawn_box_caster(world, Vec2::new(0.0, -2.0), Vec2::splat(0.5), 0.0, 1.0);

    let mut torch = PointLight::new(
        rays,
        Color::new(1.0, 0.6, 0.2, 0.9),
        15.0,
        Vec2::ZERO,
        config,
    )?;
    torch.attach_to_body(mover, Vec2::new(0.0, 0.8), 0.0);
    torch.set_ignore_attached_body(true);
    torch.set_height(3.0);
    torch.set_soft(soft);

    let mut lamp = PointLight::new(
        rays,
        Color::new(0.2, 0.4, 1.0, 0.8),
        12.0,
        Vec2::new(-4.0, -2.0),
        config,
    )?;
    lamp.set_static(true);
    lamp.set_height(5.0);
    lamp.set_soft(soft);

    let mut sun = DirectionalLight::new(rays, Color::new(1.0, 0.95, 0.85, 0.5), -60.0, config)?;
    sun.set_height(50.0);
    sun.set_soft(soft);

    Ok(DemoScene {
        lights: vec![torch.into(), lamp.into(), sun.into()],
        mover,
    })
}
