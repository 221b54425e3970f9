use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;
use lance_lights::renderer::DrawStats;
use lance_lights::scene::test_scene::load_test_scene;
use lance_lights::{LightContext, LightSource, LightingConfig, Result, ShadowWorld, Viewport};

#[derive(Parser)]
#[command(name = "lance-lights", about = "Headless 2D light and shadow demo")]
struct Args {
    /// Lighting config (JSON); defaults are used for missing fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames to simulate
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Rays per light
    #[arg(long, default_value_t = 128)]
    rays: usize,

    /// Height-based shadows instead of ray occlusion
    #[arg(long)]
    pseudo3d: bool,

    /// Soft light edges
    #[arg(long)]
    soft: bool,
}

const FRAME_DT: f32 = 1.0 / 60.0;
const MOVER_ORBIT: f32 = 4.0;

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => LightingConfig::from_json_file(path)?,
        None => LightingConfig::night(),
    };
    if args.pseudo3d {
        config = config.with_pseudo3d(true);
    }

    let mut world = ShadowWorld::new();
    let mut scene = load_test_scene(&mut world, &config, args.rays, args.soft)?;
    let mut viewport = Viewport::new(Vec2::ZERO, Vec2::new(40.0, 22.5));
    log::info!(
        "scene ready: {} fixtures, {} lights, pseudo3d={}",
        world.fixture_count(),
        scene.lights.len(),
        config.pseudo3d
    );

    let probes = [Vec2::ZERO, Vec2::new(6.0, -8.0), Vec2::new(-5.0, 6.0)];
    let mut stats = DrawStats::default();
    let mut elapsed = 0.0_f32;

    for frame in 0..args.frames {
        elapsed += FRAME_DT;

        // Drive the torch body around the origin; the camera drifts along.
        let pos = Vec2::from_angle(elapsed) * MOVER_ORBIT;
        world.set_transform(scene.mover, pos, elapsed);
        viewport.pan(Vec2::new(FRAME_DT, 0.0));

        let ctx = LightContext::new(&world, &config, viewport.bounds());
        stats.reset();
        for light in &mut scene.lights {
            light.update(&ctx);
            light.render(&mut stats);
        }
        for light in &scene.lights {
            light.render_dynamic_shadows(&mut stats);
        }

        if frame % 30 == 0 {
            let lit: Vec<bool> = probes
                .iter()
                .map(|p| scene.lights.iter().any(|light| light.contains(*p)))
                .collect();
            log::info!(
                "frame {frame}: {} lights drawn, {} draw calls, {} vertices, {} shadow passes, \
                 probes lit {:?}",
                stats.lights_rendered,
                stats.draw_calls,
                stats.vertices,
                stats.shadow_passes,
                lit
            );
        }
    }

    for light in &mut scene.lights {
        light.dispose();
    }
    log::info!("done after {} frames", args.frames);
    Ok(())
}
