pub mod mesh;
pub mod shader;

use glam::Mat4;
use mesh::{GpuMesh, LightMesh};
use shader::ShaderProgram;

use crate::error::Result;

const VERT_SRC: &str = include_str!("../../shaders/light.vert");
const FRAG_SRC: &str = include_str!("../../shaders/light.frag");

/// Where lights draw their meshes.
pub trait LightRenderTarget {
    /// Called once per light that renders this frame.
    fn light_rendered(&mut self);

    fn draw(&mut self, mesh: &LightMesh);

    /// Switch to shadow blending. Called once per light before its shadow
    /// strips are drawn.
    fn shadow_pass(&mut self) {}
}

/// Headless target that only counts what would be drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub lights_rendered: usize,
    pub draw_calls: usize,
    pub vertices: usize,
    pub shadow_passes: usize,
}

impl DrawStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl LightRenderTarget for DrawStats {
    fn light_rendered(&mut self) {
        self.lights_rendered += 1;
    }

    fn draw(&mut self, mesh: &LightMesh) {
        if mesh.is_empty() {
            return;
        }
        self.draw_calls += 1;
        self.vertices += mesh.len();
    }

    fn shadow_pass(&mut self) {
        self.shadow_passes += 1;
    }
}

/// Draws light meshes additively into the current framebuffer. Needs a
/// current GL context with loaded function pointers.
pub struct GlLightRenderer {
    shader: ShaderProgram,
    buffer: GpuMesh,
    pub stats: DrawStats,
}

impl GlLightRenderer {
    pub fn init() -> Result<Self> {
        let shader = ShaderProgram::from_sources(VERT_SRC, FRAG_SRC)?;
        Ok(Self {
            shader,
            buffer: GpuMesh::new(),
            stats: DrawStats::default(),
        })
    }

    /// Bind the light shader and enable additive blending.
    pub fn begin(&mut self, projection: &Mat4) {
        self.stats.reset();
        unsafe {
            gl::Disable(gl::DEPTH_TEST);
            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::SRC_ALPHA, gl::ONE);
        }
        self.shader.bind();
        self.shader.set_mat4("u_projTrans", projection);
    }

    pub fn end(&mut self) {
        unsafe {
            gl::Disable(gl::BLEND);
        }
    }
}

impl LightRenderTarget for GlLightRenderer {
    fn light_rendered(&mut self) {
        self.stats.light_rendered();
    }

    fn draw(&mut self, mesh: &LightMesh) {
        if mesh.is_empty() {
            return;
        }
        self.buffer.upload(mesh);
        self.buffer.draw(mesh.topology);
        self.stats.draw(mesh);
    }

    /// Shadow strips carry the ambient colour in their vertices and darken
    /// what is behind them instead of adding.
    fn shadow_pass(&mut self) {
        unsafe {
            gl::BlendFunc(gl::ONE, gl::ONE_MINUS_SRC_ALPHA);
        }
        self.stats.shadow_pass();
    }
}
