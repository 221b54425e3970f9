use bytemuck::{Pod, Zeroable};
use gl::types::*;
use glam::Vec2;
use std::mem;
use std::ptr;

/// One light-mesh vertex: world position, packed colour and the blend
/// scalar `s` read by the light shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: f32,
    pub s: f32,
}

impl Vertex {
    pub fn new(position: Vec2, color: f32, s: f32) -> Self {
        Self {
            position: position.to_array(),
            color,
            s,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleStrip,
    TriangleFan,
}

impl Topology {
    pub fn gl_mode(self) -> GLenum {
        match self {
            Topology::TriangleStrip => gl::TRIANGLE_STRIP,
            Topology::TriangleFan => gl::TRIANGLE_FAN,
        }
    }
}

/// CPU-side vertex list, refilled in place every rebuild.
#[derive(Clone, Debug)]
pub struct LightMesh {
    pub vertices: Vec<Vertex>,
    pub topology: Topology,
}

impl LightMesh {
    pub fn new(topology: Topology) -> Self {
        Self {
            vertices: Vec::new(),
            topology,
        }
    }

    pub fn with_capacity(topology: Topology, capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            topology,
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn push(&mut self, position: Vec2, color: f32, s: f32) {
        self.vertices.push(Vertex::new(position, color, s));
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Streamed vertex buffer. Grows on demand and is refilled on every upload.
pub struct GpuMesh {
    vao: GLuint,
    vbo: GLuint,
    capacity: usize,
    count: i32,
}

impl GpuMesh {
    pub fn new() -> Self {
        let mut vao = 0;
        let mut vbo = 0;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

            let stride = mem::size_of::<Vertex>() as GLsizei;

            // position (location 0)
            gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, stride, ptr::null());
            gl::EnableVertexAttribArray(0);

            // packed colour (location 1): four normalized bytes, RGBA in memory
            gl::VertexAttribPointer(
                1,
                4,
                gl::UNSIGNED_BYTE,
                gl::TRUE,
                stride,
                (2 * mem::size_of::<f32>()) as *const _,
            );
            gl::EnableVertexAttribArray(1);

            // s (location 2)
            gl::VertexAttribPointer(
                2,
                1,
                gl::FLOAT,
                gl::FALSE,
                stride,
                (3 * mem::size_of::<f32>()) as *const _,
            );
            gl::EnableVertexAttribArray(2);

            gl::BindVertexArray(0);
        }

        Self {
            vao,
            vbo,
            capacity: 0,
            count: 0,
        }
    }

    pub fn upload(&mut self, mesh: &LightMesh) {
        let bytes = mesh.as_bytes();
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo);
            if bytes.len() > self.capacity {
                gl::BufferData(
                    gl::ARRAY_BUFFER,
                    bytes.len() as GLsizeiptr,
                    bytes.as_ptr() as *const _,
                    gl::DYNAMIC_DRAW,
                );
                self.capacity = bytes.len();
            } else {
                gl::BufferSubData(
                    gl::ARRAY_BUFFER,
                    0,
                    bytes.len() as GLsizeiptr,
                    bytes.as_ptr() as *const _,
                );
            }
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        }
        self.count = mesh.len() as i32;
    }

    pub fn draw(&self, topology: Topology) {
        if self.count == 0 {
            return;
        }
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawArrays(topology.gl_mode(), 0, self.count);
            gl::BindVertexArray(0);
        }
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
        }
    }
}
