//! Illuminated-area and soft-edge meshes from clipped rays.
//!
//! Radial lights draw a fan around their origin; parallel lights draw a
//! strip alternating ray start and ray end. Soft-edge meshes pair every
//! ray end with a point pushed further out in transparent black so the
//! boundary fades out.

use glam::Vec2;

use super::rays::RayBuffers;
use crate::components::Color;
use crate::renderer::mesh::{LightMesh, Topology};

/// Fan: the origin at full intensity, then every ray end weighted by the
/// unoccluded part of its ray.
pub fn build_fan_mesh(mesh: &mut LightMesh, origin: Vec2, rays: &RayBuffers, color: f32) {
    mesh.clear();
    mesh.topology = Topology::TriangleFan;
    mesh.push(origin, color, 1.0);
    for (end, fraction) in rays.end.iter().zip(&rays.fraction) {
        mesh.push(*end, color, 1.0 - fraction);
    }
}

/// Strip alternating each ray's start and clipped end.
pub fn build_ribbon_mesh(mesh: &mut LightMesh, rays: &RayBuffers, color: f32) {
    mesh.clear();
    mesh.topology = Topology::TriangleStrip;
    for (start, end) in rays.start.iter().zip(&rays.end) {
        mesh.push(*start, color, 1.0);
        mesh.push(*end, color, 1.0);
    }
}

/// Soft edge of a radial light. The fade length shrinks with the light left
/// at each ray end.
pub fn build_radial_soft_mesh(
    mesh: &mut LightMesh,
    rays: &RayBuffers,
    directions: &[Vec2],
    color: f32,
    soft_length: f32,
) {
    mesh.clear();
    mesh.topology = Topology::TriangleStrip;
    let transparent = Color::CLEAR.to_float_bits();
    for ((end, fraction), dir) in rays.end.iter().zip(&rays.fraction).zip(directions) {
        let s = 1.0 - fraction;
        mesh.push(*end, color, s);
        mesh.push(*end + *dir * (s * soft_length), transparent, 0.0);
    }
}

/// Soft edge of a parallel light, every ray faded by the same length along
/// `dir`.
pub fn build_parallel_soft_mesh(
    mesh: &mut LightMesh,
    rays: &RayBuffers,
    dir: Vec2,
    color: f32,
    soft_length: f32,
) {
    mesh.clear();
    mesh.topology = Topology::TriangleStrip;
    let transparent = Color::CLEAR.to_float_bits();
    for end in &rays.end {
        mesh.push(*end, color, 1.0);
        mesh.push(*end + dir * soft_length, transparent, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::rays::radial_directions;
    use approx::assert_abs_diff_eq;

    fn clipped_fan() -> (RayBuffers, Vec<Vec2>) {
        let mut dirs = Vec::new();
        radial_directions(5, 0.0, &mut dirs);
        let mut rays = RayBuffers::new(5).unwrap();
        rays.radial(Vec2::ZERO, 4.0, &dirs);
        // First ray stopped halfway.
        rays.end[0] = Vec2::new(2.0, 0.0);
        rays.fraction[0] = 0.5;
        (rays, dirs)
    }

    #[test]
    fn fan_starts_at_origin() {
        let (rays, _) = clipped_fan();
        let mut mesh = LightMesh::new(Topology::TriangleStrip);
        build_fan_mesh(&mut mesh, Vec2::ZERO, &rays, 7.0);

        assert_eq!(mesh.topology, Topology::TriangleFan);
        assert_eq!(mesh.len(), rays.len() + 1);
        assert_eq!(mesh.vertices[0].pos(), Vec2::ZERO);
        assert_eq!(mesh.vertices[0].s, 1.0);
        assert_eq!(mesh.vertices[1].s, 0.5);
        assert_eq!(mesh.vertices[2].s, 0.0);
        assert!(mesh.vertices.iter().all(|v| v.color == 7.0));
    }

    #[test]
    fn ribbon_alternates_start_and_end() {
        let mut rays = RayBuffers::new(3).unwrap();
        rays.parallel(
            crate::physics::Aabb::new(Vec2::splat(-1.0), Vec2::splat(1.0)),
            Vec2::Y,
        );
        let mut mesh = LightMesh::new(Topology::TriangleFan);
        build_ribbon_mesh(&mut mesh, &rays, 1.0);

        assert_eq!(mesh.topology, Topology::TriangleStrip);
        assert_eq!(mesh.len(), 6);
        for i in 0..3 {
            assert_eq!(mesh.vertices[2 * i].pos(), rays.start[i]);
            assert_eq!(mesh.vertices[2 * i + 1].pos(), rays.end[i]);
        }
    }

    #[test]
    fn radial_soft_edge_fades_out() {
        let (rays, dirs) = clipped_fan();
        let mut mesh = LightMesh::new(Topology::TriangleStrip);
        build_radial_soft_mesh(&mut mesh, &rays, &dirs, 7.0, 2.0);

        assert_eq!(mesh.len(), 2 * rays.len());
        // Half-lit end pushed out by half the soft length.
        assert_abs_diff_eq!(mesh.vertices[1].position[0], 3.0, epsilon = 1e-5);
        assert_eq!(mesh.vertices[1].color, 0.0);
        assert_eq!(mesh.vertices[1].s, 0.0);
        // Unclipped rays carry no light past their end.
        assert_eq!(mesh.vertices[3].pos(), mesh.vertices[2].pos());
    }

    #[test]
    fn parallel_soft_edge_uses_light_direction() {
        let mut rays = RayBuffers::new(3).unwrap();
        rays.parallel(
            crate::physics::Aabb::new(Vec2::splat(-1.0), Vec2::splat(1.0)),
            Vec2::X,
        );
        let mut mesh = LightMesh::new(Topology::TriangleStrip);
        build_parallel_soft_mesh(&mut mesh, &rays, Vec2::X, 1.0, 2.5);
        for i in 0..3 {
            let near = mesh.vertices[2 * i].pos();
            let far = mesh.vertices[2 * i + 1].pos();
            assert_abs_diff_eq!(far.x - near.x, 2.5, epsilon = 1e-5);
            assert_eq!(far.y, near.y);
        }
    }
}
