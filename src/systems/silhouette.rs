//! Silhouette of a vertex ring as seen from a light.
//!
//! A vertex is "gasp" when stepping a hair past it, away from the light,
//! lands inside the shape: the light reaches it and keeps going into the
//! caster. Those vertices face the light and are dropped. The silhouette
//! is the contiguous arc of the remaining vertices, walked backwards from
//! the vertex that precedes the gasp run.

use glam::Vec2;

use crate::physics::raycast::{closest_point_on_segment, point_line_side};

/// How far past a vertex the gasp probe is placed.
pub const GASP_PROBE_DISTANCE: f32 = 0.01;

/// Light closer than this to the ring counts as touching it.
const ON_RING_EPSILON: f32 = 1e-5;

/// Ordered silhouette indices plus the scratch used to compute them.
#[derive(Default, Debug)]
pub struct Silhouette {
    pub indices: Vec<usize>,
    pub has_gasp: bool,
    gasp: Vec<bool>,
}

impl Silhouette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn clear(&mut self) {
        self.indices.clear();
        self.gasp.clear();
        self.has_gasp = false;
    }
}

fn touches_ring(light: Vec2, ring: &[Vec2], closed: bool) -> bool {
    let n = ring.len();
    if n == 1 {
        return ring[0].distance_squared(light) < ON_RING_EPSILON * ON_RING_EPSILON;
    }
    let edges = if closed { n } else { n - 1 };
    (0..edges).any(|i| {
        let p = closest_point_on_segment(ring[i], ring[(i + 1) % n], light);
        p.distance_squared(light) < ON_RING_EPSILON * ON_RING_EPSILON
    })
}

/// Find the silhouette of `ring` (world space, polygon or chain) from
/// `light`. `center` is the caster's center of mass, `inside` its point
/// test.
///
/// A light inside the shape or touching its boundary sees no silhouette.
/// Without gasp vertices the whole ring is returned, starting at the
/// vertex nearest the light; when that vertex lies left of the
/// light-to-center line the tail is reversed so the walk keeps a
/// consistent winding. An open chain is returned in chain order, end to
/// end, so consecutive indices always share a real segment.
pub fn detect_silhouette(
    light: Vec2,
    center: Vec2,
    ring: &[Vec2],
    closed: bool,
    inside: impl Fn(Vec2) -> bool,
    out: &mut Silhouette,
) {
    out.clear();
    let n = ring.len();
    if n == 0 || inside(light) || touches_ring(light, ring, closed) {
        return;
    }

    let mut min_dst = f32::INFINITY;
    let mut min_dst_n = 0;
    for (i, vertex) in ring.iter().enumerate() {
        let probe = *vertex + (*vertex - light).clamp_length_max(GASP_PROBE_DISTANCE);
        let gasp = inside(probe);
        out.gasp.push(gasp);
        if gasp {
            out.has_gasp = true;
            continue;
        }
        let dst = vertex.distance_squared(light);
        if dst < min_dst {
            min_dst = dst;
            min_dst_n = i;
        }
    }

    if !out.has_gasp && !closed {
        // Open chains are never bridged between their two ends.
        out.indices.extend(0..n);
        if point_line_side(light, center, ring[0]) >= 0 {
            out.indices.reverse();
        }
        return;
    }

    if !out.has_gasp {
        out.indices.extend(min_dst_n..n);
        out.indices.extend(0..min_dst_n);
        let correct_direction = point_line_side(light, center, ring[min_dst_n]) < 0;
        if !correct_direction {
            out.indices[1..].reverse();
        }
        return;
    }

    // Start of a gasp run: gasp vertex whose predecessor is not.
    let Some(run_start) = (0..n).find(|&i| out.gasp[i] && !out.gasp[(i + n - 1) % n]) else {
        // Every vertex faces the light.
        return;
    };

    let mut k = (run_start + n - 1) % n;
    while !out.gasp[k] {
        out.indices.push(k);
        k = (k + n - 1) % n;
    }
}
