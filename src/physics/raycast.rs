use glam::Vec2;

const PARALLEL_EPSILON: f32 = 1e-9;

/// Fraction along `p1 -> p2` where it first enters the circle, or `None`.
/// Segments starting inside the circle report no hit.
pub fn segment_circle(p1: Vec2, p2: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = p2 - p1;
    let oc = p1 - center;
    let a = d.dot(d);
    if a < PARALLEL_EPSILON {
        return None;
    }
    let c = oc.dot(oc) - radius * radius;
    if c < 0.0 {
        return None;
    }
    let b = 2.0 * oc.dot(d);
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Fraction along `p1 -> p2` where it crosses segment `a -> b`. Parallel
/// segments never intersect.
pub fn segment_segment(p1: Vec2, p2: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let r = p2 - p1;
    let s = b - a;
    let denom = r.perp_dot(s);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let ap = a - p1;
    let t = ap.perp_dot(s) / denom;
    let u = ap.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Nearest crossing of `p1 -> p2` with the edges of a vertex ring.
pub fn segment_ring(p1: Vec2, p2: Vec2, ring: &[Vec2], closed: bool) -> Option<f32> {
    let n = ring.len();
    if n < 2 {
        return None;
    }
    let edge_count = if closed { n } else { n - 1 };
    (0..edge_count)
        .filter_map(|i| segment_segment(p1, p2, ring[i], ring[(i + 1) % n]))
        .reduce(f32::min)
}

/// Convex polygon containment with the boundary counted as inside. Works
/// for either winding.
pub fn convex_contains(vertices: &[Vec2], p: Vec2) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut positive = false;
    let mut negative = false;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let side = (b - *a).perp_dot(p - *a);
        if side > 0.0 {
            positive = true;
        } else if side < 0.0 {
            negative = true;
        }
        if positive && negative {
            return false;
        }
    }
    true
}

/// Sign of the side of line `l1 -> l2` that `p` lies on: 1 left, -1 right,
/// 0 on the line.
pub fn point_line_side(l1: Vec2, l2: Vec2, p: Vec2) -> i32 {
    let side = (l2 - l1).perp_dot(p - l1);
    if side > 0.0 {
        1
    } else if side < 0.0 {
        -1
    } else {
        0
    }
}

pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
