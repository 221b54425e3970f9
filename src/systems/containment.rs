use glam::Vec2;

/// Odd-even crossing test over the closed polygon traced by `points`.
///
/// The last point connects back to the first. Horizontal edges never count
/// as crossings.
pub fn polygon_contains(points: impl IntoIterator<Item = Vec2>, p: Vec2) -> bool {
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return false;
    };

    let mut odd = false;
    let mut prev = first;
    for current in points.chain(std::iter::once(first)) {
        if crosses(current, prev, p) {
            odd = !odd;
        }
        prev = current;
    }
    odd
}

fn crosses(a: Vec2, b: Vec2, p: Vec2) -> bool {
    let straddles = (a.y < p.y && b.y >= p.y) || (a.y >= p.y && b.y < p.y);
    straddles && (p.y - a.y) / (b.y - a.y) * (b.x - a.x) < p.x - a.x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ]
    }

    #[test]
    fn inside_and_outside() {
        assert!(polygon_contains(square(), Vec2::new(2.0, 2.0)));
        assert!(!polygon_contains(square(), Vec2::new(5.0, 2.0)));
        assert!(!polygon_contains(square(), Vec2::new(2.0, -1.0)));
    }

    #[test]
    fn rotation_and_winding_do_not_matter() {
        let probes = [
            Vec2::new(2.0, 2.0),
            Vec2::new(0.5, 3.5),
            Vec2::new(-1.0, 2.0),
            Vec2::new(3.0, 4.5),
        ];
        let base = square();
        for shift in 0..base.len() {
            let mut ring = base.clone();
            ring.rotate_left(shift);
            let mut reversed = ring.clone();
            reversed.reverse();
            for p in probes {
                let expected = polygon_contains(base.iter().copied(), p);
                assert_eq!(polygon_contains(ring.iter().copied(), p), expected);
                assert_eq!(polygon_contains(reversed.iter().copied(), p), expected);
            }
        }
    }

    #[test]
    fn point_level_with_horizontal_edge() {
        // The probe shares y with the top edge; only the vertical sides count.
        let ring = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(2.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        assert!(polygon_contains(ring, Vec2::new(1.0, 2.0)));
        assert!(!polygon_contains(ring, Vec2::new(3.0, 3.0)));
    }

    #[test]
    fn degenerate_inputs_contain_nothing() {
        assert!(!polygon_contains(Vec::new(), Vec2::ZERO));
        assert!(!polygon_contains([Vec2::ZERO], Vec2::ZERO));
    }
}
