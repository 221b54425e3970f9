//! Pseudo-3D shadow length.
//!
//! Pinhole analogy: a light of height `H` over a caster of height `h`
//! projects the caster top `range * h / (H - h)` past the caster. Shadows
//! never reach past the light's range.

/// Distance a shadow ray is projected past a silhouette vertex that lies
/// `distance` away from a positional light.
///
/// A light at ground level (`light_height == 0`) and a light no higher than
/// the caster both shade the rest of the range. The result is always in
/// `0..=light_range` for non-negative inputs.
pub fn shadow_limit(distance: f32, caster_height: f32, light_height: f32, light_range: f32) -> f32 {
    let remaining = light_range - distance;
    let limit = if light_height > caster_height {
        (light_range * caster_height / (light_height - caster_height)).min(remaining)
    } else if light_height == 0.0 {
        light_range.min(remaining)
    } else {
        remaining
    };
    limit.max(0.0)
}

/// Shadow length under a light at infinite distance, `elevation` degrees
/// above the horizon. A sun on the horizon is capped at `max_length`.
pub fn sun_shadow_length(caster_height: f32, elevation: f32, max_length: f32) -> f32 {
    let tan = elevation.to_radians().tan();
    if tan <= f32::EPSILON {
        return max_length;
    }
    (caster_height / tan).clamp(0.0, max_length)
}
