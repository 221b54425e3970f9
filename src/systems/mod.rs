pub mod containment;
pub mod dynamic_shadow;
pub mod rays;
pub mod shadow_length;
pub mod silhouette;
pub mod visibility;

pub use containment::polygon_contains;
pub use dynamic_shadow::{
    collect_affected, ShadowBuilder, ShadowMeshPool, ShadowProjection, ShadowSkip,
};
pub use rays::{cast_rays, RayBuffers, MIN_RAYS};
pub use shadow_length::{shadow_limit, sun_shadow_length};
pub use silhouette::{detect_silhouette, Silhouette};
pub use visibility::{
    build_fan_mesh, build_parallel_soft_mesh, build_radial_soft_mesh, build_ribbon_mesh,
};
