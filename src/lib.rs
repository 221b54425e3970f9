//! 2D light and shadow geometry over a rigid-body scene.
//!
//! Lights cast rays against a [`physics::PhysicsQuery`] implementation and
//! turn the hits into meshes ready for additive blending. With pseudo-3D
//! enabled, casters get height-based shadow volumes instead.

pub mod camera;
pub mod components;
pub mod config;
pub mod error;
pub mod light;
pub mod physics;
pub mod renderer;
pub mod scene;
pub mod systems;

pub use camera::Viewport;
pub use components::Color;
pub use config::LightingConfig;
pub use error::{LightError, Result};
pub use light::{DirectionalLight, Light, LightContext, LightSource, PointLight};
pub use physics::{PhysicsQuery, ShadowWorld};
