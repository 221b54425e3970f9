mod lighting;
mod physics;

pub use lighting::Color;
pub use physics::{Body, CasterData, ContactFilter, Fixture, Shape};
