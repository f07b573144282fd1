//! Core shared types: math re-exports, colors, bounding boxes.
//! Renderer-agnostic; the decoder and any host build on these.

pub use glam::{Vec3, vec3};

pub mod bounds;
pub mod color;
