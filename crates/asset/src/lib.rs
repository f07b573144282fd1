//! GLB (binary glTF) decoding into CPU-friendly scene data.
//! Container reading, accessor resolution, material/texture lookup and
//! mesh assembly; no rendering or UI concerns.

pub mod accessor;
pub mod decode;
pub mod document;
pub mod error;
pub mod glb;
pub mod image;
pub mod material;
pub mod mesh;
pub mod texture;
