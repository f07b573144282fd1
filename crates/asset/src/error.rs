//! Decoder error taxonomy.
//!
//! `FormatError` is fatal: the buffer is not a usable GLB and the whole
//! decode aborts. `ImageError` and `AccessorError` are local: the decoder
//! skips the affected texture or primitive and records a [`Warning`], so a
//! partially-broken file still yields a (smaller) scene.

use thiserror::Error;

/// Fatal container-level failures.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("not a GLB container (bad magic)")]
    BadMagic,

    #[error("unsupported glTF version {0} (expected 2)")]
    UnsupportedVersion(u32),

    #[error("buffer truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("first chunk is not JSON")]
    MissingJsonChunk,

    #[error("invalid JSON chunk: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures resolving a single image entry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ImageError {
    #[error("texture file not found: {uri}")]
    NotFound { uri: String },

    #[error("could not decode image: {reason}")]
    DecodeFailed { reason: String },
}

/// Failures resolving a single accessor.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AccessorError {
    #[error("accessor index {index} out of range ({len} accessors)")]
    AccessorOutOfRange { index: usize, len: usize },

    #[error("buffer view index {index} out of range ({len} buffer views)")]
    BufferViewOutOfRange { index: usize, len: usize },

    #[error("accessor {index} has no buffer view")]
    MissingBufferView { index: usize },

    #[error("POSITION accessor is {ty}/{component_type}, expected VEC3/f32")]
    UnsupportedLayout { component_type: u32, ty: String },
}

/// Recoverable issue hit during decode; the scene is still produced.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Warning {
    #[error("mesh {mesh} primitive {primitive}: {source}")]
    Primitive {
        mesh: usize,
        primitive: usize,
        source: AccessorError,
    },

    #[error("mesh {mesh} primitive {primitive}: kept {kept} of {declared} declared vertices")]
    TruncatedPrimitive {
        mesh: usize,
        primitive: usize,
        kept: usize,
        declared: usize,
    },

    #[error("mesh {mesh} primitive {primitive}: material index {index} out of range")]
    MaterialOutOfRange {
        mesh: usize,
        primitive: usize,
        index: usize,
    },

    #[error("image {image}: {source}")]
    Image { image: usize, source: ImageError },
}
