//! Resolve POSITION accessors into vertex lists.
//!
//! Vertex reads go through the accessor -> bufferView -> BIN chunk chain
//! with every byte offset bounds-checked against the real buffer. A read
//! that would run past the end stops the walk; whatever was read so far is
//! the result. Partial geometry beats aborting the whole load.

use crate::document::{COMPONENT_FLOAT, Document, TYPE_VEC3};
use crate::error::AccessorError;
use crate::glb::{self, BinChunk};

/// Per-primitive vertex cap. Bounds worst-case memory and time on
/// adversarial or very large files; exceeding it truncates and flags.
pub const MAX_VERTICES_PER_PRIMITIVE: usize = 2000;

/// Tightly-packed VEC3/f32 stride.
const DEFAULT_STRIDE: usize = 12;

/// Vertices read for one accessor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedPositions {
    pub positions: Vec<[f32; 3]>,
    /// Count the accessor declared; `positions.len()` is what was read.
    pub declared: usize,
    /// Set when `declared` exceeded [`MAX_VERTICES_PER_PRIMITIVE`].
    pub truncated: bool,
}

impl ResolvedPositions {
    fn empty(declared: usize) -> Self {
        Self {
            positions: Vec::new(),
            declared,
            truncated: false,
        }
    }
}

/// Read up to [`MAX_VERTICES_PER_PRIMITIVE`] positions for `accessor_index`.
///
/// Only VEC3/f32 accessors are supported; any other layout is refused
/// rather than misinterpreted. A document without a BIN chunk resolves to
/// an empty vertex list.
pub fn resolve_positions(
    doc: &Document,
    accessor_index: usize,
    bin: Option<BinChunk>,
    buf: &[u8],
) -> Result<ResolvedPositions, AccessorError> {
    let accessor =
        doc.accessors
            .get(accessor_index)
            .ok_or(AccessorError::AccessorOutOfRange {
                index: accessor_index,
                len: doc.accessors.len(),
            })?;

    if accessor.component_type != COMPONENT_FLOAT || accessor.ty != TYPE_VEC3 {
        return Err(AccessorError::UnsupportedLayout {
            component_type: accessor.component_type,
            ty: accessor.ty.clone(),
        });
    }

    let view_index = accessor
        .buffer_view
        .ok_or(AccessorError::MissingBufferView {
            index: accessor_index,
        })?;
    let view = doc
        .buffer_views
        .get(view_index)
        .ok_or(AccessorError::BufferViewOutOfRange {
            index: view_index,
            len: doc.buffer_views.len(),
        })?;

    let Some(bin) = bin else {
        return Ok(ResolvedPositions::empty(accessor.count));
    };

    let stride = view.byte_stride.unwrap_or(DEFAULT_STRIDE);
    let limit = accessor.count.min(MAX_VERTICES_PER_PRIMITIVE);
    let truncated = accessor.count > limit;

    let Some(base) = bin
        .offset
        .checked_add(view.byte_offset)
        .and_then(|at| at.checked_add(accessor.byte_offset))
    else {
        return Ok(ResolvedPositions {
            truncated,
            ..ResolvedPositions::empty(accessor.count)
        });
    };

    let mut positions = Vec::with_capacity(limit);
    for i in 0..limit {
        let Some(at) = i.checked_mul(stride).and_then(|step| base.checked_add(step)) else {
            break;
        };
        let Some(end) = at.checked_add(12) else {
            break;
        };
        if end > buf.len() {
            break;
        }
        let (Some(x), Some(y), Some(z)) = (
            glb::read_f32(buf, at),
            glb::read_f32(buf, at + 4),
            glb::read_f32(buf, at + 8),
        ) else {
            break;
        };
        positions.push([x, y, z]);
    }

    if positions.len() < limit {
        log::debug!(
            "accessor {}: read {} of {} vertices before hitting buffer end",
            accessor_index,
            positions.len(),
            accessor.count
        );
    }

    Ok(ResolvedPositions {
        positions,
        declared: accessor.count,
        truncated,
    })
}
