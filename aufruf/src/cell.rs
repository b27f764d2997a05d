//! The atomic unit of call-time storage.
//!
//! A cell is a closed sum over the four primitive kinds, so a payload can
//! never be read under the wrong tag; any cross-kind read goes through the
//! autobox engine in [`crate::signature`].

use crate::{ObjectRef, StrHandle};

/// Kind of value a [`Cell`] currently stores.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellKind {
    Int,
    Float,
    Str,
    Obj,
}

/// One call-time value.
///
/// `Str` and `Obj` payloads are non-owning handles into the string and
/// object arenas; the cell keeps them alive only by reporting them through
/// [`crate::Visitable::visit_edges`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Str(StrHandle),
    Obj(ObjectRef),
}

impl Cell {
    /// Filler for positional slots created but not yet written. Holders of
    /// such slots must not rely on the content.
    pub(crate) const UNSET: Cell = Cell::Int(0);

    #[inline]
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Int(_) => CellKind::Int,
            Cell::Float(_) => CellKind::Float,
            Cell::Str(_) => CellKind::Str,
            Cell::Obj(_) => CellKind::Obj,
        }
    }
}
