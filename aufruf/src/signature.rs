//! Call signatures: the structure carrying one call's positional and named
//! arguments (or return values) across the caller/callee boundary.
//!
//! Reads are total. An out-of-range index or an absent key yields the
//! requested kind's zero value, and a kind mismatch resolves through the
//! autobox engine instead of failing — permissive calling conventions let
//! callees declare more formals than the caller supplied.

use std::collections::HashMap;

use ahash::RandomState;
use bitflags::bitflags;

use crate::{Cell, ObjectRef, Runtime, StrHandle};

/// Calls with at most this many positionals never leave the inline block.
pub const INLINE_POSITIONALS: usize = 8;

bitflags! {
    /// Per-argument markers for the calling-convention layer.
    ///
    /// The signature stores, copies and traces its flag words but never
    /// interprets them; arity and type checking happen in the layer that
    /// reads them back.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ArgFlags: u32 {
        /// Argument may be left out by the caller.
        const OPTIONAL = 1 << 0;
        /// Companion flag telling whether the optional was supplied.
        const OPT_FLAG = 1 << 1;
        /// Collects all remaining positional (or named) arguments.
        const SLURPY = 1 << 2;
        /// Passed by key instead of position.
        const NAMED = 1 << 3;
    }
}

/// Ordered argument slots with the hot-path inline block.
///
/// The overwhelming majority of calls carry at most
/// [`INLINE_POSITIONALS`] arguments; those never touch the general
/// allocator. The first push past the threshold migrates the live prefix
/// into a heap block that then grows by doubling and never shrinks.
#[derive(Debug, Clone)]
enum Slots {
    Inline([Cell; INLINE_POSITIONALS]),
    Spilled(Vec<Cell>),
}

#[derive(Debug, Clone)]
struct Positionals {
    len: usize,
    slots: Slots,
}

impl Positionals {
    fn new() -> Self {
        Self {
            len: 0,
            slots: Slots::Inline([Cell::UNSET; INLINE_POSITIONALS]),
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        match &self.slots {
            Slots::Inline(_) => INLINE_POSITIONALS,
            Slots::Spilled(cells) => cells.len(),
        }
    }

    fn ensure(&mut self, need: usize) {
        let capacity = self.capacity();
        if need <= capacity {
            return;
        }
        let grown = need.max(capacity * 2);
        match &mut self.slots {
            Slots::Inline(block) => {
                let mut cells = Vec::with_capacity(grown);
                cells.extend_from_slice(&block[..self.len]);
                cells.resize(grown, Cell::UNSET);
                self.slots = Slots::Spilled(cells);
            }
            Slots::Spilled(cells) => {
                cells.resize(grown, Cell::UNSET);
            }
        }
    }

    fn push(&mut self, cell: Cell) {
        self.ensure(self.len + 1);
        let index = self.len;
        match &mut self.slots {
            Slots::Inline(block) => block[index] = cell,
            Slots::Spilled(cells) => cells[index] = cell,
        }
        self.len += 1;
    }

    /// Write-or-create access; extends the live range up to `index` and
    /// leaves any skipped slot with unspecified content.
    fn cell_at(&mut self, index: usize) -> &mut Cell {
        self.ensure(index + 1);
        if index >= self.len {
            self.len = index + 1;
        }
        match &mut self.slots {
            Slots::Inline(block) => &mut block[index],
            Slots::Spilled(cells) => &mut cells[index],
        }
    }

    #[inline]
    fn cells(&self) -> &[Cell] {
        match &self.slots {
            Slots::Inline(block) => &block[..self.len],
            Slots::Spilled(cells) => &cells[..self.len],
        }
    }

    /// Truncate without releasing backing storage; the pooling fast path.
    fn reset(&mut self) {
        self.len = 0;
    }
}

/// One call's arguments or returns.
///
/// Cloning produces fully disjoint mutable state: an independent
/// positional copy, an independently allocated named store, and the
/// descriptor words copied verbatim. Handle payloads alias, which is safe
/// because they are immutable from this layer.
#[derive(Debug, Clone)]
pub struct Signature {
    positionals: Positionals,
    named: Option<HashMap<StrHandle, Cell, RandomState>>,
    short_sig: StrHandle,
    arg_flags: Vec<ArgFlags>,
    return_flags: Vec<ArgFlags>,
}

impl Signature {
    /// An empty signature; neither store is materialized yet.
    pub fn new() -> Self {
        Self {
            positionals: Positionals::new(),
            named: None,
            short_sig: StrHandle::NULL,
            arg_flags: Vec::new(),
            return_flags: Vec::new(),
        }
    }

    pub fn num_positionals(&self) -> usize {
        self.positionals.len
    }

    // ── Positional pushes ─────────────────────────────────────────────

    pub fn push_int(&mut self, value: i64) {
        self.positionals.push(Cell::Int(value));
    }

    pub fn push_float(&mut self, value: f64) {
        self.positionals.push(Cell::Float(value));
    }

    pub fn push_str(&mut self, value: StrHandle) {
        self.positionals.push(Cell::Str(value));
    }

    pub fn push_obj(&mut self, value: ObjectRef) {
        self.positionals.push(Cell::Obj(value));
    }

    // ── Positional reads with autoboxing ──────────────────────────────

    pub fn get_int(&self, runtime: &mut Runtime, index: usize) -> i64 {
        match self.positionals.cells().get(index) {
            Some(cell) => autobox_int(runtime, cell),
            None => 0,
        }
    }

    pub fn get_float(&self, runtime: &mut Runtime, index: usize) -> f64 {
        match self.positionals.cells().get(index) {
            Some(cell) => autobox_float(runtime, cell),
            None => 0.0,
        }
    }

    pub fn get_str(&self, runtime: &mut Runtime, index: usize) -> StrHandle {
        match self.positionals.cells().get(index) {
            Some(cell) => autobox_str(runtime, cell),
            None => StrHandle::NULL,
        }
    }

    pub fn get_obj(&self, runtime: &mut Runtime, index: usize) -> ObjectRef {
        match self.positionals.cells().get(index) {
            Some(cell) => autobox_obj(runtime, cell),
            None => ObjectRef::NULL,
        }
    }

    /// Direct write-or-create slot access, for building return signatures
    /// positionally. Growing past the current length leaves skipped slots
    /// with unspecified content.
    pub fn cell_at(&mut self, index: usize) -> &mut Cell {
        self.positionals.cell_at(index)
    }

    // ── Named store ───────────────────────────────────────────────────

    pub fn push_int_named(&mut self, key: StrHandle, value: i64) {
        self.named_store().insert(key, Cell::Int(value));
    }

    pub fn push_float_named(&mut self, key: StrHandle, value: f64) {
        self.named_store().insert(key, Cell::Float(value));
    }

    pub fn push_str_named(&mut self, key: StrHandle, value: StrHandle) {
        self.named_store().insert(key, Cell::Str(value));
    }

    pub fn push_obj_named(&mut self, key: StrHandle, value: ObjectRef) {
        self.named_store().insert(key, Cell::Obj(value));
    }

    pub fn get_int_named(&self, runtime: &mut Runtime, key: StrHandle) -> i64 {
        match self.named_cell(key) {
            Some(cell) => autobox_int(runtime, cell),
            None => 0,
        }
    }

    pub fn get_float_named(&self, runtime: &mut Runtime, key: StrHandle) -> f64 {
        match self.named_cell(key) {
            Some(cell) => autobox_float(runtime, cell),
            None => 0.0,
        }
    }

    pub fn get_str_named(&self, runtime: &mut Runtime, key: StrHandle) -> StrHandle {
        match self.named_cell(key) {
            Some(cell) => autobox_str(runtime, cell),
            None => StrHandle::NULL,
        }
    }

    pub fn get_obj_named(&self, runtime: &mut Runtime, key: StrHandle) -> ObjectRef {
        match self.named_cell(key) {
            Some(cell) => autobox_obj(runtime, cell),
            None => ObjectRef::NULL,
        }
    }

    /// Presence test without coercion.
    pub fn exists_named(&self, key: StrHandle) -> bool {
        self.named
            .as_ref()
            .is_some_and(|store| store.contains_key(&key))
    }

    fn named_cell(&self, key: StrHandle) -> Option<&Cell> {
        self.named.as_ref().and_then(|store| store.get(&key))
    }

    /// Lazily created on first named push; torn down by [`Self::reset`].
    fn named_store(&mut self) -> &mut HashMap<StrHandle, Cell, RandomState> {
        self.named.get_or_insert_with(HashMap::default)
    }

    // ── Expected-argument descriptor ──────────────────────────────────

    pub fn short_sig(&self) -> StrHandle {
        self.short_sig
    }

    pub fn set_short_sig(&mut self, short_sig: StrHandle) {
        self.short_sig = short_sig;
    }

    pub fn arg_flags(&self) -> &[ArgFlags] {
        &self.arg_flags
    }

    pub fn set_arg_flags(&mut self, flags: Vec<ArgFlags>) {
        self.arg_flags = flags;
    }

    pub fn return_flags(&self) -> &[ArgFlags] {
        &self.return_flags
    }

    pub fn set_return_flags(&mut self, flags: Vec<ArgFlags>) {
        self.return_flags = flags;
    }

    // ── Lifecycle ─────────────────────────────────────────────────────

    /// Return to the freshly-allocated state for reuse. Positional backing
    /// storage is kept so the next call can fill it without reallocating;
    /// the named store is torn down and will be recreated lazily.
    pub fn reset(&mut self) {
        self.positionals.reset();
        self.named = None;
    }

    /// Every live positional cell, in order.
    pub fn positional_cells(&self) -> &[Cell] {
        self.positionals.cells()
    }

    /// Every named entry, in no particular order.
    pub fn named_entries(&self) -> impl Iterator<Item = (StrHandle, &Cell)> {
        self.named
            .iter()
            .flat_map(|store| store.iter().map(|(key, cell)| (*key, cell)))
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

// ── Autobox engine ────────────────────────────────────────────────────
//
// Reads a cell as any requested kind. Pure except for the object column,
// where boxing materializes a fresh object, and the string column, which
// interns the rendering. The closed `Cell` sum makes the
// unrecognized-kind case unrepresentable.

fn autobox_int(runtime: &mut Runtime, cell: &Cell) -> i64 {
    match *cell {
        Cell::Int(value) => value,
        Cell::Float(value) => value as i64,
        Cell::Str(handle) => runtime.strings.to_int(handle),
        Cell::Obj(reference) => runtime.objects.get_int(&runtime.strings, reference),
    }
}

fn autobox_float(runtime: &mut Runtime, cell: &Cell) -> f64 {
    match *cell {
        Cell::Int(value) => value as f64,
        Cell::Float(value) => value,
        Cell::Str(handle) => runtime.strings.to_float(handle),
        Cell::Obj(reference) => runtime.objects.get_float(&runtime.strings, reference),
    }
}

fn autobox_str(runtime: &mut Runtime, cell: &Cell) -> StrHandle {
    match *cell {
        Cell::Int(value) => runtime.strings.from_int(value),
        Cell::Float(value) => runtime.strings.from_float(value),
        Cell::Str(handle) => handle,
        Cell::Obj(reference) => runtime.objects.get_string(&mut runtime.strings, reference),
    }
}

fn autobox_obj(runtime: &mut Runtime, cell: &Cell) -> ObjectRef {
    match *cell {
        Cell::Int(value) => runtime.objects.box_int(value),
        Cell::Float(value) => runtime.objects.box_float(value),
        Cell::Str(handle) => runtime.objects.box_str(handle),
        Cell::Obj(reference) => reference,
    }
}
