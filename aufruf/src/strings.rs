//! Interning string arena and the coercion routines the autobox engine
//! leans on.
//!
//! Strings are owned here, never by the cells that reference them. A
//! [`StrHandle`] is only a slot index; whether the slot is still populated
//! is decided by the collector. Interning deduplicates, so two handles are
//! equal exactly when their contents are equal — the named store keys on
//! this.

use std::{collections::HashMap, sync::Arc};

use ahash::RandomState;

/// Non-owning handle to a string in the [`Strings`] arena.
///
/// `NULL` is the absent-string sentinel; it is a valid thing to store in a
/// cell and coerces to `0` / `0.0`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StrHandle(u32);

impl StrHandle {
    pub const NULL: StrHandle = StrHandle(u32::MAX);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_null(), "null handle has no slot");
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "string arena slot overflow");
        Self(index as u32)
    }
}

pub struct Strings {
    entries: Vec<Option<Arc<str>>>,
    free: Vec<u32>,
    interned: HashMap<Arc<str>, u32, RandomState>,
}

impl Strings {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
            interned: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Get-or-add a string, returning the canonical handle for its content.
    pub fn intern(&mut self, text: &str) -> StrHandle {
        if let Some(&slot) = self.interned.get(text) {
            return StrHandle(slot);
        }
        let owned = Arc::<str>::from(text);
        let slot = match self.free.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(owned.clone());
                slot
            }
            None => {
                let slot = StrHandle::from_index(self.entries.len()).0;
                self.entries.push(Some(owned.clone()));
                slot
            }
        };
        self.interned.insert(owned, slot);
        StrHandle(slot)
    }

    /// Content behind a handle, or `None` for null and reclaimed handles.
    pub fn resolve(&self, handle: StrHandle) -> Option<&str> {
        if handle.is_null() {
            return None;
        }
        self.entries
            .get(handle.index())
            .and_then(|slot| slot.as_deref())
    }

    pub fn live_count(&self) -> usize {
        self.entries.len() - self.free.len()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.entries.len()
    }

    // ── Coercions used by the autobox engine ──────────────────────────

    /// Integer value of the longest numeric prefix; `0` when there is
    /// none, and for the null handle.
    pub fn to_int(&self, handle: StrHandle) -> i64 {
        match self.resolve(handle) {
            Some(text) => parse_int_prefix(text),
            None => 0,
        }
    }

    /// Float value of the longest numeric prefix; `0.0` when there is
    /// none, and for the null handle.
    pub fn to_float(&self, handle: StrHandle) -> f64 {
        match self.resolve(handle) {
            Some(text) => parse_float_prefix(text),
            None => 0.0,
        }
    }

    pub fn from_int(&mut self, value: i64) -> StrHandle {
        self.intern(&value.to_string())
    }

    pub fn from_float(&mut self, value: f64) -> StrHandle {
        self.intern(&value.to_string())
    }

    // ── Collector interface ───────────────────────────────────────────

    /// Drop every slot not set in `live`. Returns `(live, swept)` counts.
    pub(crate) fn sweep(&mut self, live: &[bool]) -> (usize, usize) {
        let mut swept = 0;
        for (index, slot) in self.entries.iter_mut().enumerate() {
            if live.get(index).copied().unwrap_or(false) {
                continue;
            }
            if let Some(text) = slot.take() {
                self.interned.remove(&*text);
                self.free.push(index as u32);
                swept += 1;
            }
        }
        (self.live_count(), swept)
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_int_prefix(text: &str) -> i64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut negative = false;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        negative = bytes[i] == b'-';
        i += 1;
    }
    let mut value: i64 = 0;
    let mut any = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        let digit = (bytes[i] - b'0') as i64;
        value = value.saturating_mul(10).saturating_add(digit);
        any = true;
        i += 1;
    }
    if !any {
        return 0;
    }
    if negative { value.saturating_neg() } else { value }
}

fn parse_float_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let len = float_prefix_len(text);
    if len == 0 {
        return 0.0;
    }
    text[..len].parse::<f64>().unwrap_or(0.0)
}

/// Byte length of the leading substring matching
/// `[+-]? digits [. digits]? ([eE] [+-]? digits)?` with at least one digit
/// in the mantissa.
fn float_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut any_digit = i > int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > frac_start || any_digit {
            any_digit = any_digit || j > frac_start;
            i = j;
        }
    }
    if !any_digit {
        return 0;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}
