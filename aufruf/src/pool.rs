//! Signature recycling.
//!
//! Resetting a populated signature is cheaper than allocating a fresh one
//! because the positional backing storage survives. Exactly one owner
//! holds a signature between `take` and the next `recycle`; the pool
//! itself serializes access so it can be shared across threads of control.

use parking_lot::{Mutex, MutexGuard};

use crate::Signature;

pub struct SignaturePool {
    parked: Mutex<Vec<Signature>>,
    limit: usize,
}

impl SignaturePool {
    /// A pool that parks at most `limit` signatures; beyond that,
    /// recycled signatures are simply dropped.
    pub fn new(limit: usize) -> Self {
        Self {
            parked: Mutex::new(Vec::new()),
            limit,
        }
    }

    /// Pop a parked signature, or allocate a fresh one.
    pub fn take(&self) -> Signature {
        self.parked.lock().pop().unwrap_or_default()
    }

    /// Reset and park a signature for the next call.
    pub fn recycle(&self, mut signature: Signature) {
        signature.reset();
        let mut parked = self.parked.lock();
        if parked.len() < self.limit {
            parked.push(signature);
        }
    }

    pub fn parked_count(&self) -> usize {
        self.parked.lock().len()
    }

    /// Parked signatures are still subject to tracing until reset tears
    /// their contents down, so the collector walks them as roots.
    pub(crate) fn parked(&self) -> MutexGuard<'_, Vec<Signature>> {
        self.parked.lock()
    }
}
