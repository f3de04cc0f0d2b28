//! Write-once memoisation cell.

use std::sync::{Mutex, PoisonError};

/// Value computed by the first successful initialiser and cached forever.
///
/// Initialisation runs under the lock, so concurrent first accesses issue
/// exactly one computation. Failed initialisations are not cached.
#[derive(Debug)]
pub(crate) struct Memo<T> {
    slot: Mutex<Option<T>>,
}

impl<T: Clone> Memo<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub(crate) fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        // The slot only ever holds a fully written value, so a poisoned lock
        // is still consistent.
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = init()?;
        *slot = Some(value.clone());
        Ok(value)
    }

    pub(crate) fn get(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
