//! Scoped rollback for speculative mutations.
//!
//! A `Restorer` wraps a mutable borrow together with the means to undo a
//! change made through it. Dropping the guard undoes the change unless
//! `commit` was called first, so every early return out of a failed search
//! branch rolls back on its own.
//!
//! The guard derefs to the wrapped value, which lets a recursive search keep
//! working on the same state while the guard is alive:
//!
//! ```
//! use puzzles::restore::Restorer;
//!
//! let mut slots = vec![0, 0, 0];
//! {
//!     let mut guard = Restorer::snapshot(&mut slots);
//!     guard[1] = 7;
//!     assert_eq!(guard[1], 7);
//! } // dropped without commit: rolled back
//! assert_eq!(slots, vec![0, 0, 0]);
//! ```

use std::ops::{Deref, DerefMut};

pub struct Restorer<'a, T: ?Sized, F: FnOnce(&mut T)> {
    target: &'a mut T,
    undo: Option<F>,
}

impl<'a, T: ?Sized, F: FnOnce(&mut T)> Restorer<'a, T, F> {
    /// Guards `target`; `undo` runs on drop unless the guard is committed.
    pub fn new(target: &'a mut T, undo: F) -> Self {
        Self {
            target,
            undo: Some(undo),
        }
    }

    /// Keeps the changes; nothing is undone when the guard goes away.
    pub fn commit(mut self) {
        self.undo = None;
    }

    /// Undoes the changes right away instead of waiting for the drop.
    pub fn restore(mut self) {
        if let Some(undo) = self.undo.take() {
            undo(&mut *self.target);
        }
    }
}

impl<'a, T: Clone> Restorer<'a, T, Box<dyn FnOnce(&mut T) + 'a>> {
    /// Saves a copy of `target` and puts it back on rollback.
    pub fn snapshot(target: &'a mut T) -> Self {
        let saved = target.clone();
        Self::new(target, Box::new(move |value: &mut T| *value = saved))
    }
}

impl<T: ?Sized, F: FnOnce(&mut T)> Deref for Restorer<'_, T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.target
    }
}

impl<T: ?Sized, F: FnOnce(&mut T)> DerefMut for Restorer<'_, T, F> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.target
    }
}

impl<T: ?Sized, F: FnOnce(&mut T)> Drop for Restorer<'_, T, F> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            undo(&mut *self.target);
        }
    }
}
