//! Per-instance re-entry tracking.
//!
//! A dictionary that contains itself (directly or through other
//! containers or host objects) would recurse forever while rendering its
//! repr or comparing against another such dictionary. Each dictionary
//! embeds one `Reentry` flag per recursive operation; a nested attempt to
//! enter the same flag is refused so the caller can emit a placeholder
//! (repr) or an error (equality) instead.

use core::cell::Cell;
use core::marker::PhantomData;

/// Embed in a struct and guard recursive entry points with
/// `let Some(_g) = self.reentry.enter() else { ... };`.
#[derive(Debug, Default)]
pub(crate) struct Reentry {
    active: Cell<bool>,
    // Single-threaded like the dictionary that owns it.
    _nosend: PhantomData<*mut ()>,
}

impl Reentry {
    pub(crate) const fn new() -> Self {
        Self {
            active: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Enter the guarded section; `None` when it is already entered.
    #[inline]
    pub(crate) fn enter(&self) -> Option<ReentryGuard<'_>> {
        if self.active.replace(true) {
            return None;
        }
        Some(ReentryGuard { owner: self })
    }
}

/// RAII guard returned by `Reentry::enter`; leaving clears the flag.
pub(crate) struct ReentryGuard<'a> {
    owner: &'a Reentry,
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        debug_assert!(self.owner.active.get());
        self.owner.active.set(false);
    }
}
