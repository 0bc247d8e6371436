//! Caller-injected synchronization and memory primitives.
//!
//! The logger owns no threads and no allocator. Whatever the surrounding
//! system uses for critical sections and heap memory is injected through
//! these traits; the defaults (`NoLock`, `NoHeap`) are no-ops, which keeps
//! single-context, allocation-free use free of any runtime cost.
//!
//! # Rules
//!
//! - Hooks must never call back into the logger, directly or indirectly
//! - Lock hooks must not be reentrant; recursive acquisition is undefined
//!   behavior by contract and is not detected at runtime

use core::alloc::Layout;
use core::ptr::NonNull;

#[cfg(feature = "alloc")]
use alloc::alloc::{alloc as heap_alloc, dealloc as heap_dealloc};

/// Critical-section hooks bracketing every mutation of logger state.
pub trait LockHooks {
    /// Enter the critical section.
    fn lock(&self);
    /// Leave the critical section.
    fn unlock(&self);
}

/// No-op lock hooks.
///
/// With `NoLock` the logger performs no synchronization and is not safe
/// for concurrent producer/consumer use. This is the documented contract
/// for single-context deployments, not a bug.
#[derive(Debug, Default)]
pub struct NoLock;

impl LockHooks for NoLock {
    #[inline]
    fn lock(&self) {}
    #[inline]
    fn unlock(&self) {}
}

/// Spinlock-backed lock hooks for no_std callers.
#[cfg(feature = "spin")]
#[derive(Debug, Default)]
pub struct SpinLock {
    inner: spin::Mutex<()>,
}

#[cfg(feature = "spin")]
impl SpinLock {
    /// Create an unlocked spinlock.
    pub const fn new() -> Self {
        Self {
            inner: spin::Mutex::new(()),
        }
    }
}

#[cfg(feature = "spin")]
impl LockHooks for SpinLock {
    #[inline]
    fn lock(&self) {
        core::mem::forget(self.inner.lock());
    }

    #[inline]
    fn unlock(&self) {
        // SAFETY: paired with the guard forgotten in `lock`; the protected
        // value is `()` so no data reference can outlive the unlock.
        unsafe { self.inner.force_unlock() }
    }
}

/// Memory hooks used for overflow-record allocation.
pub trait MemoryHooks {
    /// Allocate `layout` bytes, or `None` on failure.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Free memory previously returned by [`MemoryHooks::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this same hook instance, with the
    /// same `layout`, and must not be freed twice.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Absent memory hooks: every allocation fails.
///
/// With `NoHeap` the ring buffer is the only storage tier; captures that do
/// not fit are dropped and counted.
#[derive(Debug, Default)]
pub struct NoHeap;

impl MemoryHooks for NoHeap {
    #[inline]
    fn allocate(&self, _layout: Layout) -> Option<NonNull<u8>> {
        None
    }

    #[inline]
    unsafe fn free(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}

/// Memory hooks backed by the global allocator.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct GlobalHeap;

#[cfg(feature = "alloc")]
impl MemoryHooks for GlobalHeap {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: overflow layouts always cover at least one node header,
        // so the size is never zero.
        NonNull::new(unsafe { heap_alloc(layout) })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        heap_dealloc(ptr.as_ptr(), layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "spin")]
    #[test]
    fn test_spinlock_lock_unlock_pairs() {
        let lock = SpinLock::new();
        lock.lock();
        lock.unlock();
        lock.lock();
        lock.unlock();
    }

    #[test]
    fn test_noheap_always_fails() {
        let layout = Layout::from_size_align(64, 8).unwrap();
        assert!(NoHeap.allocate(layout).is_none());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_globalheap_roundtrip() {
        let layout = Layout::from_size_align(64, 8).unwrap();
        let ptr = GlobalHeap.allocate(layout).unwrap();
        // SAFETY: freshly allocated with the same layout.
        unsafe { GlobalHeap.free(ptr, layout) };
    }
}
