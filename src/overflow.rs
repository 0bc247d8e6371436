//! Heap overflow list for records the ring could not take.
//!
//! Nodes are appended only after a ring allocation fails, so the list is
//! not globally ordered relative to ring residents, but sequences within
//! the list itself are strictly increasing. Each node is one allocation
//! carrying its header and payload; the drain path frees it exactly once,
//! after the record has been handed to every sink.

use core::alloc::Layout;
use core::ptr::{self, NonNull};

use crate::hooks::MemoryHooks;
use crate::level::LogLevel;
use crate::ring::FrameHeader;

#[repr(C)]
struct OverflowNode {
    next: *mut OverflowNode,
    header: FrameHeader,
    // Payload bytes follow the node in the same allocation.
}

#[inline]
fn payload_ptr(node: *mut OverflowNode) -> *mut u8 {
    // SAFETY: the allocation extends `header.len` bytes past the node.
    unsafe { node.add(1) as *mut u8 }
}

/// A node unlinked by [`OverflowList::take_head_if`], pending release.
pub(crate) struct TakenNode {
    node: NonNull<OverflowNode>,
}

impl TakenNode {
    pub(crate) fn level(&self) -> LogLevel {
        // SAFETY: the node stays allocated until `OverflowList::release`.
        LogLevel::from_u8(unsafe { (*self.node.as_ptr()).header.tag })
    }

    pub(crate) fn len(&self) -> usize {
        // SAFETY: as above.
        unsafe { (*self.node.as_ptr()).header.len as usize }
    }

    pub(crate) fn payload(&self) -> *const u8 {
        payload_ptr(self.node.as_ptr())
    }
}

/// Singly linked overflow list with O(1) tail append.
pub(crate) struct OverflowList<M: MemoryHooks> {
    head: *mut OverflowNode,
    tail: *mut OverflowNode,
    hooks: M,
}

impl<M: MemoryHooks> OverflowList<M> {
    pub(crate) fn new(hooks: M) -> Self {
        Self {
            head: ptr::null_mut(),
            tail: ptr::null_mut(),
            hooks,
        }
    }

    fn layout_for(len: usize) -> Option<Layout> {
        let size = core::mem::size_of::<OverflowNode>().checked_add(len)?;
        Layout::from_size_align(size, core::mem::align_of::<OverflowNode>()).ok()
    }

    /// Allocate and append a node for a `len`-byte payload; returns the
    /// writable payload slice, or `None` if the hooks refuse.
    pub(crate) fn try_push(
        &mut self,
        level: LogLevel,
        seq: u64,
        len: usize,
    ) -> Option<&mut [u8]> {
        if len > u32::MAX as usize {
            return None;
        }
        let layout = Self::layout_for(len)?;
        let raw = self.hooks.allocate(layout)?;
        let node = raw.as_ptr() as *mut OverflowNode;

        // SAFETY: fresh allocation of `layout` bytes, node-aligned.
        unsafe {
            node.write(OverflowNode {
                next: ptr::null_mut(),
                header: FrameHeader {
                    seq,
                    len: len as u32,
                    tag: level as u8,
                },
            });
            if self.tail.is_null() {
                self.head = node;
            } else {
                (*self.tail).next = node;
            }
            self.tail = node;
            Some(core::slice::from_raw_parts_mut(payload_ptr(node), len))
        }
    }

    /// Unlink and return the head node if it carries `expected`.
    pub(crate) fn take_head_if(&mut self, expected: u64) -> Option<TakenNode> {
        if self.head.is_null() {
            return None;
        }
        // SAFETY: a non-null head is a live node owned by this list.
        unsafe {
            if (*self.head).header.seq != expected {
                return None;
            }
            let node = self.head;
            self.head = (*node).next;
            if self.head.is_null() {
                self.tail = ptr::null_mut();
            }
            Some(TakenNode {
                node: NonNull::new_unchecked(node),
            })
        }
    }

    /// Free a node previously unlinked from this list.
    pub(crate) fn release(&self, taken: TakenNode) {
        let len = taken.len();
        // SAFETY: the layout was validated when the node was allocated;
        // the node came from this list's hooks and is freed exactly once.
        unsafe {
            let layout = Layout::from_size_align_unchecked(
                core::mem::size_of::<OverflowNode>() + len,
                core::mem::align_of::<OverflowNode>(),
            );
            self.hooks.free(taken.node.cast(), layout);
        }
    }
}

impl<M: MemoryHooks> Drop for OverflowList<M> {
    fn drop(&mut self) {
        // A normal teardown drains the list first; this covers teardown
        // after a panicking sink.
        let mut node = self.head;
        while !node.is_null() {
            // SAFETY: walking the chain we exclusively own; each node is
            // freed once with the layout it was allocated with.
            unsafe {
                let next = (*node).next;
                let len = (*node).header.len as usize;
                let layout = Layout::from_size_align_unchecked(
                    core::mem::size_of::<OverflowNode>() + len,
                    core::mem::align_of::<OverflowNode>(),
                );
                self.hooks.free(NonNull::new_unchecked(node as *mut u8), layout);
                node = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Global-allocator hooks that track outstanding allocations.
    #[derive(Default)]
    struct CountingHeap {
        live: AtomicUsize,
    }

    impl<'h> MemoryHooks for &'h CountingHeap {
        fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            self.live.fetch_add(1, Ordering::Relaxed);
            NonNull::new(unsafe { std::alloc::alloc(layout) })
        }

        unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.fetch_sub(1, Ordering::Relaxed);
            std::alloc::dealloc(ptr.as_ptr(), layout)
        }
    }

    /// Hooks that refuse every allocation.
    struct RefusingHeap;

    impl MemoryHooks for RefusingHeap {
        fn allocate(&self, _layout: Layout) -> Option<NonNull<u8>> {
            None
        }

        unsafe fn free(&self, _ptr: NonNull<u8>, _layout: Layout) {
            unreachable!("nothing was ever allocated");
        }
    }

    fn push(list: &mut OverflowList<&CountingHeap>, seq: u64, payload: &[u8]) -> bool {
        match list.try_push(LogLevel::Warn, seq, payload.len()) {
            Some(slot) => {
                slot.copy_from_slice(payload);
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_fifo_order_and_release() {
        let heap = CountingHeap::default();
        let mut list = OverflowList::new(&heap);

        assert!(push(&mut list, 1, b"first"));
        assert!(push(&mut list, 2, b"second"));
        assert_eq!(heap.live.load(Ordering::Relaxed), 2);

        let taken = list.take_head_if(1).unwrap();
        assert_eq!(taken.level(), LogLevel::Warn);
        let bytes = unsafe { core::slice::from_raw_parts(taken.payload(), taken.len()) };
        assert_eq!(bytes, b"first");
        list.release(taken);

        let taken = list.take_head_if(2).unwrap();
        list.release(taken);

        assert!(list.take_head_if(3).is_none());
        assert_eq!(heap.live.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_head_sequence_mismatch_leaves_list_intact() {
        let heap = CountingHeap::default();
        let mut list = OverflowList::new(&heap);

        assert!(push(&mut list, 5, b"pending"));
        assert!(list.take_head_if(4).is_none());

        let taken = list.take_head_if(5).unwrap();
        list.release(taken);
    }

    #[test]
    fn test_refusing_hooks_fail_the_push() {
        let mut list = OverflowList::new(RefusingHeap);
        assert!(list.try_push(LogLevel::Info, 1, 16).is_none());
    }

    #[test]
    fn test_drop_frees_leftover_nodes() {
        let heap = CountingHeap::default();
        {
            let mut list = OverflowList::new(&heap);
            assert!(push(&mut list, 1, b"a"));
            assert!(push(&mut list, 2, b"bb"));
            assert!(push(&mut list, 3, b"ccc"));
        }
        assert_eq!(heap.live.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_zero_length_payload_node() {
        let heap = CountingHeap::default();
        let mut list = OverflowList::new(&heap);

        assert!(push(&mut list, 1, b""));
        let taken = list.take_head_if(1).unwrap();
        assert_eq!(taken.len(), 0);
        list.release(taken);
    }
}
