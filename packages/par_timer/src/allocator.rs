//! Global allocator wrapper that feeds the allocation columns.

use std::alloc::{GlobalAlloc, Layout};
use std::cell::Cell;
use std::fmt;

thread_local! {
    // Plain cells with const initializers: no lazy init and no destructor, so touching them from
    // inside the allocator can never allocate or recurse.
    static THREAD_ALLOC_COUNT: Cell<u64> = const { Cell::new(0) };
    static THREAD_BYTES_ALLOCATED: Cell<u64> = const { Cell::new(0) };
}

/// Number of allocations made by the current thread so far.
pub(crate) fn thread_alloc_count() -> u64 {
    THREAD_ALLOC_COUNT.try_with(Cell::get).unwrap_or_default()
}

/// Bytes allocated by the current thread so far.
pub(crate) fn thread_bytes_allocated() -> u64 {
    THREAD_BYTES_ALLOCATED.try_with(Cell::get).unwrap_or_default()
}

fn track_allocation(size: usize) {
    let size: u64 = size.try_into().expect("usize always fits into u64");

    // During thread teardown the slots may already be gone. Those allocations go uncounted.
    _ = THREAD_ALLOC_COUNT.try_with(|count| count.set(count.get().wrapping_add(1)));
    _ = THREAD_BYTES_ALLOCATED.try_with(|bytes| bytes.set(bytes.get().wrapping_add(size)));
}

// Test helper for unit tests where we do not hook the global allocator.
#[cfg(test)]
pub(crate) fn register_fake_allocation(bytes: u64) {
    track_allocation(usize::try_from(bytes).expect("test sizes fit into usize"));
}

/// A memory allocator that counts the allocations of each thread.
///
/// Install it as the global allocator to populate the `n_allocs` and `bytes` columns of every
/// [`Record`](crate::Record). Without it, both columns are zero. Only the calling thread's
/// allocations are attributed to a call, since that is the thread the call runs on.
///
/// # Examples
///
/// ```rust
/// use par_timer::{Allocator, Timer};
///
/// #[global_allocator]
/// static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();
///
/// let timer = Timer::new();
/// timer.record("allocating", || vec![1_u8, 2, 3]);
///
/// assert!(timer.rows()[0].alloc_count() >= 1);
/// ```
pub struct Allocator<A: GlobalAlloc> {
    inner: A,
}

impl<A: GlobalAlloc> fmt::Debug for Allocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocator")
            .field("inner", &"<allocator>")
            .finish()
    }
}

impl Allocator<std::alloc::System> {
    /// Creates a new counting allocator on top of the system allocator.
    #[must_use]
    #[inline]
    pub const fn system() -> Self {
        Self {
            inner: std::alloc::System,
        }
    }
}

impl<A: GlobalAlloc> Allocator<A> {
    /// Creates a new counting allocator on top of the provided allocator.
    #[must_use]
    #[inline]
    pub const fn new(allocator: A) -> Self {
        Self { inner: allocator }
    }
}

// SAFETY: We delegate all allocation operations to the underlying allocator,
// which already implements GlobalAlloc safely, and only add counting on the side.
unsafe impl<A: GlobalAlloc> GlobalAlloc for Allocator<A> {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        track_allocation(layout.size());

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.alloc(layout) }
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        track_allocation(layout.size());

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.alloc_zeroed(layout) }
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        track_allocation(new_size);

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.realloc(ptr, layout, new_size) }
    }
}
