use alloc::{boxed::Box, vec};
use core::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};

use super::{MemoryResource, bump};
use crate::Error;

/// A resource that allocates only from a buffer supplied up front.
///
/// Allocation is a pointer bump; `deallocate` does nothing. When the buffer
/// is exhausted every further allocation fails with [`Error::BadAlloc`]
/// rather than falling back to the heap.
///
/// The buffer is either allocated by [`new`](Self::new) or owned by the
/// caller ([`with_buffer`](Self::with_buffer),
/// [`from_raw_buffer`](Self::from_raw_buffer)), in which case the resource
/// never touches the heap at all.
///
/// ```
/// use jsonpool::{FixedResource, StoragePtr, parse_in};
///
/// let buffer: &'static mut [u8] = Box::leak(Box::new([0u8; 1024]));
/// let sp = StoragePtr::new(FixedResource::with_buffer(buffer));
/// let value = parse_in(br#"["a string that needs the buffer"]"#, sp).unwrap();
/// assert_eq!(value[0].as_str(), Some("a string that needs the buffer"));
/// ```
#[derive(Debug)]
pub struct FixedResource {
    buf: NonNull<[u8]>,
    used: AtomicUsize,
    owned: bool,
}

// SAFETY: the resource has exclusive use of the buffer and hands it out in
// disjoint pieces; the bump offset is updated atomically.
unsafe impl Send for FixedResource {}
// SAFETY: see above.
unsafe impl Sync for FixedResource {}

impl FixedResource {
    /// Creates a resource over a zeroed heap buffer of `size` bytes, freed
    /// when the resource is dropped.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let buf = NonNull::from(Box::leak(vec![0u8; size].into_boxed_slice()));
        Self {
            buf,
            used: AtomicUsize::new(0),
            owned: true,
        }
    }

    /// Creates a resource over a caller-owned buffer that lives for the rest
    /// of the program, such as a `static` array or a leaked box.
    #[must_use]
    pub fn with_buffer(buffer: &'static mut [u8]) -> Self {
        // SAFETY: a `'static` buffer outlives everything allocated from it.
        unsafe { Self::from_raw_buffer(buffer) }
    }

    /// Creates a resource over a caller-owned buffer with any lifetime, for
    /// example an array on the stack.
    ///
    /// # Safety
    ///
    /// `buffer` must not be used in any other way, nor go out of scope, until
    /// the resource and every value allocated from it (together with every
    /// [`StoragePtr`](crate::StoragePtr) to the resource) have been dropped.
    #[must_use]
    pub unsafe fn from_raw_buffer(buffer: &mut [u8]) -> Self {
        Self {
            buf: NonNull::from(buffer),
            used: AtomicUsize::new(0),
            owned: false,
        }
    }

    /// Total size of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes handed out so far, alignment padding included.
    #[must_use]
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    /// Makes the whole buffer available again.
    pub fn release(&mut self) {
        *self.used.get_mut() = 0;
    }
}

impl MemoryResource for FixedResource {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, Error> {
        let base = self.buf.cast::<u8>();
        let cap = self.buf.len();
        let mut used = self.used.load(Ordering::Acquire);
        loop {
            let (offset, end) = bump(base, used, cap, layout).ok_or(Error::BadAlloc)?;
            match self
                .used
                .compare_exchange_weak(used, end, Ordering::AcqRel, Ordering::Acquire)
            {
                // SAFETY: `offset..end` lies inside the buffer and was claimed
                // by the exchange above.
                Ok(_) => return Ok(unsafe { base.add(offset) }),
                Err(current) => used = current,
            }
        }
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}

    fn is_deallocate_trivial(&self) -> bool {
        true
    }
}

impl Drop for FixedResource {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: an owned buffer was leaked from a `Box<[u8]>` in `new`.
            drop(unsafe { Box::from_raw(self.buf.as_ptr()) });
        }
    }
}
