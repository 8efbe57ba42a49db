//! Uninitialised buffers obtained from a [`StoragePtr`].

use core::{alloc::Layout, marker::PhantomData, ptr::NonNull};

use crate::{Error, StoragePtr};

/// `cap` uninitialised slots of `T`.
///
/// The buffer does not remember which resource it came from; the owning
/// container passes its own `StoragePtr` to [`RawBuf::release`]. Capacity
/// zero never allocates.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _owns: PhantomData<T>,
}

// SAFETY: `RawBuf` owns its slots like `Vec<T>` does.
unsafe impl<T: Send> Send for RawBuf<T> {}
// SAFETY: see above.
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    pub(crate) const fn dangling() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _owns: PhantomData,
        }
    }

    /// Allocates room for `cap` values from `sp`.
    ///
    /// Fails with [`Error::LengthError`] when the byte size overflows, before
    /// the resource is asked for anything.
    pub(crate) fn allocate(sp: &StoragePtr, cap: usize) -> Result<Self, Error> {
        if cap == 0 || size_of::<T>() == 0 {
            return Ok(Self::dangling());
        }
        let layout = Layout::array::<T>(cap).map_err(|_| Error::LengthError)?;
        let ptr = sp.allocate(layout)?.cast::<T>();
        Ok(Self {
            ptr,
            cap,
            _owns: PhantomData,
        })
    }

    /// Returns the slots to `sp` and leaves the buffer empty.
    ///
    /// # Safety
    ///
    /// `sp` must be equal to the handle the buffer was allocated from, and
    /// every initialised slot must already have been dropped or moved out.
    pub(crate) unsafe fn release(&mut self, sp: &StoragePtr) {
        if self.cap != 0 && size_of::<T>() != 0 {
            // SAFETY: the same layout was valid when the buffer was allocated.
            let layout = unsafe {
                Layout::from_size_align_unchecked(size_of::<T>() * self.cap, align_of::<T>())
            };
            // SAFETY: forwarded to the caller.
            unsafe { sp.deallocate(self.ptr.cast::<u8>(), layout) };
        }
        *self = Self::dangling();
    }

    #[inline]
    pub(crate) fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T> core::fmt::Debug for RawBuf<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawBuf")
            .field("ptr", &self.ptr)
            .field("cap", &self.cap)
            .finish()
    }
}
