//! Pluggable memory resources and the [`StoragePtr`] handle that containers
//! carry to reach them.
//!
//! Every [`JsonString`](crate::JsonString), [`Array`](crate::Array),
//! [`Object`](crate::Object) and [`Value`](crate::Value) owns a `StoragePtr`
//! fixed at construction. All memory a container needs, and all memory its
//! children need, comes from that one resource.
//!
//! Four resources ship with the crate:
//!
//! - [`DefaultResource`]: the global heap. A default-constructed
//!   `StoragePtr` refers to it.
//! - [`MonotonicResource`]: an arena whose `deallocate` is a no-op.
//! - [`FixedResource`]: bump allocation from one fixed buffer, never touching
//!   the heap.
//! - [`NullResource`]: fails every allocation.

mod fixed;
mod monotonic;

use alloc::sync::Arc;
use core::{alloc::Layout, fmt, ptr::NonNull};

pub use fixed::FixedResource;
pub use monotonic::MonotonicResource;

use crate::Error;

/// An allocation strategy.
///
/// Implementations must be thread-safe in the Rust sense (`Send + Sync`), but
/// arena-style resources are not meant to be shared between threads that
/// allocate concurrently; they merely serialize access internally.
pub trait MemoryResource: Send + Sync + fmt::Debug {
    /// Allocates a block described by `layout`.
    ///
    /// `layout.size()` is never zero when called by this crate.
    ///
    /// # Errors
    ///
    /// [`Error::BadAlloc`] when the request cannot be satisfied.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, Error>;

    /// Returns a block to the resource.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by [`allocate`](Self::allocate) on this
    /// resource, or on a resource for which [`is_equal`](Self::is_equal)
    /// returns `true`, with the same `layout`, and must not be used again.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Whether memory allocated by `self` may be released by `other` and vice
    /// versa. Defaults to identity.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        core::ptr::addr_eq(self as *const Self, other as *const dyn MemoryResource)
    }

    /// Whether [`deallocate`](Self::deallocate) is a no-op.
    fn is_deallocate_trivial(&self) -> bool {
        false
    }
}

// --- StoragePtr ----------------------------------------------------------

#[derive(Clone, Default)]
enum Handle {
    #[default]
    Default,
    Borrowed(&'static dyn MemoryResource),
    Shared(Arc<dyn MemoryResource>),
}

/// A handle to a [`MemoryResource`].
///
/// The handle is either the process-wide default heap (the `Default` value),
/// a shared reference-counted resource, or a borrowed `'static` resource.
/// Cloning copies the handle, never the resource. Taking a handle with
/// [`core::mem::take`] leaves the default resource behind.
///
/// Two handles compare equal when their resources report
/// [`MemoryResource::is_equal`].
#[derive(Clone, Default)]
pub struct StoragePtr(Handle);

static DEFAULT_RESOURCE: DefaultResource = DefaultResource::new();

impl StoragePtr {
    pub(crate) const DEFAULT: Self = Self(Handle::Default);

    /// Creates a handle that shares ownership of `resource`.
    pub fn new<R: MemoryResource + 'static>(resource: R) -> Self {
        Self(Handle::Shared(Arc::new(resource)))
    }

    /// Creates a handle from an existing shared resource.
    #[must_use]
    pub fn from_arc(resource: Arc<dyn MemoryResource>) -> Self {
        Self(Handle::Shared(resource))
    }

    /// Creates a non-owning handle to a resource that lives forever.
    #[must_use]
    pub fn borrowed(resource: &'static dyn MemoryResource) -> Self {
        Self(Handle::Borrowed(resource))
    }

    /// The resource this handle refers to.
    #[must_use]
    pub fn resource(&self) -> &dyn MemoryResource {
        match &self.0 {
            Handle::Default => &DEFAULT_RESOURCE,
            Handle::Borrowed(r) => *r,
            Handle::Shared(r) => &**r,
        }
    }

    /// `true` only for reference-counted handles.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self.0, Handle::Shared(_))
    }

    /// `true` when this handle refers to the default heap.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self.0, Handle::Default)
    }

    /// Shortcut for `self.resource().is_deallocate_trivial()`.
    #[must_use]
    pub fn is_deallocate_trivial(&self) -> bool {
        self.resource().is_deallocate_trivial()
    }

    /// Allocates through the underlying resource.
    ///
    /// # Errors
    ///
    /// Whatever the resource reports, usually [`Error::BadAlloc`].
    pub fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, Error> {
        self.resource().allocate(layout)
    }

    /// Deallocates through the underlying resource.
    ///
    /// # Safety
    ///
    /// Same contract as [`MemoryResource::deallocate`].
    pub unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded to the caller.
        unsafe { self.resource().deallocate(ptr, layout) }
    }
}

impl PartialEq for StoragePtr {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Handle::Default, Handle::Default) => true,
            _ => self.resource().is_equal(other.resource()),
        }
    }
}

impl Eq for StoragePtr {}

impl fmt::Debug for StoragePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Handle::Default => f.write_str("StoragePtr(default)"),
            Handle::Borrowed(r) => f.debug_tuple("StoragePtr::Borrowed").field(r).finish(),
            Handle::Shared(r) => f.debug_tuple("StoragePtr::Shared").field(r).finish(),
        }
    }
}

impl<R: MemoryResource + 'static> From<Arc<R>> for StoragePtr {
    fn from(resource: Arc<R>) -> Self {
        Self(Handle::Shared(resource))
    }
}

// --- resources -----------------------------------------------------------

/// The global heap, backed by [`std::alloc`].
// Resources compare by address, so none of them may be zero-sized.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResource {
    _addr: u8,
}

impl DefaultResource {
    /// Creates a resource that allocates from the global heap.
    #[must_use]
    pub const fn new() -> Self {
        Self { _addr: 0 }
    }
}

impl MemoryResource for DefaultResource {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, Error> {
        if layout.size() == 0 {
            return Err(Error::BadAlloc);
        }
        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(Error::BadAlloc)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: the block came from `std::alloc::alloc` with this layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// A resource that fails every allocation.
///
/// Building a value on this resource proves that the operation needs no
/// dynamic memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullResource {
    _addr: u8,
}

static NULL_RESOURCE: NullResource = NullResource::new();

impl NullResource {
    /// Creates a new null resource.
    #[must_use]
    pub const fn new() -> Self {
        Self { _addr: 0 }
    }

    /// A borrowed handle to a process-wide `NullResource`.
    #[must_use]
    pub fn storage() -> StoragePtr {
        StoragePtr::borrowed(&NULL_RESOURCE)
    }
}

impl MemoryResource for NullResource {
    fn allocate(&self, _layout: Layout) -> Result<NonNull<u8>, Error> {
        Err(Error::BadAlloc)
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}

    fn is_deallocate_trivial(&self) -> bool {
        true
    }
}

/// Returns the offset of the first `layout`-aligned address at or after
/// `base + used`, and the end of the block placed there, if it fits in `cap`.
pub(crate) fn bump(
    base: NonNull<u8>,
    used: usize,
    cap: usize,
    layout: Layout,
) -> Option<(usize, usize)> {
    let addr = base.as_ptr() as usize;
    let start = addr.checked_add(used)?;
    let aligned = start.checked_add(layout.align() - 1)? & !(layout.align() - 1);
    let offset = aligned - addr;
    let end = offset.checked_add(layout.size())?;
    (end <= cap).then_some((offset, end))
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::alloc::Layout;

    use super::{DefaultResource, MemoryResource, MonotonicResource, NullResource, StoragePtr};
    use crate::Error;

    #[test]
    fn default_handles_compare_equal() {
        let a = StoragePtr::default();
        let b = StoragePtr::borrowed(&super::DEFAULT_RESOURCE);
        assert_eq!(a, StoragePtr::default());
        assert_eq!(a, b);
        assert!(!a.is_shared());
        assert!(!b.is_shared());
    }

    #[test]
    fn shared_handles_compare_by_resource() {
        let a = StoragePtr::new(MonotonicResource::new());
        let b = a.clone();
        let c = StoragePtr::new(MonotonicResource::new());
        assert!(a.is_shared());
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, StoragePtr::default());
    }

    #[test]
    fn take_leaves_default_behind() {
        let mut a = StoragePtr::new(MonotonicResource::new());
        let b = core::mem::take(&mut a);
        assert!(a.is_default());
        assert!(b.is_shared());
    }

    #[test]
    fn clone_shares_the_resource() {
        let resource = Arc::new(MonotonicResource::new());
        let sp = StoragePtr::from(Arc::clone(&resource));
        assert_eq!(Arc::strong_count(&resource), 2);
        let copy = sp.clone();
        assert_eq!(Arc::strong_count(&resource), 3);
        drop((sp, copy));
        assert_eq!(Arc::strong_count(&resource), 1);
    }

    #[test]
    fn null_resource_always_fails() {
        let sp = NullResource::storage();
        assert_eq!(sp.allocate(Layout::new::<u64>()), Err(Error::BadAlloc));
        assert!(sp.is_deallocate_trivial());
    }

    #[test]
    fn default_resource_roundtrip() {
        let layout = Layout::from_size_align(64, 16).unwrap();
        let ptr = DefaultResource::new().allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % 16, 0);
        unsafe { DefaultResource::new().deallocate(ptr, layout) };
    }
}
