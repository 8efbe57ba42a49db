use alloc::vec::Vec;
use core::{alloc::Layout, ptr::NonNull};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{MemoryResource, StoragePtr, bump};
use crate::Error;

const MIN_BLOCK_SIZE: usize = 1024;
const BLOCK_ALIGN: usize = 16;

/// An arena resource.
///
/// Allocations are carved out of large blocks obtained from an upstream
/// resource. `deallocate` does nothing; memory is only returned when the
/// resource is [released](Self::release) or dropped. Each new block is twice
/// the size of the previous one, starting at 1024 bytes unless told
/// otherwise.
///
/// An optional caller-owned seed buffer is used before any block is
/// requested upstream, which makes it possible to parse small documents
/// without touching the heap at all.
///
/// ```
/// use jsonpool::{MonotonicResource, StoragePtr, parse_in};
///
/// let sp = StoragePtr::new(MonotonicResource::new());
/// let value = parse_in(br#"{"pi":3.14,"list":[1,2,3]}"#, sp.clone()).unwrap();
/// assert_eq!(value.storage(), &sp);
/// ```
#[derive(Debug)]
pub struct MonotonicResource {
    arena: Mutex<Arena>,
    upstream: StoragePtr,
}

#[derive(Debug)]
struct Region {
    base: NonNull<u8>,
    cap: usize,
    used: usize,
}

impl Region {
    fn take(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let (offset, end) = bump(self.base, self.used, self.cap, layout)?;
        self.used = end;
        // SAFETY: `offset + layout.size() <= cap`, so the result stays inside
        // the region.
        Some(unsafe { self.base.add(offset) })
    }
}

#[derive(Debug)]
struct Arena {
    seed: Option<NonNull<[u8]>>,
    current: Option<Region>,
    blocks: Vec<(NonNull<u8>, Layout)>,
    initial_size: usize,
    next_size: usize,
}

// SAFETY: the arena has exclusive use of its seed buffer and blocks; raw
// pointers are only dereferenced while the enclosing mutex is held.
unsafe impl Send for Arena {}

impl Arena {
    fn seed_region(&self) -> Option<Region> {
        self.seed.map(|seed| Region {
            base: seed.cast::<u8>(),
            cap: seed.len(),
            used: 0,
        })
    }
}

fn block_size(n: usize) -> usize {
    n.max(MIN_BLOCK_SIZE)
        .checked_next_power_of_two()
        .unwrap_or(n)
}

impl Default for MonotonicResource {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicResource {
    /// Creates an arena whose first block is 1024 bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_initial_size(MIN_BLOCK_SIZE)
    }

    /// Creates an arena whose first block holds at least `initial_size`
    /// bytes, rounded up to a power of two.
    #[must_use]
    pub fn with_initial_size(initial_size: usize) -> Self {
        let size = block_size(initial_size);
        Self {
            arena: Mutex::new(Arena {
                seed: None,
                current: None,
                blocks: Vec::new(),
                initial_size: size,
                next_size: size,
            }),
            upstream: StoragePtr::default(),
        }
    }

    /// Creates an arena that serves allocations from `buffer` first.
    ///
    /// Once the buffer is exhausted, blocks are requested upstream, starting
    /// with the buffer's size rounded up to a power of two. The buffer is
    /// never freed by the arena.
    #[must_use]
    pub fn with_buffer(buffer: &'static mut [u8]) -> Self {
        // SAFETY: a `'static` buffer outlives everything allocated from it.
        unsafe { Self::from_raw_buffer(buffer) }
    }

    /// Like [`with_buffer`](Self::with_buffer), for a buffer with any
    /// lifetime, for example an array on the stack.
    ///
    /// # Safety
    ///
    /// `buffer` must not be used in any other way, nor go out of scope, until
    /// the arena and every value allocated from it (together with every
    /// [`StoragePtr`] to the arena) have been dropped.
    #[must_use]
    pub unsafe fn from_raw_buffer(buffer: &mut [u8]) -> Self {
        let size = block_size(buffer.len());
        let seed = NonNull::from(buffer);
        let mut arena = Arena {
            seed: Some(seed),
            current: None,
            blocks: Vec::new(),
            initial_size: size,
            next_size: size,
        };
        arena.current = arena.seed_region();
        Self {
            arena: Mutex::new(arena),
            upstream: StoragePtr::default(),
        }
    }

    /// Requests blocks from `upstream` instead of the default heap.
    #[must_use]
    pub fn with_upstream(mut self, upstream: StoragePtr) -> Self {
        self.release();
        self.upstream = upstream;
        self
    }

    /// The resource blocks are requested from.
    #[must_use]
    pub fn upstream(&self) -> &StoragePtr {
        &self.upstream
    }

    /// Size of the next block that will be requested upstream.
    #[must_use]
    pub fn next_block_size(&self) -> usize {
        self.lock().next_size
    }

    /// Returns every block to the upstream resource and rewinds the seed
    /// buffer.
    ///
    /// Taking `&mut self` guarantees no value still points into the arena.
    pub fn release(&mut self) {
        let Self { arena, upstream } = self;
        let arena = arena.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !arena.blocks.is_empty() {
            log::debug!(
                "monotonic resource: releasing {} block(s)",
                arena.blocks.len()
            );
        }
        for (ptr, layout) in arena.blocks.drain(..) {
            // SAFETY: every block was obtained from `upstream` with this layout.
            unsafe { upstream.deallocate(ptr, layout) };
        }
        arena.current = arena.seed_region();
        arena.next_size = arena.initial_size;
    }

    fn lock(&self) -> MutexGuard<'_, Arena> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryResource for MonotonicResource {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, Error> {
        let mut arena = self.lock();
        if let Some(ptr) = arena.current.as_mut().and_then(|r| r.take(layout)) {
            return Ok(ptr);
        }

        let needed = layout
            .size()
            .checked_add(layout.align())
            .ok_or(Error::BadAlloc)?;
        let size = arena
            .next_size
            .max(needed)
            .checked_next_power_of_two()
            .ok_or(Error::BadAlloc)?;
        let block_layout = Layout::from_size_align(size, layout.align().max(BLOCK_ALIGN))
            .map_err(|_| Error::BadAlloc)?;
        let base = self.upstream.allocate(block_layout)?;
        log::debug!("monotonic resource: acquired a {size} byte block");

        arena.blocks.push((base, block_layout));
        arena.next_size = size.checked_mul(2).unwrap_or(size);
        let mut region = Region {
            base,
            cap: size,
            used: 0,
        };
        let ptr = region.take(layout).ok_or(Error::BadAlloc)?;
        arena.current = Some(region);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}

    fn is_deallocate_trivial(&self) -> bool {
        true
    }
}

impl Drop for MonotonicResource {
    fn drop(&mut self) {
        self.release();
    }
}
