//! The [`JsonString`] container.

use alloc::borrow::Cow;
use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Deref, Range},
    ptr, slice,
};

use bstr::ByteSlice;

use crate::{Error, StoragePtr, raw::RawBuf};

const SBO_CAPACITY: usize = 14;
const MAX_SIZE: usize = 0x7fff_fffe;

enum Repr {
    Inline {
        len: u8,
        buf: [u8; SBO_CAPACITY + 1],
    },
    Heap {
        len: usize,
        buf: RawBuf<u8>,
    },
}

impl Repr {
    const EMPTY: Repr = Repr::Inline {
        len: 0,
        buf: [0; SBO_CAPACITY + 1],
    };
}

/// A byte string that draws its memory from a [`StoragePtr`].
///
/// Up to [`JsonString::SBO_CAPACITY`] bytes are stored inline without any
/// allocation. The contents are always followed by a NUL byte, exposed by
/// [`as_bytes_with_nul`](Self::as_bytes_with_nul).
///
/// Contents are usually UTF-8, but a parser configured with
/// `allow_invalid_utf8` may produce arbitrary bytes, so [`as_str`](Self::as_str)
/// is fallible.
///
/// Every operation that may allocate returns a `Result`. A failed operation
/// leaves the string unchanged.
///
/// ```
/// use jsonpool::JsonString;
///
/// let mut s = JsonString::from("hello");
/// s.append(b", world").unwrap();
/// s.insert_within(0, 7..12).unwrap();
/// assert_eq!(s, "worldhello, world");
/// ```
pub struct JsonString {
    repr: Repr,
    sp: StoragePtr,
}

impl JsonString {
    /// Number of bytes stored without allocating.
    pub const SBO_CAPACITY: usize = SBO_CAPACITY;

    /// Largest supported length.
    #[must_use]
    pub const fn max_size() -> usize {
        MAX_SIZE
    }

    // --- construction ----------------------------------------------------

    /// An empty string on the default resource.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(StoragePtr::default())
    }

    /// An empty string on `sp`. Never allocates.
    #[must_use]
    pub fn new_in(sp: StoragePtr) -> Self {
        Self {
            repr: Repr::EMPTY,
            sp,
        }
    }

    /// An empty string with room for `capacity` bytes.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] above [`max_size`](Self::max_size), or the
    /// resource's allocation error.
    pub fn with_capacity_in(capacity: usize, sp: StoragePtr) -> Result<Self, Error> {
        if capacity > MAX_SIZE {
            return Err(Error::LengthError);
        }
        let mut s = Self::new_in(sp);
        if capacity > SBO_CAPACITY {
            let buf = RawBuf::<u8>::allocate(&s.sp, capacity + 1)?;
            // SAFETY: the block holds at least one byte.
            unsafe { *buf.ptr() = 0 };
            s.install(buf, 0);
        }
        Ok(s)
    }

    /// Copies `bytes` into a new string on `sp`.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] above [`max_size`](Self::max_size), or the
    /// resource's allocation error.
    pub fn from_bytes_in(bytes: &[u8], sp: StoragePtr) -> Result<Self, Error> {
        let mut s = Self::with_capacity_in(bytes.len(), sp)?;
        // SAFETY: the capacity holds `bytes.len()` bytes plus the terminator.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), s.data_mut(), bytes.len());
            s.set_len(bytes.len());
        }
        Ok(s)
    }

    /// Copies `s` into a new string on `sp`.
    ///
    /// # Errors
    ///
    /// See [`from_bytes_in`](Self::from_bytes_in).
    pub fn from_str_in(s: &str, sp: StoragePtr) -> Result<Self, Error> {
        Self::from_bytes_in(s.as_bytes(), sp)
    }

    /// `count` copies of `byte`.
    ///
    /// # Errors
    ///
    /// See [`from_bytes_in`](Self::from_bytes_in).
    pub fn from_elem_in(count: usize, byte: u8, sp: StoragePtr) -> Result<Self, Error> {
        let mut s = Self::with_capacity_in(count, sp)?;
        // SAFETY: the capacity holds `count` bytes plus the terminator.
        unsafe {
            ptr::write_bytes(s.data_mut(), byte, count);
            s.set_len(count);
        }
        Ok(s)
    }

    /// Collects bytes from an iterator.
    ///
    /// The iterator's lower size bound is reserved up front; iterators that
    /// cannot tell their length grow the string as bytes arrive.
    ///
    /// # Errors
    ///
    /// See [`from_bytes_in`](Self::from_bytes_in).
    pub fn try_from_iter_in<I>(iter: I, sp: StoragePtr) -> Result<Self, Error>
    where
        I: IntoIterator<Item = u8>,
    {
        let iter = iter.into_iter();
        let mut s = Self::with_capacity_in(iter.size_hint().0, sp)?;
        for byte in iter {
            s.push(byte)?;
        }
        Ok(s)
    }

    /// Copies the string onto the same resource.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn try_clone(&self) -> Result<Self, Error> {
        self.try_clone_in(self.sp.clone())
    }

    /// Copies the string onto `sp`.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn try_clone_in(&self, sp: StoragePtr) -> Result<Self, Error> {
        Self::from_bytes_in(self.as_bytes(), sp)
    }

    // --- observers -------------------------------------------------------

    /// The resource this string allocates from.
    #[must_use]
    pub fn storage(&self) -> &StoragePtr {
        &self.sp
    }

    /// Length in bytes, terminator excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline { len, .. } => usize::from(*len),
            Repr::Heap { len, .. } => *len,
        }
    }

    /// `true` for the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes that fit before the next reallocation, terminator excluded.
    #[must_use]
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline { .. } => SBO_CAPACITY,
            Repr::Heap { buf, .. } => buf.cap() - 1,
        }
    }

    /// `true` while the contents live in the inline buffer.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline { .. })
    }

    /// The contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `len` bytes starting at `data` are initialised.
        unsafe { slice::from_raw_parts(self.data(), self.len()) }
    }

    /// The contents followed by the NUL terminator.
    #[must_use]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        // SAFETY: the terminator is always written after the contents.
        unsafe { slice::from_raw_parts(self.data(), self.len() + 1) }
    }

    /// The contents, mutably.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        // SAFETY: `len` bytes starting at `data` are initialised.
        unsafe { slice::from_raw_parts_mut(self.data_mut(), len) }
    }

    /// The contents as `str`.
    ///
    /// # Errors
    ///
    /// When the contents are not valid UTF-8.
    pub fn as_str(&self) -> Result<&str, core::str::Utf8Error> {
        core::str::from_utf8(self.as_bytes())
    }

    /// The contents as `str`, with invalid sequences replaced.
    #[must_use]
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        self.as_bytes().to_str_lossy()
    }

    /// Three-way byte comparison.
    #[must_use]
    pub fn compare(&self, other: &[u8]) -> Ordering {
        self.as_bytes().cmp(other)
    }

    /// `count` bytes starting at `pos`, clamped to the end.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `pos > len()`.
    pub fn subview(&self, pos: usize, count: usize) -> Result<&[u8], Error> {
        let rest = self.as_bytes().get(pos..).ok_or(Error::OutOfRange)?;
        Ok(&rest[..count.min(rest.len())])
    }

    /// Copies bytes starting at `pos` into `dest`, returning how many were
    /// copied.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `pos > len()`.
    pub fn copy_to(&self, dest: &mut [u8], pos: usize) -> Result<usize, Error> {
        let src = self.subview(pos, dest.len())?;
        dest[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    // --- search ----------------------------------------------------------

    /// First occurrence of `needle` at or after `pos`.
    #[must_use]
    pub fn find(&self, needle: &[u8], pos: usize) -> Option<usize> {
        let hay = self.as_bytes().get(pos..)?;
        hay.find(needle).map(|i| i + pos)
    }

    /// Last occurrence of `needle` starting at or before `pos`.
    #[must_use]
    pub fn rfind(&self, needle: &[u8], pos: usize) -> Option<usize> {
        let end = pos.saturating_add(needle.len()).min(self.len());
        self.as_bytes()[..end].rfind(needle)
    }

    /// First byte at or after `pos` that is in `set`.
    #[must_use]
    pub fn find_first_of(&self, set: &[u8], pos: usize) -> Option<usize> {
        let hay = self.as_bytes().get(pos..)?;
        hay.find_byteset(set).map(|i| i + pos)
    }

    /// First byte at or after `pos` that is not in `set`.
    #[must_use]
    pub fn find_first_not_of(&self, set: &[u8], pos: usize) -> Option<usize> {
        let hay = self.as_bytes().get(pos..)?;
        hay.find_not_byteset(set).map(|i| i + pos)
    }

    /// Last byte at or before `pos` that is in `set`.
    #[must_use]
    pub fn find_last_of(&self, set: &[u8], pos: usize) -> Option<usize> {
        let end = pos.saturating_add(1).min(self.len());
        self.as_bytes()[..end].rfind_byteset(set)
    }

    /// Last byte at or before `pos` that is not in `set`.
    #[must_use]
    pub fn find_last_not_of(&self, set: &[u8], pos: usize) -> Option<usize> {
        let end = pos.saturating_add(1).min(self.len());
        self.as_bytes()[..end].rfind_not_byteset(set)
    }

    // --- capacity --------------------------------------------------------

    /// Makes room for at least `capacity` bytes.
    ///
    /// Does nothing when the capacity already suffices. Otherwise the new
    /// capacity is the larger of `capacity` and twice the current one.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] above [`max_size`](Self::max_size), or the
    /// resource's allocation error.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), Error> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        let new_cap = self.growth(capacity)?;
        self.reallocate(new_cap)
    }

    /// Releases unused capacity, moving the contents back inline when they
    /// fit.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        let len = self.len();
        if self.is_inline() || len == self.capacity() {
            return Ok(());
        }
        if len > SBO_CAPACITY {
            return self.reallocate(len);
        }
        let mut inline = [0u8; SBO_CAPACITY + 1];
        inline[..len].copy_from_slice(self.as_bytes());
        let Self { repr, sp } = self;
        if let Repr::Heap { buf, .. } = repr {
            // SAFETY: bytes need no drop and the buffer came from `sp`.
            unsafe { buf.release(sp) };
        }
        *repr = Repr::Inline {
            len: len as u8,
            buf: inline,
        };
        Ok(())
    }

    // --- modifiers -------------------------------------------------------

    /// Removes every byte, keeping the capacity.
    pub fn clear(&mut self) {
        // SAFETY: zero is always within capacity.
        unsafe { self.set_len(0) };
    }

    /// Shortens the string to `len` bytes. Longer lengths are ignored.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            // SAFETY: shrinking stays within capacity.
            unsafe { self.set_len(len) };
        }
    }

    /// Appends one byte.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        let len = self.len();
        self.splice(len, 0, Fill::Repeat(byte, 1))
    }

    /// Removes and returns the last byte.
    pub fn pop(&mut self) -> Option<u8> {
        let last = *self.as_bytes().last()?;
        self.truncate(self.len() - 1);
        Some(last)
    }

    /// Appends `bytes`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let len = self.len();
        self.splice(len, 0, Fill::Bytes(bytes))
    }

    /// Appends `s`. This is the fallible counterpart of `+=` on
    /// [`String`](alloc::string::String).
    ///
    /// ```
    /// use jsonpool::JsonString;
    ///
    /// let mut s = JsonString::from("key");
    /// s.push_str("_suffix").unwrap();
    /// assert_eq!(s, "key_suffix");
    /// ```
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn push_str(&mut self, s: &str) -> Result<(), Error> {
        self.append(s.as_bytes())
    }

    /// Appends `count` copies of `byte`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn append_n(&mut self, count: usize, byte: u8) -> Result<(), Error> {
        let len = self.len();
        self.splice(len, 0, Fill::Repeat(byte, count))
    }

    /// Appends a copy of `src`, a range of this string.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a range outside the string, otherwise see
    /// [`reserve`](Self::reserve).
    pub fn append_within(&mut self, src: Range<usize>) -> Result<(), Error> {
        self.insert_within(self.len(), src)
    }

    /// Inserts `bytes` before position `pos`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `pos > len()`, otherwise see
    /// [`reserve`](Self::reserve).
    pub fn insert(&mut self, pos: usize, bytes: &[u8]) -> Result<(), Error> {
        self.check_pos(pos)?;
        self.splice(pos, 0, Fill::Bytes(bytes))
    }

    /// Inserts `count` copies of `byte` before position `pos`.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert).
    pub fn insert_n(&mut self, pos: usize, count: usize, byte: u8) -> Result<(), Error> {
        self.check_pos(pos)?;
        self.splice(pos, 0, Fill::Repeat(byte, count))
    }

    /// Inserts a copy of `src`, a range of this string, before position
    /// `pos`.
    ///
    /// The range is interpreted against the string as it was before the
    /// call, whether it lies before, after or across `pos`.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert), and [`Error::OutOfRange`] for a
    /// range outside the string.
    pub fn insert_within(&mut self, pos: usize, src: Range<usize>) -> Result<(), Error> {
        let len = self.len();
        self.check_pos(pos)?;
        self.check_range(&src)?;
        let n = src.end - src.start;
        if n > MAX_SIZE - len {
            return Err(Error::LengthError);
        }
        let new_len = len + n;

        if new_len > self.capacity() {
            let new_cap = self.growth(new_len)?;
            let buf = RawBuf::<u8>::allocate(&self.sp, new_cap + 1)?;
            let old = self.data();
            let dst = buf.ptr();
            // SAFETY: both buffers are large enough and do not overlap.
            unsafe {
                ptr::copy_nonoverlapping(old, dst, pos);
                ptr::copy_nonoverlapping(old.add(src.start), dst.add(pos), n);
                ptr::copy_nonoverlapping(old.add(pos), dst.add(pos + n), len - pos);
                *dst.add(new_len) = 0;
            }
            self.install(buf, new_len);
            return Ok(());
        }

        let base = self.data_mut();
        // SAFETY: every range stays below `new_len <= capacity`.
        unsafe {
            ptr::copy(base.add(pos), base.add(pos + n), len - pos);
            if src.end <= pos {
                ptr::copy(base.add(src.start), base.add(pos), n);
            } else if src.start >= pos {
                ptr::copy(base.add(src.start + n), base.add(pos), n);
            } else {
                // the source straddles `pos`; its tail moved up by `n`
                let head = pos - src.start;
                ptr::copy(base.add(src.start), base.add(pos), head);
                ptr::copy(base.add(pos + n), base.add(pos + head), n - head);
            }
            self.set_len(new_len);
        }
        Ok(())
    }

    /// Removes up to `count` bytes starting at `pos`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `pos > len()`.
    pub fn erase(&mut self, pos: usize, count: usize) -> Result<(), Error> {
        self.check_pos(pos)?;
        let count = count.min(self.len() - pos);
        self.splice(pos, count, Fill::Bytes(&[]))
    }

    /// Replaces up to `count` bytes starting at `pos` with `bytes`.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert).
    pub fn replace(&mut self, pos: usize, count: usize, bytes: &[u8]) -> Result<(), Error> {
        self.check_pos(pos)?;
        let count = count.min(self.len() - pos);
        self.splice(pos, count, Fill::Bytes(bytes))
    }

    /// Replaces up to `count` bytes starting at `pos` with `n` copies of
    /// `byte`.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert).
    pub fn replace_n(&mut self, pos: usize, count: usize, n: usize, byte: u8) -> Result<(), Error> {
        self.check_pos(pos)?;
        let count = count.min(self.len() - pos);
        self.splice(pos, count, Fill::Repeat(byte, n))
    }

    /// Replaces up to `count` bytes starting at `pos` with a copy of `src`, a
    /// range of this string as it was before the call.
    ///
    /// # Errors
    ///
    /// As for [`insert_within`](Self::insert_within).
    pub fn replace_within(
        &mut self,
        pos: usize,
        count: usize,
        src: Range<usize>,
    ) -> Result<(), Error> {
        self.check_pos(pos)?;
        self.check_range(&src)?;
        let copy = Self::from_bytes_in(&self.as_bytes()[src], self.sp.clone())?;
        self.replace(pos, count, copy.as_bytes())
    }

    /// Grows with copies of `byte` or truncates to `len`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn resize(&mut self, len: usize, byte: u8) -> Result<(), Error> {
        let cur = self.len();
        if len <= cur {
            self.truncate(len);
            Ok(())
        } else {
            self.append_n(len - cur, byte)
        }
    }

    /// Replaces the whole contents with `bytes`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn assign(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let len = self.len();
        self.splice(0, len, Fill::Bytes(bytes))
    }

    /// Exchanges contents with `other`. Each string keeps its own resource;
    /// when the resources differ the contents are copied across.
    ///
    /// # Errors
    ///
    /// The allocation error of either resource. Both strings are unchanged
    /// on failure.
    pub fn swap(&mut self, other: &mut Self) -> Result<(), Error> {
        if self.sp == other.sp {
            core::mem::swap(&mut self.repr, &mut other.repr);
            return Ok(());
        }
        let mine = other.try_clone_in(self.sp.clone())?;
        let theirs = self.try_clone_in(other.sp.clone())?;
        *self = mine;
        *other = theirs;
        Ok(())
    }

    // --- internals -------------------------------------------------------

    fn check_pos(&self, pos: usize) -> Result<(), Error> {
        if pos > self.len() {
            Err(Error::OutOfRange)
        } else {
            Ok(())
        }
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), Error> {
        if range.start > range.end || range.end > self.len() {
            Err(Error::OutOfRange)
        } else {
            Ok(())
        }
    }

    fn growth(&self, new_size: usize) -> Result<usize, Error> {
        if new_size > MAX_SIZE {
            return Err(Error::LengthError);
        }
        let cap = self.capacity();
        if cap > MAX_SIZE - cap {
            return Ok(MAX_SIZE);
        }
        Ok(new_size.max(cap * 2))
    }

    fn data(&self) -> *const u8 {
        match &self.repr {
            Repr::Inline { buf, .. } => buf.as_ptr(),
            Repr::Heap { buf, .. } => buf.ptr(),
        }
    }

    fn data_mut(&mut self) -> *mut u8 {
        match &mut self.repr {
            Repr::Inline { buf, .. } => buf.as_mut_ptr(),
            Repr::Heap { buf, .. } => buf.ptr(),
        }
    }

    /// # Safety
    ///
    /// `len <= capacity()` and the first `len` bytes are initialised.
    unsafe fn set_len(&mut self, new_len: usize) {
        match &mut self.repr {
            Repr::Inline { len, .. } => *len = new_len as u8,
            Repr::Heap { len, .. } => *len = new_len,
        }
        // SAFETY: the buffer always has room for the terminator.
        unsafe { *self.data_mut().add(new_len) = 0 };
    }

    /// Adopts `buf` (already holding `len` bytes and a terminator), releasing
    /// the previous heap block.
    fn install(&mut self, buf: RawBuf<u8>, len: usize) {
        let Self { repr, sp } = self;
        if let Repr::Heap { buf: old, .. } = repr {
            // SAFETY: bytes need no drop and the block came from `sp`.
            unsafe { old.release(sp) };
        }
        *repr = Repr::Heap { len, buf };
    }

    fn reallocate(&mut self, new_cap: usize) -> Result<(), Error> {
        let len = self.len();
        let buf = RawBuf::<u8>::allocate(&self.sp, new_cap + 1)?;
        // SAFETY: the new block holds `new_cap + 1 >= len + 1` bytes.
        unsafe { ptr::copy_nonoverlapping(self.data(), buf.ptr(), len + 1) };
        self.install(buf, len);
        Ok(())
    }

    /// Replaces `pos..pos + remove` with `fill`. Allocates before touching the
    /// contents, so a failure leaves the string as it was.
    fn splice(&mut self, pos: usize, remove: usize, fill: Fill<'_>) -> Result<(), Error> {
        let len = self.len();
        let count = fill.len();
        let kept = len - remove;
        if count > MAX_SIZE - kept {
            return Err(Error::LengthError);
        }
        let new_len = kept + count;
        let tail = len - pos - remove;

        if new_len > self.capacity() {
            let new_cap = self.growth(new_len)?;
            let buf = RawBuf::<u8>::allocate(&self.sp, new_cap + 1)?;
            let old = self.data();
            let dst = buf.ptr();
            // SAFETY: the new block holds `new_len + 1` bytes and is disjoint
            // from the old one.
            unsafe {
                ptr::copy_nonoverlapping(old, dst, pos);
                fill.write(dst.add(pos));
                ptr::copy_nonoverlapping(old.add(pos + remove), dst.add(pos + count), tail);
                *dst.add(new_len) = 0;
            }
            self.install(buf, new_len);
        } else {
            let base = self.data_mut();
            // SAFETY: everything stays below `new_len <= capacity`.
            unsafe {
                ptr::copy(base.add(pos + remove), base.add(pos + count), tail);
                fill.write(base.add(pos));
                self.set_len(new_len);
            }
        }
        Ok(())
    }
}

enum Fill<'a> {
    Bytes(&'a [u8]),
    Repeat(u8, usize),
}

impl Fill<'_> {
    fn len(&self) -> usize {
        match self {
            Fill::Bytes(b) => b.len(),
            Fill::Repeat(_, n) => *n,
        }
    }

    /// # Safety
    ///
    /// `dst` is valid for `self.len()` bytes and does not overlap the source.
    unsafe fn write(&self, dst: *mut u8) {
        match self {
            // SAFETY: forwarded to the caller.
            Fill::Bytes(b) => unsafe { ptr::copy_nonoverlapping(b.as_ptr(), dst, b.len()) },
            // SAFETY: forwarded to the caller.
            Fill::Repeat(byte, n) => unsafe { ptr::write_bytes(dst, *byte, *n) },
        }
    }
}

impl Drop for JsonString {
    fn drop(&mut self) {
        let Self { repr, sp } = self;
        if let Repr::Heap { buf, .. } = repr {
            // SAFETY: bytes need no drop and the block came from `sp`.
            unsafe { buf.release(sp) };
        }
    }
}

impl Default for JsonString {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// When the resource cannot allocate the copy, like `std` collections do.
impl Clone for JsonString {
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("cannot clone string: {err}"))
    }
}

impl Deref for JsonString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for JsonString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Borrow<[u8]> for JsonString {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// # Panics
///
/// When the default heap cannot allocate.
impl From<&str> for JsonString {
    fn from(s: &str) -> Self {
        Self::from_str_in(s, StoragePtr::default())
            .unwrap_or_else(|err| panic!("cannot build string: {err}"))
    }
}

impl PartialEq for JsonString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for JsonString {}

impl PartialEq<[u8]> for JsonString {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<str> for JsonString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for JsonString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<JsonString> for str {
    fn eq(&self, other: &JsonString) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<JsonString> for &str {
    fn eq(&self, other: &JsonString) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for JsonString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsonString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for JsonString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_bytes().as_bstr(), f)
    }
}

impl fmt::Display for JsonString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_bytes().as_bstr(), f)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use rstest::rstest;

    use super::JsonString;
    use crate::{Error, NullResource, StoragePtr};

    const LONG: &str = "abcdefghijklmnopqrstuvwxyz";

    #[test]
    fn short_strings_stay_inline() {
        let s = JsonString::from_str_in("fourteen bytes", NullResource::storage()).unwrap();
        assert!(s.is_inline());
        assert_eq!(s.capacity(), JsonString::SBO_CAPACITY);
        assert_eq!(s.as_bytes_with_nul(), b"fourteen bytes\0");
    }

    #[test]
    fn long_strings_need_the_heap() {
        let err = JsonString::from_str_in(LONG, NullResource::storage()).unwrap_err();
        assert_eq!(err, Error::BadAlloc);
        let s = JsonString::from(LONG);
        assert!(!s.is_inline());
        assert_eq!(s.capacity(), LONG.len());
        assert_eq!(s.as_bytes_with_nul().last(), Some(&0));
    }

    #[test]
    fn too_large_fails_before_allocating() {
        let sp = NullResource::storage();
        let err = JsonString::with_capacity_in(JsonString::max_size() + 1, sp.clone()).unwrap_err();
        assert_eq!(err, Error::LengthError);
        let mut s = JsonString::new_in(sp);
        assert_eq!(s.reserve(JsonString::max_size() + 1), Err(Error::LengthError));
        assert_eq!(
            s.append_n(JsonString::max_size() + 1, b'x'),
            Err(Error::LengthError)
        );
    }

    #[test]
    fn growth_doubles() {
        let mut s = JsonString::from(LONG);
        s.push(b'!').unwrap();
        assert_eq!(s.capacity(), LONG.len() * 2);
        s.reserve(10).unwrap();
        assert_eq!(s.capacity(), LONG.len() * 2);
        s.reserve(200).unwrap();
        assert_eq!(s.capacity(), 200);
    }

    #[test]
    fn shrink_returns_inline() {
        let mut s = JsonString::from(LONG);
        s.truncate(3);
        s.shrink_to_fit().unwrap();
        assert!(s.is_inline());
        assert_eq!(s, "abc");

        let mut s = JsonString::from(LONG);
        s.reserve(100).unwrap();
        s.shrink_to_fit().unwrap();
        assert_eq!(s.capacity(), LONG.len());
    }

    #[rstest]
    #[case::before(4, 0..2, "abcdabef")]
    #[case::after(1, 3..5, "adebcdef")]
    #[case::bisects(2, 1..4, "abbcdcdef")]
    #[case::at_start(0, 0..6, "abcdefabcdef")]
    #[case::at_end(6, 2..6, "abcdefcdef")]
    fn insert_within(
        #[case] pos: usize,
        #[case] src: core::ops::Range<usize>,
        #[case] expected: &str,
    ) {
        let mut inline = JsonString::from("abcdef");
        inline.insert_within(pos, src.clone()).unwrap();
        assert_eq!(inline, expected);

        let mut heap = JsonString::from("abcdef");
        heap.reserve(64).unwrap();
        heap.insert_within(pos, src).unwrap();
        assert_eq!(heap, expected);
    }

    #[test]
    fn insert_within_heap_reallocation() {
        let mut s = JsonString::from(LONG);
        let cap = s.capacity();
        s.insert_within(2, 0..26).unwrap();
        assert!(s.capacity() > cap);
        assert_eq!(
            s,
            "ababcdefghijklmnopqrstuvwxyzcdefghijklmnopqrstuvwxyz"
        );
    }

    #[test]
    fn insert_and_erase() {
        let mut s = JsonString::from("hello");
        s.insert(0, b">> ").unwrap();
        s.insert_n(s.len(), 3, b'!').unwrap();
        assert_eq!(s, ">> hello!!!");
        s.erase(0, 3).unwrap();
        s.erase(5, 100).unwrap();
        assert_eq!(s, "hello");
        assert_eq!(s.insert(6, b"x"), Err(Error::OutOfRange));
        assert_eq!(s.erase(6, 0), Err(Error::OutOfRange));
    }

    #[test]
    fn push_str_concatenates() {
        let mut s = JsonString::new_in(NullResource::storage());
        s.push_str("ab").unwrap();
        s.push_str("cd").unwrap();
        assert_eq!(s, "abcd");
        assert_eq!(s.push_str(LONG), Err(Error::BadAlloc));
        assert_eq!(s, "abcd");
    }

    #[test]
    fn replace_variants() {
        let mut s = JsonString::from("0123456789");
        s.replace(2, 3, b"ab").unwrap();
        assert_eq!(s, "01ab56789");
        s.replace_n(0, 2, 4, b'z').unwrap();
        assert_eq!(s, "zzzzab56789");
        s.replace_within(0, 4, 4..6).unwrap();
        assert_eq!(s, "abab56789");
        s.replace(0, 100, LONG.as_bytes()).unwrap();
        assert_eq!(s, LONG);
    }

    #[test]
    fn resize_and_pop() {
        let mut s = JsonString::new();
        s.resize(3, b'x').unwrap();
        assert_eq!(s, "xxx");
        s.resize(1, b'y').unwrap();
        assert_eq!(s, "x");
        assert_eq!(s.pop(), Some(b'x'));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn search() {
        let s = JsonString::from("abcabcxyz");
        assert_eq!(s.find(b"bc", 0), Some(1));
        assert_eq!(s.find(b"bc", 2), Some(4));
        assert_eq!(s.find(b"bc", 20), None);
        assert_eq!(s.rfind(b"bc", usize::MAX), Some(4));
        assert_eq!(s.rfind(b"bc", 3), Some(1));
        assert_eq!(s.find_first_of(b"zyx", 0), Some(6));
        assert_eq!(s.find_first_not_of(b"abc", 0), Some(6));
        assert_eq!(s.find_last_of(b"abc", usize::MAX), Some(5));
        assert_eq!(s.find_last_not_of(b"xyz", usize::MAX), Some(5));
        assert_eq!(s.find_last_of(b"c", 4), Some(2));
    }

    #[test]
    fn views_and_comparisons() {
        let s = JsonString::from("hello world");
        assert_eq!(s.subview(6, 100).unwrap(), b"world");
        assert_eq!(s.subview(12, 1), Err(Error::OutOfRange));
        let mut dest = [0u8; 4];
        assert_eq!(s.copy_to(&mut dest, 6).unwrap(), 4);
        assert_eq!(&dest, b"worl");
        assert!(s.starts_with(b"hello"));
        assert!(s.ends_with(b"world"));
        assert_eq!(s.compare(b"hello"), core::cmp::Ordering::Greater);
        assert!(JsonString::from("a") < JsonString::from("b"));
        assert_eq!(format!("{s:?}"), "\"hello world\"");
    }

    #[test]
    fn swap_keeps_storage() {
        let sp = StoragePtr::new(crate::MonotonicResource::new());
        let mut a = JsonString::from_str_in(LONG, sp.clone()).unwrap();
        let mut b = JsonString::from("short");
        a.swap(&mut b).unwrap();
        assert_eq!(a, "short");
        assert_eq!(b, LONG);
        assert_eq!(a.storage(), &sp);
        assert!(b.storage().is_default());
    }

    #[test]
    fn iterator_construction() {
        let s = JsonString::try_from_iter_in(LONG.bytes().filter(|b| b % 2 == 0), StoragePtr::default())
            .unwrap();
        assert_eq!(s, "bdfhjlnprtvxz");
        assert_eq!(s.as_str().unwrap(), "bdfhjlnprtvxz");
    }
}
