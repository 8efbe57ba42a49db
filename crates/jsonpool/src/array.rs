//! The [`Array`] container.

use alloc::vec::Vec;
use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::{Deref, Range},
    ptr, slice,
};

use crate::{Error, Slot, StoragePtr, Value, raw::RawBuf};

const MAX_SIZE: usize = 0x7fff_fffe;

/// A contiguous sequence of [`Value`]s that draws its memory from a
/// [`StoragePtr`].
///
/// Every element lives on the array's resource: values inserted from another
/// resource are copied over. Implicit growth multiplies the capacity by 1.5.
///
/// The array dereferences to `[Value]`, so read-only slice methods (`len`,
/// `iter`, `get`, indexing, ...) are available directly. Mutating methods
/// that may allocate return a `Result` and leave the array unchanged on
/// failure.
///
/// Elements are reached mutably through [`Slot`] handles
/// ([`at_mut`](Self::at_mut), [`get_mut`](Self::get_mut),
/// [`iter_mut`](Self::iter_mut)), never as `&mut Value`, so an element
/// cannot be replaced by a value living on another resource:
///
/// ```
/// use jsonpool::{Array, MonotonicResource, StoragePtr, Value};
///
/// let sp = StoragePtr::new(MonotonicResource::new());
/// let mut arr = Array::new_in(sp.clone());
/// arr.resize(2).unwrap();
/// arr.at_mut(1).unwrap().set(Value::from("long enough to allocate a block")).unwrap();
/// arr.swap_elements(0, 1).unwrap();
/// assert_eq!(arr[0].storage(), &sp);
/// ```
pub struct Array {
    buf: RawBuf<Value>,
    len: usize,
    sp: StoragePtr,
}

impl Array {
    /// Largest supported number of elements.
    #[must_use]
    pub const fn max_size() -> usize {
        MAX_SIZE
    }

    /// An empty array on the default resource.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(StoragePtr::default())
    }

    /// An empty array on `sp`. Never allocates.
    #[must_use]
    pub fn new_in(sp: StoragePtr) -> Self {
        Self {
            buf: RawBuf::dangling(),
            len: 0,
            sp,
        }
    }

    /// An empty array with room for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] above [`max_size`](Self::max_size), or the
    /// resource's allocation error.
    pub fn with_capacity_in(capacity: usize, sp: StoragePtr) -> Result<Self, Error> {
        if capacity > MAX_SIZE {
            return Err(Error::LengthError);
        }
        let buf = RawBuf::allocate(&sp, capacity)?;
        Ok(Self { buf, len: 0, sp })
    }

    /// `count` nulls.
    ///
    /// # Errors
    ///
    /// See [`with_capacity_in`](Self::with_capacity_in).
    pub fn with_len_in(count: usize, sp: StoragePtr) -> Result<Self, Error> {
        let mut arr = Self::with_capacity_in(count, sp)?;
        arr.resize(count)?;
        Ok(arr)
    }

    /// `count` copies of `value`.
    ///
    /// # Errors
    ///
    /// See [`with_capacity_in`](Self::with_capacity_in).
    pub fn from_elem_in(count: usize, value: &Value, sp: StoragePtr) -> Result<Self, Error> {
        let mut arr = Self::with_capacity_in(count, sp)?;
        arr.resize_with_value(count, value)?;
        Ok(arr)
    }

    /// Collects values from an iterator, copying each onto `sp` when needed.
    ///
    /// The iterator's lower size bound is reserved up front.
    ///
    /// # Errors
    ///
    /// See [`with_capacity_in`](Self::with_capacity_in).
    pub fn try_from_iter_in<I>(iter: I, sp: StoragePtr) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Value>,
    {
        let iter = iter.into_iter();
        let mut arr = Self::with_capacity_in(iter.size_hint().0.min(MAX_SIZE), sp)?;
        for value in iter {
            arr.push(value)?;
        }
        Ok(arr)
    }

    /// Deep copy onto the same resource.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn try_clone(&self) -> Result<Self, Error> {
        self.try_clone_in(self.sp.clone())
    }

    /// Deep copy onto `sp`.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn try_clone_in(&self, sp: StoragePtr) -> Result<Self, Error> {
        let mut arr = Self::with_capacity_in(self.len, sp)?;
        for value in self.iter() {
            let copy = value.try_clone_in(arr.sp.clone())?;
            // SAFETY: the capacity equals `self.len`.
            unsafe { arr.push_unchecked(copy) };
        }
        Ok(arr)
    }

    /// The resource this array allocates from.
    #[must_use]
    pub fn storage(&self) -> &StoragePtr {
        &self.sp
    }

    /// Elements that fit before the next reallocation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.cap()
    }

    /// The elements.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        // SAFETY: the first `len` slots are initialised.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    fn slice_mut(&mut self) -> &mut [Value] {
        // SAFETY: the first `len` slots are initialised.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// The element at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index >= len()`.
    pub fn at(&self, index: usize) -> Result<&Value, Error> {
        self.get(index).ok_or(Error::OutOfRange)
    }

    /// The element at `index`, mutably.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index >= len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<Slot<'_>, Error> {
        self.get_mut(index).ok_or(Error::OutOfRange)
    }

    /// The element at `index`, mutably, or `None` past the end.
    pub fn get_mut(&mut self, index: usize) -> Option<Slot<'_>> {
        self.slice_mut().get_mut(index).map(Slot::new)
    }

    /// The first element, mutably.
    pub fn first_mut(&mut self) -> Option<Slot<'_>> {
        self.slice_mut().first_mut().map(Slot::new)
    }

    /// The last element, mutably.
    pub fn last_mut(&mut self) -> Option<Slot<'_>> {
        self.slice_mut().last_mut().map(Slot::new)
    }

    /// Every element, mutably, in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = Slot<'_>> {
        self.slice_mut().iter_mut().map(Slot::new)
    }

    // --- reordering ------------------------------------------------------

    /// Exchanges the elements at `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when either index is `>= len()`.
    pub fn swap_elements(&mut self, a: usize, b: usize) -> Result<(), Error> {
        if a >= self.len || b >= self.len {
            return Err(Error::OutOfRange);
        }
        self.slice_mut().swap(a, b);
        Ok(())
    }

    /// Sorts the elements with `compare`. Does not allocate; equal elements
    /// may be reordered.
    pub fn sort_unstable_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.slice_mut().sort_unstable_by(compare);
    }

    /// Reverses the order of the elements.
    pub fn reverse(&mut self) {
        self.slice_mut().reverse();
    }

    // --- capacity --------------------------------------------------------

    /// Makes room for at least `capacity` elements.
    ///
    /// Does nothing when the capacity already suffices. Otherwise the new
    /// capacity is the larger of `capacity` and 1.5 times the current one.
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

    /// Shrinks the capacity to the length.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn shrink_to_fit(&mut self) -> Result<(), Error> {
        if self.capacity() <= self.len {
            return Ok(());
        }
        self.reallocate(self.len)
    }

    // --- modifiers -------------------------------------------------------

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn push(&mut self, value: Value) -> Result<(), Error> {
        let value = value.rehome(&self.sp)?;
        if self.len == self.capacity() {
            self.reserve(self.len + 1)?;
        }
        // SAFETY: reserved above.
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<Value> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was initialised and is now outside `len`.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.len)) })
    }

    /// Inserts `value` before `index`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index > len()`, otherwise see
    /// [`reserve`](Self::reserve).
    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), Error> {
        if index > self.len {
            return Err(Error::OutOfRange);
        }
        let value = value.rehome(&self.sp)?;
        if self.len == self.capacity() {
            self.reserve(self.len + 1)?;
        }
        // SAFETY: room for one more element was reserved; the tail shift
        // stays inside the buffer.
        unsafe {
            let at = self.buf.ptr().add(index);
            ptr::copy(at, at.add(1), self.len - index);
            ptr::write(at, value);
        }
        self.len += 1;
        Ok(())
    }

    /// Inserts `count` copies of `value` before `index`.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert).
    pub fn insert_n(&mut self, index: usize, count: usize, value: &Value) -> Result<(), Error> {
        if index > self.len {
            return Err(Error::OutOfRange);
        }
        let value = value.try_clone_in(self.sp.clone())?;
        self.reserve_more(count)?;
        self.fill_spare(count, || value.try_clone())?;
        self.slice_mut()[index..].rotate_right(count);
        Ok(())
    }

    /// Inserts a copy of the element at `src` before `index`.
    ///
    /// The element is copied before anything moves, so this is the way to
    /// insert an element of the array into itself.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when either position is invalid, otherwise see
    /// [`reserve`](Self::reserve).
    pub fn insert_within(&mut self, index: usize, src: usize) -> Result<(), Error> {
        let copy = self.at(src)?.try_clone()?;
        self.insert(index, copy)
    }

    /// Inserts every value from `iter` before `index`, in order.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert). Nothing is inserted on failure.
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Value>,
    {
        if index > self.len {
            return Err(Error::OutOfRange);
        }
        let mut staged = Self::try_from_iter_in(iter, self.sp.clone())?;
        let count = staged.len;
        self.reserve_more(count)?;
        // SAFETY: `count` slots are reserved; ownership of the staged values
        // moves over and `staged` forgets them.
        unsafe {
            ptr::copy_nonoverlapping(staged.buf.ptr(), self.buf.ptr().add(self.len), count);
            staged.len = 0;
        }
        self.len += count;
        self.slice_mut()[index..].rotate_right(count);
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the tail down.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index >= len()`.
    pub fn remove(&mut self, index: usize) -> Result<Value, Error> {
        if index >= self.len {
            return Err(Error::OutOfRange);
        }
        // SAFETY: `index` is initialised; the tail shift stays inside `len`.
        let value = unsafe {
            let at = self.buf.ptr().add(index);
            let value = ptr::read(at);
            ptr::copy(at.add(1), at, self.len - index - 1);
            value
        };
        self.len -= 1;
        Ok(value)
    }

    /// Removes the element at `index`, returning the index of the element
    /// that now occupies that position (equal to `len()` when the last
    /// element was removed).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index >= len()`.
    pub fn erase(&mut self, index: usize) -> Result<usize, Error> {
        self.remove(index)?;
        Ok(index)
    }

    /// Removes the elements in `range`, returning `range.start`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] for a range outside the array.
    pub fn erase_range(&mut self, range: Range<usize>) -> Result<usize, Error> {
        if range.start > range.end || range.end > self.len {
            return Err(Error::OutOfRange);
        }
        let Range { start, end } = range;
        let tail = self.len - end;
        self.len = start;
        // SAFETY: `start..end` is initialised and now outside `len`; the tail
        // is moved down afterwards.
        unsafe {
            let base = self.buf.ptr();
            ptr::drop_in_place(slice::from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        Ok(start)
    }

    /// Drops every element past `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old = self.len;
        self.len = len;
        // SAFETY: `len..old` is initialised and now outside `len`.
        unsafe {
            ptr::drop_in_place(slice::from_raw_parts_mut(
                self.buf.ptr().add(len),
                old - len,
            ));
        }
    }

    /// Drops every element, keeping the capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Grows with nulls or truncates to `len`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn resize(&mut self, len: usize) -> Result<(), Error> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        self.reserve(len)?;
        let sp = self.sp.clone();
        self.fill_spare(len - self.len, || Ok(Value::null_in(sp.clone())))
    }

    /// Grows with copies of `value` or truncates to `len`.
    ///
    /// # Errors
    ///
    /// See [`reserve`](Self::reserve).
    pub fn resize_with_value(&mut self, len: usize, value: &Value) -> Result<(), Error> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        self.reserve(len)?;
        let sp = self.sp.clone();
        self.fill_spare(len - self.len, || value.try_clone_in(sp.clone()))
    }

    /// Exchanges contents with `other`. Each array keeps its own resource;
    /// when the resources differ the contents are copied across.
    ///
    /// # Errors
    ///
    /// The allocation error of either resource. Both arrays are unchanged on
    /// failure.
    pub fn swap(&mut self, other: &mut Self) -> Result<(), Error> {
        if self.sp == other.sp {
            core::mem::swap(&mut self.buf, &mut other.buf);
            core::mem::swap(&mut self.len, &mut other.len);
            return Ok(());
        }
        let mine = other.try_clone_in(self.sp.clone())?;
        let theirs = self.try_clone_in(other.sp.clone())?;
        *self = mine;
        *other = theirs;
        Ok(())
    }

    // --- internals -------------------------------------------------------

    fn growth(&self, new_size: usize) -> Result<usize, Error> {
        if new_size > MAX_SIZE {
            return Err(Error::LengthError);
        }
        let cap = self.capacity();
        if cap > MAX_SIZE - cap / 2 {
            return Ok(MAX_SIZE);
        }
        Ok(new_size.max(cap + cap / 2))
    }

    fn reserve_more(&mut self, additional: usize) -> Result<(), Error> {
        if additional > MAX_SIZE - self.len {
            return Err(Error::LengthError);
        }
        self.reserve(self.len + additional)
    }

    fn reallocate(&mut self, new_cap: usize) -> Result<(), Error> {
        let mut buf = RawBuf::<Value>::allocate(&self.sp, new_cap)?;
        // SAFETY: the new buffer holds at least `len` elements; values are
        // moved bitwise and the old slots are released without dropping.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.ptr(), buf.ptr(), self.len);
            core::mem::swap(&mut self.buf, &mut buf);
            buf.release(&self.sp);
        }
        Ok(())
    }

    /// # Safety
    ///
    /// `len < capacity()` and `value` lives on this array's resource.
    unsafe fn push_unchecked(&mut self, value: Value) {
        // SAFETY: forwarded to the caller.
        unsafe { ptr::write(self.buf.ptr().add(self.len), value) };
        self.len += 1;
    }

    /// Appends `count` values produced by `make`, which must already be on
    /// this array's resource. On failure the appended values are dropped
    /// again.
    fn fill_spare(
        &mut self,
        count: usize,
        mut make: impl FnMut() -> Result<Value, Error>,
    ) -> Result<(), Error> {
        debug_assert!(self.len + count <= self.capacity());
        let start = self.len;
        for _ in 0..count {
            match make() {
                // SAFETY: the caller reserved `count` slots.
                Ok(value) => unsafe { self.push_unchecked(value) },
                Err(err) => {
                    self.truncate(start);
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

impl Drop for Array {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: every element was dropped and the buffer came from `sp`.
        unsafe { self.buf.release(&self.sp) };
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// When the resource cannot allocate the copy, like `std` collections do.
impl Clone for Array {
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("cannot clone array: {err}"))
    }
}

impl Deref for Array {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        self.as_slice()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// # Panics
///
/// When the default heap cannot allocate.
impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::try_from_iter_in(iter, StoragePtr::default())
            .unwrap_or_else(|err| panic!("cannot build array: {err}"))
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        values.into_iter().collect()
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Hash for Array {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::Array;
    use crate::{Error, MonotonicResource, NullResource, StoragePtr, Value};

    fn ints(values: &[i64]) -> Array {
        values.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn growth_is_one_and_a_half() {
        let mut arr = Array::with_capacity_in(4, StoragePtr::default()).unwrap();
        assert_eq!(arr.capacity(), 4);
        arr.reserve(arr.capacity() + 1).unwrap();
        assert_eq!(arr.capacity(), 6);
        arr.reserve(arr.capacity() + 1).unwrap();
        assert_eq!(arr.capacity(), 9);
    }

    #[test]
    fn reserve_below_capacity_is_a_no_op() {
        let mut arr = ints(&[1, 2, 3]);
        arr.reserve(10).unwrap();
        let cap = arr.capacity();
        let first = arr.as_ptr();
        arr.reserve(5).unwrap();
        arr.reserve(0).unwrap();
        assert_eq!(arr.capacity(), cap);
        assert_eq!(arr.as_ptr(), first);
    }

    #[test]
    fn self_reference_insert() {
        let mut arr = ints(&[1, 2, 3]);
        arr.insert_within(0, 1).unwrap();
        assert_eq!(arr, ints(&[2, 1, 2, 3]));
        let len = arr.len();
        arr.insert_within(len, 0).unwrap();
        assert_eq!(arr, ints(&[2, 1, 2, 3, 2]));
    }

    #[test]
    fn insert_variants() {
        let mut arr = ints(&[1, 5]);
        arr.insert(1, Value::from(2)).unwrap();
        arr.insert_n(3, 2, &Value::from(9)).unwrap();
        arr.insert_iter(3, [Value::from(3), Value::from(4)]).unwrap();
        assert_eq!(arr, ints(&[1, 2, 5, 3, 4, 9, 9]));
        assert_eq!(arr.insert(8, Value::new()), Err(Error::OutOfRange));
    }

    #[test]
    fn erase_variants() {
        let mut arr = ints(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(arr.erase(1).unwrap(), 1);
        assert_eq!(arr, ints(&[0, 2, 3, 4, 5]));
        assert_eq!(arr.erase_range(1..3).unwrap(), 1);
        assert_eq!(arr, ints(&[0, 4, 5]));
        assert_eq!(arr.erase(2).unwrap(), arr.len());
        assert_eq!(arr.erase(5), Err(Error::OutOfRange));
        assert_eq!(arr.remove(0).unwrap(), Value::from(0));
        assert_eq!(arr.pop(), Some(Value::from(4)));
        assert_eq!(arr.pop(), None);
    }

    #[test]
    fn resize_fills_nulls_and_copies() {
        let mut arr = Array::new();
        arr.resize(2).unwrap();
        assert!(arr.iter().all(Value::is_null));
        arr.resize_with_value(4, &Value::from("x")).unwrap();
        assert_eq!(arr[3], Value::from("x"));
        arr.resize(1).unwrap();
        assert_eq!(arr.len(), 1);
    }

    #[test]
    fn at_reports_out_of_range() {
        let arr = ints(&[1]);
        assert_eq!(arr.at(0).unwrap(), &Value::from(1));
        assert_eq!(arr.at(1), Err(Error::OutOfRange));
    }

    #[test]
    fn foreign_values_are_copied_over() {
        let sp = StoragePtr::new(MonotonicResource::new());
        let mut arr = Array::new_in(sp.clone());
        arr.push(Value::from("a string long enough for the heap")).unwrap();
        arr.push(Value::from(ints(&[1, 2]))).unwrap();
        for value in &arr {
            assert_eq!(value.storage(), &sp);
        }
        assert_eq!(arr[1].as_array().unwrap()[0].storage(), &sp);
    }

    #[test]
    fn null_resource_refuses_growth() {
        let mut arr = Array::new_in(NullResource::storage());
        assert_eq!(arr.push(Value::new()), Err(Error::BadAlloc));
        assert!(arr.is_empty());
        assert_eq!(
            Array::with_capacity_in(Array::max_size() + 1, NullResource::storage()).unwrap_err(),
            Error::LengthError
        );
    }

    #[test]
    fn equality_is_order_sensitive() {
        assert_eq!(ints(&[1, 2]), ints(&[1, 2]));
        assert_ne!(ints(&[1, 2]), ints(&[2, 1]));
    }

    #[test]
    fn reordering_in_place() {
        let mut arr = ints(&[3, 1, 2]);
        arr.sort_unstable_by(|a, b| a.as_i64().cmp(&b.as_i64()));
        assert_eq!(arr, ints(&[1, 2, 3]));
        arr.reverse();
        assert_eq!(arr, ints(&[3, 2, 1]));
        arr.swap_elements(0, 2).unwrap();
        assert_eq!(arr, ints(&[1, 2, 3]));
        assert_eq!(arr.swap_elements(0, 3), Err(Error::OutOfRange));
    }

    #[test]
    fn element_slots_stay_on_the_array() {
        let sp = StoragePtr::new(MonotonicResource::new());
        let mut arr = Array::new_in(sp.clone());
        arr.resize(3).unwrap();
        arr.at_mut(0).unwrap().set(Value::from("a string long enough for the heap")).unwrap();
        arr.first_mut().unwrap().set_from(&Value::from(ints(&[1]))).unwrap();
        arr.last_mut().unwrap().emplace_string().push_str("z").unwrap();
        for mut slot in arr.iter_mut() {
            if slot.is_null() {
                slot.set(ints(&[4, 5])).unwrap();
            }
        }
        assert!(arr.get_mut(3).is_none());
        assert_eq!(arr.at_mut(3).err(), Some(Error::OutOfRange));
        for value in &arr {
            assert_eq!(value.storage(), &sp);
        }
        assert_eq!(arr[0][0].storage(), &sp);
        assert_eq!(arr[1][1].storage(), &sp);
    }

    #[test]
    fn shrink_and_swap() {
        let mut a = ints(&[1, 2, 3]);
        a.reserve(20).unwrap();
        a.shrink_to_fit().unwrap();
        assert_eq!(a.capacity(), 3);

        let sp = StoragePtr::new(MonotonicResource::new());
        let mut b = Array::new_in(sp.clone());
        b.push(Value::from(true)).unwrap();
        a.swap(&mut b).unwrap();
        assert_eq!(a, Array::from(vec![Value::from(true)]));
        assert_eq!(b, ints(&[1, 2, 3]));
        assert_eq!(b.storage(), &sp);
        assert_eq!(b[0].storage(), &sp);
    }
}
