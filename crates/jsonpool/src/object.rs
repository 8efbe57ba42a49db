//! The [`Object`] container.

use alloc::vec::Vec;
use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
    ptr, slice,
};

use crate::{Error, JsonString, Slot, StoragePtr, Value, raw::RawBuf, value::NULL};

const MAX_SIZE: usize = 0x7fff_fffe;
/// Objects up to this capacity are searched linearly and carry no table.
const SMALL_OBJECT_LIMIT: usize = 18;
const NONE: u32 = u32::MAX;

fn hasher() -> ahash::RandomState {
    ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
}

fn digest(key: &[u8]) -> u64 {
    hasher().hash_one(key)
}

/// One member of an [`Object`].
pub struct KeyValuePair {
    key: JsonString,
    value: Value,
    next: u32,
}

impl KeyValuePair {
    /// The key.
    #[must_use]
    pub fn key(&self) -> &JsonString {
        &self.key
    }

    /// The key followed by its NUL terminator.
    #[must_use]
    pub fn key_with_nul(&self) -> &[u8] {
        self.key.as_bytes_with_nul()
    }

    /// The value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The value, mutably.
    pub fn value_mut(&mut self) -> Slot<'_> {
        Slot::new(&mut self.value)
    }

    /// Splits the pair.
    #[must_use]
    pub fn into_parts(self) -> (JsonString, Value) {
        (self.key, self.value)
    }
}

impl fmt::Debug for KeyValuePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyValuePair")
            .field(&self.key)
            .field(&self.value)
            .finish()
    }
}

/// An insertion-ordered map from string keys to [`Value`]s that draws its
/// memory from a [`StoragePtr`].
///
/// Members are stored contiguously in insertion order. Objects larger than a
/// handful of members also keep a chained hash index over the keys. Keys are
/// unique: [`insert`](Self::insert) keeps the existing member,
/// [`insert_or_assign`](Self::insert_or_assign) overwrites it.
///
/// Equality and hashing ignore member order.
///
/// ```
/// use jsonpool::{Object, Value};
///
/// let mut obj = Object::new();
/// obj.insert("b", Value::from(2)).unwrap();
/// obj.insert("a", Value::from(1)).unwrap();
/// obj.get_or_insert_null("c").unwrap().set(true).unwrap();
/// let keys: Vec<_> = obj.keys().map(|k| k.to_string()).collect();
/// assert_eq!(keys, ["b", "a", "c"]);
/// ```
pub struct Object {
    entries: RawBuf<KeyValuePair>,
    buckets: RawBuf<u32>,
    len: usize,
    sp: StoragePtr,
}

impl Object {
    /// Largest supported number of members.
    #[must_use]
    pub const fn max_size() -> usize {
        MAX_SIZE
    }

    /// An empty object on the default resource.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(StoragePtr::default())
    }

    /// An empty object on `sp`. Never allocates.
    #[must_use]
    pub fn new_in(sp: StoragePtr) -> Self {
        Self {
            entries: RawBuf::dangling(),
            buckets: RawBuf::dangling(),
            len: 0,
            sp,
        }
    }

    /// An empty object with room for `capacity` members.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] above [`max_size`](Self::max_size), or the
    /// resource's allocation error.
    pub fn with_capacity_in(capacity: usize, sp: StoragePtr) -> Result<Self, Error> {
        let mut obj = Self::new_in(sp);
        obj.reserve(capacity)?;
        Ok(obj)
    }

    /// Collects members from an iterator. Later duplicates of a key are
    /// ignored, as with [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// See [`with_capacity_in`](Self::with_capacity_in).
    pub fn try_from_iter_in<I, K>(iter: I, sp: StoragePtr) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<[u8]>,
    {
        let mut obj = Self::new_in(sp);
        obj.insert_iter(iter)?;
        Ok(obj)
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
        let mut obj = Self::with_capacity_in(self.len, sp)?;
        for kv in self.iter() {
            let key = kv.key.try_clone_in(obj.sp.clone())?;
            let value = kv.value.try_clone_in(obj.sp.clone())?;
            // SAFETY: capacity was reserved, keys are unique in `self`, and
            // both parts live on `obj.sp`.
            unsafe { obj.push_entry(key, value) };
        }
        Ok(obj)
    }

    /// Adds parsed members. When a key repeats, the member keeps its first
    /// position and takes the last value.
    ///
    /// Allocates nothing when every part already lives on this object's
    /// resource and enough capacity is reserved.
    pub(crate) fn extend_last_wins<I>(&mut self, pairs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (JsonString, Value)>,
    {
        for (key, value) in pairs {
            let key = if key.storage() == &self.sp {
                key
            } else {
                key.try_clone_in(self.sp.clone())?
            };
            let value = value.rehome(&self.sp)?;
            match self.find(&key) {
                Some(i) => self.entries_mut()[i].value = value,
                None => {
                    self.reserve(self.len + 1)?;
                    // SAFETY: reserved above; the key is absent.
                    unsafe { self.push_entry(key, value) };
                }
            }
        }
        Ok(())
    }

    // --- observers -------------------------------------------------------

    /// The resource this object allocates from.
    #[must_use]
    pub fn storage(&self) -> &StoragePtr {
        &self.sp
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members that fit before the next reallocation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap()
    }

    /// Number of hash buckets; zero while the object is small.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.cap()
    }

    /// The members in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[KeyValuePair] {
        // SAFETY: the first `len` entries are initialised.
        unsafe { slice::from_raw_parts(self.entries.ptr(), self.len) }
    }

    /// Iterates over the members in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, KeyValuePair> {
        self.as_slice().iter()
    }

    /// Iterates over the members with mutable values.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&JsonString, Slot<'_>)> {
        self.entries_mut()
            .iter_mut()
            .map(|kv| (&kv.key, Slot::new(&mut kv.value)))
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &JsonString> {
        self.iter().map(KeyValuePair::key)
    }

    /// Iterates over the values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(KeyValuePair::value)
    }

    /// Iterates over the values, mutably.
    pub fn values_mut(&mut self) -> impl Iterator<Item = Slot<'_>> {
        self.entries_mut().iter_mut().map(KeyValuePair::value_mut)
    }

    /// Position of `key` in insertion order.
    pub fn find<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<usize> {
        let key = key.as_ref();
        if self.buckets.cap() == 0 {
            return self.iter().position(|kv| kv.key.as_bytes() == key);
        }
        let entries = self.as_slice();
        let mut i = self.heads()[self.bucket_of(key)];
        while i != NONE {
            let kv = &entries[i as usize];
            if kv.key.as_bytes() == key {
                return Some(i as usize);
            }
            i = kv.next;
        }
        None
    }

    /// The value for `key`.
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Value> {
        self.find(key).map(|i| &self.as_slice()[i].value)
    }

    /// The value for `key`, mutably.
    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<Slot<'_>> {
        let i = self.find(key)?;
        Some(self.entries_mut()[i].value_mut())
    }

    /// The member at `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&KeyValuePair> {
        self.as_slice().get(index)
    }

    /// The value for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when the key is absent.
    pub fn at<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<&Value, Error> {
        self.get(key).ok_or(Error::OutOfRange)
    }

    /// The value for `key`, mutably.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when the key is absent.
    pub fn at_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<Slot<'_>, Error> {
        self.get_mut(key).ok_or(Error::OutOfRange)
    }

    /// Whether `key` is present.
    pub fn contains_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Number of members with `key`: zero or one.
    pub fn count<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> usize {
        usize::from(self.contains_key(key))
    }

    // --- capacity --------------------------------------------------------

    /// Makes room for at least `capacity` members, sizing the hash index to
    /// match.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] above [`max_size`](Self::max_size), or the
    /// resource's allocation error.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), Error> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        if capacity > MAX_SIZE {
            return Err(Error::LengthError);
        }
        let cap = self.capacity();
        let new_cap = if cap > MAX_SIZE - cap / 2 {
            MAX_SIZE
        } else {
            capacity.max(cap + cap / 2)
        };
        self.reallocate(new_cap)
    }

    // --- modifiers -------------------------------------------------------

    /// Inserts `value` under `key` unless the key is already present.
    ///
    /// Returns the member's position and whether it was inserted.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] for an oversized key or object, or the
    /// resource's allocation error. The object is unchanged on failure.
    pub fn insert<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
        value: Value,
    ) -> Result<(usize, bool), Error> {
        if let Some(i) = self.find(key) {
            return Ok((i, false));
        }
        let i = self.insert_new(key.as_ref(), value)?;
        Ok((i, true))
    }

    /// Inserts `value` under `key`, replacing any previous value.
    ///
    /// Returns the member's position and whether it was newly inserted.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert).
    pub fn insert_or_assign<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
        value: Value,
    ) -> Result<(usize, bool), Error> {
        if let Some(i) = self.find(key) {
            let value = value.rehome(&self.sp)?;
            self.entries_mut()[i].value = value;
            return Ok((i, false));
        }
        let i = self.insert_new(key.as_ref(), value)?;
        Ok((i, true))
    }

    /// The value for `key`, inserting a null first when the key is absent.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert).
    pub fn get_or_insert_null<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
    ) -> Result<Slot<'_>, Error> {
        let i = match self.find(key) {
            Some(i) => i,
            None => self.insert_new(key.as_ref(), Value::null_in(self.sp.clone()))?,
        };
        Ok(self.entries_mut()[i].value_mut())
    }

    /// Inserts every member of `iter` whose key is not present yet. Within
    /// `iter`, the first occurrence of a key wins.
    ///
    /// # Errors
    ///
    /// As for [`insert`](Self::insert). Nothing is inserted on failure.
    pub fn insert_iter<I, K>(&mut self, iter: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<[u8]>,
    {
        let iter = iter.into_iter();
        let mut staged = Vec::with_capacity(iter.size_hint().0);
        for (key, value) in iter {
            let key = JsonString::from_bytes_in(key.as_ref(), self.sp.clone())?;
            let value = value.rehome(&self.sp)?;
            staged.push((key, value));
        }
        if staged.len() > MAX_SIZE - self.len {
            return Err(Error::LengthError);
        }
        self.reserve(self.len + staged.len())?;
        for (key, value) in staged {
            if self.find(&key).is_none() {
                // SAFETY: room for every staged member was reserved.
                unsafe { self.push_entry(key, value) };
            }
        }
        Ok(())
    }

    /// Removes `key`, shifting later members down to keep their order.
    pub fn shift_remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<Value> {
        let i = self.find(key)?;
        Some(self.shift_remove_index(i).value)
    }

    /// Removes `key` by moving the last member into its place.
    pub fn swap_remove<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<Value> {
        let i = self.find(key)?;
        let last = self.len - 1;
        if self.buckets.cap() != 0 {
            self.unlink(i);
            if i != last {
                self.unlink(last);
            }
        }
        // SAFETY: `i` and `last` are initialised; after the move `last` is
        // outside `len`.
        let removed = unsafe {
            let base = self.entries.ptr();
            let removed = ptr::read(base.add(i));
            if i != last {
                ptr::copy_nonoverlapping(base.add(last), base.add(i), 1);
            }
            removed
        };
        self.len -= 1;
        if i != last && self.buckets.cap() != 0 {
            self.link(i);
        }
        Some(removed.value)
    }

    /// Removes `key` while preserving order, returning how many members were
    /// removed.
    pub fn erase<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> usize {
        usize::from(self.shift_remove(key).is_some())
    }

    /// Removes the member at `index`, returning the index of the member that
    /// follows it (now at the same position).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index >= len()`.
    pub fn erase_at(&mut self, index: usize) -> Result<usize, Error> {
        if index >= self.len {
            return Err(Error::OutOfRange);
        }
        self.shift_remove_index(index);
        Ok(index)
    }

    /// Drops every member, keeping the capacity.
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        // SAFETY: the first `len` entries are initialised and now outside
        // `len`.
        unsafe {
            ptr::drop_in_place(slice::from_raw_parts_mut(self.entries.ptr(), len));
        }
        if self.buckets.cap() != 0 {
            self.heads_mut().fill(NONE);
        }
    }

    /// Exchanges contents with `other`. Each object keeps its own resource;
    /// when the resources differ the contents are copied across.
    ///
    /// # Errors
    ///
    /// The allocation error of either resource. Both objects are unchanged
    /// on failure.
    pub fn swap(&mut self, other: &mut Self) -> Result<(), Error> {
        if self.sp == other.sp {
            core::mem::swap(&mut self.entries, &mut other.entries);
            core::mem::swap(&mut self.buckets, &mut other.buckets);
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

    fn entries_mut(&mut self) -> &mut [KeyValuePair] {
        // SAFETY: the first `len` entries are initialised.
        unsafe { slice::from_raw_parts_mut(self.entries.ptr(), self.len) }
    }

    fn heads(&self) -> &[u32] {
        // SAFETY: the whole bucket array is initialised when allocated.
        unsafe { slice::from_raw_parts(self.buckets.ptr(), self.buckets.cap()) }
    }

    fn heads_mut(&mut self) -> &mut [u32] {
        // SAFETY: as in `heads`.
        unsafe { slice::from_raw_parts_mut(self.buckets.ptr(), self.buckets.cap()) }
    }

    pub(crate) fn bucket_of(&self, key: &[u8]) -> usize {
        // the remainder is below the bucket count, itself below `u32::MAX`
        (digest(key) % self.buckets.cap() as u64) as usize
    }

    fn link(&mut self, i: usize) {
        let b = self.bucket_of(self.as_slice()[i].key.as_bytes());
        let head = self.heads()[b];
        self.entries_mut()[i].next = head;
        self.heads_mut()[b] = i as u32;
    }

    fn unlink(&mut self, i: usize) {
        let b = self.bucket_of(self.as_slice()[i].key.as_bytes());
        let next = self.as_slice()[i].next;
        if self.heads()[b] == i as u32 {
            self.heads_mut()[b] = next;
            return;
        }
        let mut j = self.heads()[b];
        while j != NONE {
            let kv = &mut self.entries_mut()[j as usize];
            if kv.next == i as u32 {
                kv.next = next;
                return;
            }
            j = kv.next;
        }
    }

    fn rebuild_index(&mut self) {
        if self.buckets.cap() == 0 {
            return;
        }
        self.heads_mut().fill(NONE);
        for i in 0..self.len {
            self.link(i);
        }
    }

    fn reallocate(&mut self, new_cap: usize) -> Result<(), Error> {
        let mut entries = RawBuf::<KeyValuePair>::allocate(&self.sp, new_cap)?;
        let mut buckets = if new_cap > SMALL_OBJECT_LIMIT {
            match RawBuf::<u32>::allocate(&self.sp, new_cap) {
                Ok(buckets) => buckets,
                Err(err) => {
                    // SAFETY: the block is empty and came from `sp`.
                    unsafe { entries.release(&self.sp) };
                    return Err(err);
                }
            }
        } else {
            RawBuf::dangling()
        };
        // SAFETY: the new entry block holds `len` members, which are moved
        // bitwise; the old blocks are released without dropping anything and
        // the new bucket array is fully written before use.
        unsafe {
            ptr::copy_nonoverlapping(self.entries.ptr(), entries.ptr(), self.len);
            ptr::write_bytes(buckets.ptr(), 0xff, buckets.cap());
            core::mem::swap(&mut self.entries, &mut entries);
            core::mem::swap(&mut self.buckets, &mut buckets);
            entries.release(&self.sp);
            buckets.release(&self.sp);
        }
        self.rebuild_index();
        Ok(())
    }

    fn insert_new(&mut self, key: &[u8], value: Value) -> Result<usize, Error> {
        if self.len >= MAX_SIZE {
            return Err(Error::LengthError);
        }
        let key = JsonString::from_bytes_in(key, self.sp.clone())?;
        let value = value.rehome(&self.sp)?;
        self.reserve(self.len + 1)?;
        // SAFETY: reserved above; the caller checked the key is absent.
        Ok(unsafe { self.push_entry(key, value) })
    }

    /// # Safety
    ///
    /// `len < capacity()`, `key` is absent, and both parts live on this
    /// object's resource.
    unsafe fn push_entry(&mut self, key: JsonString, value: Value) -> usize {
        let i = self.len;
        // SAFETY: forwarded to the caller.
        unsafe {
            ptr::write(
                self.entries.ptr().add(i),
                KeyValuePair {
                    key,
                    value,
                    next: NONE,
                },
            );
        }
        self.len += 1;
        if self.buckets.cap() != 0 {
            self.link(i);
        }
        i
    }

    fn shift_remove_index(&mut self, i: usize) -> KeyValuePair {
        // SAFETY: `i < len`; the tail is moved down over the hole.
        let removed = unsafe {
            let at = self.entries.ptr().add(i);
            let removed = ptr::read(at);
            ptr::copy(at.add(1), at, self.len - i - 1);
            removed
        };
        self.len -= 1;
        self.rebuild_index();
        removed
    }
}

impl Drop for Object {
    fn drop(&mut self) {
        self.clear();
        // SAFETY: every member was dropped and both blocks came from `sp`.
        unsafe {
            self.entries.release(&self.sp);
            self.buckets.release(&self.sp);
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// When the resource cannot allocate the copy, like `std` collections do.
impl Clone for Object {
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("cannot clone object: {err}"))
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = &'a KeyValuePair;
    type IntoIter = slice::Iter<'a, KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// # Panics
///
/// When the default heap cannot allocate.
impl<K: AsRef<[u8]>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::try_from_iter_in(iter, StoragePtr::default())
            .unwrap_or_else(|err| panic!("cannot build object: {err}"))
    }
}

impl<K: AsRef<[u8]> + ?Sized> Index<&K> for Object {
    type Output = Value;

    /// The value for `key`, or a null when the key is absent.
    fn index(&self, key: &K) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|kv| other.get(&kv.key).is_some_and(|v| *v == kv.value))
    }
}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let hasher = hasher();
        let combined = self.iter().fold(0u64, |acc, kv| {
            acc.wrapping_add(hasher.hash_one((kv.key.as_bytes(), &kv.value)))
        });
        state.write_usize(self.len);
        state.write_u64(combined);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|kv| (&kv.key, &kv.value)))
            .finish()
    }
}
