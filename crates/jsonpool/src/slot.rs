//! Mutable handles to values owned by a container.

use core::{
    cmp::Ordering,
    fmt,
    ops::{Deref, Range},
};

use crate::{Array, Error, JsonString, Object, Value, ValueMut};

/// A mutable handle to a value that lives inside a container.
///
/// Every child of an [`Array`], [`Object`] or [`Value`] lives on its
/// parent's [`StoragePtr`](crate::StoragePtr). A `Slot` reads like `&T`
/// through [`Deref`] and offers the mutations that keep the storage in
/// place, but never hands out a `&mut T` that could be overwritten with a
/// value from another resource. Replacing the whole value goes through
/// [`set`](Slot::set), which moves or copies the new value onto the slot's
/// storage.
///
/// ```
/// use jsonpool::{Array, MonotonicResource, StoragePtr, Value};
///
/// let sp = StoragePtr::new(MonotonicResource::new());
/// let mut arr = Array::new_in(sp.clone());
/// arr.push(Value::new()).unwrap();
/// arr.at_mut(0)
///     .unwrap()
///     .set(Value::from("a string long enough to need its own block"))
///     .unwrap();
/// assert_eq!(arr[0].storage(), &sp);
/// ```
pub struct Slot<'a, T = Value> {
    target: &'a mut T,
}

impl<'a, T> Slot<'a, T> {
    pub(crate) fn new(target: &'a mut T) -> Self {
        Self { target }
    }

    /// A shorter-lived handle to the same value.
    pub fn reborrow(&mut self) -> Slot<'_, T> {
        Slot::new(self.target)
    }

    /// Gives up mutable access, keeping the borrow's full lifetime.
    #[must_use]
    pub fn into_ref(self) -> &'a T {
        self.target
    }
}

/// Wraps a value the caller owns, so it can be passed where a slot is
/// expected (for example to [`Slot::swap`]).
impl<'a, T> From<&'a mut T> for Slot<'a, T> {
    fn from(target: &'a mut T) -> Self {
        Self::new(target)
    }
}

impl<T> Deref for Slot<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.target
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.target, f)
    }
}

/// Generates `&mut self` methods that call the method of the same name on
/// the target. Generic parameters go in square brackets.
macro_rules! forward {
    ($(
        $(#[$attr:meta])*
        fn $name:ident $([$($generics:tt)*])? (&mut self $(, $arg:ident: $ty:ty)*) $(-> $ret:ty)?;
    )*) => {
        $(
            $(#[$attr])*
            pub fn $name $(<$($generics)*>)? (&mut self $(, $arg: $ty)*) $(-> $ret)? {
                self.target.$name($($arg),*)
            }
        )*
    };
}

// --- values ----------------------------------------------------------------

impl Slot<'_, Value> {
    /// Replaces the value with `value`, moved or copied onto this slot's
    /// storage.
    ///
    /// # Errors
    ///
    /// The resource's allocation error; the value is unchanged on failure.
    pub fn set(&mut self, value: impl Into<Value>) -> Result<(), Error> {
        self.target.assign(value.into())
    }

    /// Replaces the value with a copy of `other` on this slot's storage.
    ///
    /// # Errors
    ///
    /// The resource's allocation error; the value is unchanged on failure.
    pub fn set_from(&mut self, other: &Value) -> Result<(), Error> {
        self.target.assign_from(other)
    }

    /// Exchanges contents with `other`; each side keeps its storage.
    ///
    /// # Errors
    ///
    /// As for [`Value::swap`].
    pub fn swap(&mut self, other: &mut Slot<'_, Value>) -> Result<(), Error> {
        self.target.swap(other.target)
    }

    forward! {
        /// Same as [`Value::take`].
        fn take(&mut self) -> Value;
        /// Same as [`Value::view_mut`].
        fn view_mut(&mut self) -> ValueMut<'_>;
        /// Same as [`Value::emplace_null`].
        fn emplace_null(&mut self);
        /// Same as [`Value::emplace_bool`].
        fn emplace_bool(&mut self) -> &mut bool;
        /// Same as [`Value::emplace_int64`].
        fn emplace_int64(&mut self) -> &mut i64;
        /// Same as [`Value::emplace_uint64`].
        fn emplace_uint64(&mut self) -> &mut u64;
        /// Same as [`Value::emplace_double`].
        fn emplace_double(&mut self) -> &mut f64;
        /// Same as [`Value::emplace_string`].
        fn emplace_string(&mut self) -> Slot<'_, JsonString>;
        /// Same as [`Value::emplace_array`].
        fn emplace_array(&mut self) -> Slot<'_, Array>;
        /// Same as [`Value::emplace_object`].
        fn emplace_object(&mut self) -> Slot<'_, Object>;
        /// Same as [`Value::as_bool_mut`].
        fn as_bool_mut(&mut self) -> Option<&mut bool>;
        /// Same as [`Value::as_i64_mut`].
        fn as_i64_mut(&mut self) -> Option<&mut i64>;
        /// Same as [`Value::as_u64_mut`].
        fn as_u64_mut(&mut self) -> Option<&mut u64>;
        /// Same as [`Value::as_f64_mut`].
        fn as_f64_mut(&mut self) -> Option<&mut f64>;
        /// Same as [`Value::as_string_mut`].
        fn as_string_mut(&mut self) -> Option<Slot<'_, JsonString>>;
        /// Same as [`Value::as_array_mut`].
        fn as_array_mut(&mut self) -> Option<Slot<'_, Array>>;
        /// Same as [`Value::as_object_mut`].
        fn as_object_mut(&mut self) -> Option<Slot<'_, Object>>;
        /// Same as [`Value::get_mut`].
        fn get_mut[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Option<Slot<'_>>;
        /// Same as [`Value::at_key_mut`].
        fn at_key_mut[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Result<Slot<'_>, Error>;
        /// Same as [`Value::at_index_mut`].
        fn at_index_mut(&mut self, index: usize) -> Result<Slot<'_>, Error>;
    }
}

// --- arrays ----------------------------------------------------------------

impl Slot<'_, Array> {
    /// Exchanges contents with `other`; each array keeps its storage.
    ///
    /// # Errors
    ///
    /// As for [`Array::swap`].
    pub fn swap(&mut self, other: &mut Slot<'_, Array>) -> Result<(), Error> {
        self.target.swap(other.target)
    }

    /// Same as [`Array::iter_mut`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = Slot<'_>> {
        self.target.iter_mut()
    }

    forward! {
        /// Same as [`Array::get_mut`].
        fn get_mut(&mut self, index: usize) -> Option<Slot<'_>>;
        /// Same as [`Array::at_mut`].
        fn at_mut(&mut self, index: usize) -> Result<Slot<'_>, Error>;
        /// Same as [`Array::first_mut`].
        fn first_mut(&mut self) -> Option<Slot<'_>>;
        /// Same as [`Array::last_mut`].
        fn last_mut(&mut self) -> Option<Slot<'_>>;
        /// Same as [`Array::reserve`].
        fn reserve(&mut self, capacity: usize) -> Result<(), Error>;
        /// Same as [`Array::shrink_to_fit`].
        fn shrink_to_fit(&mut self) -> Result<(), Error>;
        /// Same as [`Array::push`].
        fn push(&mut self, value: Value) -> Result<(), Error>;
        /// Same as [`Array::pop`].
        fn pop(&mut self) -> Option<Value>;
        /// Same as [`Array::insert`].
        fn insert(&mut self, index: usize, value: Value) -> Result<(), Error>;
        /// Same as [`Array::insert_n`].
        fn insert_n(&mut self, index: usize, count: usize, value: &Value) -> Result<(), Error>;
        /// Same as [`Array::insert_within`].
        fn insert_within(&mut self, index: usize, src: usize) -> Result<(), Error>;
        /// Same as [`Array::insert_iter`].
        fn insert_iter[I: IntoIterator<Item = Value>](&mut self, index: usize, iter: I) -> Result<(), Error>;
        /// Same as [`Array::remove`].
        fn remove(&mut self, index: usize) -> Result<Value, Error>;
        /// Same as [`Array::erase`].
        fn erase(&mut self, index: usize) -> Result<usize, Error>;
        /// Same as [`Array::erase_range`].
        fn erase_range(&mut self, range: Range<usize>) -> Result<usize, Error>;
        /// Same as [`Array::truncate`].
        fn truncate(&mut self, len: usize);
        /// Same as [`Array::clear`].
        fn clear(&mut self);
        /// Same as [`Array::resize`].
        fn resize(&mut self, len: usize) -> Result<(), Error>;
        /// Same as [`Array::resize_with_value`].
        fn resize_with_value(&mut self, len: usize, value: &Value) -> Result<(), Error>;
        /// Same as [`Array::swap_elements`].
        fn swap_elements(&mut self, a: usize, b: usize) -> Result<(), Error>;
        /// Same as [`Array::sort_unstable_by`].
        fn sort_unstable_by[F: FnMut(&Value, &Value) -> Ordering](&mut self, compare: F);
        /// Same as [`Array::reverse`].
        fn reverse(&mut self);
    }
}

// --- objects ---------------------------------------------------------------

impl Slot<'_, Object> {
    /// Exchanges contents with `other`; each object keeps its storage.
    ///
    /// # Errors
    ///
    /// As for [`Object::swap`].
    pub fn swap(&mut self, other: &mut Slot<'_, Object>) -> Result<(), Error> {
        self.target.swap(other.target)
    }

    /// Same as [`Object::iter_mut`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&JsonString, Slot<'_>)> {
        self.target.iter_mut()
    }

    /// Same as [`Object::values_mut`].
    pub fn values_mut(&mut self) -> impl Iterator<Item = Slot<'_>> {
        self.target.values_mut()
    }

    forward! {
        /// Same as [`Object::get_mut`].
        fn get_mut[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Option<Slot<'_>>;
        /// Same as [`Object::at_mut`].
        fn at_mut[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Result<Slot<'_>, Error>;
        /// Same as [`Object::reserve`].
        fn reserve(&mut self, capacity: usize) -> Result<(), Error>;
        /// Same as [`Object::insert`].
        fn insert[K: AsRef<[u8]> + ?Sized](&mut self, key: &K, value: Value) -> Result<(usize, bool), Error>;
        /// Same as [`Object::insert_or_assign`].
        fn insert_or_assign[K: AsRef<[u8]> + ?Sized](&mut self, key: &K, value: Value) -> Result<(usize, bool), Error>;
        /// Same as [`Object::get_or_insert_null`].
        fn get_or_insert_null[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Result<Slot<'_>, Error>;
        /// Same as [`Object::insert_iter`].
        fn insert_iter[I: IntoIterator<Item = (K, Value)>, K: AsRef<[u8]>](&mut self, iter: I) -> Result<(), Error>;
        /// Same as [`Object::shift_remove`].
        fn shift_remove[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Option<Value>;
        /// Same as [`Object::swap_remove`].
        fn swap_remove[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> Option<Value>;
        /// Same as [`Object::erase`].
        fn erase[K: AsRef<[u8]> + ?Sized](&mut self, key: &K) -> usize;
        /// Same as [`Object::erase_at`].
        fn erase_at(&mut self, index: usize) -> Result<usize, Error>;
        /// Same as [`Object::clear`].
        fn clear(&mut self);
    }
}

// --- strings ---------------------------------------------------------------

impl Slot<'_, JsonString> {
    /// Exchanges contents with `other`; each string keeps its storage.
    ///
    /// # Errors
    ///
    /// As for [`JsonString::swap`].
    pub fn swap(&mut self, other: &mut Slot<'_, JsonString>) -> Result<(), Error> {
        self.target.swap(other.target)
    }

    forward! {
        /// Same as [`JsonString::as_bytes_mut`].
        fn as_bytes_mut(&mut self) -> &mut [u8];
        /// Same as [`JsonString::reserve`].
        fn reserve(&mut self, capacity: usize) -> Result<(), Error>;
        /// Same as [`JsonString::shrink_to_fit`].
        fn shrink_to_fit(&mut self) -> Result<(), Error>;
        /// Same as [`JsonString::clear`].
        fn clear(&mut self);
        /// Same as [`JsonString::truncate`].
        fn truncate(&mut self, len: usize);
        /// Same as [`JsonString::push`].
        fn push(&mut self, byte: u8) -> Result<(), Error>;
        /// Same as [`JsonString::pop`].
        fn pop(&mut self) -> Option<u8>;
        /// Same as [`JsonString::append`].
        fn append(&mut self, bytes: &[u8]) -> Result<(), Error>;
        /// Same as [`JsonString::push_str`].
        fn push_str(&mut self, s: &str) -> Result<(), Error>;
        /// Same as [`JsonString::append_n`].
        fn append_n(&mut self, count: usize, byte: u8) -> Result<(), Error>;
        /// Same as [`JsonString::append_within`].
        fn append_within(&mut self, src: Range<usize>) -> Result<(), Error>;
        /// Same as [`JsonString::insert`].
        fn insert(&mut self, pos: usize, bytes: &[u8]) -> Result<(), Error>;
        /// Same as [`JsonString::insert_n`].
        fn insert_n(&mut self, pos: usize, count: usize, byte: u8) -> Result<(), Error>;
        /// Same as [`JsonString::insert_within`].
        fn insert_within(&mut self, pos: usize, src: Range<usize>) -> Result<(), Error>;
        /// Same as [`JsonString::erase`].
        fn erase(&mut self, pos: usize, count: usize) -> Result<(), Error>;
        /// Same as [`JsonString::replace`].
        fn replace(&mut self, pos: usize, count: usize, bytes: &[u8]) -> Result<(), Error>;
        /// Same as [`JsonString::replace_n`].
        fn replace_n(&mut self, pos: usize, count: usize, n: usize, byte: u8) -> Result<(), Error>;
        /// Same as [`JsonString::replace_within`].
        fn replace_within(&mut self, pos: usize, count: usize, src: Range<usize>) -> Result<(), Error>;
        /// Same as [`JsonString::resize`].
        fn resize(&mut self, len: usize, byte: u8) -> Result<(), Error>;
        /// Same as [`JsonString::assign`].
        fn assign(&mut self, bytes: &[u8]) -> Result<(), Error>;
    }
}
