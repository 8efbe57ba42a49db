//! The [`Value`] tagged union and its borrowed views.

use alloc::string::String;
use core::{
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
};

use crate::{Array, Error, JsonString, Kind, Numeric, Object, Slot, StoragePtr};

/// Returned by lookups that miss.
pub(crate) static NULL: Value = Value(Inner::Null(StoragePtr::DEFAULT));

#[derive(Clone)]
enum Inner {
    Null(StoragePtr),
    Bool(bool, StoragePtr),
    Int64(i64, StoragePtr),
    Uint64(u64, StoragePtr),
    Double(f64, StoragePtr),
    String(JsonString),
    Array(Array),
    Object(Object),
}

/// A JSON value: null, boolean, number, string, array or object.
///
/// Every value remembers the [`StoragePtr`] it was created with. Scalars
/// carry the handle directly; strings and containers carry it through their
/// payload, and every element nested below a container shares the
/// container's storage.
///
/// Numbers keep their parsed representation: `Int64`, `Uint64` or `Double`.
/// An `Int64` and a `Uint64` compare equal when they hold the same integer;
/// a `Double` never equals an integer.
///
/// ```
/// use jsonpool::{Kind, Value};
///
/// let mut v = Value::from(3);
/// assert_eq!(v.kind(), Kind::Int64);
/// v.emplace_array().push(Value::from("x")).unwrap();
/// assert_eq!(v.to_string(), r#"["x"]"#);
/// ```
#[derive(Clone)]
pub struct Value(Inner);

/// A borrowed view of a [`Value`], for pattern matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    /// `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int64(i64),
    /// An unsigned integer.
    Uint64(u64),
    /// A double.
    Double(f64),
    /// A string.
    String(&'a JsonString),
    /// An array.
    Array(&'a Array),
    /// An object.
    Object(&'a Object),
}

/// A mutable view of a [`Value`], for pattern matching.
#[derive(Debug)]
pub enum ValueMut<'a> {
    /// `null`.
    Null,
    /// A boolean.
    Bool(&'a mut bool),
    /// A signed integer.
    Int64(&'a mut i64),
    /// An unsigned integer.
    Uint64(&'a mut u64),
    /// A double.
    Double(&'a mut f64),
    /// A string.
    String(Slot<'a, JsonString>),
    /// An array.
    Array(Slot<'a, Array>),
    /// An object.
    Object(Slot<'a, Object>),
}

impl Value {
    // --- construction ----------------------------------------------------

    /// A null on the default resource.
    #[must_use]
    pub fn new() -> Self {
        Self::null_in(StoragePtr::default())
    }

    /// A null on `sp`.
    #[must_use]
    pub fn null_in(sp: StoragePtr) -> Self {
        Self(Inner::Null(sp))
    }

    /// A boolean on `sp`.
    #[must_use]
    pub fn bool_in(b: bool, sp: StoragePtr) -> Self {
        Self(Inner::Bool(b, sp))
    }

    /// A signed integer on `sp`.
    #[must_use]
    pub fn int64_in(v: i64, sp: StoragePtr) -> Self {
        Self(Inner::Int64(v, sp))
    }

    /// An unsigned integer on `sp`.
    #[must_use]
    pub fn uint64_in(v: u64, sp: StoragePtr) -> Self {
        Self(Inner::Uint64(v, sp))
    }

    /// A double on `sp`.
    #[must_use]
    pub fn double_in(v: f64, sp: StoragePtr) -> Self {
        Self(Inner::Double(v, sp))
    }

    /// A string copied onto `sp`.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn string_in(s: &str, sp: StoragePtr) -> Result<Self, Error> {
        Ok(Self(Inner::String(JsonString::from_str_in(s, sp)?)))
    }

    /// An empty array on `sp`.
    #[must_use]
    pub fn array_in(sp: StoragePtr) -> Self {
        Self(Inner::Array(Array::new_in(sp)))
    }

    /// An empty object on `sp`.
    #[must_use]
    pub fn object_in(sp: StoragePtr) -> Self {
        Self(Inner::Object(Object::new_in(sp)))
    }

    /// The zero value of `kind` on `sp`: `false`, `0`, `0.0`, or an empty
    /// string or container.
    #[must_use]
    pub fn from_kind_in(kind: Kind, sp: StoragePtr) -> Self {
        Self(match kind {
            Kind::Null => Inner::Null(sp),
            Kind::Bool => Inner::Bool(false, sp),
            Kind::Int64 => Inner::Int64(0, sp),
            Kind::Uint64 => Inner::Uint64(0, sp),
            Kind::Double => Inner::Double(0.0, sp),
            Kind::String => Inner::String(JsonString::new_in(sp)),
            Kind::Array => Inner::Array(Array::new_in(sp)),
            Kind::Object => Inner::Object(Object::new_in(sp)),
        })
    }

    /// Deep copy onto the same resource.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn try_clone(&self) -> Result<Self, Error> {
        self.try_clone_in(self.storage().clone())
    }

    /// Deep copy onto `sp`.
    ///
    /// # Errors
    ///
    /// The resource's allocation error.
    pub fn try_clone_in(&self, sp: StoragePtr) -> Result<Self, Error> {
        Ok(Self(match &self.0 {
            Inner::Null(_) => Inner::Null(sp),
            Inner::Bool(b, _) => Inner::Bool(*b, sp),
            Inner::Int64(v, _) => Inner::Int64(*v, sp),
            Inner::Uint64(v, _) => Inner::Uint64(*v, sp),
            Inner::Double(v, _) => Inner::Double(*v, sp),
            Inner::String(s) => Inner::String(s.try_clone_in(sp)?),
            Inner::Array(a) => Inner::Array(a.try_clone_in(sp)?),
            Inner::Object(o) => Inner::Object(o.try_clone_in(sp)?),
        }))
    }

    /// Moves `self` onto `sp`, copying only when it lives elsewhere.
    pub(crate) fn rehome(self, sp: &StoragePtr) -> Result<Self, Error> {
        if self.storage() == sp {
            Ok(self)
        } else {
            self.try_clone_in(sp.clone())
        }
    }

    // --- observers -------------------------------------------------------

    /// The kind of value held.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.0 {
            Inner::Null(_) => Kind::Null,
            Inner::Bool(..) => Kind::Bool,
            Inner::Int64(..) => Kind::Int64,
            Inner::Uint64(..) => Kind::Uint64,
            Inner::Double(..) => Kind::Double,
            Inner::String(_) => Kind::String,
            Inner::Array(_) => Kind::Array,
            Inner::Object(_) => Kind::Object,
        }
    }

    /// The resource this value allocates from.
    #[must_use]
    pub fn storage(&self) -> &StoragePtr {
        match &self.0 {
            Inner::Null(sp)
            | Inner::Bool(_, sp)
            | Inner::Int64(_, sp)
            | Inner::Uint64(_, sp)
            | Inner::Double(_, sp) => sp,
            Inner::String(s) => s.storage(),
            Inner::Array(a) => a.storage(),
            Inner::Object(o) => o.storage(),
        }
    }

    /// Borrows the value for pattern matching.
    #[must_use]
    pub fn view(&self) -> ValueRef<'_> {
        match &self.0 {
            Inner::Null(_) => ValueRef::Null,
            Inner::Bool(b, _) => ValueRef::Bool(*b),
            Inner::Int64(v, _) => ValueRef::Int64(*v),
            Inner::Uint64(v, _) => ValueRef::Uint64(*v),
            Inner::Double(v, _) => ValueRef::Double(*v),
            Inner::String(s) => ValueRef::String(s),
            Inner::Array(a) => ValueRef::Array(a),
            Inner::Object(o) => ValueRef::Object(o),
        }
    }

    /// Mutably borrows the value for pattern matching. The kind cannot be
    /// changed through the view; use the `emplace_*` methods for that.
    pub fn view_mut(&mut self) -> ValueMut<'_> {
        match &mut self.0 {
            Inner::Null(_) => ValueMut::Null,
            Inner::Bool(b, _) => ValueMut::Bool(b),
            Inner::Int64(v, _) => ValueMut::Int64(v),
            Inner::Uint64(v, _) => ValueMut::Uint64(v),
            Inner::Double(v, _) => ValueMut::Double(v),
            Inner::String(s) => ValueMut::String(Slot::new(s)),
            Inner::Array(a) => ValueMut::Array(Slot::new(a)),
            Inner::Object(o) => ValueMut::Object(Slot::new(o)),
        }
    }

    /// `true` for null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.0, Inner::Null(_))
    }

    /// `true` for a boolean.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        matches!(self.0, Inner::Bool(..))
    }

    /// `true` for a signed integer.
    #[must_use]
    pub fn is_int64(&self) -> bool {
        matches!(self.0, Inner::Int64(..))
    }

    /// `true` for an unsigned integer.
    #[must_use]
    pub fn is_uint64(&self) -> bool {
        matches!(self.0, Inner::Uint64(..))
    }

    /// `true` for a double.
    #[must_use]
    pub fn is_double(&self) -> bool {
        matches!(self.0, Inner::Double(..))
    }

    /// `true` for a string.
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self.0, Inner::String(_))
    }

    /// `true` for an array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.0, Inner::Array(_))
    }

    /// `true` for an object.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self.0, Inner::Object(_))
    }

    /// `int64`, `uint64` or `double`.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.0, Inner::Int64(..) | Inner::Uint64(..) | Inner::Double(..))
    }

    /// Anything but an array or an object.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !self.is_structured()
    }

    /// An array or an object.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self.0, Inner::Array(_) | Inner::Object(_))
    }

    // --- accessors -------------------------------------------------------

    /// The boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.0 {
            Inner::Bool(b, _) => Some(b),
            _ => None,
        }
    }

    /// The signed integer, if this is an `int64`. No conversion is applied;
    /// see [`to_number`](Self::to_number).
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Inner::Int64(v, _) => Some(v),
            _ => None,
        }
    }

    /// The unsigned integer, if this is a `uint64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self.0 {
            Inner::Uint64(v, _) => Some(v),
            _ => None,
        }
    }

    /// The double, if this is a `double`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.0 {
            Inner::Double(v, _) => Some(v),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_string(&self) -> Option<&JsonString> {
        match &self.0 {
            Inner::String(s) => Some(s),
            _ => None,
        }
    }

    /// The string as `&str`, if this is a string holding valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_string().and_then(|s| s.as_str().ok())
    }

    /// The array, if this is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match &self.0 {
            Inner::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The object, if this is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match &self.0 {
            Inner::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable counterpart of the accessor without `_mut`.
    pub fn as_bool_mut(&mut self) -> Option<&mut bool> {
        match &mut self.0 {
            Inner::Bool(b, _) => Some(b),
            _ => None,
        }
    }

    /// Mutable counterpart of the accessor without `_mut`.
    pub fn as_i64_mut(&mut self) -> Option<&mut i64> {
        match &mut self.0 {
            Inner::Int64(v, _) => Some(v),
            _ => None,
        }
    }

    /// Mutable counterpart of the accessor without `_mut`.
    pub fn as_u64_mut(&mut self) -> Option<&mut u64> {
        match &mut self.0 {
            Inner::Uint64(v, _) => Some(v),
            _ => None,
        }
    }

    /// Mutable counterpart of the accessor without `_mut`.
    pub fn as_f64_mut(&mut self) -> Option<&mut f64> {
        match &mut self.0 {
            Inner::Double(v, _) => Some(v),
            _ => None,
        }
    }

    /// The string, as a handle that keeps it on this value's storage.
    pub fn as_string_mut(&mut self) -> Option<Slot<'_, JsonString>> {
        self.string_mut().map(Slot::new)
    }

    /// The array, as a handle that keeps its elements on this value's
    /// storage.
    pub fn as_array_mut(&mut self) -> Option<Slot<'_, Array>> {
        self.array_mut().map(Slot::new)
    }

    /// The object, as a handle that keeps its members on this value's
    /// storage.
    pub fn as_object_mut(&mut self) -> Option<Slot<'_, Object>> {
        self.object_mut().map(Slot::new)
    }

    fn string_mut(&mut self) -> Option<&mut JsonString> {
        match &mut self.0 {
            Inner::String(s) => Some(s),
            _ => None,
        }
    }

    fn array_mut(&mut self) -> Option<&mut Array> {
        match &mut self.0 {
            Inner::Array(a) => Some(a),
            _ => None,
        }
    }

    fn object_mut(&mut self) -> Option<&mut Object> {
        match &mut self.0 {
            Inner::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Unwraps a string, or gives the value back.
    ///
    /// # Errors
    ///
    /// `self` when it is not a string.
    pub fn into_string(self) -> Result<JsonString, Self> {
        match self.0 {
            Inner::String(s) => Ok(s),
            other => Err(Self(other)),
        }
    }

    /// Unwraps an array, or gives the value back.
    ///
    /// # Errors
    ///
    /// `self` when it is not an array.
    pub fn into_array(self) -> Result<Array, Self> {
        match self.0 {
            Inner::Array(a) => Ok(a),
            other => Err(Self(other)),
        }
    }

    /// Unwraps an object, or gives the value back.
    ///
    /// # Errors
    ///
    /// `self` when it is not an object.
    pub fn into_object(self) -> Result<Object, Self> {
        match self.0 {
            Inner::Object(o) => Ok(o),
            other => Err(Self(other)),
        }
    }

    /// Converts a number to `T` when the conversion is exact.
    ///
    /// ```
    /// use jsonpool::{Error, Value};
    ///
    /// assert_eq!(Value::from(2.0).to_number::<u8>(), Ok(2));
    /// assert_eq!(Value::from(-1).to_number::<u32>(), Err(Error::NotExact));
    /// assert_eq!(Value::from("1").to_number::<i64>(), Err(Error::NotNumber));
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::NotNumber`] for non-numbers, [`Error::NotExact`] when the
    /// value is out of range for `T` or has a fractional part.
    pub fn to_number<T: Numeric>(&self) -> Result<T, Error> {
        match self.0 {
            Inner::Int64(v, _) => T::from_i64(v),
            Inner::Uint64(v, _) => T::from_u64(v),
            Inner::Double(v, _) => T::from_f64(v),
            _ => Err(Error::NotNumber),
        }
    }

    // --- emplace ---------------------------------------------------------

    fn reset_with(&mut self, make: impl FnOnce(StoragePtr) -> Inner) -> &mut Inner {
        let sp = self.storage().clone();
        self.0 = make(sp);
        &mut self.0
    }

    /// Replaces the value with null, keeping the storage.
    pub fn emplace_null(&mut self) {
        self.reset_with(Inner::Null);
    }

    /// Replaces the value with `false`, keeping the storage.
    pub fn emplace_bool(&mut self) -> &mut bool {
        match self.reset_with(|sp| Inner::Bool(false, sp)) {
            Inner::Bool(b, _) => b,
            _ => unreachable!(),
        }
    }

    /// Replaces the value with `0_i64`, keeping the storage.
    pub fn emplace_int64(&mut self) -> &mut i64 {
        match self.reset_with(|sp| Inner::Int64(0, sp)) {
            Inner::Int64(v, _) => v,
            _ => unreachable!(),
        }
    }

    /// Replaces the value with `0_u64`, keeping the storage.
    pub fn emplace_uint64(&mut self) -> &mut u64 {
        match self.reset_with(|sp| Inner::Uint64(0, sp)) {
            Inner::Uint64(v, _) => v,
            _ => unreachable!(),
        }
    }

    /// Replaces the value with `0.0`, keeping the storage.
    pub fn emplace_double(&mut self) -> &mut f64 {
        match self.reset_with(|sp| Inner::Double(0.0, sp)) {
            Inner::Double(v, _) => v,
            _ => unreachable!(),
        }
    }

    /// Replaces the value with an empty string, keeping the storage.
    pub fn emplace_string(&mut self) -> Slot<'_, JsonString> {
        match self.reset_with(|sp| Inner::String(JsonString::new_in(sp))) {
            Inner::String(s) => Slot::new(s),
            _ => unreachable!(),
        }
    }

    /// Replaces the value with an empty array, keeping the storage.
    pub fn emplace_array(&mut self) -> Slot<'_, Array> {
        match self.reset_with(|sp| Inner::Array(Array::new_in(sp))) {
            Inner::Array(a) => Slot::new(a),
            _ => unreachable!(),
        }
    }

    /// Replaces the value with an empty object, keeping the storage.
    pub fn emplace_object(&mut self) -> Slot<'_, Object> {
        match self.reset_with(|sp| Inner::Object(Object::new_in(sp))) {
            Inner::Object(o) => Slot::new(o),
            _ => unreachable!(),
        }
    }

    // --- lookup ----------------------------------------------------------

    /// The member `key` of an object.
    pub fn get<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// The member `key` of an object, mutably.
    pub fn get_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<Slot<'_>> {
        self.object_mut()?.get_mut(key)
    }

    /// The member `key` of an object.
    ///
    /// # Errors
    ///
    /// [`Error::KindMismatch`] when this is not an object,
    /// [`Error::OutOfRange`] when the key is absent.
    pub fn at_key<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<&Value, Error> {
        self.as_object().ok_or(Error::KindMismatch)?.at(key)
    }

    /// The member `key` of an object, mutably.
    ///
    /// # Errors
    ///
    /// As for [`at_key`](Self::at_key).
    pub fn at_key_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Result<Slot<'_>, Error> {
        self.object_mut().ok_or(Error::KindMismatch)?.at_mut(key)
    }

    /// The element `index` of an array.
    ///
    /// # Errors
    ///
    /// [`Error::KindMismatch`] when this is not an array,
    /// [`Error::OutOfRange`] when the index is past the end.
    pub fn at_index(&self, index: usize) -> Result<&Value, Error> {
        self.as_array().ok_or(Error::KindMismatch)?.at(index)
    }

    /// The element `index` of an array, mutably.
    ///
    /// # Errors
    ///
    /// As for [`at_index`](Self::at_index).
    pub fn at_index_mut(&mut self, index: usize) -> Result<Slot<'_>, Error> {
        self.array_mut().ok_or(Error::KindMismatch)?.at_mut(index)
    }

    // --- assignment ------------------------------------------------------

    /// Replaces `self` with `value`, moved or copied onto this value's
    /// storage.
    ///
    /// # Errors
    ///
    /// The resource's allocation error; `self` is unchanged on failure.
    pub fn assign(&mut self, value: Value) -> Result<(), Error> {
        let value = value.rehome(self.storage())?;
        *self = value;
        Ok(())
    }

    /// Replaces `self` with a copy of `other` on this value's storage.
    ///
    /// # Errors
    ///
    /// The resource's allocation error; `self` is unchanged on failure.
    pub fn assign_from(&mut self, other: &Value) -> Result<(), Error> {
        let value = other.try_clone_in(self.storage().clone())?;
        *self = value;
        Ok(())
    }

    /// Exchanges contents with `other`. Each value keeps its own storage;
    /// when the storages differ the contents are copied across.
    ///
    /// # Errors
    ///
    /// The allocation error of either resource. Both values are unchanged on
    /// failure.
    pub fn swap(&mut self, other: &mut Value) -> Result<(), Error> {
        if self.storage() == other.storage() {
            core::mem::swap(self, other);
            return Ok(());
        }
        let mine = other.try_clone_in(self.storage().clone())?;
        let theirs = self.try_clone_in(other.storage().clone())?;
        *self = mine;
        *other = theirs;
        Ok(())
    }

    /// Moves the value out, leaving a null on the same storage.
    pub fn take(&mut self) -> Value {
        let sp = self.storage().clone();
        core::mem::replace(self, Value::null_in(sp))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> From<&'a Value> for ValueRef<'a> {
    fn from(value: &'a Value) -> Self {
        value.view()
    }
}

impl<K: AsRef<[u8]> + ?Sized> Index<&K> for Value {
    type Output = Value;

    /// The member `key`, or a null when this is not an object or the key is
    /// absent.
    fn index(&self, key: &K) -> &Value {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    /// The element `index`, or a null when this is not an array or the index
    /// is past the end.
    fn index(&self, index: usize) -> &Value {
        self.as_array().and_then(|a| a.get(index)).unwrap_or(&NULL)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Inner::Null(_), Inner::Null(_)) => true,
            (Inner::Bool(a, _), Inner::Bool(b, _)) => a == b,
            (Inner::Int64(a, _), Inner::Int64(b, _)) => a == b,
            (Inner::Uint64(a, _), Inner::Uint64(b, _)) => a == b,
            (Inner::Int64(i, _), Inner::Uint64(u, _)) | (Inner::Uint64(u, _), Inner::Int64(i, _)) => {
                u64::try_from(*i).is_ok_and(|i| i == *u)
            }
            #[allow(clippy::float_cmp)]
            (Inner::Double(a, _), Inner::Double(b, _)) => a == b,
            (Inner::String(a), Inner::String(b)) => a == b,
            (Inner::Array(a), Inner::Array(b)) => a == b,
            (Inner::Object(a), Inner::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Inner::Null(_) => state.write_u8(0),
            Inner::Bool(b, _) => {
                state.write_u8(1);
                b.hash(state);
            }
            // non-negative signed integers hash like the equal unsigned ones
            Inner::Int64(v, _) => match u64::try_from(*v) {
                Ok(u) => {
                    state.write_u8(3);
                    state.write_u64(u);
                }
                Err(_) => {
                    state.write_u8(2);
                    state.write_i64(*v);
                }
            },
            Inner::Uint64(u, _) => {
                state.write_u8(3);
                state.write_u64(*u);
            }
            Inner::Double(d, _) => {
                state.write_u8(4);
                let d = if *d == 0.0 { 0.0 } else { *d };
                state.write_u64(d.to_bits());
            }
            Inner::String(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            Inner::Array(a) => {
                state.write_u8(6);
                a.hash(state);
            }
            Inner::Object(o) => {
                state.write_u8(7);
                o.hash(state);
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Null(_) => f.write_str("Null"),
            Inner::Bool(b, _) => f.debug_tuple("Bool").field(b).finish(),
            Inner::Int64(v, _) => f.debug_tuple("Int64").field(v).finish(),
            Inner::Uint64(v, _) => f.debug_tuple("Uint64").field(v).finish(),
            Inner::Double(v, _) => f.debug_tuple("Double").field(v).finish(),
            Inner::String(s) => f.debug_tuple("String").field(s).finish(),
            Inner::Array(a) => f.debug_tuple("Array").field(a).finish(),
            Inner::Object(o) => f.debug_tuple("Object").field(o).finish(),
        }
    }
}

/// Compact JSON. Invalid UTF-8 inside strings is replaced.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::serializer::to_string(self))
    }
}

// --- conversions ---------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::bool_in(b, StoragePtr::default())
    }
}

macro_rules! from_integer {
    ($variant:ident, $wide:ty: $($ty:ty),*) => {$(
        impl From<$ty> for Value {
            #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
            fn from(v: $ty) -> Self {
                Self(Inner::$variant(v as $wide, StoragePtr::default()))
            }
        }
    )*};
}

from_integer!(Int64, i64: i8, i16, i32, i64, isize);
from_integer!(Uint64, u64: u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::double_in(v, StoragePtr::default())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::double_in(f64::from(v), StoragePtr::default())
    }
}

/// # Panics
///
/// When the default heap cannot allocate.
impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string_in(s, StoragePtr::default())
            .unwrap_or_else(|err| panic!("cannot allocate string: {err}"))
    }
}

/// # Panics
///
/// When the default heap cannot allocate.
impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<JsonString> for Value {
    fn from(s: JsonString) -> Self {
        Self(Inner::String(s))
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Self(Inner::Array(a))
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self(Inner::Object(o))
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use rstest::rstest;

    use super::{Value, ValueMut, ValueRef};
    use crate::{Array, Error, Kind, MonotonicResource, Object, StoragePtr};

    fn hash(v: &Value) -> u64 {
        ahash::RandomState::with_seeds(1, 2, 3, 4).hash_one(v)
    }

    #[rstest]
    #[case(Value::new(), Kind::Null)]
    #[case(Value::from(false), Kind::Bool)]
    #[case(Value::from(-1), Kind::Int64)]
    #[case(Value::from(1u8), Kind::Uint64)]
    #[case(Value::from(0.5), Kind::Double)]
    #[case(Value::from(""), Kind::String)]
    #[case(Value::from(Array::new()), Kind::Array)]
    #[case(Value::from(Object::new()), Kind::Object)]
    fn kinds(#[case] v: Value, #[case] kind: Kind) {
        assert_eq!(v.kind(), kind);
        assert_eq!(Value::from_kind_in(kind, StoragePtr::default()).kind(), kind);
        assert_eq!(v.is_structured(), matches!(kind, Kind::Array | Kind::Object));
        assert_eq!(v.is_number(), matches!(kind, Kind::Int64 | Kind::Uint64 | Kind::Double));
    }

    #[test]
    fn integers_compare_across_signedness() {
        assert_eq!(Value::from(5), Value::from(5u64));
        assert_eq!(hash(&Value::from(5)), hash(&Value::from(5u64)));
        assert_ne!(Value::from(-1), Value::from(u64::MAX));
        assert_ne!(Value::from(5), Value::from(5.0));
        assert_eq!(hash(&Value::from(0.0)), hash(&Value::from(-0.0)));
    }

    #[rstest]
    #[case(Value::from(1.5), Err(Error::NotExact), Err(Error::NotExact))]
    #[case(Value::from(2.0), Ok(2), Ok(2))]
    #[case(Value::from(-4.0), Ok(-4), Err(Error::NotExact))]
    #[case(Value::from(300), Err(Error::NotExact), Err(Error::NotExact))]
    #[case(Value::from(true), Err(Error::NotNumber), Err(Error::NotNumber))]
    fn to_number(
        #[case] v: Value,
        #[case] as_i8: Result<i8, Error>,
        #[case] as_u8: Result<u8, Error>,
    ) {
        assert_eq!(v.to_number::<i8>(), as_i8);
        assert_eq!(v.to_number::<u8>(), as_u8);
    }

    #[test]
    fn emplace_keeps_storage() {
        let sp = StoragePtr::new(MonotonicResource::new());
        let mut v = Value::int64_in(1, sp.clone());
        v.emplace_string().append(b"a string that does not fit inline").unwrap();
        assert_eq!(v.storage(), &sp);
        assert_eq!(v.as_string().unwrap().storage(), &sp);
        *v.emplace_double() = 2.5;
        assert_eq!(v, Value::from(2.5));
        v.emplace_object().insert("k", Value::from(1)).unwrap();
        assert_eq!(v["k"].storage(), &sp);
        v.emplace_null();
        assert!(v.is_null());
        assert_eq!(v.storage(), &sp);
    }

    #[test]
    fn lookups() {
        let mut v = Value::new();
        v.emplace_object().insert("a", Value::from(Array::from_iter([Value::from(1)]))).unwrap();
        assert_eq!(v["a"][0], Value::from(1));
        assert!(v["a"][9].is_null());
        assert!(v["missing"]["deeper"].is_null());
        assert_eq!(v.at_key("missing"), Err(Error::OutOfRange));
        assert_eq!(v.at_index(0), Err(Error::KindMismatch));
        assert_eq!(v.at_key("a").unwrap().at_index(0).unwrap(), &Value::from(1));
        if let ValueMut::Int64(n) = v.at_key_mut("a").unwrap().at_index_mut(0).unwrap().view_mut() {
            *n += 1;
        }
        assert_eq!(v["a"][0].view(), ValueRef::Int64(2));
    }

    #[test]
    fn swap_across_storages_copies() {
        let sp = StoragePtr::new(MonotonicResource::new());
        let mut a = Value::string_in("left side, long enough to allocate", sp.clone()).unwrap();
        let mut b = Value::from(7);
        a.swap(&mut b).unwrap();
        assert_eq!(a, Value::from(7));
        assert_eq!(a.storage(), &sp);
        assert_eq!(b.as_str(), Some("left side, long enough to allocate"));
        assert!(b.storage().is_default());
    }

    #[test]
    fn assign_copies_onto_own_storage() {
        let sp = StoragePtr::new(MonotonicResource::new());
        let mut v = Value::null_in(sp.clone());
        let source = Value::from(Array::from_iter([Value::from("x")]));
        v.assign_from(&source).unwrap();
        assert_eq!(v, source);
        assert_eq!(v[0].storage(), &sp);
        v.assign(Value::from(3u8)).unwrap();
        assert_eq!(v.storage(), &sp);
        let taken = v.take();
        assert_eq!(taken, Value::from(3));
        assert!(v.is_null());
        assert_eq!(v.storage(), &sp);
    }

    #[test]
    fn debug_is_structural() {
        let mut v = Value::new();
        let mut obj = v.emplace_object();
        obj.insert("k", Value::from(1)).unwrap();
        obj.insert("s", Value::from("x")).unwrap();
        assert_eq!(format!("{v:?}"), r#"Object({"k": Int64(1), "s": String("x")})"#);
    }

    #[test]
    fn into_container_gives_back_other_kinds() {
        let v = Value::from(1);
        let v = v.into_array().unwrap_err();
        assert_eq!(v.into_object().unwrap_err(), Value::from(1));
        assert!(Value::from("s").into_string().is_ok());
    }
}
