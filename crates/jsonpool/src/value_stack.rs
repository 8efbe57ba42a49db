//! Bottom-up construction of a [`Value`] tree.

use alloc::vec::Vec;

use crate::{Array, Error, JsonString, Object, StoragePtr, Value};

/// A stack of finished values from which containers are assembled.
///
/// Scalars and strings are pushed as they are recognised; a container is
/// built when it closes by popping its elements (or key/value pairs) off the
/// top of the stack. The finished tree never needs recursion to build.
///
/// Every value is created on the stack's [`StoragePtr`]. The stack itself and
/// the partial-string buffer use the global heap and are reused across
/// [`reset`](Self::reset)s.
///
/// ```
/// use jsonpool::{StoragePtr, Value, ValueStack};
///
/// let mut st = ValueStack::new(StoragePtr::default());
/// st.push_key(b"a").unwrap();
/// st.push_int64(1);
/// st.push_object(1).unwrap();
/// let v = st.release().unwrap();
/// assert_eq!(v["a"], Value::from(1));
/// ```
#[derive(Debug, Default)]
pub struct ValueStack {
    sp: StoragePtr,
    stack: Vec<Value>,
    chars: Vec<u8>,
}

impl ValueStack {
    /// An empty stack building values on `sp`.
    #[must_use]
    pub fn new(sp: StoragePtr) -> Self {
        Self {
            sp,
            stack: Vec::new(),
            chars: Vec::new(),
        }
    }

    /// Drops everything pushed so far and builds future values on `sp`.
    pub fn reset(&mut self, sp: StoragePtr) {
        self.stack.clear();
        self.chars.clear();
        self.sp = sp;
    }

    /// The resource values are built on.
    #[must_use]
    pub fn storage(&self) -> &StoragePtr {
        &self.sp
    }

    /// Number of values on the stack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// `true` when nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Replaces the top `len` values with an array holding them in order.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when fewer than `len` values are on the stack,
    /// or the resource's allocation error. The stack is unchanged on failure.
    pub fn push_array(&mut self, len: usize) -> Result<(), Error> {
        let start = self.stack.len().checked_sub(len).ok_or(Error::OutOfRange)?;
        let mut arr = Array::with_capacity_in(len, self.sp.clone())?;
        for value in self.stack.drain(start..) {
            // cannot fail: capacity is reserved and the value is on `sp`
            arr.push(value)?;
        }
        self.stack.push(Value::from(arr));
        Ok(())
    }

    /// Replaces the top `len` key/value pairs with an object. When a key
    /// repeats, the member stays where it first appeared and takes the last
    /// value.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when fewer than `2 * len` values are on the
    /// stack, [`Error::KindMismatch`] when a key slot does not hold a string,
    /// or the resource's allocation error. The stack is unchanged on failure.
    pub fn push_object(&mut self, len: usize) -> Result<(), Error> {
        let start = len
            .checked_mul(2)
            .and_then(|n| self.stack.len().checked_sub(n))
            .ok_or(Error::OutOfRange)?;
        if !self.stack[start..].iter().step_by(2).all(Value::is_string) {
            return Err(Error::KindMismatch);
        }
        let mut obj = Object::with_capacity_in(len, self.sp.clone())?;
        let mut drained = self.stack.drain(start..);
        let pairs = core::iter::from_fn(|| {
            let key = drained.next()?.into_string().ok()?;
            Some((key, drained.next()?))
        });
        // cannot fail: capacity is reserved and every part is on `sp`
        obj.extend_last_wins(pairs)?;
        drop(drained);
        self.stack.push(Value::from(obj));
        Ok(())
    }

    /// Appends part of a key or string that continues in a later push.
    pub fn push_chars(&mut self, part: &[u8]) {
        self.chars.extend_from_slice(part);
    }

    /// Pushes a key made of the pending chars followed by `part`.
    ///
    /// # Errors
    ///
    /// [`Error::LengthError`] for an oversized key, or the resource's
    /// allocation error.
    pub fn push_key(&mut self, part: &[u8]) -> Result<(), Error> {
        self.push_text(part)
    }

    /// Pushes a string made of the pending chars followed by `part`.
    ///
    /// # Errors
    ///
    /// As for [`push_key`](Self::push_key).
    pub fn push_string(&mut self, part: &[u8]) -> Result<(), Error> {
        self.push_text(part)
    }

    fn push_text(&mut self, part: &[u8]) -> Result<(), Error> {
        let len = self.chars.len() + part.len();
        let mut s = JsonString::with_capacity_in(len, self.sp.clone())?;
        s.append(&self.chars)?;
        s.append(part)?;
        self.chars.clear();
        self.stack.push(Value::from(s));
        Ok(())
    }

    /// Pushes a signed integer.
    pub fn push_int64(&mut self, v: i64) {
        self.stack.push(Value::int64_in(v, self.sp.clone()));
    }

    /// Pushes an unsigned integer.
    pub fn push_uint64(&mut self, v: u64) {
        self.stack.push(Value::uint64_in(v, self.sp.clone()));
    }

    /// Pushes a double.
    pub fn push_double(&mut self, v: f64) {
        self.stack.push(Value::double_in(v, self.sp.clone()));
    }

    /// Pushes a boolean.
    pub fn push_bool(&mut self, b: bool) {
        self.stack.push(Value::bool_in(b, self.sp.clone()));
    }

    /// Pushes a null.
    pub fn push_null(&mut self) {
        self.stack.push(Value::null_in(self.sp.clone()));
    }

    /// Takes the single finished value, leaving the stack empty.
    ///
    /// # Errors
    ///
    /// [`Error::Incomplete`] unless exactly one value is on the stack.
    pub fn release(&mut self) -> Result<Value, Error> {
        if self.stack.len() != 1 {
            return Err(Error::Incomplete);
        }
        self.chars.clear();
        self.stack.pop().ok_or(Error::Incomplete)
    }
}
