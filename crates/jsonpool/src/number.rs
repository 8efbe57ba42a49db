//! Checked conversion of numeric values to Rust number types.

use crate::Error;

mod sealed {
    pub trait Sealed {}
}

/// A Rust number type that a JSON number can convert into.
///
/// Implemented for every primitive integer and float type. Used by
/// [`Value::to_number`](crate::Value::to_number).
pub trait Numeric: sealed::Sealed + Sized {
    #[doc(hidden)]
    fn from_i64(v: i64) -> Result<Self, Error>;
    #[doc(hidden)]
    fn from_u64(v: u64) -> Result<Self, Error>;
    #[doc(hidden)]
    fn from_f64(v: f64) -> Result<Self, Error>;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {$(
        impl sealed::Sealed for $ty {}

        impl Numeric for $ty {
            fn from_i64(v: i64) -> Result<Self, Error> {
                <$ty>::try_from(v).map_err(|_| Error::NotExact)
            }

            fn from_u64(v: u64) -> Result<Self, Error> {
                <$ty>::try_from(v).map_err(|_| Error::NotExact)
            }

            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            fn from_f64(v: f64) -> Result<Self, Error> {
                // `MAX as f64` may round up, so the upper bound is exclusive.
                let in_range = v >= <$ty>::MIN as f64 && v < <$ty>::MAX as f64 + 1.0;
                if in_range && v.fract() == 0.0 {
                    Ok(v as $ty)
                } else {
                    Err(Error::NotExact)
                }
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl sealed::Sealed for f64 {}

#[allow(clippy::cast_precision_loss)]
impl Numeric for f64 {
    fn from_i64(v: i64) -> Result<Self, Error> {
        Ok(v as f64)
    }

    fn from_u64(v: u64) -> Result<Self, Error> {
        Ok(v as f64)
    }

    fn from_f64(v: f64) -> Result<Self, Error> {
        Ok(v)
    }
}

impl sealed::Sealed for f32 {}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
impl Numeric for f32 {
    fn from_i64(v: i64) -> Result<Self, Error> {
        Ok(v as f32)
    }

    fn from_u64(v: u64) -> Result<Self, Error> {
        Ok(v as f32)
    }

    fn from_f64(v: f64) -> Result<Self, Error> {
        Ok(v as f32)
    }
}
