//! Number formatting into fixed stack buffers.

use core::fmt::{self, Write};

/// Longest text any formatter here produces (`-1.7976931348623157e308` is 23).
pub(crate) const MAX_NUMBER_LEN: usize = 32;

/// The formatted text of one number.
#[derive(Clone, Copy)]
pub(crate) struct NumberBuf {
    bytes: [u8; MAX_NUMBER_LEN],
    len: usize,
}

impl NumberBuf {
    const fn empty() -> Self {
        Self {
            bytes: [0; MAX_NUMBER_LEN],
            len: 0,
        }
    }

    fn from_static(text: &[u8]) -> Self {
        let mut out = Self::empty();
        out.bytes[..text.len()].copy_from_slice(text);
        out.len = text.len();
        out
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Write for NumberBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        let dest = self.bytes.get_mut(self.len..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Exact decimal digits of `v`.
pub(crate) fn format_uint64(mut v: u64) -> NumberBuf {
    let mut digits = [0u8; 20];
    let mut start = digits.len();
    loop {
        start -= 1;
        #[allow(clippy::cast_possible_truncation)]
        {
            digits[start] = b'0' + (v % 10) as u8;
        }
        v /= 10;
        if v == 0 {
            break;
        }
    }
    NumberBuf::from_static(&digits[start..])
}

pub(crate) fn format_int64(v: i64) -> NumberBuf {
    let magnitude = format_uint64(v.unsigned_abs());
    if v >= 0 {
        return magnitude;
    }
    let mut out = NumberBuf::from_static(b"-");
    let digits = magnitude.as_bytes();
    out.bytes[1..=digits.len()].copy_from_slice(digits);
    out.len += digits.len();
    out
}

/// Shortest text that parses back to `v`, always with an exponent so that it
/// re-parses as a double. Infinities overflow on purpose; NaN has no JSON
/// spelling and becomes `null`.
pub(crate) fn format_double(v: f64) -> NumberBuf {
    if v.is_nan() {
        return NumberBuf::from_static(b"null");
    }
    if v.is_infinite() {
        return NumberBuf::from_static(if v > 0.0 { b"1e99999" } else { b"-1e99999" });
    }
    let mut out = NumberBuf::empty();
    if write!(out, "{v:e}").is_err() {
        // cannot happen: the buffer holds the longest finite double
        return NumberBuf::from_static(b"null");
    }
    out
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::{format_double, format_int64, format_uint64};

    #[quickcheck]
    fn integers_match_display(v: i64, u: u64) -> bool {
        format_int64(v).as_bytes() == v.to_string().as_bytes()
            && format_uint64(u).as_bytes() == u.to_string().as_bytes()
    }

    #[rstest]
    #[case(0, "0")]
    #[case(7, "7")]
    #[case(-1, "-1")]
    #[case(i64::MAX, "9223372036854775807")]
    #[case(i64::MIN, "-9223372036854775808")]
    fn signed(#[case] v: i64, #[case] expected: &str) {
        assert_eq!(format_int64(v).as_bytes(), expected.as_bytes());
    }

    #[test]
    fn unsigned_max() {
        assert_eq!(format_uint64(u64::MAX).as_bytes(), b"18446744073709551615");
    }

    #[rstest]
    #[case(1.5, "1.5e0")]
    #[case(100.0, "1e2")]
    #[case(0.0, "0e0")]
    #[case(-0.0, "-0e0")]
    #[case(f64::MAX, "1.7976931348623157e308")]
    #[case(-f64::MIN_POSITIVE, "-2.2250738585072014e-308")]
    #[case(f64::INFINITY, "1e99999")]
    #[case(f64::NEG_INFINITY, "-1e99999")]
    #[case(f64::NAN, "null")]
    fn doubles(#[case] v: f64, #[case] expected: &str) {
        assert_eq!(format_double(v).as_bytes(), expected.as_bytes());
    }

    #[test]
    fn doubles_round_trip() {
        for v in [0.1, 1.0 / 3.0, 5e-324, 123_456_789.123, -2.5e-7] {
            let text = format_double(v);
            let back: f64 = core::str::from_utf8(text.as_bytes()).unwrap().parse().unwrap();
            assert_eq!(back.to_bits(), v.to_bits());
        }
    }
}
