use crate::Error;

/// Incremental UTF-8 validation, one byte at a time.
///
/// Follows the well-formed byte sequence table of the Unicode standard, so
/// overlong forms, encoded surrogates and code points above U+10FFFF are
/// rejected. A sequence may be split across input chunks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Utf8Validator {
    need: u8,
    lo: u8,
    hi: u8,
}

impl Default for Utf8Validator {
    fn default() -> Self {
        Self {
            need: 0,
            lo: 0x80,
            hi: 0xbf,
        }
    }
}

impl Utf8Validator {
    /// `true` between code points.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.need == 0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn feed(&mut self, b: u8) -> Result<(), Error> {
        if self.need != 0 {
            if b < self.lo || b > self.hi {
                return Err(Error::Syntax);
            }
            self.need -= 1;
            self.lo = 0x80;
            self.hi = 0xbf;
            return Ok(());
        }
        let (need, lo, hi) = match b {
            0x00..=0x7f => return Ok(()),
            0xc2..=0xdf => (1, 0x80, 0xbf),
            0xe0 => (2, 0xa0, 0xbf),
            0xe1..=0xec | 0xee..=0xef => (2, 0x80, 0xbf),
            0xed => (2, 0x80, 0x9f),
            0xf0 => (3, 0x90, 0xbf),
            0xf1..=0xf3 => (3, 0x80, 0xbf),
            0xf4 => (3, 0x80, 0x8f),
            _ => return Err(Error::Syntax),
        };
        *self = Self { need, lo, hi };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Utf8Validator;

    fn validate(chunks: &[&[u8]]) -> bool {
        let mut v = Utf8Validator::default();
        chunks
            .iter()
            .flat_map(|c| c.iter())
            .all(|&b| v.feed(b).is_ok())
            && v.is_idle()
    }

    #[rstest]
    #[case::ascii(&[&b"plain"[..]], true)]
    #[case::split_four_byte(&[&b"\xf0\x9f"[..], &b"\x98\x80"[..]], true)]
    #[case::overlong(&[&b"\xc0\xaf"[..]], false)]
    #[case::encoded_surrogate(&[&b"\xed\xa0\x80"[..]], false)]
    #[case::above_max(&[&b"\xf4\x90\x80\x80"[..]], false)]
    #[case::truncated(&[&b"\xe2\x82"[..]], false)]
    #[case::stray_continuation(&[&b"\x80"[..]], false)]
    fn sequences(#[case] chunks: &[&[u8]], #[case] valid: bool) {
        assert_eq!(validate(chunks), valid);
    }
}
