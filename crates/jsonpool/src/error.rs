use thiserror::Error;

/// Every failure reported by this crate.
///
/// Parse failures, numeric conversion failures and container failures share
/// one closed enumeration so that a handler can inject any of them into the
/// parser, and so that the value-building layers can forward allocation
/// failures unchanged. Use [`Error::condition`] to ask which family an error
/// belongs to.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    // --- parse_error ---------------------------------------------------
    /// The input is not valid JSON.
    #[error("syntax error")]
    Syntax,
    /// Bytes remain after the end of the document.
    #[error("extra data")]
    ExtraData,
    /// The input ended before the document was complete.
    #[error("incomplete JSON")]
    Incomplete,
    /// The exponent of a number does not fit in 32 bits.
    #[error("exponent overflow")]
    ExponentOverflow,
    /// Containers are nested deeper than the configured maximum.
    #[error("too deep")]
    TooDeep,
    /// A low surrogate appeared where a high surrogate was expected.
    #[error("illegal leading surrogate")]
    IllegalLeadingSurrogate,
    /// A high surrogate was followed by something other than a low surrogate.
    #[error("illegal trailing surrogate")]
    IllegalTrailingSurrogate,
    /// A `\u` escape contained a byte that is not a hexadecimal digit.
    #[error("expected hex digit")]
    ExpectedHexDigit,
    /// A high surrogate was not followed by a `\u` escape.
    #[error("expected utf16 escape")]
    ExpectedUtf16Escape,
    /// An object has more members than the handler accepts.
    #[error("object too large")]
    ObjectTooLarge,
    /// An array has more elements than the handler accepts.
    #[error("array too large")]
    ArrayTooLarge,
    /// A key is longer than the handler accepts.
    #[error("key too large")]
    KeyTooLarge,
    /// A string is longer than the handler accepts.
    #[error("string too large")]
    StringTooLarge,
    /// A handler reported a failure of its own.
    #[error("got exception")]
    Exception,

    // --- assign_error --------------------------------------------------
    /// The value is not a number.
    #[error("not a number")]
    NotNumber,
    /// The number cannot be represented exactly by the requested type.
    #[error("not exact")]
    NotExact,

    // --- container -----------------------------------------------------
    /// The memory resource could not satisfy an allocation.
    #[error("allocation failed")]
    BadAlloc,
    /// A size would exceed the container's `max_size()`.
    #[error("length error")]
    LengthError,
    /// A position or key does not exist in the container.
    #[error("out of range")]
    OutOfRange,
    /// The value does not hold the requested kind.
    #[error("value has the wrong kind")]
    KindMismatch,

    /// Sentinel used to inject failures in tests.
    #[doc(hidden)]
    #[error("test failure")]
    TestFailure,
}

/// Family an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// The input could not be parsed.
    ParseError,
    /// A numeric conversion was not possible.
    AssignError,
    /// A container or memory resource operation failed.
    ContainerError,
    /// A failure injected by a test.
    TestFailure,
}

impl Error {
    /// Returns the family this error belongs to.
    #[must_use]
    pub fn condition(self) -> Condition {
        match self {
            Error::Syntax
            | Error::ExtraData
            | Error::Incomplete
            | Error::ExponentOverflow
            | Error::TooDeep
            | Error::IllegalLeadingSurrogate
            | Error::IllegalTrailingSurrogate
            | Error::ExpectedHexDigit
            | Error::ExpectedUtf16Escape
            | Error::ObjectTooLarge
            | Error::ArrayTooLarge
            | Error::KeyTooLarge
            | Error::StringTooLarge
            | Error::Exception => Condition::ParseError,
            Error::NotNumber | Error::NotExact => Condition::AssignError,
            Error::BadAlloc | Error::LengthError | Error::OutOfRange | Error::KindMismatch => {
                Condition::ContainerError
            }
            Error::TestFailure => Condition::TestFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use rstest::rstest;

    use super::{Condition, Error};

    #[rstest]
    #[case(Error::Syntax, Condition::ParseError)]
    #[case(Error::Exception, Condition::ParseError)]
    #[case(Error::StringTooLarge, Condition::ParseError)]
    #[case(Error::NotNumber, Condition::AssignError)]
    #[case(Error::NotExact, Condition::AssignError)]
    #[case(Error::BadAlloc, Condition::ContainerError)]
    #[case(Error::TestFailure, Condition::TestFailure)]
    fn conditions(#[case] err: Error, #[case] expected: Condition) {
        assert_eq!(err.condition(), expected);
    }

    #[test]
    fn messages() {
        assert_eq!(Error::TooDeep.to_string(), "too deep");
        assert_eq!(Error::ExtraData.to_string(), "extra data");
    }
}
