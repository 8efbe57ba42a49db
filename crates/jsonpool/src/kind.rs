use core::fmt;

/// The dynamic type of a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// `null`.
    Null,
    /// `true` or `false`.
    Bool,
    /// A signed 64-bit integer.
    Int64,
    /// An unsigned 64-bit integer above `i64::MAX`, or one built explicitly.
    Uint64,
    /// A binary64 floating-point number.
    Double,
    /// A [`JsonString`](crate::JsonString).
    String,
    /// An [`Array`](crate::Array).
    Array,
    /// An [`Object`](crate::Object).
    Object,
}

impl Kind {
    /// The lowercase name used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int64 => "int64",
            Kind::Uint64 => "uint64",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
