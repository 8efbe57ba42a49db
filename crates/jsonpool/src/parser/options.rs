/// Configuration options for the push parser.
///
/// The defaults accept strict RFC 8259 JSON nested at most 32 levels deep.
/// Each `allow_*` flag enables one extension.
///
/// # Default
///
/// `max_depth` is 32, every flag is `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of nested arrays and objects.
    ///
    /// Opening a container at this depth fails with
    /// [`Error::TooDeep`](crate::Error::TooDeep). Zero rejects every
    /// container.
    ///
    /// # Default
    ///
    /// `32`
    pub max_depth: usize,

    /// Whether `// line` and `/* block */` comments are accepted wherever
    /// whitespace is.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_comments: bool,

    /// Whether a comma may follow the last element of an array or the last
    /// member of an object.
    ///
    /// # Examples
    ///
    /// ```json
    /// [1, 2, 3,]
    /// ```
    ///
    /// ```json
    /// {"a": 1,}
    /// ```
    ///
    /// # Default
    ///
    /// `false`
    pub allow_trailing_commas: bool,

    /// Whether string contents may contain byte sequences that are not valid
    /// UTF-8. Escape sequences are still checked.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_invalid_utf8: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            allow_comments: false,
            allow_trailing_commas: false,
            allow_invalid_utf8: false,
        }
    }
}
