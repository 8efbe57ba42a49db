//! Matching `null`, `true` and `false` one byte at a time, so that a literal
//! may straddle any number of input pieces.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Literal {
    Null,
    True,
    False,
}

impl Literal {
    const fn spelling(self) -> &'static [u8] {
        match self {
            Literal::Null => b"null",
            Literal::True => b"true",
            Literal::False => b"false",
        }
    }
}

/// Outcome of feeding one byte.
pub(crate) enum Step {
    NeedMore,
    Done(Literal),
    Reject,
}

/// A literal whose first `matched` bytes have been seen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct PartialLiteral {
    literal: Option<Literal>,
    matched: u8,
}

impl PartialLiteral {
    pub(crate) const fn none() -> Self {
        Self {
            literal: None,
            matched: 0,
        }
    }

    /// Starts a literal from its first byte; any other byte gives an idle
    /// matcher that rejects everything.
    pub(crate) const fn new(first: u8) -> Self {
        let literal = match first {
            b'n' => Some(Literal::Null),
            b't' => Some(Literal::True),
            b'f' => Some(Literal::False),
            _ => None,
        };
        Self {
            literal,
            matched: 1,
        }
    }

    pub(crate) fn step(&mut self, b: u8) -> Step {
        let Some(literal) = self.literal else {
            return Step::Reject;
        };
        let spelling = literal.spelling();
        if spelling.get(usize::from(self.matched)) != Some(&b) {
            return Step::Reject;
        }
        self.matched += 1;
        if usize::from(self.matched) == spelling.len() {
            *self = Self::none();
            Step::Done(literal)
        } else {
            Step::NeedMore
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Literal, PartialLiteral, Step};

    fn run(text: &[u8]) -> Option<Literal> {
        let (&first, rest) = text.split_first()?;
        let mut m = PartialLiteral::new(first);
        for &b in rest {
            match m.step(b) {
                Step::NeedMore => {}
                Step::Done(lit) => return Some(lit),
                Step::Reject => return None,
            }
        }
        None
    }

    #[rstest]
    #[case(b"null", Some(Literal::Null))]
    #[case(b"true", Some(Literal::True))]
    #[case(b"false", Some(Literal::False))]
    #[case(b"nul", None)]
    #[case(b"tru3", None)]
    #[case(b"fals", None)]
    #[case(b"xull", None)]
    fn literals(#[case] text: &[u8], #[case] expected: Option<Literal>) {
        assert_eq!(run(text), expected);
    }

    #[test]
    fn idle_matcher_rejects() {
        assert!(matches!(PartialLiteral::none().step(b'u'), Step::Reject));
    }

    #[test]
    fn a_rejected_byte_leaves_the_match_in_place() {
        let mut m = PartialLiteral::new(b't');
        assert!(matches!(m.step(b'x'), Step::Reject));
        assert!(matches!(m.step(b'r'), Step::NeedMore));
    }
}
