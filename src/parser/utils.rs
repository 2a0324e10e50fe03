use std::fmt;

use serde::Serialize;

/// A zero-based cursor into the input source, tracked as byte index plus
/// line and column.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SourcePosition {
    index: usize,
    line: usize,
    col: usize,
}

/// Half-open character range in the input source: `start` is the first
/// character of the item, `end` points just past it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl Span {
    #[doc(hidden)]
    pub fn zero_width(pos: SourcePosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    #[doc(hidden)]
    pub fn single_width(pos: SourcePosition) -> Self {
        let mut end = pos;
        end.advance_col();
        Self { start: pos, end }
    }

    #[doc(hidden)]
    pub fn unlocated() -> Self {
        Self::zero_width(SourcePosition::new_origin())
    }
}

/// An item tagged with the [`Span`] of source text it was parsed from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Spanning<T, Sp = Span> {
    /// Wrapped item.
    pub item: T,

    /// [`Span`] of the wrapped item.
    pub span: Sp,
}

impl<T> Spanning<T> {
    pub(crate) fn new(span: Span, item: T) -> Self {
        Self { item, span }
    }

    #[doc(hidden)]
    pub fn zero_width(pos: &SourcePosition, item: T) -> Self {
        Self::new(Span::zero_width(*pos), item)
    }

    #[doc(hidden)]
    pub fn single_width(pos: &SourcePosition, item: T) -> Self {
        Self::new(Span::single_width(*pos), item)
    }

    #[doc(hidden)]
    pub fn start_end(start: &SourcePosition, end: &SourcePosition, item: T) -> Self {
        Self::new(
            Span {
                start: *start,
                end: *end,
            },
            item,
        )
    }

    /// Wraps a non-empty list in the span from its first to its last item.
    #[doc(hidden)]
    pub fn spanning(v: Vec<Spanning<T>>) -> Option<Spanning<Vec<Spanning<T>>>> {
        match (v.first(), v.last()) {
            (Some(first), Some(last)) => {
                let span = Span {
                    start: first.span.start,
                    end: last.span.end,
                };
                Some(Spanning::new(span, v))
            }
            _ => None,
        }
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self::new(Span::unlocated(), item)
    }

    /// Returns start position of the wrapped item.
    pub fn start(&self) -> SourcePosition {
        self.span.start
    }

    /// Returns end position of the wrapped item.
    pub fn end(&self) -> SourcePosition {
        self.span.end
    }

    /// Maps the wrapped item, keeping the span.
    pub fn map<O, F: FnOnce(T) -> O>(self, f: F) -> Spanning<O> {
        Spanning::new(self.span, f(self.item))
    }
}

impl<T: fmt::Display> fmt::Display for Spanning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.item, self.span.start)
    }
}

impl<T: std::error::Error> std::error::Error for Spanning<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.item.source()
    }
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(index: usize, line: usize, col: usize) -> Self {
        assert!(index >= line + col);
        Self { index, line, col }
    }

    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self {
            index: 0,
            line: 0,
            col: 0,
        }
    }

    #[doc(hidden)]
    pub fn advance_col(&mut self) {
        self.index += 1;
        self.col += 1;
    }

    #[doc(hidden)]
    pub fn advance_line(&mut self) {
        self.index += 1;
        self.line += 1;
        self.col = 0;
    }

    /// Zero-based byte index into the input source.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Zero-based line number. Wire formats add one before reporting.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Zero-based column number. Wire formats add one before reporting.
    pub fn column(&self) -> usize {
        self.col
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
