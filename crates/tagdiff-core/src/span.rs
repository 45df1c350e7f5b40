#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(SpanError::Inverted { start, end })
        }
    }

    pub fn empty_at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slices `source` with this span, checking bounds and UTF-8 boundaries.
    pub fn slice<'a>(&self, source: &'a str) -> Result<&'a str, SpanError> {
        if self.start > self.end {
            return Err(SpanError::Inverted {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > source.len() {
            return Err(SpanError::OutOfBounds {
                end: self.end,
                len: source.len(),
            });
        }
        source.get(self.start..self.end).ok_or(SpanError::NotCharBoundary {
            start: self.start,
            end: self.end,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpanError {
    Inverted { start: usize, end: usize },
    OutOfBounds { end: usize, len: usize },
    NotCharBoundary { start: usize, end: usize },
}

impl std::fmt::Display for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanError::Inverted { start, end } => {
                write!(f, "span start {} is after end {}", start, end)
            }
            SpanError::OutOfBounds { end, len } => {
                write!(f, "span end {} exceeds source length {}", end, len)
            }
            SpanError::NotCharBoundary { start, end } => {
                write!(f, "span {}..{} is not on a character boundary", start, end)
            }
        }
    }
}
