use std::fmt::Formatter;

mod char_stream;
pub use char_stream::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub struct Line(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub struct Col(pub usize);

/// A saved read position. Handed out by [`CharSource::mark`] and accepted back by
/// [`CharSource::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    offset: usize,
    line: Line,
    col: Col,
}

impl Mark {
    fn start() -> Self {
        Self { offset: 0, line: Line(1), col: Col(1) }
    }

    fn advance(&mut self, c: char, width: usize) {
        self.offset += width;
        if c == '\n' {
            self.line.0 += 1;
            self.col = Col(1);
        } else {
            self.col.0 += 1;
        }
    }

    pub fn line(&self) -> Line {
        self.line
    }

    pub fn col(&self) -> Col {
        self.col
    }
}

/// Anything the tokenizer can pull characters from.
///
/// Besides plain reading, a source must support one level of backtracking:
/// `mark()` remembers the current position and `reset()` rewinds to it. Sources
/// are only required to honour the most recent mark.
pub trait CharSource {
    fn next_char(&mut self) -> Option<char>;

    fn peek(&mut self) -> Option<char>;

    fn peek_next(&mut self) -> Option<char>;

    fn mark(&mut self) -> Mark;

    fn reset(&mut self, mark: Mark);

    fn line(&self) -> Line;

    fn col(&self) -> Col;
}

#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: Mark,
}

impl<'a> std::fmt::Debug for Cursor<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // `{:#?}` adds the source text
        if f.alternate() {
            f.debug_struct("Cursor")
                .field("line", &self.pos.line)
                .field("col", &self.pos.col)
                .field("source", &self.source)
                .finish()
        } else {
            f.debug_struct("Cursor").field("line", &self.pos.line).field("col", &self.pos.col).finish()
        }
    }
}

impl<'a> PartialEq for Cursor<'a> {
    fn eq(&self, other: &Self) -> bool {
        (self.source, self.pos.offset) == (other.source, other.pos.offset)
    }
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: Mark::start() }
    }

    /// The part of the source that has not been read yet.
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos.offset == self.source.len()
    }
}

impl<'a> From<&'a str> for Cursor<'a> {
    fn from(source: &'a str) -> Self {
        Self::new(source)
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_char()
    }
}

impl<'a> CharSource for Cursor<'a> {
    fn next_char(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.pos.advance(c, c.len_utf8());
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_next(&mut self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn mark(&mut self) -> Mark {
        self.pos
    }

    fn reset(&mut self, mark: Mark) {
        assert!(mark.offset <= self.source.len());
        self.pos = mark;
    }

    fn line(&self) -> Line {
        self.pos.line
    }

    fn col(&self) -> Col {
        self.pos.col
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mark_and_reset() {
        let mut cursor: Cursor = "ab\ncd\n\n".into();

        cursor.next(); // 'a'

        let mark = cursor.mark();

        cursor.next(); // 'b'
        cursor.next(); // '\n'
        cursor.next(); // 'c'
        assert_eq!(cursor.rest(), "d\n\n");

        cursor.reset(mark);
        assert_eq!(cursor.rest(), "b\ncd\n\n");
        assert_eq!((cursor.line(), cursor.col()), (Line(1), Col(2)));
    }

    #[test]
    fn test_next_and_position() {
        let source = "ab\ncd\n\n";
        let mut cursor = Cursor::new(source);

        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_next(), Some('b'));
        assert_eq!(cursor.next(), Some('a'));

        assert_eq!((cursor.line(), cursor.col()), (Line(1), Col(2)));

        assert_eq!(cursor.next(), Some('b'));
        assert_eq!((cursor.line(), cursor.col()), (Line(1), Col(3)));

        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!((cursor.line(), cursor.col()), (Line(2), Col(1)));

        cursor.next(); // 'c'
        cursor.next(); // 'd'

        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!((cursor.line(), cursor.col()), (Line(3), Col(1)));

        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!((cursor.line(), cursor.col()), (Line(4), Col(1)));

        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.next(), None);
        assert!(cursor.is_at_end());
        assert_eq!((cursor.line(), cursor.col()), (Line(4), Col(1)));

        cursor = "".into();
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.peek_next(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!((cursor.line(), cursor.col()), (Line(1), Col(1)));

        cursor = "\n".into();
        assert_eq!(cursor.peek(), Some('\n'));
        assert_eq!(cursor.peek_next(), None);
        assert_eq!(cursor.next(), Some('\n'));
        assert_eq!((cursor.line(), cursor.col()), (Line(2), Col(1)));
    }

    #[test]
    fn multibyte_characters() {
        let mut cursor = Cursor::new("äö€x");
        assert_eq!(cursor.next(), Some('ä'));
        let mark = cursor.mark();
        assert_eq!(cursor.next(), Some('ö'));
        assert_eq!(cursor.next(), Some('€'));
        assert_eq!(cursor.col(), Col(4));
        cursor.reset(mark);
        assert_eq!(cursor.rest(), "ö€x");
    }
}
