use crate::{CharSource, Col, Line, Mark};

/// Adapts any character iterator (a decoding reader, a `Chars` of a temporary
/// string, ...) into a [`CharSource`].
///
/// Characters are pulled lazily. Everything read since the most recent
/// [`mark`](CharSource::mark) stays buffered, older characters are dropped.
#[derive(Debug)]
pub struct CharStream<I: Iterator<Item = char>> {
    input: I,
    buffer: Vec<char>,
    // Absolute index of buffer[0]
    base: usize,
    pos: Mark,
}

impl<I: Iterator<Item = char>> CharStream<I> {
    pub fn new(input: I) -> Self {
        Self { input, buffer: Vec::new(), base: 0, pos: Mark::start() }
    }

    fn index(&self) -> usize {
        self.pos.offset - self.base
    }

    fn fill(&mut self, ahead: usize) -> Option<char> {
        let wanted = self.index() + ahead;
        while self.buffer.len() <= wanted {
            self.buffer.push(self.input.next()?);
        }
        Some(self.buffer[wanted])
    }
}

impl<I: Iterator<Item = char>> CharSource for CharStream<I> {
    fn next_char(&mut self) -> Option<char> {
        let c = self.fill(0)?;
        self.pos.advance(c, 1);
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.fill(0)
    }

    fn peek_next(&mut self) -> Option<char> {
        self.fill(1)
    }

    fn mark(&mut self) -> Mark {
        let consumed = self.index();
        self.buffer.drain(..consumed);
        self.base = self.pos.offset;
        self.pos
    }

    fn reset(&mut self, mark: Mark) {
        assert!(mark.offset >= self.base, "Can only reset to the most recent mark");
        self.pos = mark;
    }

    fn line(&self) -> Line {
        self.pos.line
    }

    fn col(&self) -> Col {
        self.pos.col
    }
}
