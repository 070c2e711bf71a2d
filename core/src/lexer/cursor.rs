/// Reads source bytes one at a time, remembering the offset.
pub struct Cursor<'src> {
    bytes: &'src [u8],
    offset: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            bytes: source.as_bytes(),
            offset: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.offset
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    pub fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.offset + 1).copied()
    }

    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.offset += 1;
        Some(byte)
    }

    /// Consume bytes while `pred` holds; returns how many were taken.
    pub fn eat_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> usize {
        let start = self.offset;
        while self.peek().is_some_and(&mut pred) {
            self.offset += 1;
        }
        self.offset - start
    }

    /// Text between `start` and the current offset. Invalid UTF-8 is replaced.
    pub fn slice_from(&self, start: usize) -> String {
        let start = start.min(self.offset);
        String::from_utf8_lossy(&self.bytes[start..self.offset]).into_owned()
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.bytes.len()
    }
}
