use super::layout;

pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True iff the bytes starting at `offset` begin with `prefix`.
    pub fn starts_with_at(&self, offset: usize, prefix: &[u8]) -> bool {
        self.payload
            .get(offset..)
            .is_some_and(|rest| rest.starts_with(prefix))
    }

    /// Index of the CR of the first CRLF pair strictly after `offset`, or the
    /// payload length when no terminated line remains. Callers must treat the
    /// length value as an unterminated line.
    pub fn find_line_end(&self, offset: usize) -> usize {
        let len = self.payload.len();
        let mut i = offset + 1;
        while i + 1 < len {
            if self.payload[i] == layout::CR && self.payload[i + 1] == layout::LF {
                return i;
            }
            i += 1;
        }
        len
    }

    /// Index of the next `"` at or after `offset`, scanning to the payload
    /// end.
    pub fn find_quote(&self, offset: usize) -> Option<usize> {
        self.payload
            .get(offset..)?
            .iter()
            .position(|&b| b == layout::QUOTE)
            .map(|at| offset + at)
    }

    pub fn slice(&self, range: std::ops::Range<usize>) -> &'a [u8] {
        self.payload.get(range).unwrap_or_default()
    }

    pub fn utf8(&self, range: std::ops::Range<usize>) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(self.slice(range))
    }
}
