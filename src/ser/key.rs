use super::encode::encode;

/// The key of the value currently being written, e.g. `user[tags][0]`.
///
/// Segments are pushed while descending into the document and popped on the
/// way back up, so that the bytes of common prefixes are only encoded once.
pub(crate) struct KeyStack {
    buf: String,
    marks: Vec<usize>,
    space_as_plus: bool,
}

impl KeyStack {
    pub fn new(space_as_plus: bool) -> Self {
        Self {
            buf: String::new(),
            marks: Vec::with_capacity(4),
            space_as_plus,
        }
    }

    /// Pushes a new key segment onto the key stack for nested structures.
    ///
    /// - First key "user" becomes: `user`
    /// - Second key "name" becomes: `user[name]`
    /// - Third key "first" becomes: `user[name][first]`
    pub fn push_name(&mut self, name: &str) {
        self.marks.push(self.buf.len());
        if self.marks.len() == 1 {
            self.push_encoded(name);
            return;
        }

        self.buf.push('[');
        match name.as_bytes().first() {
            Some(&digit) if name.bytes().all(|b| b.is_ascii_digit()) => {
                // an all-digit name would read back as a list index
                self.buf.push_str("%3");
                self.buf.push(char::from(digit));
                self.buf.push_str(&name[1..]);
            }
            _ => self.push_encoded(name),
        }
        self.buf.push(']');
    }

    /// Pushes a `[index]` segment.
    pub fn push_index(&mut self, index: usize) {
        self.marks.push(self.buf.len());
        let mut buffer = itoa::Buffer::new();
        self.buf.push('[');
        self.buf.push_str(buffer.format(index));
        self.buf.push(']');
    }

    pub fn pop(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.buf.truncate(mark);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    fn push_encoded(&mut self, segment: &str) {
        if segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
        {
            // the common case needs no percent-encoding
            self.buf.push_str(segment);
        } else {
            for encoded in encode(segment, self.space_as_plus) {
                self.buf.push_str(&encoded);
            }
        }
    }
}
