//! Draft text being composed by the user

/// Editable input buffer with a cursor.
///
/// The cursor is a char index, not a byte offset, so multi-byte input never
/// splits a code point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position in chars
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Replace the whole draft and move the cursor to the end
    #[cfg(test)]
    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.char_len();
    }

    /// Take the draft, leaving the buffer empty
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, text);
        self.cursor += text.chars().count();
    }

    /// Delete the char before the cursor
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    /// Delete the char under the cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}
