//! Editor surface used by the single-link workflow.

/// A position in a document. `line` is zero-based, `ch` is a byte offset
/// within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

pub trait Editor {
    fn cursor(&self) -> Position;

    /// Text of `line` without its line terminator.
    fn line(&self, line: usize) -> Option<String>;

    fn replace_span(&mut self, text: &str, from: Position, to: Position);
}

/// An [`Editor`] over an in-memory copy of a document.
#[derive(Debug, Clone)]
pub struct DocumentEditor {
    content: String,
    cursor: Position,
}

impl DocumentEditor {
    pub fn new(content: String, cursor: Position) -> Self {
        Self { content, cursor }
    }

    /// Places the cursor at a zero-based `column` counted in characters.
    /// Columns past the end of the line clamp to the end.
    pub fn at_column(content: String, line: usize, column: usize) -> Self {
        let ch = content
            .split('\n')
            .nth(line)
            .map(|text| {
                text.char_indices()
                    .nth(column)
                    .map_or(text.len(), |(idx, _)| idx)
            })
            .unwrap_or(0);
        Self::new(content, Position { line, ch })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    fn offset(&self, pos: Position) -> Option<usize> {
        let mut start = 0;
        for (idx, line) in self.content.split('\n').enumerate() {
            if idx == pos.line {
                return (pos.ch <= line.len() && line.is_char_boundary(pos.ch))
                    .then_some(start + pos.ch);
            }
            start += line.len() + 1;
        }
        None
    }
}

impl Editor for DocumentEditor {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn line(&self, line: usize) -> Option<String> {
        self.content
            .split('\n')
            .nth(line)
            .map(|text| text.strip_suffix('\r').unwrap_or(text).to_string())
    }

    fn replace_span(&mut self, text: &str, from: Position, to: Position) {
        if let (Some(start), Some(end)) = (self.offset(from), self.offset(to))
            && start <= end
        {
            self.content.replace_range(start..end, text);
        }
    }
}
