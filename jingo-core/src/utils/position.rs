use std::fmt::Display;
use std::rc::Rc;

/// A cursor into a source text. Copied by value into every token and AST
/// node, so advancing a live cursor never disturbs a captured span.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub source_name: Rc<str>,
    pub full_text: Rc<str>,
}

impl Position {
    pub fn new(source_name: &str, full_text: &str) -> Self {
        Self {
            offset: 0,
            line: 0,
            column: 0,
            source_name: source_name.into(),
            full_text: full_text.into(),
        }
    }

    /// Steps past `current`. Stepping past a newline starts the next line
    /// at column 0.
    pub fn advance(&mut self, current: Option<char>) {
        self.offset += 1;

        if current == Some('\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.source_name, self.line + 1, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start.offset, self.end.offset)
    }
}
