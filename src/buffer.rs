use std::str::Utf8Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Lf,
    CrLf,
    None,
}

impl Terminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub terminator: Terminator,
}

impl Line {
    pub fn new(content: impl Into<String>, terminator: Terminator) -> Self {
        Self {
            content: content.into(),
            terminator,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileBuffer {
    lines: Vec<Line>,
}

impl FileBuffer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Utf8Error> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from_text(text))
    }

    pub fn from_text(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0usize;
        let mut index = 0usize;

        while index < bytes.len() {
            if bytes[index] == b'\n' {
                let (content_end, terminator) = if index > start && bytes[index - 1] == b'\r' {
                    (index - 1, Terminator::CrLf)
                } else {
                    (index, Terminator::Lf)
                };
                lines.push(Line::new(&source[start..content_end], terminator));
                index += 1;
                start = index;
            } else {
                index += 1;
            }
        }

        if start < source.len() {
            lines.push(Line::new(&source[start..], Terminator::None));
        }

        Self { lines }
    }

    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// 1-indexed lookup, matching the numbering of anchors and listings.
    pub fn line(&self, number: usize) -> Option<&Line> {
        number.checked_sub(1).and_then(|index| self.lines.get(index))
    }

    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.content.as_str())
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(&line.content);
            text.push_str(line.terminator.as_str());
        }
        text
    }
}
