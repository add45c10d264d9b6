//! Source text as seen by the checks.
//!
//! A [`SourceFile`] splits the text into 1-indexed lines and pre-computes a
//! masked copy of every line in which comments are blanked and the contents
//! of string and character literals are replaced with spaces. Every raw
//! character maps to exactly one masked character, so character columns
//! found in the masked text are valid against the raw text.

/// Per-line scan result.
#[derive(Debug, Clone, Default)]
struct LineInfo {
    /// Line with comments and literal contents blanked.
    code: String,
    /// A comment token (`//`, `/*`, or a block comment body) touches this line.
    has_comment: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    BlockComment,
}

/// A source file split into lines, with comment and literal masking.
#[derive(Debug, Clone)]
pub struct SourceFile<'a> {
    /// Display name (file name or path).
    pub name: &'a str,
    /// Raw content.
    pub content: &'a str,
    lines: Vec<&'a str>,
    info: Vec<LineInfo>,
}

impl<'a> SourceFile<'a> {
    /// Scans `content`. Never fails; any text is accepted.
    #[must_use]
    pub fn new(name: &'a str, content: &'a str) -> Self {
        let lines: Vec<&str> = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        // A trailing newline does not start another line.
        let lines = match lines.split_last() {
            Some((last, rest)) if last.is_empty() => rest.to_vec(),
            _ => lines,
        };
        let info = scan(&lines);
        Self {
            name,
            content,
            lines,
            info,
        }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the file has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Raw lines, 0-indexed slice.
    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Raw text of a 1-indexed line.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1).and_then(|i| self.lines.get(i).copied())
    }

    /// Masked text of a 1-indexed line (empty when out of range).
    #[must_use]
    pub fn code(&self, line: usize) -> &str {
        line.checked_sub(1)
            .and_then(|i| self.info.get(i))
            .map_or("", |info| info.code.as_str())
    }

    /// Iterates `(line_number, masked_code)` pairs.
    pub fn code_lines(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.info
            .iter()
            .enumerate()
            .map(|(i, info)| (i + 1, info.code.as_str()))
    }

    /// Whether a comment token touches a 1-indexed line.
    #[must_use]
    pub fn has_comment(&self, line: usize) -> bool {
        line.checked_sub(1)
            .and_then(|i| self.info.get(i))
            .is_some_and(|info| info.has_comment)
    }

    /// Whether a line holds code once comments are removed.
    #[must_use]
    pub fn is_code(&self, line: usize) -> bool {
        !self.code(line).trim().is_empty()
    }

    /// Whether a line holds a comment and nothing else.
    #[must_use]
    pub fn is_comment_only(&self, line: usize) -> bool {
        self.has_comment(line) && !self.is_code(line)
    }

    /// Number of lines touched by a comment.
    #[must_use]
    pub fn comment_line_count(&self) -> usize {
        self.info.iter().filter(|i| i.has_comment).count()
    }

    /// First line holding code, if any.
    #[must_use]
    pub fn first_code_line(&self) -> Option<usize> {
        (1..=self.len()).find(|&n| self.is_code(n))
    }

    /// Next line at or after `from` holding code.
    #[must_use]
    pub fn next_code_line(&self, from: usize) -> Option<usize> {
        (from.max(1)..=self.len()).find(|&n| self.is_code(n))
    }
}

/// 1-indexed character column of a byte offset within `text`.
///
/// Offsets past the end or inside a multi-byte character are clamped down
/// to the preceding character boundary.
#[must_use]
pub fn column_at(text: &str, byte_offset: usize) -> usize {
    let mut end = byte_offset.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].chars().count() + 1
}

fn scan(lines: &[&str]) -> Vec<LineInfo> {
    let mut mode = Mode::Code;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let chars: Vec<char> = line.chars().collect();
        let mut code = String::with_capacity(line.len());
        let mut has_comment = mode == Mode::BlockComment;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if mode == Mode::BlockComment {
                if c == '*' && next == Some('/') {
                    mode = Mode::Code;
                    code.push_str("  ");
                    i += 2;
                } else {
                    code.push(' ');
                    i += 1;
                }
                continue;
            }

            match (c, next) {
                ('/', Some('/')) => {
                    has_comment = true;
                    code.extend(std::iter::repeat(' ').take(chars.len() - i));
                    break;
                }
                ('/', Some('*')) => {
                    has_comment = true;
                    mode = Mode::BlockComment;
                    code.push_str("  ");
                    i += 2;
                }
                ('"' | '\'', _) => {
                    i = mask_literal(&chars, i, &mut code);
                }
                _ => {
                    code.push(c);
                    i += 1;
                }
            }
        }

        out.push(LineInfo { code, has_comment });
    }

    out
}

/// Copies a literal starting at `start`, keeping the quotes and blanking
/// the body. Unterminated literals end at the end of the line.
fn mask_literal(chars: &[char], start: usize, code: &mut String) -> usize {
    let quote = chars[start];
    code.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                code.push(' ');
                if i + 1 < chars.len() {
                    code.push(' ');
                }
                i += 2;
            }
            c if c == quote => {
                code.push(quote);
                return i + 1;
            }
            _ => {
                code.push(' ');
                i += 1;
            }
        }
    }
    chars.len()
}
