use std::ops::Range;

/// Source text with comments blanked, plus where its string literals lie.
pub struct MaskedSource {
    /// Comment contents replaced with spaces; newlines and byte length kept,
    /// so offsets and line numbers computed here are valid for the original.
    pub text: String,
    /// Contents of string and template literals, quotes excluded. Sorted.
    strings: Vec<Range<usize>>,
}

impl MaskedSource {
    pub fn new(source: &str) -> Self {
        scan(source)
    }

    /// Whether byte `offset` lies inside a string or template literal.
    pub fn in_string(&self, offset: usize) -> bool {
        let idx = self.strings.partition_point(|r| r.end <= offset);
        self.strings.get(idx).is_some_and(|r| r.start <= offset)
    }
}

/// Blank comment contents with spaces. `//` inside a string is not taken
/// for a comment.
fn scan(source: &str) -> MaskedSource {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(u8),
    }

    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut strings = Vec::new();
    let mut state = State::Code;
    let mut string_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                (b'"' | b'\'' | b'`', _) => {
                    state = State::Str(b);
                    string_start = i + 1;
                    out.push(b);
                }
                _ => out.push(b),
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                    out.push(b'\n');
                } else {
                    out.push(b' ');
                }
            }
            State::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = State::Code;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    continue;
                }
                out.push(if b == b'\n' { b'\n' } else { b' ' });
            }
            State::Str(quote) => {
                out.push(b);
                if b == b'\\' {
                    if let Some(escaped) = next {
                        out.push(escaped);
                        i += 2;
                        continue;
                    }
                } else if b == quote || (b == b'\n' && quote != b'`') {
                    strings.push(string_start..i);
                    state = State::Code;
                }
            }
        }
        i += 1;
    }

    if let State::Str(_) = state {
        strings.push(string_start..bytes.len());
    }

    // Only whole comment bytes were replaced with ASCII, so this cannot fail.
    let text = String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned());
    MaskedSource { text, strings }
}

/// Byte offset → 1-based line number lookup.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }
}
