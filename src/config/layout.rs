//! Span index over block-style YAML text
//!
//! `serde_yaml` gives typed reads but drops comments and formatting on write.
//! This index records where every scalar value sits in the original text so an
//! update can splice the new value in place and leave every other byte alone.
//!
//! Handled: block mappings and sequences (including `-   key: value` items),
//! plain and single-line quoted scalars, comments, blank lines, `---` markers.
//! Flow collections, block scalars, anchors and multi-line plain scalars are
//! indexed as opaque: readable through `serde_yaml`, not editable.

use super::path::{ConfigPath, Segment};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Mapping(MappingNode),
    Sequence(Vec<Node>),
    /// Byte span of the scalar text, quotes included
    Scalar(Range<usize>),
    /// `key:` with no value; holds the offset right after the colon
    Empty(usize),
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MappingNode {
    /// Column of the keys
    pub indent: usize,
    pub entries: Vec<(String, Node)>,
    /// Offset just past the last line that belongs to this mapping
    pub end: usize,
}

impl MappingNode {
    fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().rev().find(|(k, _)| k == key).map(|(_, node)| node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LineKind {
    Blank,
    Comment,
    Marker,
    Content,
}

#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    indent: usize,
    /// End of the line content, before `\r\n` or `\n`
    content_end: usize,
    /// Start of the following line
    next: usize,
    kind: LineKind,
}

/// Index of a YAML document's block structure
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    root: Node,
}

impl Layout {
    pub fn build(text: &str) -> Self {
        let mut parser = Parser::new(text);
        let root = match parser.peek() {
            Some(line) => {
                let indent = parser.lines[line].indent;
                parser.parse_node(line, indent)
            }
            None => Node::Opaque,
        };
        Self { root }
    }

    pub fn resolve(&self, path: &ConfigPath) -> Option<&Node> {
        let mut node = &self.root;
        for segment in path.segments() {
            node = match (node, segment) {
                (Node::Mapping(mapping), Segment::Key(key)) => mapping.get(key)?,
                (Node::Sequence(items), Segment::Index(index)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

struct Parser<'a> {
    text: &'a str,
    lines: Vec<Line>,
    /// Next unconsumed line
    pos: usize,
    /// Last consumed content line
    last: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let (raw_end, next) = match text[start..].find('\n') {
                Some(pos) => (start + pos, start + pos + 1),
                None => (text.len(), text.len()),
            };
            let content_end = if text[start..raw_end].ends_with('\r') { raw_end - 1 } else { raw_end };
            let raw = &text[start..content_end];
            let indent = raw.len() - raw.trim_start_matches(' ').len();
            let trimmed = raw.trim();

            let kind = if trimmed.is_empty() {
                LineKind::Blank
            } else if trimmed.starts_with('#') {
                LineKind::Comment
            } else if indent == 0 && (trimmed == "---" || trimmed == "..." || trimmed.starts_with("--- ")) {
                LineKind::Marker
            } else {
                LineKind::Content
            };

            lines.push(Line { start, indent, content_end, next, kind });
            start = next;
        }

        Self { text, lines, pos: 0, last: 0 }
    }

    /// Next content line without consuming it
    fn peek(&self) -> Option<usize> {
        (self.pos..self.lines.len()).find(|&i| self.lines[i].kind == LineKind::Content)
    }

    fn consume(&mut self, line: usize) {
        self.pos = line + 1;
        self.last = line;
    }

    fn content(&self, line: usize, col: usize) -> &'a str {
        let l = self.lines[line];
        &self.text[l.start + col..l.content_end]
    }

    fn parse_node(&mut self, line: usize, col: usize) -> Node {
        let content = self.content(line, col);
        if is_dash(content) {
            self.parse_sequence(line, col)
        } else if split_key(content).is_some() {
            self.parse_mapping(line, col)
        } else {
            self.consume(line);
            let start = self.lines[line].start + col;
            let node = scalar_node(content, start);
            self.skip_deeper(col, node)
        }
    }

    fn parse_sequence(&mut self, first: usize, col: usize) -> Node {
        let mut items = Vec::new();
        let mut current = Some(first);

        while let Some(line) = current {
            let content = self.content(line, col);
            let after_dash = &content[1..];
            let rest_col = col + 1 + (after_dash.len() - after_dash.trim_start_matches(' ').len());
            let rest = self.content(line, rest_col);

            let item = if rest.is_empty() || rest.starts_with('#') {
                self.consume(line);
                self.parse_block_value(col, false, self.lines[line].start + col + 1)
            } else {
                self.parse_node(line, rest_col)
            };
            items.push(item);

            current = self
                .peek()
                .filter(|&next| self.lines[next].indent == col && is_dash(self.content(next, col)));
        }

        Node::Sequence(items)
    }

    fn parse_mapping(&mut self, first: usize, col: usize) -> Node {
        let mut entries = Vec::new();
        let mut current = Some(first);

        while let Some(line) = current {
            let content_start = self.lines[line].start + col;
            let content = self.content(line, col);
            let Some((key, value_offset)) = split_key(content) else {
                break;
            };
            self.consume(line);

            let after_colon = content_start + value_offset;
            let rest = &content[value_offset..];
            let value_start = after_colon + (rest.len() - rest.trim_start().len());
            let value = strip_comment(rest.trim_start());

            let node = if value.is_empty() {
                self.parse_block_value(col, true, after_colon)
            } else {
                let node = scalar_node(value, value_start);
                self.skip_deeper(col, node)
            };
            entries.push((key, node));

            current = self
                .peek()
                .filter(|&next| self.lines[next].indent == col && split_key(self.content(next, col)).is_some());
        }

        let end = self.lines[self.last].next;
        Node::Mapping(MappingNode { indent: col, entries, end })
    }

    /// Value on the lines below a `key:` or `-` with nothing after it
    fn parse_block_value(&mut self, parent: usize, allow_flush_sequence: bool, empty_at: usize) -> Node {
        match self.peek() {
            Some(next) if self.lines[next].indent > parent => {
                let indent = self.lines[next].indent;
                self.parse_node(next, indent)
            }
            Some(next)
                if allow_flush_sequence
                    && self.lines[next].indent == parent
                    && is_dash(self.content(next, parent)) =>
            {
                self.parse_sequence(next, parent)
            }
            _ => Node::Empty(empty_at),
        }
    }

    /// Consume continuation lines indented past `col`; any such line makes the value opaque
    fn skip_deeper(&mut self, col: usize, node: Node) -> Node {
        let mut skipped = false;
        // Block scalars may contain lines that look like comments
        let block_scalar = matches!(node, Node::Opaque);

        loop {
            let next = if block_scalar {
                (self.pos..self.lines.len()).find(|&i| self.lines[i].kind != LineKind::Blank)
            } else {
                self.peek()
            };
            match next {
                Some(line) if self.lines[line].indent > col => {
                    self.consume(line);
                    skipped = true;
                }
                _ => break,
            }
        }

        if skipped { Node::Opaque } else { node }
    }
}

fn is_dash(content: &str) -> bool {
    content == "-" || content.starts_with("- ") || content.starts_with("-\t")
}

/// Split `key: rest`, returning the unquoted key and the offset just past the colon
fn split_key(content: &str) -> Option<(String, usize)> {
    let bytes = content.as_bytes();
    let first = *bytes.first()?;

    if first == b'"' || first == b'\'' {
        let close = closing_quote(content)?;
        let after = &content[close + 1..];
        let colon = after.len() - after.trim_start_matches(' ').len();
        if !after[colon..].starts_with(':') {
            return None;
        }
        let end = close + 1 + colon + 1;
        if !followed_by_space(content, end) {
            return None;
        }
        return Some((unquote(&content[..=close]), end));
    }

    if matches!(first, b'[' | b'{' | b'#' | b'?' | b'|' | b'>' | b'&' | b'*' | b'!') {
        return None;
    }

    let mut prev_space = false;
    for (i, c) in content.char_indices() {
        if c == '#' && prev_space {
            return None;
        }
        if c == ':' && followed_by_space(content, i + 1) {
            return Some((content[..i].trim_end().to_string(), i + 1));
        }
        prev_space = c == ' ' || c == '\t';
    }
    None
}

fn followed_by_space(content: &str, at: usize) -> bool {
    matches!(content.as_bytes().get(at), None | Some(b' ') | Some(b'\t'))
}

/// Index of the quote closing the scalar that opens `content`
fn closing_quote(content: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let quote = bytes[0];
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b if b == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    if quoted.starts_with('\'') {
        inner.replace("''", "'")
    } else {
        inner.replace("\\\"", "\"").replace("\\\\", "\\")
    }
}

/// Scalar text before any trailing comment
fn strip_comment(value: &str) -> &str {
    if value.starts_with('"') || value.starts_with('\'') {
        return match closing_quote(value) {
            Some(close) => &value[..=close],
            None => value.trim_end(),
        };
    }

    let mut prev_space = false;
    for (i, c) in value.char_indices() {
        if c == '#' && prev_space {
            return value[..i].trim_end();
        }
        prev_space = c == ' ' || c == '\t';
    }
    value.trim_end()
}

fn scalar_node(value: &str, start: usize) -> Node {
    let value = strip_comment(value);
    match value.as_bytes().first() {
        None => Node::Empty(start),
        Some(b'[' | b'{' | b'|' | b'>' | b'&' | b'*' | b'!') => Node::Opaque,
        Some(b'"' | b'\'') if closing_quote(value).is_none() => Node::Opaque,
        _ => Node::Scalar(start..start + value.len()),
    }
}
