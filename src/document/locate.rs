//! Source positions for the keys of a parsed config document.
//!
//! serde_json/serde_yaml values carry no spans, so positions are recovered by
//! scanning the source text forward for each key in document order. The scan
//! skips comments, quoted scalars and block scalars, so key-like text inside
//! them never matches. Keys are addressed by JSON pointer
//! (`/pipeline/processors/0/label`); an array element resolves to the
//! position of its first key.

use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// 1-based line and column.
pub type Position = (usize, usize);

#[derive(Debug, Default, Clone)]
pub struct Positions {
    by_pointer: HashMap<String, Position>,
}

impl Positions {
    /// Locate every object key of `value` within `source`.
    pub fn scan(source: &str, value: &Value) -> Self {
        let mut scanner = Scanner {
            source,
            line_starts: line_starts(source),
            cursor: 0,
            last: (1, 1),
            out: HashMap::new(),
        };
        scanner.walk("", value);
        Self {
            by_pointer: scanner.out,
        }
    }

    pub fn get(&self, pointer: &str) -> Option<Position> {
        self.by_pointer.get(pointer).copied()
    }

    /// Position of `pointer`, falling back to its nearest located ancestor.
    pub fn nearest(&self, pointer: &str) -> Position {
        let mut p = pointer;
        loop {
            if let Some(pos) = self.get(p) {
                return pos;
            }
            match p.rfind('/') {
                Some(idx) => p = &p[..idx],
                None => return (1, 1),
            }
        }
    }
}

/// Append an escaped reference token to a JSON pointer.
pub fn child_pointer(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, token.replace('~', "~0").replace('/', "~1"))
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

struct Scanner<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
    cursor: usize,
    last: Position,
    out: HashMap<String, Position>,
}

impl Scanner<'_> {
    fn walk(&mut self, pointer: &str, value: &Value) {
        match value {
            Value::Object(m) => {
                for (k, v) in m {
                    let child = child_pointer(pointer, k);
                    let pos = self.find_key(k);
                    self.out.insert(child.clone(), pos);
                    self.walk(&child, v);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let child = child_pointer(pointer, &i.to_string());
                    self.walk(&child, item);
                    let first_key = match item {
                        Value::Object(m) => m
                            .keys()
                            .next()
                            .and_then(|k| self.out.get(&child_pointer(&child, k)).copied()),
                        _ => None,
                    };
                    if let Some(pos) = first_key {
                        self.out.insert(child, pos);
                    }
                }
            }
            _ => {}
        }
    }

    fn find_key(&mut self, key: &str) -> Position {
        match self.next_key(key) {
            Some((start, end)) => {
                self.cursor = end;
                self.last = self.position_of(start);
            }
            None => trace!(key, line = self.last.0, "key not found in source"),
        }
        self.last
    }

    /// Byte range of the next occurrence of `key` used as a mapping key.
    fn next_key(&self, key: &str) -> Option<(usize, usize)> {
        let src = self.source;
        let bytes = src.as_bytes();
        let mut i = self.cursor;
        while i < bytes.len() {
            let token_start = i == 0 || is_token_boundary(bytes[i - 1]);
            match bytes[i] {
                b'#' if i == 0 || bytes[i - 1].is_ascii_whitespace() => {
                    i = line_end(src, i);
                }
                q @ (b'"' | b'\'') if token_start => {
                    let Some(close) = quoted_end(bytes, i, q) else {
                        i += 1;
                        continue;
                    };
                    if &bytes[i + 1..close] == key.as_bytes()
                        && followed_by_colon(bytes, close + 1)
                    {
                        return Some((i + 1, close));
                    }
                    i = close + 1;
                }
                b'|' | b'>' if token_start => match block_scalar_end(src, i) {
                    Some(end) => i = end,
                    None => i += 1,
                },
                _ => {
                    let end = i + key.len();
                    if token_start
                        && bytes[i..].starts_with(key.as_bytes())
                        && followed_by_colon(bytes, end)
                    {
                        return Some((i, end));
                    }
                    i += 1;
                }
            }
        }
        None
    }

    fn position_of(&self, offset: usize) -> Position {
        let line = self.line_starts.partition_point(|&s| s <= offset);
        let line_start = self.line_starts.get(line.saturating_sub(1)).copied().unwrap_or(0);
        let column = self.source[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

fn is_token_boundary(b: u8) -> bool {
    b.is_ascii_whitespace() || matches!(b, b'{' | b'[' | b',' | b':')
}

/// Index just past the end of the line containing `i` (excluding the newline).
fn line_end(src: &str, i: usize) -> usize {
    src[i..].find('\n').map_or(src.len(), |n| i + n)
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Column offset of the first key on a line, past any `- ` item markers.
fn key_indent(line: &str) -> usize {
    let mut rest = line.trim_start_matches(' ');
    while let Some(r) = rest.strip_prefix("- ") {
        rest = r.trim_start_matches(' ');
    }
    line.len() - rest.len()
}

/// Index of the quote closing the scalar opened at `start`.
fn quoted_end(bytes: &[u8], start: usize, quote: u8) -> Option<usize> {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' if quote == b'"' => j += 2,
            b if b == quote => {
                // '' is an escaped quote inside a single-quoted scalar.
                if quote == b'\'' && bytes.get(j + 1) == Some(&b'\'') {
                    j += 2;
                } else {
                    return Some(j);
                }
            }
            _ => j += 1,
        }
    }
    None
}

fn followed_by_colon(bytes: &[u8], mut i: usize) -> bool {
    while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
        i += 1;
    }
    bytes.get(i) == Some(&b':')
}

/// End of a `|` / `>` block scalar whose indicator sits at `i`: every
/// following blank line or line indented deeper than the owning key (or
/// sequence dash).
fn block_scalar_end(src: &str, i: usize) -> Option<usize> {
    let before = src[..i].trim_end_matches([' ', '\t']);
    if !(before.ends_with(':') || before.ends_with('-')) {
        return None;
    }
    let eol = line_end(src, i);
    let header = src[i + 1..eol]
        .trim_start_matches(|c: char| c == '+' || c == '-' || c.is_ascii_digit())
        .trim_start();
    if !(header.is_empty() || header.starts_with('#')) {
        return None;
    }

    let owner_start = src[..i].rfind('\n').map_or(0, |n| n + 1);
    let indent = if before.ends_with('-') {
        before.len() - 1 - owner_start
    } else {
        key_indent(&src[owner_start..i])
    };
    let mut pos = eol;
    while pos < src.len() {
        let next = pos + 1;
        let next_end = line_end(src, next);
        let line = &src[next..next_end];
        if !line.trim().is_empty() && indent_of(line) <= indent {
            break;
        }
        pos = next_end;
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn yaml(src: &str) -> Positions {
        let v: Value = serde_yaml::from_str(src).unwrap();
        Positions::scan(src, &v)
    }

    #[test]
    fn yaml_keys_in_document_order() {
        let src = "\
input:
  label: a
  stdin: {}
pipeline:
  processors:
    - label: b
      noop: {}
    - log:
        message: hi
";
        let p = yaml(src);
        assert_eq!(p.get("/input"), Some((1, 1)));
        assert_eq!(p.get("/input/label"), Some((2, 3)));
        assert_eq!(p.get("/pipeline/processors/0/label"), Some((6, 7)));
        assert_eq!(p.get("/pipeline/processors/0"), Some((6, 7)));
        assert_eq!(p.get("/pipeline/processors/1/log/message"), Some((9, 9)));
    }

    #[test]
    fn repeated_keys_resolve_to_successive_lines() {
        let src = r#"{
  "a": {"label": "x"},
  "b": {
    "label": "y"
  }
}"#;
        let v: Value = serde_json::from_str(src).unwrap();
        let p = Positions::scan(src, &v);
        assert_eq!(p.get("/a/label"), Some((2, 10)));
        assert_eq!(p.get("/b/label"), Some((4, 6)));
    }

    #[test]
    fn nearest_walks_up_to_located_ancestor() {
        let p = yaml("input:\n  stdin: {}\n");
        assert_eq!(p.nearest("/input/stdin/missing"), (2, 3));
        assert_eq!(p.nearest("/nothing"), (1, 1));
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        assert_eq!(child_pointer("/a", "b/c~d"), "/a/b~1c~0d");
    }

    #[test]
    fn commented_keys_are_skipped() {
        let src = "\
input:
  label: a
  # stdin: old_name
  #stdin: older
  stdin: {} # label: trailing
";
        let p = yaml(src);
        assert_eq!(p.get("/input/label"), Some((2, 3)));
        assert_eq!(p.get("/input/stdin"), Some((5, 3)));
    }

    #[test]
    fn quoted_values_are_skipped() {
        let src = "\
log:
  message: 'x label: y'
  other: \"a \\\" label: b\"
  label: real
";
        let p = yaml(src);
        assert_eq!(p.get("/log/label"), Some((4, 3)));
    }

    #[test]
    fn quoted_keys_are_located() {
        let src = "'label': a\n\"stdin\": {}\n";
        let p = yaml(src);
        assert_eq!(p.get("/label"), Some((1, 2)));
        assert_eq!(p.get("/stdin"), Some((2, 2)));
    }

    #[test]
    fn block_scalars_are_skipped() {
        let src = "\
processors:
  - bloblang: |
      label: not_a_key
      root = this

    label: real
  - log:
      message: >-
        label: folded
      level: INFO
";
        let p = yaml(src);
        assert_eq!(p.get("/processors/0/label"), Some((6, 5)));
        assert_eq!(p.get("/processors/1/log/level"), Some((10, 7)));
    }

    #[test]
    fn apostrophes_inside_plain_scalars_do_not_open_quotes() {
        let src = "message: it's fine\nlabel: a\n";
        let p = yaml(src);
        assert_eq!(p.get("/label"), Some((2, 1)));
    }

    #[test]
    fn columns_count_characters() {
        let src = "{\"näme\": 1, \"label\": \"é\"}";
        let v: Value = serde_json::from_str(src).unwrap();
        let p = Positions::scan(src, &v);
        assert_eq!(p.get("/label"), Some((1, 14)));
    }
}
