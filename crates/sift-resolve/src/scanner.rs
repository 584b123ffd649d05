//! Import scanner: bounded tokenizing of import statements.
//!
//! This is deliberately *not* a syntax-aware parser. It recognizes the
//! top-level import statement shapes (default, namespace, named lists with
//! aliasing across lines, side-effect-only, single or double quotes) with a
//! small hand-rolled tokenizer, and skips over comments and string literals
//! so import-shaped text inside them does not misfire. Anything more exotic
//! (dynamic `import()`, `import.meta`, unicode identifiers in the import
//! clause) is intentionally left alone. Remaining misfires on degenerate
//! input are an accepted limitation of the fast path, not a defect.

use std::ops::Range;

/// One import-like statement found in a compilation unit's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMatch {
    /// The full statement text as it appears in the source.
    pub raw: String,
    /// The quoted module specifier.
    pub specifier: String,
    /// Positional index of this match in source order.
    pub index: usize,
    /// Byte range of the specifier (quotes excluded) within the unit.
    pub spec_span: Range<usize>,
}

/// Scan a compilation unit for import statements, in source order.
pub fn scan_imports(text: &str) -> Vec<ImportMatch> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut matches = Vec::new();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
            }
            b'\'' | b'"' | b'`' => {
                i = skip_string(bytes, i);
            }
            b'i' if is_word_at(bytes, i, b"import") => {
                if let Some((found, end)) = parse_import(text, i, matches.len()) {
                    matches.push(found);
                    i = end;
                } else {
                    i += b"import".len();
                }
            }
            c if is_ident_byte(c) => {
                // Consume whole identifiers so keywords embedded in longer
                // names never trigger.
                while i < len && is_ident_byte(bytes[i]) {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    matches
}

/// Parse one import statement starting at the `import` keyword.
///
/// Returns the match and the byte offset just past the statement, or `None`
/// when the text after the keyword is not statement-shaped (dynamic import,
/// `import.meta`, a missing `from`, an unterminated specifier).
fn parse_import(text: &str, start: usize, index: usize) -> Option<(ImportMatch, usize)> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = start + b"import".len();
    let mut saw_clause = false;
    let mut last_word: Option<&str> = None;

    loop {
        let c = *bytes.get(i)?;

        if c.is_ascii_whitespace() {
            i += 1;
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            i = skip_line_comment(bytes, i);
        } else if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i = skip_block_comment(bytes, i);
        } else if c == b'\'' || c == b'"' {
            // The specifier string. A non-empty clause must end in `from`.
            if saw_clause && last_word != Some("from") {
                return None;
            }
            let spec_start = i + 1;
            let mut j = spec_start;
            while j < len && bytes[j] != c {
                if bytes[j] == b'\n' {
                    return None;
                }
                j += 1;
            }
            if j >= len {
                return None;
            }

            // Fold an optional trailing semicolon into the statement.
            let mut end = j + 1;
            let mut k = end;
            while k < len && (bytes[k] == b' ' || bytes[k] == b'\t') {
                k += 1;
            }
            if k < len && bytes[k] == b';' {
                end = k + 1;
            }

            let found = ImportMatch {
                raw: text[start..end].to_string(),
                specifier: text[spec_start..j].to_string(),
                index,
                spec_span: spec_start..j,
            };
            return Some((found, end));
        } else if is_ident_byte(c) {
            let word_start = i;
            while i < len && is_ident_byte(bytes[i]) {
                i += 1;
            }
            last_word = Some(&text[word_start..i]);
            saw_clause = true;
        } else if matches!(c, b'{' | b'}' | b',') {
            saw_clause = true;
            last_word = None;
            i += 1;
        } else if c == b'*' {
            saw_clause = true;
            i += 1;
        } else {
            // `(`, `.`, or anything else: not an import statement.
            return None;
        }
    }
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

/// True when `word` occurs at `i` with identifier boundaries on both sides.
fn is_word_at(bytes: &[u8], i: usize, word: &[u8]) -> bool {
    if !bytes[i..].starts_with(word) {
        return false;
    }
    if i > 0 && is_ident_byte(bytes[i - 1]) {
        return false;
    }
    match bytes.get(i + word.len()) {
        Some(&c) => !is_ident_byte(c),
        None => true,
    }
}

fn skip_line_comment(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    i += 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip a string or template literal starting at its opening quote.
///
/// Plain strings are abandoned at an (invalid) unescaped newline so an
/// unbalanced quote cannot swallow the rest of the file. Template literals
/// may span lines; `${}` interpolation is not tracked.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            b'\n' if quote != b'`' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}
