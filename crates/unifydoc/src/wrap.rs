//! Greedy word wrapping for monospace body text
//!
//! Widths are counted in characters. A logical line is cut into chunks of
//! whitespace and non-whitespace, and chunks are packed greedily:
//!
//! - leading indentation of the first sub-line is kept
//! - whitespace at the start of later sub-lines, and at the end of every
//!   sub-line, is dropped
//! - a word longer than the width is broken across sub-lines
//! - a blank or whitespace-only line produces no sub-lines
//!
//! Logical lines end at `\n`, `\r\n`, a lone `\r`, vertical tab, form feed,
//! the `\x1c`..`\x1e` separators, NEL, and U+2028/U+2029. Only ASCII
//! whitespace is a break point; a non-breaking space stays inside its word.

use crate::constants::TAB_WIDTH;

/// Wrap one logical line into sub-lines of at most `width` characters.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut chunks = split_chunks(&normalize_whitespace(line));
    chunks.reverse();

    let mut lines: Vec<String> = Vec::new();

    while !chunks.is_empty() {
        let mut current: Vec<Vec<char>> = Vec::new();
        let mut current_len = 0;

        if !lines.is_empty() && chunks.last().is_some_and(|c| is_blank(c)) {
            chunks.pop();
        }

        while let Some(chunk) = chunks.last() {
            if current_len + chunk.len() > width {
                break;
            }
            current_len += chunk.len();
            if let Some(chunk) = chunks.pop() {
                current.push(chunk);
            }
        }

        // Break an over-long word at the remaining room
        if let Some(chunk) = chunks.last_mut() {
            let room = width - current_len;
            if chunk.len() > width && room > 0 {
                let rest = chunk.split_off(room);
                current.push(std::mem::replace(chunk, rest));
            }
        }

        if current.last().is_some_and(|c| is_blank(c)) {
            current.pop();
        }

        if !current.is_empty() {
            lines.push(current.into_iter().flatten().collect());
        }
    }

    lines
}

/// Split content into logical lines and wrap each of them.
pub fn wrap_text(content: &str, width: usize) -> Vec<String> {
    split_lines(content)
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Logical lines; `\r\n` counts as one break and a trailing break adds no line
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }
        lines.push(&content[start..idx]);
        let mut end = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                end = next + 1;
            }
        }
        start = end;
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }
    lines
}

/// Expand tabs to column stops and turn other ASCII whitespace into a space
fn normalize_whitespace(line: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(line.len());
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - out.len() % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', pad));
        } else if matches!(ch, '\n' | '\r' | '\x0b' | '\x0c' | ' ') {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

/// Alternating runs of spaces and non-spaces
fn split_chunks(chars: &[char]) -> Vec<Vec<char>> {
    let mut chunks: Vec<Vec<char>> = Vec::new();
    for &ch in chars {
        match chunks.last_mut() {
            Some(chunk) if (chunk[0] == ' ') == (ch == ' ') => chunk.push(ch),
            _ => chunks.push(vec![ch]),
        }
    }
    chunks
}

fn is_blank(chunk: &[char]) -> bool {
    chunk.iter().all(|&c| c == ' ')
}
