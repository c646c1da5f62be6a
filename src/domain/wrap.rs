//! Label wrapping for display.
//!
//! Widths are counted in `char`s and words are split on Unicode whitespace,
//! so the result does not depend on the locale.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const ELLIPSIS: &str = "...";

/// Line budget for a wrapped label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapBudget {
    pub max_chars: usize,
    pub max_lines: usize,
}

impl WrapBudget {
    pub const fn new(max_chars: usize, max_lines: usize) -> Self {
        Self {
            max_chars,
            max_lines,
        }
    }

    pub fn wrap(&self, text: &str) -> Vec<String> {
        wrap_text(text, self.max_chars, self.max_lines)
    }
}

/// Greedy word wrap into at most `max_lines` lines of at most `max_chars`.
///
/// Words longer than a line are split. When the text does not fit, the last
/// kept line ends with [`ELLIPSIS`].
pub fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    if max_chars == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        for piece in split_word(word, max_chars) {
            let piece_len = piece.chars().count();
            if current_len == 0 {
                current = piece;
                current_len = piece_len;
            } else if current_len + 1 + piece_len <= max_chars {
                current.push(' ');
                current.push_str(&piece);
                current_len += 1 + piece_len;
            } else {
                lines.push(std::mem::replace(&mut current, piece));
                current_len = piece_len;
            }
        }
    }
    if current_len > 0 {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = with_ellipsis(last, max_chars);
        }
    }
    lines
}

/// Shorten `text` to `max_chars` characters followed by [`ELLIPSIS`].
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}{}", text.chars().take(max_chars).collect::<String>(), ELLIPSIS)
    } else {
        text.to_string()
    }
}

fn split_word(word: &str, max_chars: usize) -> Vec<String> {
    word.chars()
        .chunks(max_chars)
        .into_iter()
        .map(|chunk| chunk.collect())
        .collect()
}

fn with_ellipsis(line: &str, max_chars: usize) -> String {
    let marker_len = ELLIPSIS.chars().count();
    if max_chars <= marker_len {
        return ELLIPSIS.chars().take(max_chars).collect();
    }
    let keep = max_chars - marker_len;
    let kept: String = line.chars().take(keep).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}
