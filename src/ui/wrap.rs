use std::ops::Range;
use unicode_width::UnicodeWidthChar;

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Greedy word wrap over char indices.
///
/// Each range is one display line; a word keeps its trailing spaces. Words
/// wider than `width` are split at the character that overflows.
pub fn wrap_ranges(text: &str, width: usize) -> Vec<Range<usize>> {
    let chars: Vec<char> = text.chars().collect();
    let width = width.max(1);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0;
    let mut i = 0;

    while i < chars.len() {
        let token_start = i;
        while i < chars.len() && chars[i] != ' ' {
            i += 1;
        }
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        let token_width: usize = chars[token_start..i].iter().map(|&c| char_width(c)).sum();

        if line_width > 0 && line_width + token_width > width {
            lines.push(line_start..token_start);
            line_start = token_start;
            line_width = 0;
        }

        if token_width <= width {
            line_width += token_width;
            continue;
        }

        for (j, &c) in chars.iter().enumerate().take(i).skip(token_start) {
            let cw = char_width(c);
            if line_width > 0 && line_width + cw > width {
                lines.push(line_start..j);
                line_start = j;
                line_width = 0;
            }
            line_width += cw;
        }
    }

    if line_start < chars.len() || lines.is_empty() {
        lines.push(line_start..chars.len());
    }
    lines
}

/// Line holding char `idx`; an index past the end belongs to the last line
pub fn line_of(lines: &[Range<usize>], idx: usize) -> usize {
    lines
        .iter()
        .position(|r| r.contains(&idx))
        .unwrap_or(lines.len().saturating_sub(1))
}

/// First visible line so that `line` sits in the middle of a `height` tall view
pub fn scroll_offset(line: usize, total_lines: usize, height: usize) -> usize {
    if total_lines <= height {
        return 0;
    }
    line.saturating_sub(height / 2).min(total_lines - height)
}
