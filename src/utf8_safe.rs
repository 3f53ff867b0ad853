//! Column-aware string helpers for fixed-width screen fields.
//!
//! Field values are measured in terminal columns, not bytes, so a value such as
//! `12°` or a non-ASCII SSID never splits a glyph or overruns its slot.

use unicode_width::UnicodeWidthChar;

/// Display width of a single glyph; control and zero-width chars still occupy a cell.
pub fn glyph_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0).max(1)
}

/// Number of terminal columns the string occupies.
pub fn display_width(s: &str) -> usize {
    s.chars().map(glyph_width).sum()
}

/// Longest prefix of `s` that fits in `max_cols` columns.
/// Respects UTF-8 boundaries and never splits a double-width glyph.
pub fn prefix_by_columns(s: &str, max_cols: usize) -> &str {
    let mut cols = 0usize;
    for (idx, ch) in s.char_indices() {
        let next = cols.saturating_add(glyph_width(ch));
        if next > max_cols {
            return &s[..idx];
        }
        cols = next;
    }
    s
}

/// Truncate or right-pad `s` with spaces so it occupies exactly `width` columns.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let visible = prefix_by_columns(s, width);
    let used = display_width(visible);
    let mut padded = String::with_capacity(visible.len() + width.saturating_sub(used));
    padded.push_str(visible);
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_to_width_pads_short_values() {
        assert_eq!(pad_to_width("?m", 5), "?m   ");
        assert_eq!(pad_to_width("", 3), "   ");
        assert_eq!(pad_to_width("Y", 1), "Y");
    }

    #[test]
    fn pad_to_width_truncates_long_values() {
        assert_eq!(pad_to_width("0.123456", 6), "0.1234");
        assert_eq!(pad_to_width("anything", 0), "");
    }

    #[test]
    fn pad_to_width_is_always_exact() {
        for value in ["", "1.5m", "100%", "-12.345678", "TELLO-ABCDEF-LONG-SSID-NAME"] {
            for width in 0..24 {
                assert_eq!(display_width(&pad_to_width(value, width)), width);
            }
        }
    }

    #[test]
    fn prefix_by_columns_keeps_wide_glyphs_whole() {
        assert_eq!(prefix_by_columns("你好世界", 3), "你");
        assert_eq!(prefix_by_columns("你好世界", 4), "你好");
        assert_eq!(pad_to_width("你好", 3), "你 ");
    }

    #[test]
    fn degree_sign_is_single_column() {
        assert_eq!(display_width("-90°"), 4);
        assert_eq!(pad_to_width("-90°", 6), "-90°  ");
    }
}
