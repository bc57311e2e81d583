//! Canonical forms for hexagram names and line names.
//!
//! Content files spell hexagram names with legacy character variants and label
//! lines either by traditional name (`初九`) or by position only (`初爻`). All of
//! it is normalized once at load time so every later lookup is an exact match.

use crate::catalog::trigram::Line;

/// Legacy or alternate characters and their canonical replacements.
const VARIANT_CHARS: &[(char, char)] = &[
    ('澤', '沢'),
    ('蛊', '蠱'),
    ('爲', '為'),
    ('晉', '晋'),
    ('壯', '壮'),
    ('歸', '帰'),
    ('豐', '豊'),
    ('濟', '済'),
    ('觀', '観'),
    ('剝', '剥'),
    ('頥', '頤'),
    ('恆', '恒'),
    ('遁', '遯'),
];

/// Normalize a hexagram name: trim, drop interior whitespace (ASCII and
/// full-width) and replace legacy character variants.
pub fn canonical_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            VARIANT_CHARS
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

/// Traditional name of a line from its position (1 = bottom) and value.
///
/// Returns `None` for positions outside `1..=6`.
pub fn line_name(position: u8, line: Line) -> Option<&'static str> {
    let name = match (position, line) {
        (1, Line::Yang) => "初九",
        (1, Line::Yin) => "初六",
        (2, Line::Yang) => "九二",
        (2, Line::Yin) => "六二",
        (3, Line::Yang) => "九三",
        (3, Line::Yin) => "六三",
        (4, Line::Yang) => "九四",
        (4, Line::Yin) => "六四",
        (5, Line::Yang) => "九五",
        (5, Line::Yin) => "六五",
        (6, Line::Yang) => "上九",
        (6, Line::Yin) => "上六",
        _ => return None,
    };
    Some(name)
}

/// A parsed line label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLabel {
    pub position: u8,
    /// Present when the label encodes the line value (`初九`), absent for
    /// position-only labels (`初爻`, `1`).
    pub line: Option<Line>,
}

/// Parse any accepted line label.
pub fn parse_line_label(raw: &str) -> Option<LineLabel> {
    let raw = raw.trim();

    for position in 1..=6u8 {
        for line in [Line::Yang, Line::Yin] {
            if line_name(position, line) == Some(raw) {
                return Some(LineLabel {
                    position,
                    line: Some(line),
                });
            }
        }
    }

    let position = match raw {
        "初爻" | "1" => 1,
        "二爻" | "2" => 2,
        "三爻" | "3" => 3,
        "四爻" | "4" => 4,
        "五爻" | "5" => 5,
        "上爻" | "6" => 6,
        _ => return None,
    };
    Some(LineLabel {
        position,
        line: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_collapse_to_one_spelling() {
        assert_eq!(canonical_name("天澤履"), "天沢履");
        assert_eq!(canonical_name(" 山風蛊 "), "山風蠱");
        assert_eq!(canonical_name("乾\u{3000}為天"), "乾為天");
        assert_eq!(canonical_name("乾爲天"), "乾為天");
        assert_eq!(canonical_name("地天泰"), "地天泰");
    }

    #[test]
    fn line_names_follow_position_and_value() {
        assert_eq!(line_name(1, Line::Yang), Some("初九"));
        assert_eq!(line_name(3, Line::Yin), Some("六三"));
        assert_eq!(line_name(6, Line::Yin), Some("上六"));
        assert_eq!(line_name(0, Line::Yang), None);
        assert_eq!(line_name(7, Line::Yin), None);
    }

    #[test]
    fn parses_traditional_and_position_only_labels() {
        assert_eq!(
            parse_line_label("九五"),
            Some(LineLabel {
                position: 5,
                line: Some(Line::Yang)
            })
        );
        assert_eq!(
            parse_line_label("二爻"),
            Some(LineLabel {
                position: 2,
                line: None
            })
        );
        assert_eq!(parse_line_label("6").map(|l| l.position), Some(6));
        assert_eq!(parse_line_label("七爻"), None);
    }
}
