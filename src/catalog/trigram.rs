//! Lines and the eight trigrams.

use serde::{Deserialize, Serialize};

use crate::catalog::dimension::Dimension;

/// A single line of a hexagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    /// Broken line, binary 0.
    Yin = 0,
    /// Solid line, binary 1.
    Yang = 1,
}

impl Line {
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Self::Yin),
            1 => Some(Self::Yang),
            _ => None,
        }
    }

    pub fn bit(self) -> u8 {
        self as u8
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Yin => Self::Yang,
            Self::Yang => Self::Yin,
        }
    }
}

/// One of the eight 3-line sub-patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigram {
    Qian,
    Dui,
    Li,
    Zhen,
    Xun,
    Kan,
    Gen,
    Kun,
}

impl Trigram {
    pub const ALL: [Trigram; 8] = [
        Trigram::Qian,
        Trigram::Dui,
        Trigram::Li,
        Trigram::Zhen,
        Trigram::Xun,
        Trigram::Kan,
        Trigram::Gen,
        Trigram::Kun,
    ];

    /// Lines bottom-to-top.
    pub fn lines(self) -> [Line; 3] {
        use Line::{Yang, Yin};
        match self {
            Self::Qian => [Yang, Yang, Yang],
            Self::Dui => [Yang, Yang, Yin],
            Self::Li => [Yang, Yin, Yang],
            Self::Zhen => [Yang, Yin, Yin],
            Self::Xun => [Yin, Yang, Yang],
            Self::Kan => [Yin, Yang, Yin],
            Self::Gen => [Yin, Yin, Yang],
            Self::Kun => [Yin, Yin, Yin],
        }
    }

    pub fn from_lines(lines: [Line; 3]) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.lines() == lines)
            .unwrap_or(Self::Kun)
    }

    /// Trigram character, e.g. `乾`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Qian => "乾",
            Self::Dui => "兌",
            Self::Li => "離",
            Self::Zhen => "震",
            Self::Xun => "巽",
            Self::Kan => "坎",
            Self::Gen => "艮",
            Self::Kun => "坤",
        }
    }

    /// Natural image used in hexagram names, e.g. `天` for 乾.
    pub fn image(self) -> &'static str {
        match self {
            Self::Qian => "天",
            Self::Dui => "沢",
            Self::Li => "火",
            Self::Zhen => "雷",
            Self::Xun => "風",
            Self::Kan => "水",
            Self::Gen => "山",
            Self::Kun => "地",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qian => "qian",
            Self::Dui => "dui",
            Self::Li => "li",
            Self::Zhen => "zhen",
            Self::Xun => "xun",
            Self::Kan => "kan",
            Self::Gen => "gen",
            Self::Kun => "kun",
        }
    }

    /// The trait dimension anchored to this trigram.
    pub fn dimension(self) -> Dimension {
        match self {
            Self::Qian => Dimension::Creativity,
            Self::Zhen => Dimension::Action,
            Self::Kan => Dimension::Exploration,
            Self::Gen => Dimension::Stability,
            Self::Kun => Dimension::Receptivity,
            Self::Xun => Dimension::Adaptability,
            Self::Li => Dimension::Expression,
            Self::Dui => Dimension::Harmony,
        }
    }

    /// Accepts the character (`乾`), the image (`天`, also `澤`) or the romanized name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name == "澤" {
            return Some(Self::Dui);
        }
        Self::ALL.into_iter().find(|t| {
            t.name() == name || t.image() == name || t.as_str().eq_ignore_ascii_case(name)
        })
    }
}

impl std::fmt::Display for Trigram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}
