//! The 8-dimension trait naming scheme.
//!
//! Every dimension is anchored to one trigram. The canonical order below is the
//! order used by trait vectors and is never rearranged.

use serde::{Deserialize, Serialize};

/// Number of trait dimensions.
pub const DIMENSION_COUNT: usize = 8;

/// A named trait dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Creativity, anchored to 乾.
    Creativity = 0,
    /// Action, anchored to 震.
    Action = 1,
    /// Exploration, anchored to 坎.
    Exploration = 2,
    /// Stability, anchored to 艮.
    Stability = 3,
    /// Receptivity, anchored to 坤.
    Receptivity = 4,
    /// Adaptability, anchored to 巽.
    Adaptability = 5,
    /// Expression, anchored to 離.
    Expression = 6,
    /// Harmony, anchored to 兌.
    Harmony = 7,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Dimension; DIMENSION_COUNT] = [
        Dimension::Creativity,
        Dimension::Action,
        Dimension::Exploration,
        Dimension::Stability,
        Dimension::Receptivity,
        Dimension::Adaptability,
        Dimension::Expression,
        Dimension::Harmony,
    ];

    /// Position of this dimension in a trait vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tag used by the questionnaire content, e.g. `乾_創造性`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Creativity => "乾_創造性",
            Self::Action => "震_行動性",
            Self::Exploration => "坎_探求性",
            Self::Stability => "艮_安定性",
            Self::Receptivity => "坤_受容性",
            Self::Adaptability => "巽_適応性",
            Self::Expression => "離_表現性",
            Self::Harmony => "兌_調和性",
        }
    }

    /// English identifier, e.g. `creativity`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creativity => "creativity",
            Self::Action => "action",
            Self::Exploration => "exploration",
            Self::Stability => "stability",
            Self::Receptivity => "receptivity",
            Self::Adaptability => "adaptability",
            Self::Expression => "expression",
            Self::Harmony => "harmony",
        }
    }

    /// Resolve a dimension from either its questionnaire tag or its English identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.tag() == name || d.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
