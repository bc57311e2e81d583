//! Pairwise interaction analysis across the three classified roles.
//!
//! Scoring is structural and symmetric in its two profiles:
//! - Shared trigram (same slot, same trigram): +1.0 synergy each
//! - Differing line: +0.5 synergy each
//! - Inverse pair (one profile is the other read top-down): +1.0 synergy
//! - Matching line outside a shared trigram: +0.75 conflict each
//!
//! The net score `synergy - conflict` is banded into a [`Category`]. A profile
//! paired with itself is always [`Category::Chaos`].

use serde::Serialize;

use crate::catalog::ReferenceProfile;
use crate::classifier::{ClassificationResult, Role};
use crate::error::ValidationError;

const SHARED_TRIGRAM_SYNERGY: f64 = 1.0;
const DIFFERING_LINE_SYNERGY: f64 = 0.5;
const INVERSE_SYNERGY: f64 = 1.0;
const MATCHING_LINE_CONFLICT: f64 = 0.75;

/// Net scores below this are [`Category::Conflict`].
pub const CONFLICT_BELOW: f64 = -0.5;
/// Net scores below this (and not conflict) are [`Category::Tension`].
pub const TENSION_BELOW: f64 = 0.75;
/// Net scores below this (and not tension) are [`Category::Harmony`]; the rest are synergy.
pub const HARMONY_BELOW: f64 = 2.0;

/// Match-percentage spread above which one role is flagged as dominating another.
pub const IMBALANCE_SPREAD: f64 = 50.0;

/// Fixed order in which role pairs are reported.
pub const ROLE_PAIRS: [(Role, Role); 3] = [
    (Role::Engine, Role::Interface),
    (Role::Engine, Role::SafeMode),
    (Role::Interface, Role::SafeMode),
];

/// Interaction category, ordered from most to least adversarial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Conflict,
    Tension,
    Chaos,
    Harmony,
    Synergy,
}

impl Category {
    /// Band a net score. Total over every finite score.
    pub fn from_net(net: f64) -> Self {
        if net < CONFLICT_BELOW {
            Self::Conflict
        } else if net < TENSION_BELOW {
            Self::Tension
        } else if net < HARMONY_BELOW {
            Self::Harmony
        } else {
            Self::Synergy
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "CONFLICT",
            Self::Tension => "TENSION",
            Self::Chaos => "CHAOS",
            Self::Harmony => "HARMONY",
            Self::Synergy => "SYNERGY",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Conflict => "pull in opposite directions and need deliberate mediation",
            Self::Tension => "rub against each other; the friction can be productive",
            Self::Chaos => "mirror each other exactly, amplifying one pattern without balance",
            Self::Harmony => "sit comfortably together",
            Self::Synergy => "complement each other and reinforce their strengths",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Structural relationship between two profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Relationship {
    pub identical: bool,
    /// Lines of one are the other's read top-to-bottom.
    pub inverse: bool,
    /// Every line differs.
    pub opposite: bool,
    /// Adjacent in the sequence table.
    pub neighbour: bool,
}

/// Scores for one unordered pair of profiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub shared_trigrams: u8,
    pub differing_lines: u8,
    pub relationship: Relationship,
    pub synergy: f64,
    pub conflict: f64,
    pub category: Category,
}

impl PairScore {
    pub fn net(&self) -> f64 {
        self.synergy - self.conflict
    }
}

/// Score two profiles. Symmetric in its arguments.
pub fn analyze_pair(a: &ReferenceProfile, b: &ReferenceProfile) -> PairScore {
    let pa = a.pattern();
    let pb = b.pattern();

    let shared = a.shared_trigrams(b);
    let differing = pa.differing_lines(pb) as u8;
    let identical = pa == pb;
    let relationship = Relationship {
        identical,
        inverse: !identical && pa.reversed() == pb,
        opposite: differing == 6,
        neighbour: a.id().abs_diff(b.id()) == 1,
    };

    let matching_outside_shared = (6 - differing) - 3 * shared;
    let mut synergy = SHARED_TRIGRAM_SYNERGY * f64::from(shared)
        + DIFFERING_LINE_SYNERGY * f64::from(differing);
    if relationship.inverse {
        synergy += INVERSE_SYNERGY;
    }
    let conflict = MATCHING_LINE_CONFLICT * f64::from(matching_outside_shared);

    let category = if identical {
        Category::Chaos
    } else {
        Category::from_net(synergy - conflict)
    };

    PairScore {
        shared_trigrams: shared,
        differing_lines: differing,
        relationship,
        synergy,
        conflict,
        category,
    }
}

/// Interaction verdict for two roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityPair {
    pub role_a: Role,
    pub role_b: Role,
    pub profile_a: u8,
    pub profile_b: u8,
    pub category: Category,
    pub synergy_score: f64,
    pub conflict_score: f64,
    pub net_score: f64,
    pub relationship: Relationship,
    pub summary: String,
}

/// Two roles whose match percentages sit more than [`IMBALANCE_SPREAD`] apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoleImbalance {
    /// Role with the highest match percentage.
    pub dominant: Role,
    /// Role with the lowest match percentage.
    pub weak: Role,
    pub spread: f64,
}

/// Full analysis of a classification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    /// Engine/Interface, Engine/SafeMode, Interface/SafeMode.
    pub pairs: [CompatibilityPair; 3],
    /// Net scores indexed by role; symmetric with a zero diagonal.
    pub matrix: [[f64; 3]; 3],
    /// Mean net score across the three pairs.
    pub overall_balance: f64,
    /// `max(0, -overall_balance)`.
    pub conflict_level: f64,
    /// The mean net score falls in the synergy band.
    pub high_synergy: bool,
    pub imbalance: Option<RoleImbalance>,
    pub overall_summary: String,
}

impl CompatibilityReport {
    pub fn pair(&self, a: Role, b: Role) -> Option<&CompatibilityPair> {
        self.pairs
            .iter()
            .find(|p| (p.role_a == a && p.role_b == b) || (p.role_a == b && p.role_b == a))
    }
}

/// Stateless analyzer over classification results.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityAnalyzer;

impl CompatibilityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze three results passed in their role slots.
    pub fn analyze(
        &self,
        engine: &ClassificationResult,
        interface: &ClassificationResult,
        safe_mode: &ClassificationResult,
    ) -> Result<CompatibilityReport, ValidationError> {
        let slots = [engine, interface, safe_mode];
        for (expected, result) in Role::ALL.iter().zip(slots) {
            if result.role != *expected {
                return Err(ValidationError::RoleMismatch {
                    expected: expected.to_string(),
                    actual: result.role.to_string(),
                });
            }
        }
        Ok(self.build_report(slots))
    }

    /// Analyze an unordered slice that must hold exactly one result per role.
    pub fn analyze_results(
        &self,
        results: &[ClassificationResult],
    ) -> Result<CompatibilityReport, ValidationError> {
        if results.len() != Role::ALL.len() {
            return Err(ValidationError::RoleCount {
                count: results.len(),
            });
        }

        let mut slots: [Option<&ClassificationResult>; 3] = [None; 3];
        for result in results {
            let slot = &mut slots[result.role.index()];
            if slot.is_some() {
                return Err(ValidationError::DuplicateRole {
                    role: result.role.to_string(),
                });
            }
            *slot = Some(result);
        }

        match slots {
            [Some(engine), Some(interface), Some(safe_mode)] => {
                self.analyze(engine, interface, safe_mode)
            }
            // Three results with no duplicates cover every role.
            _ => Err(ValidationError::RoleCount {
                count: results.len(),
            }),
        }
    }

    fn build_report(&self, slots: [&ClassificationResult; 3]) -> CompatibilityReport {
        let pairs = ROLE_PAIRS.map(|(a, b)| {
            let ra = slots[a.index()];
            let rb = slots[b.index()];
            let score = analyze_pair(&ra.profile, &rb.profile);
            let net = score.net();

            tracing::debug!(
                role_a = %a,
                role_b = %b,
                category = %score.category,
                net,
                "Scored role pair"
            );

            CompatibilityPair {
                role_a: a,
                role_b: b,
                profile_a: ra.profile.id(),
                profile_b: rb.profile.id(),
                category: score.category,
                synergy_score: score.synergy,
                conflict_score: score.conflict,
                net_score: net,
                relationship: score.relationship,
                summary: format!(
                    "{a} ({}) and {b} ({}) {}: {} (net {net:+.2})",
                    ra.profile.name(),
                    rb.profile.name(),
                    score.category.describe(),
                    score.category,
                ),
            }
        });

        let mut matrix = [[0.0; 3]; 3];
        for pair in &pairs {
            let (i, j) = (pair.role_a.index(), pair.role_b.index());
            matrix[i][j] = pair.net_score;
            matrix[j][i] = pair.net_score;
        }

        let overall_balance = pairs.iter().map(|p| p.net_score).sum::<f64>() / pairs.len() as f64;
        let conflict_level = (-overall_balance).max(0.0);
        let high_synergy = Category::from_net(overall_balance) == Category::Synergy;
        let imbalance = role_imbalance(slots);
        let mut overall_summary = overall_summary(&pairs, overall_balance);
        if let Some(imbalance) = &imbalance {
            overall_summary.push_str(&format!(
                " {} outweighs {} by {:.1} points.",
                imbalance.dominant, imbalance.weak, imbalance.spread
            ));
        }

        CompatibilityReport {
            pairs,
            matrix,
            overall_balance,
            conflict_level,
            high_synergy,
            imbalance,
            overall_summary,
        }
    }
}

/// Strongest and weakest role by match percentage, when they are too far apart.
/// The earliest role wins ties on either end.
fn role_imbalance(slots: [&ClassificationResult; 3]) -> Option<RoleImbalance> {
    let mut dominant = slots[0];
    let mut weak = slots[0];
    for result in &slots[1..] {
        if result.match_percentage > dominant.match_percentage {
            dominant = result;
        }
        if result.match_percentage < weak.match_percentage {
            weak = result;
        }
    }

    let spread = dominant.match_percentage - weak.match_percentage;
    (spread > IMBALANCE_SPREAD).then_some(RoleImbalance {
        dominant: dominant.role,
        weak: weak.role,
        spread,
    })
}

fn overall_summary(pairs: &[CompatibilityPair; 3], balance: f64) -> String {
    let weakest = pairs
        .iter()
        .min_by(|x, y| x.net_score.total_cmp(&y.net_score))
        .map(|p| format!("{}/{}", p.role_a, p.role_b))
        .unwrap_or_default();
    let tone = Category::from_net(balance);
    let chaos = pairs.iter().filter(|p| p.category == Category::Chaos).count();

    let mut summary = format!(
        "Overall balance {balance:+.2} ({tone}); weakest link is {weakest}."
    );
    if chaos > 0 {
        summary.push_str(&format!(
            " {chaos} pair(s) repeat the same profile across roles."
        ));
    }
    summary
}
