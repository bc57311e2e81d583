//! Nearest-profile classification of questionnaire answers.
//!
//! Answers are folded into a [`TraitVector`] and compared against the cached
//! vector of every reference profile. Selection is deterministic: the highest
//! similarity wins and ties go to the lowest profile id.

pub mod similarity;

pub use similarity::{TraitVector, cosine_similarity, match_percentage};

use std::cmp::Reverse;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{Dimension, ReferenceCatalog, ReferenceProfile};
use crate::error::{ComputationError, Result, ValidationError};

/// Number of candidates returned by [`VectorClassifier::rank`] callers that
/// want the usual shortlist.
pub const DEFAULT_CANDIDATES: usize = 4;

/// Similarities closer than this are treated as a tie.
const SIMILARITY_RESOLUTION: f64 = 1e9;

/// One of the three classification slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Primary drive.
    Engine,
    /// Social presentation.
    Interface,
    /// Stress response.
    SafeMode,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Engine, Role::Interface, Role::SafeMode];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Interface => "interface",
            Self::SafeMode => "safe_mode",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single `(dimension, weight)` contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTag {
    #[serde(alias = "key")]
    pub dimension: String,
    #[serde(alias = "value")]
    pub weight: f64,
}

/// One selected answer with its dimension contributions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    #[serde(default, alias = "dimensionTags", alias = "scoring_tags")]
    pub tags: Vec<DimensionTag>,
}

impl ScoredAnswer {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|(dimension, weight)| DimensionTag {
                    dimension: dimension.into(),
                    weight,
                })
                .collect(),
        }
    }
}

/// Answers already partitioned by role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleAnswers {
    pub engine: Vec<ScoredAnswer>,
    pub interface: Vec<ScoredAnswer>,
    pub safe_mode: Vec<ScoredAnswer>,
}

impl RoleAnswers {
    pub fn for_role(&self, role: Role) -> &[ScoredAnswer] {
        match role {
            Role::Engine => &self.engine,
            Role::Interface => &self.interface,
            Role::SafeMode => &self.safe_mode,
        }
    }
}

/// The best-matching profile for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub role: Role,
    pub profile: ReferenceProfile,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f64,
    /// Similarity rescaled to `[0, 100]`.
    pub match_percentage: f64,
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub profile_id: u8,
    pub name: String,
    pub similarity: f64,
    pub match_percentage: f64,
}

/// Results for all three roles from a single run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripleClassification {
    pub engine: ClassificationResult,
    pub interface: ClassificationResult,
    pub safe_mode: ClassificationResult,
}

impl TripleClassification {
    pub fn get(&self, role: Role) -> &ClassificationResult {
        match role {
            Role::Engine => &self.engine,
            Role::Interface => &self.interface,
            Role::SafeMode => &self.safe_mode,
        }
    }
}

/// Classifier over an immutable catalogue with cached profile vectors.
#[derive(Debug, Clone)]
pub struct VectorClassifier {
    catalog: Arc<ReferenceCatalog>,
    vectors: Vec<TraitVector>,
}

impl VectorClassifier {
    pub fn new(catalog: Arc<ReferenceCatalog>) -> Self {
        let vectors = catalog.iter().map(TraitVector::for_profile).collect();
        Self { catalog, vectors }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    /// Sum every answer's contributions into a trait vector. Weights are kept
    /// as given; only a sum that leaves the finite range is rejected.
    pub fn trait_vector(
        &self,
        answers: &[ScoredAnswer],
    ) -> std::result::Result<TraitVector, ValidationError> {
        let mut vector = TraitVector::default();
        for (answer_index, answer) in answers.iter().enumerate() {
            for tag in &answer.tags {
                let dimension = Dimension::from_name(&tag.dimension).ok_or_else(|| {
                    ValidationError::UnknownDimension {
                        name: tag.dimension.clone(),
                        answer_index,
                    }
                })?;
                if !tag.weight.is_finite() {
                    return Err(ValidationError::NonFiniteWeight {
                        name: tag.dimension.clone(),
                        weight: tag.weight,
                        answer_index,
                    });
                }
                vector.add(dimension, tag.weight);
            }
        }
        if let Some((dimension, _)) = vector.non_finite() {
            return Err(ValidationError::NonFiniteTotal {
                name: dimension.tag().to_string(),
            });
        }
        Ok(vector)
    }

    /// Best-matching profile for `answers` in the given role.
    pub fn classify(&self, answers: &[ScoredAnswer], role: Role) -> Result<ClassificationResult> {
        let ranked = self.rank(answers, role, 1)?;
        let best = ranked
            .into_iter()
            .next()
            .ok_or(ComputationError::ZeroMagnitude {
                role: role.to_string(),
            })?;
        let profile = self.catalog.profile(best.profile_id)?.clone();

        tracing::debug!(
            role = %role,
            profile_id = profile.id(),
            profile = profile.name(),
            similarity = best.similarity,
            "Classified role"
        );

        Ok(ClassificationResult {
            role,
            profile,
            similarity: best.similarity,
            match_percentage: best.match_percentage,
        })
    }

    /// Top `top_n` candidates, highest similarity first, lowest id first among ties.
    pub fn rank(&self, answers: &[ScoredAnswer], role: Role, top_n: usize) -> Result<Vec<Candidate>> {
        let vector = self.trait_vector(answers)?;
        if vector.is_zero() {
            return Err(ComputationError::ZeroMagnitude {
                role: role.to_string(),
            }
            .into());
        }

        let mut scored: Vec<(&ReferenceProfile, f64)> = self
            .catalog
            .iter()
            .zip(&self.vectors)
            .map(|(profile, pv)| (profile, cosine_similarity(vector.as_array(), pv.as_array())))
            .collect();

        scored.sort_by_key(|(profile, sim)| (Reverse(tie_key(*sim)), profile.id()));

        Ok(scored
            .into_iter()
            .take(top_n)
            .map(|(profile, similarity)| Candidate {
                profile_id: profile.id(),
                name: profile.name().to_string(),
                similarity,
                match_percentage: match_percentage(similarity),
            })
            .collect())
    }

    /// Classify all three roles; the first failing role aborts the run.
    pub fn classify_all(&self, answers: &RoleAnswers) -> Result<TripleClassification> {
        Ok(TripleClassification {
            engine: self.classify(answers.for_role(Role::Engine), Role::Engine)?,
            interface: self.classify(answers.for_role(Role::Interface), Role::Interface)?,
            safe_mode: self.classify(answers.for_role(Role::SafeMode), Role::SafeMode)?,
        })
    }
}

/// Similarity quantized for ordering, so float noise cannot split a tie.
fn tie_key(similarity: f64) -> i64 {
    (similarity * SIMILARITY_RESOLUTION).round() as i64
}
