//! HaQei triple-role classification engine.
//!
//! Questionnaire answers are classified into three roles against a catalogue
//! of 64 reference profiles, the three results are analyzed pairwise for
//! compatibility, and any `(profile, line)` state can be projected through an
//! eight-leaf transformation tree with narrative text for every outcome.
//!
//! All reference data is loaded once through an [`engine::Engine`] and is
//! immutable afterwards.

pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod compatibility;
pub mod config;
pub mod engine;
pub mod error;
pub mod narrative;
pub mod source;
pub mod transformation;

pub use catalog::{ReferenceCatalog, ReferenceProfile};
pub use classifier::{ClassificationResult, Role, RoleAnswers, ScoredAnswer, VectorClassifier};
pub use compatibility::{
    Category, CompatibilityAnalyzer, CompatibilityPair, CompatibilityReport, RoleImbalance,
};
pub use config::EngineConfig;
pub use engine::{Engine, LoadOptions, Readiness, ReferenceContext};
pub use error::{Error, ErrorKind, Result};
pub use narrative::NarrativeCorpus;
pub use source::{ContentSource, FileContentSource, StaticContentSource};
pub use transformation::{LeafCode, TransformationTree, TransformationTreeGenerator};
