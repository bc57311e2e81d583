//! Three-step transformation trees over `(hexagram, line)` states.
//!
//! Two operators act on a state:
//! - Progress (`P`): move one line up; from the top line, move to line 1 of
//!   the next profile in the sequence table.
//! - Change (`H`): flip the current line and resolve the new pattern back to a
//!   profile through the catalogue.
//!
//! Applying both operators three levels deep gives eight leaves, one per
//! [`LeafCode`]. Every leaf must resolve a narrative from the corpus; a single
//! missing entry aborts generation.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{LINE_COUNT, ReferenceCatalog, validate_position};
use crate::error::{Result, ValidationError};
use crate::narrative::{NarrativeCorpus, NarrativeEntry};

/// Depth of every generated tree.
pub const TREE_DEPTH: usize = 3;

/// Number of leaves in every generated tree.
pub const LEAF_COUNT: usize = 1 << TREE_DEPTH;

/// A transformation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Operator {
    Progress,
    Change,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Self::Progress => 'P',
            Self::Change => 'H',
        }
    }

    /// `J` is the legacy spelling of Progress.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            'P' | 'J' => Some(Self::Progress),
            'H' => Some(Self::Change),
            _ => None,
        }
    }
}

/// Path of three operators from the root to a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeafCode([Operator; TREE_DEPTH]);

impl LeafCode {
    /// All eight codes, Progress before Change at every level.
    pub const ALL: [LeafCode; LEAF_COUNT] = {
        use Operator::{Change as H, Progress as P};
        [
            LeafCode([P, P, P]),
            LeafCode([P, P, H]),
            LeafCode([P, H, P]),
            LeafCode([P, H, H]),
            LeafCode([H, P, P]),
            LeafCode([H, P, H]),
            LeafCode([H, H, P]),
            LeafCode([H, H, H]),
        ]
    };

    pub fn new(ops: [Operator; TREE_DEPTH]) -> Self {
        Self(ops)
    }

    pub fn operators(&self) -> &[Operator; TREE_DEPTH] {
        &self.0
    }
}

impl FromStr for LeafCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ValidationError::LeafCode {
            code: s.to_string(),
        };
        let trimmed = s.trim();
        if trimmed.chars().count() != TREE_DEPTH {
            return Err(invalid());
        }
        let mut ops = [Operator::Progress; TREE_DEPTH];
        for (slot, c) in ops.iter_mut().zip(trimmed.chars()) {
            *slot = Operator::from_symbol(c.to_ascii_uppercase()).ok_or_else(invalid)?;
        }
        Ok(Self(ops))
    }
}

impl std::fmt::Display for LeafCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for op in self.0 {
            write!(f, "{}", op.symbol())?;
        }
        Ok(())
    }
}

impl Serialize for LeafCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A `(hexagram, line)` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TransformationNode {
    pub hexagram_id: u8,
    pub line_position: u8,
}

impl TransformationNode {
    pub fn new(hexagram_id: u8, line_position: u8) -> Self {
        Self {
            hexagram_id,
            line_position,
        }
    }
}

/// One terminal outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationLeaf {
    pub code: LeafCode,
    /// State after each of the three steps; the last is the final state.
    pub path: [TransformationNode; TREE_DEPTH],
    pub final_name: String,
    pub final_line_name: &'static str,
    pub narrative: NarrativeEntry,
}

impl TransformationLeaf {
    pub fn final_node(&self) -> TransformationNode {
        self.path[TREE_DEPTH - 1]
    }
}

/// Depth-3 tree rooted at the starting state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationTree {
    pub root: TransformationNode,
    pub root_name: String,
    pub root_line_name: &'static str,
    /// Leaves in [`LeafCode::ALL`] order.
    pub leaves: Vec<TransformationLeaf>,
}

impl TransformationTree {
    pub fn leaf(&self, code: LeafCode) -> Option<&TransformationLeaf> {
        self.leaves.iter().find(|l| l.code == code)
    }
}

/// Builds transformation trees against a loaded catalogue and corpus.
#[derive(Debug, Clone)]
pub struct TransformationTreeGenerator {
    catalog: Arc<ReferenceCatalog>,
    corpus: Arc<NarrativeCorpus>,
}

impl TransformationTreeGenerator {
    pub fn new(catalog: Arc<ReferenceCatalog>, corpus: Arc<NarrativeCorpus>) -> Self {
        Self { catalog, corpus }
    }

    /// Apply one operator to a state.
    pub fn apply(&self, node: TransformationNode, op: Operator) -> Result<TransformationNode> {
        let profile = self.catalog.profile(node.hexagram_id)?;
        validate_position(node.line_position)?;

        let next = match op {
            Operator::Progress if node.line_position < LINE_COUNT => {
                TransformationNode::new(node.hexagram_id, node.line_position + 1)
            }
            Operator::Progress => {
                TransformationNode::new(self.catalog.successor(node.hexagram_id)?, 1)
            }
            Operator::Change => {
                let flipped = profile.pattern().flip(node.line_position);
                TransformationNode::new(self.catalog.id_for_pattern(flipped)?, node.line_position)
            }
        };
        Ok(next)
    }

    /// States visited along `code` from `root`.
    pub fn walk(
        &self,
        root: TransformationNode,
        code: LeafCode,
    ) -> Result<[TransformationNode; TREE_DEPTH]> {
        let mut path = [root; TREE_DEPTH];
        let mut current = root;
        for (slot, op) in path.iter_mut().zip(code.operators()) {
            current = self.apply(current, *op)?;
            *slot = current;
        }
        Ok(path)
    }

    /// Build the full tree from a starting hexagram and line.
    pub fn generate(&self, start_id: u8, start_position: u8) -> Result<TransformationTree> {
        let root_profile = self.catalog.profile(start_id)?;
        let root_line_name = root_profile.line_name(start_position)?;
        let root = TransformationNode::new(start_id, start_position);

        let mut leaves = Vec::with_capacity(LEAF_COUNT);
        for code in LeafCode::ALL {
            let path = self.walk(root, code)?;
            let narrative = self.corpus.lookup(root_profile, start_position, code)?;

            let last = path[TREE_DEPTH - 1];
            let final_profile = self.catalog.profile(last.hexagram_id)?;
            leaves.push(TransformationLeaf {
                code,
                path,
                final_name: final_profile.name().to_string(),
                final_line_name: final_profile.line_name(last.line_position)?,
                narrative: narrative.clone(),
            });
        }

        tracing::debug!(
            hexagram = start_id,
            position = start_position,
            leaves = leaves.len(),
            "Generated transformation tree"
        );

        Ok(TransformationTree {
            root,
            root_name: root_profile.name().to_string(),
            root_line_name,
            leaves,
        })
    }
}
