//! Reference catalogue of the 64 profiles.
//!
//! A [`ReferenceCatalog`] is built once from [`ProfileRecord`]s and never
//! mutated. Construction validates every record against its trigram pair and
//! checks that the 64 line patterns form a bijection with the ids, so the
//! lookups used by the classifier and the transformation tree are total.

pub mod builtin;
pub mod canonical;
pub mod dimension;
pub mod trigram;

pub use canonical::{canonical_name, line_name, parse_line_label};
pub use dimension::{DIMENSION_COUNT, Dimension};
pub use trigram::{Line, Trigram};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ComputationError, ValidationError};

/// Number of profiles in a complete catalogue.
pub const PROFILE_COUNT: usize = 64;

/// Number of lines per profile.
pub const LINE_COUNT: u8 = 6;

/// Six lines packed bottom-to-top into the low bits of a byte (bit 0 = line 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinePattern(u8);

impl LinePattern {
    pub fn from_lines(lines: &[Line; 6]) -> Self {
        let bits = lines
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, line)| acc | (line.bit() << i));
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Line at `position` (1 = bottom). Caller guarantees `1..=6`.
    pub fn line(self, position: u8) -> Line {
        if (self.0 >> (position - 1)) & 1 == 1 {
            Line::Yang
        } else {
            Line::Yin
        }
    }

    pub fn lines(self) -> [Line; 6] {
        std::array::from_fn(|i| self.line(i as u8 + 1))
    }

    /// Pattern with the line at `position` flipped.
    pub fn flip(self, position: u8) -> Self {
        Self(self.0 ^ (1 << (position - 1)))
    }

    /// Same lines read top-to-bottom.
    pub fn reversed(self) -> Self {
        let mut lines = self.lines();
        lines.reverse();
        Self::from_lines(&lines)
    }

    /// Every line flipped.
    pub fn complement(self) -> Self {
        Self(!self.0 & 0b11_1111)
    }

    /// Number of positions where the two patterns differ.
    pub fn differing_lines(self, other: Self) -> u32 {
        ((self.0 ^ other.0) & 0b11_1111).count_ones()
    }
}

impl std::fmt::Display for LinePattern {
    /// Bottom-to-top binary digits, e.g. `011111`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            write!(f, "{}", line.bit())?;
        }
        Ok(())
    }
}

/// Raw catalogue record as stored in `catalog.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: u8,
    pub name: String,
    /// Lower (inner) trigram, by character, image or romanized name.
    pub lower: String,
    /// Upper (outer) trigram.
    pub upper: String,
    /// Optional explicit lines bottom-to-top; checked against the trigrams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<u8>>,
}

/// One of the 64 reference profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceProfile {
    id: u8,
    name: String,
    lines: [Line; 6],
    lower: Trigram,
    upper: Trigram,
}

impl ReferenceProfile {
    /// Build a profile whose lines are derived from its trigram pair.
    pub fn new(
        id: u8,
        name: impl Into<String>,
        lower: Trigram,
        upper: Trigram,
    ) -> Result<Self, CatalogError> {
        if id == 0 || id as usize > PROFILE_COUNT {
            return Err(CatalogError::IdOutOfRange { id });
        }
        let name = canonical_name(&name.into());
        if name.is_empty() {
            return Err(CatalogError::EmptyName { id });
        }

        let [a, b, c] = lower.lines();
        let [d, e, f] = upper.lines();
        Ok(Self {
            id,
            name,
            lines: [a, b, c, d, e, f],
            lower,
            upper,
        })
    }

    /// Validate a raw record, including any explicit lines it carries.
    pub fn from_record(record: &ProfileRecord) -> Result<Self, CatalogError> {
        let lower = Trigram::from_name(&record.lower).ok_or_else(|| {
            CatalogError::UnknownTrigram {
                id: record.id,
                name: record.lower.clone(),
            }
        })?;
        let upper = Trigram::from_name(&record.upper).ok_or_else(|| {
            CatalogError::UnknownTrigram {
                id: record.id,
                name: record.upper.clone(),
            }
        })?;
        let profile = Self::new(record.id, record.name.as_str(), lower, upper)?;

        if let Some(raw) = &record.lines {
            if raw.len() != LINE_COUNT as usize {
                return Err(CatalogError::LineCount {
                    id: record.id,
                    count: raw.len(),
                });
            }
            let mut declared = [Line::Yin; 6];
            for (slot, bit) in declared.iter_mut().zip(raw) {
                *slot = Line::from_bit(*bit).ok_or(CatalogError::LineValue {
                    id: record.id,
                    value: *bit,
                })?;
            }
            if declared != profile.lines {
                return Err(CatalogError::LinesMismatch {
                    id: record.id,
                    lines: LinePattern::from_lines(&declared).to_string(),
                    lower: lower.name().to_string(),
                    upper: upper.name().to_string(),
                });
            }
        }

        Ok(profile)
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lines bottom-to-top.
    pub fn lines(&self) -> &[Line; 6] {
        &self.lines
    }

    pub fn lower(&self) -> Trigram {
        self.lower
    }

    pub fn upper(&self) -> Trigram {
        self.upper
    }

    pub fn pattern(&self) -> LinePattern {
        LinePattern::from_lines(&self.lines)
    }

    /// Line at `position` (1 = bottom).
    pub fn line(&self, position: u8) -> Result<Line, ValidationError> {
        validate_position(position)?;
        Ok(self.lines[position as usize - 1])
    }

    /// Traditional name of the line at `position`, e.g. `初九`.
    pub fn line_name(&self, position: u8) -> Result<&'static str, ValidationError> {
        let line = self.line(position)?;
        line_name(position, line).ok_or(ValidationError::LinePosition { position })
    }

    /// Number of trigram slots (lower, upper) holding the same trigram in both profiles.
    pub fn shared_trigrams(&self, other: &ReferenceProfile) -> u8 {
        u8::from(self.lower == other.lower) + u8::from(self.upper == other.upper)
    }
}

/// Reject line positions outside `1..=6`.
pub fn validate_position(position: u8) -> Result<(), ValidationError> {
    if (1..=LINE_COUNT).contains(&position) {
        Ok(())
    } else {
        Err(ValidationError::LinePosition { position })
    }
}

/// Immutable catalogue of the 64 reference profiles.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    /// Profiles indexed by `id - 1`.
    profiles: Vec<ReferenceProfile>,
    /// Profile id indexed by line pattern bits.
    by_pattern: [u8; PROFILE_COUNT],
    /// Canonical name to id.
    by_name: HashMap<String, u8>,
}

impl ReferenceCatalog {
    /// Validate records and assemble the catalogue.
    ///
    /// Requires exactly 64 records with unique ids, unique canonical names and
    /// unique line patterns.
    pub fn from_records(records: &[ProfileRecord]) -> Result<Self, CatalogError> {
        let mut slots: Vec<Option<ReferenceProfile>> = vec![None; PROFILE_COUNT];
        let mut by_name = HashMap::with_capacity(PROFILE_COUNT);
        let mut by_pattern = [0u8; PROFILE_COUNT];

        for record in records {
            let profile = ReferenceProfile::from_record(record)?;
            let id = profile.id;
            let slot = &mut slots[id as usize - 1];
            if slot.is_some() {
                return Err(CatalogError::DuplicateId { id });
            }

            if let Some(first) = by_name.insert(profile.name.clone(), id) {
                return Err(CatalogError::DuplicateName {
                    name: profile.name.clone(),
                    first,
                    second: id,
                });
            }

            let pattern = profile.pattern();
            let owner = &mut by_pattern[pattern.bits() as usize];
            if *owner != 0 {
                return Err(CatalogError::DuplicatePattern {
                    pattern: pattern.to_string(),
                    first: *owner,
                    second: id,
                });
            }
            *owner = id;

            *slot = Some(profile);
        }

        let count = slots.iter().filter(|s| s.is_some()).count();
        if count != PROFILE_COUNT {
            return Err(CatalogError::Incomplete { count });
        }

        Ok(Self {
            profiles: slots.into_iter().flatten().collect(),
            by_pattern,
            by_name,
        })
    }

    /// The King Wen catalogue compiled into the crate.
    pub fn builtin() -> Self {
        Self::from_records(&builtin::records())
            .unwrap_or_else(|e| unreachable!("built-in catalog is invalid: {e}"))
    }

    /// Profile by id, or a validation error for ids outside `1..=64`.
    pub fn profile(&self, id: u8) -> Result<&ReferenceProfile, ValidationError> {
        if id == 0 {
            return Err(ValidationError::HexagramId { id });
        }
        self.profiles
            .get(id as usize - 1)
            .ok_or(ValidationError::HexagramId { id })
    }

    /// Profile by name; the name is canonicalized first.
    pub fn by_name(&self, name: &str) -> Option<&ReferenceProfile> {
        let id = *self.by_name.get(&canonical_name(name))?;
        self.profiles.get(id as usize - 1)
    }

    /// Resolve a line pattern to the profile that owns it.
    pub fn id_for_pattern(&self, pattern: LinePattern) -> Result<u8, ComputationError> {
        match self.by_pattern.get(pattern.bits() as usize) {
            Some(&id) if id != 0 => Ok(id),
            _ => Err(ComputationError::UnmatchedPattern {
                pattern: pattern.to_string(),
            }),
        }
    }

    /// Next profile in the sequence table; the last wraps to the first.
    pub fn successor(&self, id: u8) -> Result<u8, ComputationError> {
        if id == 0 || id as usize > self.profiles.len() {
            return Err(ComputationError::MissingSuccessor { id });
        }
        Ok(if id as usize == self.profiles.len() {
            1
        } else {
            id + 1
        })
    }

    /// Profiles in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u8, name: &str, lower: &str, upper: &str) -> ProfileRecord {
        ProfileRecord {
            id,
            name: name.to_string(),
            lower: lower.to_string(),
            upper: upper.to_string(),
            lines: None,
        }
    }

    #[test]
    fn builtin_catalog_is_a_bijection() {
        let catalog = ReferenceCatalog::builtin();
        assert_eq!(catalog.len(), PROFILE_COUNT);
        for profile in catalog.iter() {
            assert_eq!(catalog.id_for_pattern(profile.pattern()).unwrap(), profile.id());
        }
    }

    #[test]
    fn well_known_patterns() {
        let catalog = ReferenceCatalog::builtin();
        let qian = catalog.profile(1).unwrap();
        assert_eq!(qian.name(), "乾為天");
        assert_eq!(qian.pattern().to_string(), "111111");
        assert_eq!(catalog.profile(2).unwrap().pattern().to_string(), "000000");

        // 水雷屯: thunder below (100), water above (010).
        assert_eq!(catalog.profile(3).unwrap().pattern().to_string(), "100010");

        // Flipping the bottom line of 乾為天 gives 天風姤.
        let flipped = qian.pattern().flip(1);
        assert_eq!(flipped.to_string(), "011111");
        assert_eq!(catalog.id_for_pattern(flipped).unwrap(), 44);
    }

    #[test]
    fn lookup_by_variant_name() {
        let catalog = ReferenceCatalog::builtin();
        assert_eq!(catalog.by_name("天澤履").map(|p| p.id()), Some(10));
        assert_eq!(catalog.by_name("山風蛊").map(|p| p.id()), Some(18));
        assert!(catalog.by_name("不明").is_none());
    }

    #[test]
    fn successor_wraps_after_last() {
        let catalog = ReferenceCatalog::builtin();
        assert_eq!(catalog.successor(1).unwrap(), 2);
        assert_eq!(catalog.successor(63).unwrap(), 64);
        assert_eq!(catalog.successor(64).unwrap(), 1);
        assert!(catalog.successor(0).is_err());
        assert!(catalog.successor(65).is_err());
    }

    #[test]
    fn profile_id_out_of_range() {
        let catalog = ReferenceCatalog::builtin();
        assert!(matches!(
            catalog.profile(0),
            Err(ValidationError::HexagramId { id: 0 })
        ));
        assert!(matches!(
            catalog.profile(65),
            Err(ValidationError::HexagramId { id: 65 })
        ));
    }

    #[test]
    fn line_names_reflect_values() {
        let catalog = ReferenceCatalog::builtin();
        let tun = catalog.profile(3).unwrap();
        assert_eq!(tun.line_name(1).unwrap(), "初九");
        assert_eq!(tun.line_name(2).unwrap(), "六二");
        assert_eq!(tun.line_name(5).unwrap(), "九五");
        assert_eq!(tun.line_name(6).unwrap(), "上六");
        assert!(tun.line_name(0).is_err());
        assert!(tun.line_name(7).is_err());
    }

    #[test]
    fn explicit_lines_must_match_trigrams() {
        let mut good = record(1, "乾為天", "乾", "乾");
        good.lines = Some(vec![1, 1, 1, 1, 1, 1]);
        assert!(ReferenceProfile::from_record(&good).is_ok());

        let mut bad = good.clone();
        bad.lines = Some(vec![0, 1, 1, 1, 1, 1]);
        assert!(matches!(
            ReferenceProfile::from_record(&bad),
            Err(CatalogError::LinesMismatch { id: 1, .. })
        ));

        let mut short = good.clone();
        short.lines = Some(vec![1, 1, 1]);
        assert!(matches!(
            ReferenceProfile::from_record(&short),
            Err(CatalogError::LineCount { count: 3, .. })
        ));

        let mut weird = good;
        weird.lines = Some(vec![1, 1, 2, 1, 1, 1]);
        assert!(matches!(
            ReferenceProfile::from_record(&weird),
            Err(CatalogError::LineValue { value: 2, .. })
        ));
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(matches!(
            ReferenceProfile::from_record(&record(0, "x", "乾", "乾")),
            Err(CatalogError::IdOutOfRange { id: 0 })
        ));
        assert!(matches!(
            ReferenceProfile::from_record(&record(5, "  ", "乾", "乾")),
            Err(CatalogError::EmptyName { id: 5 })
        ));
        assert!(matches!(
            ReferenceProfile::from_record(&record(5, "x", "乾", "金")),
            Err(CatalogError::UnknownTrigram { .. })
        ));
    }

    #[test]
    fn catalog_rejects_duplicates_and_gaps() {
        let mut records = builtin::records();
        records.pop();
        assert!(matches!(
            ReferenceCatalog::from_records(&records),
            Err(CatalogError::Incomplete { count: 63 })
        ));

        let mut records = builtin::records();
        records[1].id = 1;
        assert!(matches!(
            ReferenceCatalog::from_records(&records),
            Err(CatalogError::DuplicateId { id: 1 })
        ));

        let mut records = builtin::records();
        records[1].name = "乾為天".to_string();
        assert!(matches!(
            ReferenceCatalog::from_records(&records),
            Err(CatalogError::DuplicateName { .. })
        ));

        let mut records = builtin::records();
        records[1].lower = "qian".to_string();
        records[1].upper = "qian".to_string();
        assert!(matches!(
            ReferenceCatalog::from_records(&records),
            Err(CatalogError::DuplicatePattern { first: 1, second: 2, .. })
        ));
    }

    #[test]
    fn pattern_helpers() {
        let p = LinePattern::from_lines(&[
            Line::Yang,
            Line::Yin,
            Line::Yin,
            Line::Yin,
            Line::Yang,
            Line::Yin,
        ]);
        assert_eq!(p.to_string(), "100010");
        assert_eq!(p.reversed().to_string(), "010001");
        assert_eq!(p.complement().to_string(), "011101");
        assert_eq!(p.differing_lines(p.complement()), 6);
        assert_eq!(p.flip(3).flip(3), p);
    }
}
