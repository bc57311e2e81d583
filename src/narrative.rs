//! Narrative corpus keyed by starting profile, starting line and leaf code.
//!
//! Raw keys have the form `"<profile name> <line name> | <code>"`. They are
//! parsed and canonicalized once at load time into [`NarrativeKey`]s, so a
//! lookup is an exact match on `(profile id, line position, code)`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::{LINE_COUNT, ReferenceCatalog, ReferenceProfile, parse_line_label};
use crate::error::{InitializationError, LookupError, Result, ValidationError};
use crate::transformation::LeafCode;

/// Number of entries in a complete corpus: 64 profiles × 6 lines × 8 codes.
pub const CORPUS_SIZE: usize = 64 * LINE_COUNT as usize * LeafCode::ALL.len();

/// Splits a raw key into name, line label and code.
static KEY_RE: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"^\s*(?P<name>.+?)\s+(?P<line>\S+)\s*\|\s*(?P<code>[A-Za-z]+)\s*$").unwrap()
});

/// A corpus value as stored by the content store.
///
/// Plain strings are accepted as-is; authored entries carry the long chain
/// text plus optional side notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNarrative {
    Text(String),
    Authored {
        chain_long: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suitability: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caution: Option<String>,
    },
}

/// Raw corpus as fetched from a content source.
pub type RawCorpus = BTreeMap<String, RawNarrative>;

/// Resolved narrative text for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeEntry {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suitability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caution: Option<String>,
}

impl From<RawNarrative> for NarrativeEntry {
    fn from(raw: RawNarrative) -> Self {
        match raw {
            RawNarrative::Text(text) => Self {
                text: text.trim().to_string(),
                suitability: None,
                caution: None,
            },
            RawNarrative::Authored {
                chain_long,
                suitability,
                caution,
            } => Self {
                text: chain_long.trim().to_string(),
                suitability: suitability.filter(|s| !s.trim().is_empty()),
                caution: caution.filter(|s| !s.trim().is_empty()),
            },
        }
    }
}

/// Canonical lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NarrativeKey {
    pub profile_id: u8,
    pub position: u8,
    pub code: LeafCode,
}

/// Immutable, canonicalized narrative table.
#[derive(Debug, Clone, Default)]
pub struct NarrativeCorpus {
    entries: HashMap<NarrativeKey, NarrativeEntry>,
}

impl NarrativeCorpus {
    /// Parse and canonicalize every raw key against the catalogue.
    ///
    /// Fails on the first malformed key, empty text, or two raw keys that
    /// canonicalize to the same entry. Completeness is checked separately by
    /// [`NarrativeCorpus::verify_complete`].
    pub fn from_raw(
        raw: RawCorpus,
        catalog: &ReferenceCatalog,
    ) -> std::result::Result<Self, InitializationError> {
        let mut entries = HashMap::with_capacity(raw.len());
        let mut origins: HashMap<NarrativeKey, String> = HashMap::with_capacity(raw.len());

        for (raw_key, value) in raw {
            let key = parse_key(&raw_key, catalog)?;
            let entry = NarrativeEntry::from(value);
            if entry.text.is_empty() {
                return Err(InitializationError::EmptyNarrative { key: raw_key });
            }
            if let Some(existing) = origins.get(&key) {
                return Err(InitializationError::DuplicateNarrativeKey {
                    key: raw_key,
                    existing: existing.clone(),
                });
            }
            origins.insert(key, raw_key);
            entries.insert(key, entry);
        }

        tracing::debug!(entries = entries.len(), "Parsed narrative corpus");
        Ok(Self { entries })
    }

    /// Canonical display key, e.g. `乾為天 初九 | HPP`.
    pub fn format_key(
        profile: &ReferenceProfile,
        position: u8,
        code: LeafCode,
    ) -> std::result::Result<String, ValidationError> {
        Ok(format!(
            "{} {} | {}",
            profile.name(),
            profile.line_name(position)?,
            code
        ))
    }

    pub fn get(&self, key: &NarrativeKey) -> Option<&NarrativeEntry> {
        self.entries.get(key)
    }

    /// Required lookup; a missing entry is a [`LookupError`].
    pub fn lookup(
        &self,
        profile: &ReferenceProfile,
        position: u8,
        code: LeafCode,
    ) -> Result<&NarrativeEntry> {
        let key = NarrativeKey {
            profile_id: profile.id(),
            position,
            code,
        };
        match self.entries.get(&key) {
            Some(entry) => Ok(entry),
            None => Err(LookupError::NarrativeMissing {
                key: Self::format_key(profile, position, code)?,
            }
            .into()),
        }
    }

    /// Display keys of every expected entry that is absent, in catalogue order.
    pub fn missing_keys(&self, catalog: &ReferenceCatalog) -> Vec<String> {
        let mut missing = Vec::new();
        for profile in catalog.iter() {
            for position in 1..=LINE_COUNT {
                for code in LeafCode::ALL {
                    let key = NarrativeKey {
                        profile_id: profile.id(),
                        position,
                        code,
                    };
                    if !self.entries.contains_key(&key)
                        && let Ok(display) = Self::format_key(profile, position, code)
                    {
                        missing.push(display);
                    }
                }
            }
        }
        missing
    }

    /// Require an entry for every `(profile, line, code)` combination.
    pub fn verify_complete(
        &self,
        catalog: &ReferenceCatalog,
    ) -> std::result::Result<(), InitializationError> {
        let missing = self.missing_keys(catalog);
        match missing.first() {
            None => Ok(()),
            Some(first) => Err(InitializationError::IncompleteCorpus {
                missing: missing.len(),
                expected: CORPUS_SIZE,
                first_missing: first.clone(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_key(
    raw_key: &str,
    catalog: &ReferenceCatalog,
) -> std::result::Result<NarrativeKey, InitializationError> {
    let malformed = |reason: String| InitializationError::MalformedNarrativeKey {
        key: raw_key.to_string(),
        reason,
    };

    let caps = KEY_RE
        .captures(raw_key)
        .ok_or_else(|| malformed("expected '<name> <line> | <code>'".to_string()))?;

    let name = &caps["name"];
    let profile = catalog
        .by_name(name)
        .ok_or_else(|| malformed(format!("unknown profile name '{name}'")))?;

    let label = parse_line_label(&caps["line"])
        .ok_or_else(|| malformed(format!("unknown line name '{}'", &caps["line"])))?;
    if let Some(declared) = label.line {
        let actual = profile
            .line(label.position)
            .map_err(|e| malformed(e.to_string()))?;
        if declared != actual {
            return Err(malformed(format!(
                "line {} of {} is {:?}, key says {:?}",
                label.position,
                profile.name(),
                actual,
                declared
            )));
        }
    }

    let code: LeafCode = caps["code"].parse().map_err(|e: ValidationError| malformed(e.to_string()))?;

    Ok(NarrativeKey {
        profile_id: profile.id(),
        position: label.position,
        code,
    })
}

/// Complete corpus whose texts are their own canonical keys.
#[cfg(test)]
pub(crate) fn synthetic_corpus(catalog: &ReferenceCatalog) -> RawCorpus {
    let mut raw = RawCorpus::new();
    for profile in catalog.iter() {
        for position in 1..=LINE_COUNT {
            for code in LeafCode::ALL {
                let key = NarrativeCorpus::format_key(profile, position, code).unwrap();
                raw.insert(key.clone(), RawNarrative::Text(key));
            }
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn text(s: &str) -> RawNarrative {
        RawNarrative::Text(s.to_string())
    }

    #[test]
    fn test_synthetic_corpus_is_complete() {
        let catalog = ReferenceCatalog::builtin();
        let corpus = NarrativeCorpus::from_raw(synthetic_corpus(&catalog), &catalog).unwrap();
        assert_eq!(corpus.len(), CORPUS_SIZE);
        assert!(corpus.verify_complete(&catalog).is_ok());
    }

    #[test]
    fn test_legacy_keys_are_canonicalized() {
        let catalog = ReferenceCatalog::builtin();
        let mut raw = RawCorpus::new();
        raw.insert("天澤履 初爻 | JJH".to_string(), text("walk on"));
        raw.insert("乾爲天　九五 | HPP".to_string(), text("soar"));
        let corpus = NarrativeCorpus::from_raw(raw, &catalog).unwrap();

        let lu = catalog.profile(10).unwrap();
        let entry = corpus.lookup(lu, 1, "PPH".parse().unwrap()).unwrap();
        assert_eq!(entry.text, "walk on");

        let qian = catalog.profile(1).unwrap();
        assert_eq!(
            corpus.lookup(qian, 5, "HPP".parse().unwrap()).unwrap().text,
            "soar"
        );
    }

    #[test]
    fn test_authored_entries_keep_side_notes() {
        let raw: RawCorpus = serde_json::from_str(
            r#"{
                "坤為地 初六 | PPP": {
                    "chain_long": " Frost underfoot. ",
                    "suitability": "patient work",
                    "caution": "",
                    "label": "ignored"
                }
            }"#,
        )
        .unwrap();
        let catalog = ReferenceCatalog::builtin();
        let corpus = NarrativeCorpus::from_raw(raw, &catalog).unwrap();
        let entry = corpus
            .lookup(catalog.profile(2).unwrap(), 1, LeafCode::ALL[0])
            .unwrap();
        assert_eq!(entry.text, "Frost underfoot.");
        assert_eq!(entry.suitability.as_deref(), Some("patient work"));
        assert_eq!(entry.caution, None);
    }

    #[test]
    fn test_malformed_keys_are_rejected() {
        let catalog = ReferenceCatalog::builtin();
        for bad in [
            "乾為天 初九 PPP",
            "不明卦 初九 | PPP",
            "乾為天 七爻 | PPP",
            "乾為天 初六 | PPP",
            "乾為天 初九 | PPX",
        ] {
            let mut raw = RawCorpus::new();
            raw.insert(bad.to_string(), text("x"));
            assert!(
                matches!(
                    NarrativeCorpus::from_raw(raw, &catalog),
                    Err(InitializationError::MalformedNarrativeKey { .. })
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_colliding_keys_are_rejected() {
        let catalog = ReferenceCatalog::builtin();
        let mut raw = RawCorpus::new();
        raw.insert("乾為天 初九 | PPP".to_string(), text("a"));
        raw.insert("乾為天 初爻 | JJJ".to_string(), text("b"));
        assert!(matches!(
            NarrativeCorpus::from_raw(raw, &catalog),
            Err(InitializationError::DuplicateNarrativeKey { .. })
        ));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let catalog = ReferenceCatalog::builtin();
        let mut raw = RawCorpus::new();
        raw.insert("乾為天 初九 | PPP".to_string(), text("   "));
        assert!(matches!(
            NarrativeCorpus::from_raw(raw, &catalog),
            Err(InitializationError::EmptyNarrative { .. })
        ));
    }

    #[test]
    fn test_incomplete_corpus_reports_first_gap() {
        let catalog = ReferenceCatalog::builtin();
        let mut raw = synthetic_corpus(&catalog);
        raw.remove("坤為地 六二 | PHP");
        raw.remove("火水未済 上九 | HHH");
        let corpus = NarrativeCorpus::from_raw(raw, &catalog).unwrap();

        match corpus.verify_complete(&catalog) {
            Err(InitializationError::IncompleteCorpus {
                missing,
                expected,
                first_missing,
            }) => {
                assert_eq!(missing, 2);
                assert_eq!(expected, CORPUS_SIZE);
                assert_eq!(first_missing, "坤為地 六二 | PHP");
            }
            other => panic!("expected IncompleteCorpus, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_lookup_names_the_key() {
        let catalog = ReferenceCatalog::builtin();
        let corpus = NarrativeCorpus::default();
        let err = corpus
            .lookup(catalog.profile(1).unwrap(), 1, LeafCode::ALL[4])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Lookup(LookupError::NarrativeMissing { ref key }) if key == "乾為天 初九 | HPP"
        ));
    }
}
