//! The King Wen catalogue compiled into the crate.
//!
//! Entries are `(name, lower trigram, upper trigram)` in sequence order; the
//! position in the table plus one is the profile id.

use crate::catalog::ProfileRecord;
use crate::catalog::trigram::Trigram::{self, Dui, Gen, Kan, Kun, Li, Qian, Xun, Zhen};

pub(crate) const KING_WEN: [(&str, Trigram, Trigram); 64] = [
    ("乾為天", Qian, Qian),
    ("坤為地", Kun, Kun),
    ("水雷屯", Zhen, Kan),
    ("山水蒙", Kan, Gen),
    ("水天需", Qian, Kan),
    ("天水訟", Kan, Qian),
    ("地水師", Kan, Kun),
    ("水地比", Kun, Kan),
    ("風天小畜", Qian, Xun),
    ("天沢履", Dui, Qian),
    ("地天泰", Qian, Kun),
    ("天地否", Kun, Qian),
    ("天火同人", Li, Qian),
    ("火天大有", Qian, Li),
    ("地山謙", Gen, Kun),
    ("雷地豫", Kun, Zhen),
    ("沢雷随", Zhen, Dui),
    ("山風蠱", Xun, Gen),
    ("地沢臨", Dui, Kun),
    ("風地観", Kun, Xun),
    ("火雷噬嗑", Zhen, Li),
    ("山火賁", Li, Gen),
    ("山地剥", Kun, Gen),
    ("地雷復", Zhen, Kun),
    ("天雷无妄", Zhen, Qian),
    ("山天大畜", Qian, Gen),
    ("山雷頤", Zhen, Gen),
    ("沢風大過", Xun, Dui),
    ("坎為水", Kan, Kan),
    ("離為火", Li, Li),
    ("沢山咸", Gen, Dui),
    ("雷風恒", Xun, Zhen),
    ("天山遯", Gen, Qian),
    ("雷天大壮", Qian, Zhen),
    ("火地晋", Kun, Li),
    ("地火明夷", Li, Kun),
    ("風火家人", Li, Xun),
    ("火沢睽", Dui, Li),
    ("水山蹇", Gen, Kan),
    ("雷水解", Kan, Zhen),
    ("山沢損", Dui, Gen),
    ("風雷益", Zhen, Xun),
    ("沢天夬", Qian, Dui),
    ("天風姤", Xun, Qian),
    ("沢地萃", Kun, Dui),
    ("地風升", Xun, Kun),
    ("沢水困", Kan, Dui),
    ("水風井", Xun, Kan),
    ("沢火革", Li, Dui),
    ("火風鼎", Xun, Li),
    ("震為雷", Zhen, Zhen),
    ("艮為山", Gen, Gen),
    ("風山漸", Gen, Xun),
    ("雷沢帰妹", Dui, Zhen),
    ("雷火豊", Li, Zhen),
    ("火山旅", Gen, Li),
    ("巽為風", Xun, Xun),
    ("兌為沢", Dui, Dui),
    ("風水渙", Kan, Xun),
    ("水沢節", Dui, Kan),
    ("風沢中孚", Dui, Xun),
    ("雷山小過", Gen, Zhen),
    ("水火既済", Li, Kan),
    ("火水未済", Kan, Li),
];

/// Records for the built-in catalogue, lines omitted (derived from the trigrams).
pub fn records() -> Vec<ProfileRecord> {
    KING_WEN
        .iter()
        .enumerate()
        .map(|(i, (name, lower, upper))| ProfileRecord {
            id: (i + 1) as u8,
            name: (*name).to_string(),
            lower: lower.as_str().to_string(),
            upper: upper.as_str().to_string(),
            lines: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_trigram_pair_appears_once() {
        let pairs: HashSet<(Trigram, Trigram)> =
            KING_WEN.iter().map(|(_, lower, upper)| (*lower, *upper)).collect();
        assert_eq!(pairs.len(), 64);
    }

    #[test]
    fn names_start_with_upper_image() {
        for (name, lower, upper) in KING_WEN.iter() {
            if lower == upper {
                assert!(name.ends_with(upper.image()), "{name}");
            } else {
                assert!(name.starts_with(upper.image()), "{name}");
                assert!(name[upper.image().len()..].starts_with(lower.image()), "{name}");
            }
        }
    }
}
