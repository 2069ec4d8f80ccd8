//! Mutually exclusive badge and trait pairs.
use serde::{Deserialize, Serialize};

/// Symmetric conflict relation over modifier ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConflictSet(pub Vec<[String; 2]>);

impl ConflictSet {
    #[must_use]
    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.0
            .iter()
            .any(|[x, y]| (x == a && y == b) || (x == b && y == a))
    }

    /// First conflicting pair within `ids`, scanning every pair once.
    #[must_use]
    pub fn first_conflict<'a>(&self, ids: &[&'a str]) -> Option<(&'a str, &'a str)> {
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                if self.conflicts(a, b) {
                    return Some((*a, *b));
                }
            }
        }
        None
    }

    /// Ids referenced by the relation.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().flat_map(|[a, b]| [a.as_str(), b.as_str()])
    }
}
