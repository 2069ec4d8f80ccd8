//! Static modifier tables: badges, traits, coaching perks, and facilities.
//!
//! Defaults ship as embedded JSON. Callers can replace any table by building a
//! [`ModifierTables`] from their own JSON.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub mod badges;
pub mod coaching;
pub mod conditions;
pub mod conflicts;
pub mod facilities;
pub mod traits;

pub use badges::{BadgeDef, BadgeMode, BadgeTier, MAX_BADGES, TierValues, badge_slot_cap};
pub use coaching::{Coach, CoachingStaff, DefensiveScheme, OffensiveScheme, PerkDef};
pub use conditions::{Condition, Situation};
pub use conflicts::ConflictSet;
pub use facilities::{Facilities, FacilityDef, FacilityKind};
pub use traits::{TraitDef, TraitRarity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
struct BadgeFile {
    badges: Vec<BadgeDef>,
    #[serde(default)]
    conflicts: ConflictSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
struct TraitFile {
    traits: Vec<TraitDef>,
    #[serde(default)]
    conflicts: ConflictSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
struct PerkFile {
    perks: Vec<PerkDef>,
}

/// Every modifier table the adapter consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModifierTables {
    #[serde(default)]
    pub badges: Vec<BadgeDef>,
    #[serde(default)]
    pub badge_conflicts: ConflictSet,
    #[serde(default)]
    pub traits: Vec<TraitDef>,
    #[serde(default)]
    pub trait_conflicts: ConflictSet,
    #[serde(default)]
    pub perks: Vec<PerkDef>,
    #[serde(default)]
    pub facilities: BTreeMap<FacilityKind, FacilityDef>,
}

impl ModifierTables {
    /// Load all tables from a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed or if validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let tables: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        tables.validate()?;
        Ok(tables)
    }

    /// Assemble tables from the per-concern JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if any document fails to parse or the combined tables are invalid.
    pub fn from_parts(
        badges_json: &str,
        traits_json: &str,
        perks_json: &str,
        facilities_json: &str,
    ) -> Result<Self, String> {
        let badges: BadgeFile =
            serde_json::from_str(badges_json).map_err(|e| format!("badges: {e}"))?;
        let traits: TraitFile =
            serde_json::from_str(traits_json).map_err(|e| format!("traits: {e}"))?;
        let perks: PerkFile = serde_json::from_str(perks_json).map_err(|e| format!("perks: {e}"))?;
        let facilities: BTreeMap<FacilityKind, FacilityDef> =
            serde_json::from_str(facilities_json).map_err(|e| format!("facilities: {e}"))?;
        let tables = Self {
            badges: badges.badges,
            badge_conflicts: badges.conflicts,
            traits: traits.traits,
            trait_conflicts: traits.conflicts,
            perks: perks.perks,
            facilities,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Get embedded default tables
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_parts(
            include_str!("../../assets/data/badges.json"),
            include_str!("../../assets/data/traits.json"),
            include_str!("../../assets/data/perks.json"),
            include_str!("../../assets/data/facilities.json"),
        )
        .unwrap_or_else(|e| {
            log::error!("embedded modifier tables failed to load: {e}");
            Self::default()
        })
    }

    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for badge in &self.badges {
            if !seen.insert(badge.id.as_str()) {
                return Err(format!("duplicate badge id: {}", badge.id));
            }
            if !badge.values.is_monotone() {
                return Err(format!("badge {} tier values decrease", badge.id));
            }
        }
        if let Some(id) = self.badge_conflicts.ids().find(|id| !seen.contains(id)) {
            return Err(format!("badge conflict references unknown badge: {id}"));
        }

        let mut seen = HashSet::new();
        for def in &self.traits {
            if !seen.insert(def.id.as_str()) {
                return Err(format!("duplicate trait id: {}", def.id));
            }
        }
        if let Some(id) = self.trait_conflicts.ids().find(|id| !seen.contains(id)) {
            return Err(format!("trait conflict references unknown trait: {id}"));
        }

        let mut seen = HashSet::new();
        for perk in &self.perks {
            if !seen.insert(perk.id.as_str()) {
                return Err(format!("duplicate perk id: {}", perk.id));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn badge(&self, id: &str) -> Option<&BadgeDef> {
        self.badges.iter().find(|badge| badge.id == id)
    }

    #[must_use]
    pub fn trait_def(&self, id: &str) -> Option<&TraitDef> {
        self.traits.iter().find(|def| def.id == id)
    }

    #[must_use]
    pub fn perk(&self, id: &str) -> Option<&PerkDef> {
        self.perks.iter().find(|perk| perk.id == id)
    }

    #[must_use]
    pub fn facility(&self, kind: FacilityKind) -> Option<&FacilityDef> {
        self.facilities.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    #[test]
    fn default_tables_load() {
        let tables = ModifierTables::default_config();
        assert!(tables.validate().is_ok());
        assert!(tables.badges.len() >= 15);
        assert!(tables.traits.len() >= 10);
        assert!(!tables.perks.is_empty());
        assert_eq!(tables.facilities.len(), FacilityKind::ALL.len());
    }

    #[test]
    fn embedded_tables_parse_without_falling_back() {
        let parsed = ModifierTables::from_parts(
            include_str!("../../assets/data/badges.json"),
            include_str!("../../assets/data/traits.json"),
            include_str!("../../assets/data/perks.json"),
            include_str!("../../assets/data/facilities.json"),
        );
        assert_eq!(parsed.as_ref(), Ok(&ModifierTables::default_config()));
        assert_ne!(ModifierTables::default_config(), ModifierTables::default());
    }

    #[test]
    fn red_zone_qb_targets_passing_inside_the_twenty() {
        let tables = ModifierTables::default_config();
        let badge = tables.badge("red_zone_qb").expect("badge present");
        assert_eq!(badge.condition, Condition::RedZone);
        assert!(badge.applies_to(Attribute::ShortAccuracy));
        assert!(!badge.applies_to(Attribute::Speed));
        assert!(badge.values.get(BadgeTier::Gold) > badge.values.get(BadgeTier::Bronze));
    }

    #[test]
    fn shipped_conflicts_cover_known_pairs() {
        let tables = ModifierTables::default_config();
        assert!(tables.badge_conflicts.conflicts("game_manager", "gunslinger"));
        assert!(tables.trait_conflicts.conflicts("injury_prone", "iron_man"));
    }

    #[test]
    fn duplicate_badge_ids_are_rejected() {
        let json = r#"{
            "badges": [
                {"id":"a","name":"A","group":"physical","values":{"bronze":1,"silver":2,"gold":3,"hall_of_fame":4}},
                {"id":"a","name":"A2","group":"physical","values":{"bronze":1,"silver":2,"gold":3,"hall_of_fame":4}}
            ]
        }"#;
        let err = ModifierTables::from_json(json).unwrap_err();
        assert!(err.contains("duplicate badge id"));
    }

    #[test]
    fn conflicts_must_reference_known_ids() {
        let json = r#"{
            "traits": [{"id":"calm","name":"Calm","rarity":"common"}],
            "trait_conflicts": [["calm","ghost"]]
        }"#;
        assert!(ModifierTables::from_json(json).is_err());
    }
}
