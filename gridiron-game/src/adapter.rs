//! Converts persisted roster records into the simulator's team representation.
//!
//! Always-on traits are folded into each player's base vector once. Everything that
//! depends on the game situation is kept as a list of conditional modifiers and applied
//! per play by [`SimTeam::unit_ratings`].
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::attributes::{Attribute, AttributeVector};
use crate::error::RosterError;
use crate::modifiers::{
    BadgeMode, CoachingStaff, Condition, Facilities, FacilityKind, ModifierTables,
    OffensiveScheme, Situation, badge_slot_cap,
};
use crate::numbers::round_to_rating;
use crate::roster::{Conference, Division, PlayerId, PlayerRecord, Position, TeamId, TeamRecord};
use crate::units::{Slot, Unit, UnitRatings};
use crate::weather::{Climate, WeatherEffect};

/// Unit points lost in the fourth quarter and overtime before medical relief.
const LATE_GAME_FATIGUE: f32 = 1.5;
/// Unit points per point of aggregate morale, and its bound.
const MORALE_WEIGHT: f32 = 0.1;
const MORALE_CAP: f32 = 1.0;

/// Situational attribute modifier from a badge or conditional trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalMod {
    pub source: String,
    pub condition: Condition,
    pub attributes: Vec<Attribute>,
    pub value: f32,
    pub mode: BadgeMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimPlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub overall: u8,
    /// Ratings with always-on traits applied.
    pub base: AttributeVector,
    pub conditional: Vec<ConditionalMod>,
    pub morale: i32,
}

impl SimPlayer {
    /// Attributes with every modifier active in `situation` applied.
    ///
    /// Additive modifiers stack first, then percentage modifiers.
    #[must_use]
    pub fn effective(&self, situation: &Situation) -> AttributeVector {
        let mut attrs = self.base;
        let active = || {
            self.conditional
                .iter()
                .filter(|m| m.condition.holds(situation))
        };
        for m in active().filter(|m| m.mode == BadgeMode::Additive) {
            for attr in &m.attributes {
                attrs.add(*attr, m.value);
            }
        }
        for m in active().filter(|m| m.mode == BadgeMode::Percent) {
            for attr in &m.attributes {
                attrs.scale(*attr, m.value);
            }
        }
        attrs
    }

    fn has_active(&self, situation: &Situation) -> bool {
        self.conditional
            .iter()
            .any(|m| m.condition.holds(situation))
    }
}

/// Play-calling tendencies from the coaching staff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tendencies {
    pub pass_ratio: f64,
    pub deep_share: f64,
    pub fourth_down_aggression: f64,
}

impl Default for Tendencies {
    fn default() -> Self {
        let scheme = OffensiveScheme::Balanced;
        Self {
            pass_ratio: scheme.pass_ratio(),
            deep_share: scheme.deep_share(),
            fourth_down_aggression: 0.0,
        }
    }
}

/// Per-play inputs the team cannot know on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingContext {
    pub situation: Situation,
    /// League home-field bonus when this team hosts at a non-neutral site.
    pub home_field: Option<f32>,
    pub weather: WeatherEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimTeam {
    pub id: TeamId,
    pub abbreviation: String,
    pub name: String,
    pub conference: Conference,
    pub division: Division,
    pub climate: Climate,
    pub overall: u8,
    pub players: Vec<SimPlayer>,
    pub depth_chart: BTreeMap<Slot, usize>,
    /// Coaching, facility, and morale bonuses per unit.
    pub unit_bonus: UnitRatings,
    pub home_field_bonus: f32,
    pub fatigue_relief: f32,
    pub tendencies: Tendencies,
    #[serde(default)]
    pub bye_week: Option<u8>,
    base_units: UnitRatings,
}

impl SimTeam {
    /// Build the simulator form of a team, validating every loadout.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` for unknown or conflicting badges/traits, badge counts above
    /// the player's cap, or a starting slot no rostered player can fill.
    pub fn from_record(record: &TeamRecord, tables: &ModifierTables) -> Result<Self, RosterError> {
        let mut players = Vec::with_capacity(record.roster.len());
        for player in &record.roster {
            validate_loadout(player, tables)?;
            players.push(build_player(player, tables));
        }
        let depth_chart = build_depth_chart(record.id, &players)?;

        let mut unit_bonus = UnitRatings::default();
        let mut tendencies = Tendencies::default();
        if let Some(staff) = &record.coaching {
            apply_coaching(staff, tables, &mut unit_bonus, &mut tendencies);
        }
        let facilities = record.facilities.unwrap_or_default();
        let (home_field_bonus, fatigue_relief) =
            apply_facilities(&facilities, tables, &mut unit_bonus);
        let morale: i32 = players.iter().map(|p| p.morale).sum();
        #[allow(clippy::cast_precision_loss)]
        let morale_bonus = (morale as f32 * MORALE_WEIGHT).clamp(-MORALE_CAP, MORALE_CAP);
        unit_bonus.add_all(morale_bonus);

        let mut team = Self {
            id: record.id,
            abbreviation: record.abbreviation.clone(),
            name: record.display_name(),
            conference: record.conference,
            division: record.division,
            climate: record.climate,
            overall: 0,
            players,
            depth_chart,
            unit_bonus,
            home_field_bonus,
            fatigue_relief,
            tendencies,
            bye_week: None,
            base_units: UnitRatings::default(),
        };
        team.base_units = team.raw_units(&Situation::neutral(), false);
        team.overall = round_to_rating(f64::from(team.base_units.overall()));
        Ok(team)
    }

    #[must_use]
    pub fn starter(&self, slot: Slot) -> Option<&SimPlayer> {
        self.depth_chart
            .get(&slot)
            .and_then(|idx| self.players.get(*idx))
    }

    #[must_use]
    pub fn starter_id(&self, slot: Slot) -> Option<PlayerId> {
        self.starter(slot).map(|p| p.id)
    }

    /// Effective attributes of the player in `slot` for a situation.
    #[must_use]
    pub fn effective_attributes(&self, slot: Slot, situation: &Situation) -> Option<AttributeVector> {
        self.starter(slot).map(|p| p.effective(situation))
    }

    /// Unit ratings without any situational modifier.
    #[must_use]
    pub const fn base_units(&self) -> UnitRatings {
        self.base_units
    }

    fn raw_units(&self, situation: &Situation, use_cache: bool) -> UnitRatings {
        let active: Vec<bool> = self
            .players
            .iter()
            .map(|p| p.has_active(situation))
            .collect();
        if use_cache && !active.iter().any(|a| *a) {
            return self.base_units;
        }
        let mut effective: BTreeMap<usize, AttributeVector> = BTreeMap::new();
        let mut ratings = UnitRatings::default();
        for unit in Unit::ALL {
            let mut total = 0.0;
            for (slot, weight) in unit.contributors() {
                let Some(idx) = self.depth_chart.get(slot).copied() else {
                    continue;
                };
                let Some(player) = self.players.get(idx) else {
                    continue;
                };
                let attrs = if active.get(idx).copied().unwrap_or(false) {
                    *effective
                        .entry(idx)
                        .or_insert_with(|| player.effective(situation))
                } else {
                    player.base
                };
                total += unit.score(&attrs) * weight;
            }
            ratings.set(unit, total);
        }
        ratings
    }

    /// Fully modified unit ratings for one play.
    #[must_use]
    pub fn unit_ratings(&self, ctx: &RatingContext) -> UnitRatings {
        let mut ratings = self.raw_units(&ctx.situation, true);
        for unit in Unit::ALL {
            ratings.add(unit, self.unit_bonus.get(unit));
        }
        if let Some(home_field) = ctx.home_field {
            ratings.add_all(home_field + self.home_field_bonus);
        }
        if ctx.situation.quarter >= 4 {
            ratings.add_all(-LATE_GAME_FATIGUE * (1.0 - self.fatigue_relief).clamp(0.0, 1.0));
        }
        for unit in [Unit::Passing, Unit::Receiving] {
            ratings.scale(unit, ctx.weather.passing);
        }
        for unit in [Unit::Kicking, Unit::Punting] {
            ratings.scale(unit, ctx.weather.kicking);
        }
        ratings
    }
}

/// Build simulator teams for a whole league.
///
/// # Errors
///
/// Returns the first `RosterError` encountered.
pub fn build_teams(
    records: &[TeamRecord],
    tables: &ModifierTables,
) -> Result<Vec<SimTeam>, RosterError> {
    records
        .iter()
        .map(|record| SimTeam::from_record(record, tables))
        .collect()
}

/// Overall rating for a player at his listed position.
#[must_use]
pub fn position_overall(position: Position, attrs: &AttributeVector) -> u8 {
    let score = match position {
        Position::QB => Unit::Passing.score(attrs),
        Position::RB => Unit::Rushing
            .score(attrs)
            .mul_add(0.8, Unit::BallSecurity.score(attrs) * 0.2),
        Position::WR | Position::TE => Unit::Receiving.score(attrs),
        Position::OT | Position::OG | Position::C => {
            (Unit::PassBlock.score(attrs) + Unit::RunBlock.score(attrs)) / 2.0
        }
        Position::DE | Position::DT => {
            (Unit::PassRush.score(attrs) + Unit::RunDefense.score(attrs)) / 2.0
        }
        Position::LB => (Unit::RunDefense.score(attrs) * 2.0 + Unit::Coverage.score(attrs)) / 3.0,
        Position::CB | Position::S => Unit::Coverage.score(attrs),
        Position::K => Unit::Kicking.score(attrs),
        Position::P => Unit::Punting.score(attrs),
    };
    round_to_rating(f64::from(score))
}

/// Check a player's badges and traits against the tables, caps, and conflicts.
///
/// # Errors
///
/// Returns the first violated `RosterError`.
pub fn validate_loadout(player: &PlayerRecord, tables: &ModifierTables) -> Result<(), RosterError> {
    for (i, badge) in player.badges.iter().enumerate() {
        if tables.badge(&badge.id).is_none() {
            return Err(RosterError::UnknownBadge {
                player: player.id,
                badge: badge.id.clone(),
            });
        }
        if player.badges[..i].iter().any(|b| b.id == badge.id) {
            return Err(RosterError::DuplicateBadge {
                player: player.id,
                badge: badge.id.clone(),
            });
        }
    }
    let overall = player
        .overall
        .unwrap_or_else(|| position_overall(player.position, &player.ratings.to_dense()));
    let cap = badge_slot_cap(overall, player.experience);
    if player.badges.len() > cap {
        return Err(RosterError::TooManyBadges {
            player: player.id,
            count: player.badges.len(),
            cap,
        });
    }
    let badge_ids: Vec<&str> = player.badges.iter().map(|b| b.id.as_str()).collect();
    if let Some((first, second)) = tables.badge_conflicts.first_conflict(&badge_ids) {
        return Err(RosterError::BadgeConflict {
            player: player.id,
            first: first.to_string(),
            second: second.to_string(),
        });
    }

    if let Some(unknown) = player.traits.iter().find(|t| tables.trait_def(t).is_none()) {
        return Err(RosterError::UnknownTrait {
            player: player.id,
            trait_id: unknown.clone(),
        });
    }
    let trait_ids: Vec<&str> = player.traits.iter().map(String::as_str).collect();
    if let Some((first, second)) = tables.trait_conflicts.first_conflict(&trait_ids) {
        return Err(RosterError::TraitConflict {
            player: player.id,
            first: first.to_string(),
            second: second.to_string(),
        });
    }
    Ok(())
}

fn build_player(record: &PlayerRecord, tables: &ModifierTables) -> SimPlayer {
    let mut base = record.ratings.to_dense();
    let mut conditional = Vec::new();
    let mut morale = 0;

    for id in &record.traits {
        let Some(def) = tables.trait_def(id) else {
            continue;
        };
        morale += i32::from(def.morale);
        if def.is_always_on() {
            for (attr, delta) in def.scaled_deltas() {
                base.add(attr, delta);
            }
        } else {
            for (attr, delta) in def.scaled_deltas() {
                conditional.push(ConditionalMod {
                    source: def.id.clone(),
                    condition: def.condition,
                    attributes: vec![attr],
                    value: delta,
                    mode: BadgeMode::Additive,
                });
            }
        }
    }

    for equipped in &record.badges {
        let Some(def) = tables.badge(&equipped.id) else {
            continue;
        };
        conditional.push(ConditionalMod {
            source: def.id.clone(),
            condition: def.condition,
            attributes: def.affected().collect(),
            value: def.values.get(equipped.tier),
            mode: def.mode,
        });
    }

    let overall = record
        .overall
        .unwrap_or_else(|| position_overall(record.position, &base));
    SimPlayer {
        id: record.id,
        name: record.name.clone(),
        position: record.position,
        overall,
        base,
        conditional,
        morale,
    }
}

/// Assign starters: best overall first, preferring the slot's primary positions.
fn build_depth_chart(
    team: TeamId,
    players: &[SimPlayer],
) -> Result<BTreeMap<Slot, usize>, RosterError> {
    let mut order: Vec<usize> = (0..players.len()).collect();
    order.sort_by(|a, b| {
        players[*b]
            .overall
            .cmp(&players[*a].overall)
            .then(players[*a].id.cmp(&players[*b].id))
    });
    let mut taken = vec![false; players.len()];
    let mut chart = BTreeMap::new();
    for slot in Slot::ALL {
        let pick = slot.eligible().iter().find_map(|position| {
            order
                .iter()
                .copied()
                .find(|idx| !taken[*idx] && players[*idx].position == *position)
        });
        let Some(idx) = pick else {
            return Err(RosterError::MissingPosition {
                team,
                position: slot.eligible()[0].as_str(),
            });
        };
        taken[idx] = true;
        chart.insert(slot, idx);
    }
    Ok(chart)
}

fn apply_coaching(
    staff: &CoachingStaff,
    tables: &ModifierTables,
    bonus: &mut UnitRatings,
    tendencies: &mut Tendencies,
) {
    bonus.add_all(staff.head_coach_bonus());
    for (unit, delta) in staff.offense.tilt().iter().chain(staff.defense.tilt()) {
        bonus.add(*unit, *delta);
    }
    tendencies.pass_ratio = staff.offense.pass_ratio();
    tendencies.deep_share = staff.offense.deep_share();
    for id in staff.perks() {
        let Some(perk) = tables.perk(id) else {
            log::warn!("ignoring unknown coaching perk '{id}'");
            continue;
        };
        for (unit, delta) in &perk.units {
            bonus.add(*unit, *delta);
        }
        tendencies.pass_ratio += perk.pass_bias;
        tendencies.fourth_down_aggression += perk.fourth_down_aggression;
    }
    tendencies.pass_ratio = tendencies.pass_ratio.clamp(0.3, 0.8);
    tendencies.fourth_down_aggression = tendencies.fourth_down_aggression.clamp(0.0, 0.6);
}

fn apply_facilities(
    facilities: &Facilities,
    tables: &ModifierTables,
    bonus: &mut UnitRatings,
) -> (f32, f32) {
    let mut home_field = 0.0;
    let mut relief = 0.0;
    for kind in FacilityKind::ALL {
        let Some(def) = tables.facility(kind) else {
            continue;
        };
        let upgrades = facilities.upgrades(kind);
        for (unit, per_level) in &def.units {
            bonus.add(*unit, per_level * upgrades);
        }
        home_field += def.home_field * upgrades;
        relief += def.fatigue_relief * upgrades;
    }
    (home_field, relief.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::synthetic_team;
    use crate::modifiers::BadgeTier;
    use crate::roster::EquippedBadge;

    fn tables() -> ModifierTables {
        ModifierTables::default_config()
    }

    fn qb_with_badges(badges: &[(&str, BadgeTier)]) -> PlayerRecord {
        let mut record = PlayerRecord::new(
            PlayerId(1),
            "Test Passer",
            Position::QB,
            crate::attributes::Ratings::uniform(92),
        );
        record.experience = 8;
        for (id, tier) in badges {
            record.badges.push(EquippedBadge::new(id, *tier));
        }
        record
    }

    #[test]
    fn synthetic_team_fills_every_slot() {
        let team = SimTeam::from_record(&synthetic_team(TeamId(1), 70), &tables()).unwrap();
        assert_eq!(team.depth_chart.len(), Slot::ALL.len());
        assert_eq!(team.overall, 70);
    }

    #[test]
    fn missing_quarterback_is_reported() {
        let mut record = synthetic_team(TeamId(3), 70);
        record.roster.retain(|p| p.position != Position::QB);
        let err = SimTeam::from_record(&record, &tables()).unwrap_err();
        assert_eq!(
            err,
            RosterError::MissingPosition {
                team: TeamId(3),
                position: "QB"
            }
        );
    }

    #[test]
    fn unknown_badge_is_rejected() {
        let player = qb_with_badges(&[("laser_eyes", BadgeTier::Gold)]);
        assert!(matches!(
            validate_loadout(&player, &tables()),
            Err(RosterError::UnknownBadge { .. })
        ));
    }

    #[test]
    fn conflicting_badges_are_rejected() {
        let player = qb_with_badges(&[
            ("gunslinger", BadgeTier::Gold),
            ("clutch", BadgeTier::Bronze),
            ("game_manager", BadgeTier::Silver),
        ]);
        assert_eq!(
            validate_loadout(&player, &tables()),
            Err(RosterError::BadgeConflict {
                player: PlayerId(1),
                first: "gunslinger".into(),
                second: "game_manager".into(),
            })
        );
    }

    #[test]
    fn badge_cap_depends_on_overall_and_experience() {
        let mut player = qb_with_badges(&[
            ("clutch", BadgeTier::Bronze),
            ("red_zone_qb", BadgeTier::Bronze),
        ]);
        player.ratings = crate::attributes::Ratings::uniform(60);
        player.experience = 0;
        assert!(matches!(
            validate_loadout(&player, &tables()),
            Err(RosterError::TooManyBadges { cap: 1, count: 2, .. })
        ));
        player.experience = 3;
        assert!(validate_loadout(&player, &tables()).is_ok());
    }

    #[test]
    fn conflicting_traits_are_rejected() {
        let player = qb_with_badges(&[]).with_trait("iron_man").with_trait("injury_prone");
        assert!(matches!(
            validate_loadout(&player, &tables()),
            Err(RosterError::TraitConflict { .. })
        ));
    }

    #[test]
    fn always_on_traits_fold_into_base() {
        let player = qb_with_badges(&[]).with_trait("gym_rat");
        let sim = build_player(&player, &tables());
        assert!((sim.base.get(Attribute::Strength) - 94.0).abs() < 1e-4);
        assert!(sim.conditional.is_empty());
    }

    #[test]
    fn conditional_traits_wait_for_their_situation() {
        let player = qb_with_badges(&[]).with_trait("clutch_gene");
        let sim = build_player(&player, &tables());
        let calm = Situation::neutral();
        assert!((sim.effective(&calm).get(Attribute::Poise) - 92.0).abs() < 1e-4);
        let mut late = calm;
        late.quarter = 4;
        late.clock = 60;
        assert!((sim.effective(&late).get(Attribute::Poise) - 98.0).abs() < 1e-4);
    }

    #[test]
    fn home_field_and_weather_apply_in_order() {
        let team = SimTeam::from_record(&synthetic_team(TeamId(1), 70), &tables()).unwrap();
        let neutral = RatingContext {
            situation: Situation::neutral(),
            home_field: None,
            weather: WeatherEffect::none(),
        };
        let base = team.unit_ratings(&neutral);
        let hosted = team.unit_ratings(&RatingContext {
            home_field: Some(2.0),
            ..neutral
        });
        assert!((hosted.get(Unit::Rushing) - base.get(Unit::Rushing) - 2.0).abs() < 1e-3);

        let snowy = team.unit_ratings(&RatingContext {
            weather: WeatherEffect {
                passing: 0.5,
                kicking: 1.0,
                fumble: 1.0,
            },
            ..neutral
        });
        assert!((snowy.get(Unit::Passing) - base.get(Unit::Passing) * 0.5).abs() < 1e-3);
        assert!((snowy.get(Unit::Rushing) - base.get(Unit::Rushing)).abs() < 1e-3);
    }

    #[test]
    fn coaching_perks_and_schemes_shape_the_team() {
        let mut record = synthetic_team(TeamId(4), 70);
        let mut staff = CoachingStaff {
            offense: OffensiveScheme::AirRaid,
            ..CoachingStaff::default()
        };
        staff.offensive_coordinator = staff.offensive_coordinator.with_perk("vertical_attack");
        record.coaching = Some(staff);
        let team = SimTeam::from_record(&record, &tables()).unwrap();
        assert!(team.tendencies.pass_ratio > OffensiveScheme::AirRaid.pass_ratio());
        assert!(team.unit_bonus.get(Unit::Receiving) > 2.5);
    }

    #[test]
    fn medical_upgrades_soften_fatigue() {
        let mut record = synthetic_team(TeamId(5), 70);
        record.facilities = Some(Facilities {
            medical: 5,
            ..Facilities::default()
        });
        let team = SimTeam::from_record(&record, &tables()).unwrap();
        assert!(team.fatigue_relief > 0.5);
        let plain = SimTeam::from_record(&synthetic_team(TeamId(6), 70), &tables()).unwrap();
        let mut late = Situation::neutral();
        late.quarter = 4;
        let ctx = RatingContext {
            situation: late,
            home_field: None,
            weather: WeatherEffect::none(),
        };
        assert!(
            team.unit_ratings(&ctx).get(Unit::Passing) > plain.unit_ratings(&ctx).get(Unit::Passing)
        );
    }
}
