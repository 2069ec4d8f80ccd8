//! Sample 32-team league and synthetic rosters.
//!
//! The embedded `league.json` carries a profile per franchise (identity, team rating,
//! schemes, facilities, and a few star players). Full rosters are expanded from the
//! profile so the file stays small.
use serde::{Deserialize, Serialize};

use crate::attributes::Ratings;
use crate::modifiers::{Coach, CoachingStaff, DefensiveScheme, Facilities, OffensiveScheme};
use crate::roster::{
    BadgeSet, Conference, Division, EquippedBadge, PlayerId, PlayerRecord, Position, TeamId,
    TeamRecord,
};
use crate::weather::Climate;

/// Positions and counts every generated roster carries.
pub const ROSTER_TEMPLATE: [(Position, u8); 14] = [
    (Position::QB, 1),
    (Position::RB, 2),
    (Position::WR, 3),
    (Position::TE, 1),
    (Position::OT, 2),
    (Position::OG, 2),
    (Position::C, 1),
    (Position::DE, 2),
    (Position::DT, 2),
    (Position::LB, 3),
    (Position::CB, 3),
    (Position::S, 2),
    (Position::K, 1),
    (Position::P, 1),
];

const FIRST_NAMES: [&str; 24] = [
    "Aaron", "Brandon", "Cole", "Darius", "Evan", "Felix", "Grant", "Hassan", "Isaac", "Jamal",
    "Kendrick", "Logan", "Malik", "Nate", "Omar", "Parker", "Quentin", "Reggie", "Shane", "Terrell",
    "Victor", "Wesley", "Xavier", "Zeke",
];

const LAST_NAMES: [&str; 29] = [
    "Abernathy", "Bellamy", "Crowder", "Dawkins", "Ellison", "Fitzgerald", "Gaines", "Hollins",
    "Ingram", "Jefferson", "Kimbrough", "Lockett", "Mayfield", "Norwood", "Okafor", "Pettigrew",
    "Quarles", "Rutledge", "Sizemore", "Thibodeaux", "Underwood", "Vickers", "Whitfield", "Yarbrough",
    "Zamora", "Barkley", "Colquitt", "Dorsett", "Everett",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarProfile {
    pub name: String,
    pub position: Position,
    /// Added to the team rating for this player.
    #[serde(default)]
    pub boost: u8,
    #[serde(default)]
    pub badges: Vec<EquippedBadge>,
    #[serde(default)]
    pub traits: Vec<String>,
}

/// Compact description of a franchise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub id: TeamId,
    pub city: String,
    pub name: String,
    pub abbreviation: String,
    pub conference: Conference,
    pub division: Division,
    #[serde(default)]
    pub climate: Climate,
    pub rating: u8,
    #[serde(default)]
    pub offense: OffensiveScheme,
    #[serde(default)]
    pub defense: DefensiveScheme,
    /// Head coach rating.
    #[serde(default = "TeamProfile::default_coach")]
    pub coach: u8,
    #[serde(default)]
    pub facilities: Option<Facilities>,
    #[serde(default)]
    pub stars: Vec<StarProfile>,
}

impl TeamProfile {
    const fn default_coach() -> u8 {
        60
    }

    /// Expand the profile into a full team record.
    #[must_use]
    pub fn to_record(&self) -> TeamRecord {
        let mut roster = generated_roster(self.id, self.rating, true);
        for star in &self.stars {
            let Some(player) = roster
                .iter_mut()
                .find(|p| p.position == star.position && p.experience < STAR_EXPERIENCE)
            else {
                continue;
            };
            player.name.clone_from(&star.name);
            player.ratings = Ratings::uniform(self.rating.saturating_add(star.boost));
            player.experience = STAR_EXPERIENCE;
            player.age = 29;
            player.badges = star.badges.iter().cloned().collect::<BadgeSet>();
            player.traits.clone_from(&star.traits);
        }
        TeamRecord {
            id: self.id,
            city: self.city.clone(),
            name: self.name.clone(),
            abbreviation: self.abbreviation.clone(),
            conference: self.conference,
            division: self.division,
            climate: self.climate,
            roster,
            coaching: Some(CoachingStaff {
                head_coach: Coach::new(&person_name(self.id.0, 90), self.coach),
                offensive_coordinator: Coach::new(&person_name(self.id.0, 91), 60),
                defensive_coordinator: Coach::new(&person_name(self.id.0, 92), 60),
                offense: self.offense,
                defense: self.defense,
            }),
            facilities: self.facilities,
        }
    }
}

const STAR_EXPERIENCE: u8 = 7;

#[derive(Debug, Deserialize)]
struct LeagueFile {
    teams: Vec<TeamProfile>,
}

/// Load franchise profiles from JSON.
///
/// # Errors
///
/// Returns an error if the JSON cannot be parsed.
pub fn profiles_from_json(json_str: &str) -> Result<Vec<TeamProfile>, String> {
    serde_json::from_str::<LeagueFile>(json_str)
        .map(|file| file.teams)
        .map_err(|e| format!("JSON parse error: {e}"))
}

/// Embedded franchise profiles.
#[must_use]
pub fn sample_profiles() -> Vec<TeamProfile> {
    profiles_from_json(include_str!("../assets/data/league.json")).unwrap_or_else(|e| {
        log::error!("embedded league profiles failed to load: {e}");
        Vec::new()
    })
}

/// The embedded 32-team league with full rosters.
#[must_use]
pub fn sample_league() -> Vec<TeamRecord> {
    sample_profiles().iter().map(TeamProfile::to_record).collect()
}

/// Conference and division for a team id laid out four to a division, sixteen to a
/// conference.
#[must_use]
pub fn default_alignment(id: TeamId) -> (Conference, Division) {
    let idx = usize::from(id.0.saturating_sub(1));
    let conference = Conference::ALL[(idx / 16) % 2];
    let division = Division::ALL[(idx / 4) % 4];
    (conference, division)
}

/// A team whose every player is rated `rating` in every attribute, with no
/// coaching or facility upgrades.
#[must_use]
pub fn synthetic_team(id: TeamId, rating: u8) -> TeamRecord {
    let (conference, division) = default_alignment(id);
    TeamRecord {
        id,
        city: "Synthetic".to_string(),
        name: format!("Team {}", id.0),
        abbreviation: format!("S{:02}", id.0 % 100),
        conference,
        division,
        climate: Climate::default(),
        roster: generated_roster(id, rating, false),
        coaching: None,
        facilities: None,
    }
}

/// A full league of synthetic teams, all rated `rating`.
#[must_use]
pub fn synthetic_league(rating: u8) -> Vec<TeamRecord> {
    (1..=32).map(|id| synthetic_team(TeamId(id), rating)).collect()
}

fn person_name(team: u16, idx: usize) -> String {
    let seed = usize::from(team);
    let first = FIRST_NAMES[(seed * 7 + idx * 3) % FIRST_NAMES.len()];
    let last = LAST_NAMES[(seed * 11 + idx * 5) % LAST_NAMES.len()];
    format!("{first} {last}")
}

/// Roster filling [`ROSTER_TEMPLATE`]. With `spread`, depth players sit a few points
/// below the team rating.
fn generated_roster(team: TeamId, rating: u8, spread: bool) -> Vec<PlayerRecord> {
    let mut roster = Vec::new();
    for (position, count) in ROSTER_TEMPLATE {
        for depth in 0..count {
            let idx = roster.len();
            let id = PlayerId(u32::from(team.0) * 100 + u32::try_from(idx).unwrap_or(0));
            let player_rating = if spread {
                let wobble = u8::try_from((usize::from(team.0) * 3 + idx * 7) % 5).unwrap_or(0);
                rating
                    .saturating_add(wobble)
                    .saturating_sub(2)
                    .saturating_sub(depth * 2)
            } else {
                rating
            };
            let mut player = PlayerRecord::new(
                id,
                &person_name(team.0, idx),
                position,
                Ratings::uniform(player_rating),
            );
            player.age = 23 + u8::try_from(idx % 9).unwrap_or(0);
            player.experience = u8::try_from(idx % 6).unwrap_or(0);
            roster.push(player);
        }
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::build_teams;
    use crate::config::LeagueConfig;
    use crate::modifiers::ModifierTables;
    use std::collections::HashSet;

    #[test]
    fn sample_league_fills_the_structure() {
        let league = sample_league();
        assert_eq!(league.len(), 32);
        assert!(LeagueConfig::default().validate_teams(&league).is_ok());
        for team in &league {
            assert_eq!((team.conference, team.division), default_alignment(team.id));
        }
    }

    #[test]
    fn sample_rosters_pass_validation() {
        let teams = build_teams(&sample_league(), &ModifierTables::default_config()).unwrap();
        let best = teams.iter().max_by_key(|t| t.overall).unwrap();
        let worst = teams.iter().min_by_key(|t| t.overall).unwrap();
        assert!(best.overall > worst.overall + 8);
    }

    #[test]
    fn player_ids_are_unique_across_the_league() {
        let league = sample_league();
        let mut ids = HashSet::new();
        for player in league.iter().flat_map(|t| &t.roster) {
            assert!(ids.insert(player.id), "duplicate {}", player.id);
        }
    }

    #[test]
    fn stars_replace_a_starter() {
        let league = sample_league();
        let boston = league.iter().find(|t| t.abbreviation == "BOS").unwrap();
        let qb = boston.roster.iter().find(|p| p.position == Position::QB).unwrap();
        assert_eq!(qb.name, "Declan Whitaker");
        assert_eq!(qb.badges.len(), 2);
        assert_eq!(qb.ratings.get(crate::attributes::Attribute::ShortAccuracy), 86);
    }

    #[test]
    fn synthetic_rosters_follow_the_template() {
        let team = synthetic_team(TeamId(20), 70);
        let expected: u8 = ROSTER_TEMPLATE.iter().map(|(_, n)| n).sum();
        assert_eq!(team.roster.len(), usize::from(expected));
        assert_eq!(team.conference, Conference::West);
        assert_eq!(team.division, Division::North);
        assert!(team.roster.iter().all(|p| p.name.contains(' ')));
    }
}
