//! Game-day weather selection and effects
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MAX_EXTREME_STREAK: u8 = 2;

/// Stadium climate of the home team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Climate {
    Dome,
    Warm,
    #[default]
    Temperate,
    Cold,
}

/// Weather conditions for a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Snow,
    Wind,
    Heat,
    Dome,
}

impl Weather {
    /// Adverse weather that counts toward the extreme streak and badge conditions.
    #[must_use]
    pub const fn is_adverse(self) -> bool {
        matches!(self, Self::Rain | Self::Snow | Self::Wind | Self::Heat)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Wind => "wind",
            Self::Heat => "heat",
            Self::Dome => "dome",
        }
    }
}

const OUTDOOR_ORDER: [Weather; 5] = [
    Weather::Clear,
    Weather::Rain,
    Weather::Snow,
    Weather::Wind,
    Weather::Heat,
];

/// Part of the calendar a game falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonSegment {
    Early,
    Mid,
    Late,
}

impl SeasonSegment {
    #[must_use]
    pub const fn for_week(week: u8) -> Self {
        match week {
            0..=6 => Self::Early,
            7..=12 => Self::Mid,
            _ => Self::Late,
        }
    }
}

/// Multipliers applied to unit ratings and turnover odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    #[serde(default = "WeatherEffect::neutral")]
    pub passing: f32,
    #[serde(default = "WeatherEffect::neutral")]
    pub kicking: f32,
    /// Multiplier on fumble odds.
    #[serde(default = "WeatherEffect::neutral")]
    pub fumble: f32,
}

impl WeatherEffect {
    const fn neutral() -> f32 {
        1.0
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            passing: 1.0,
            kicking: 1.0,
            fumble: 1.0,
        }
    }
}

/// Weather weights and effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub effects: HashMap<Weather, WeatherEffect>,
    pub weights: HashMap<Climate, HashMap<SeasonSegment, HashMap<Weather, u32>>>,
}

impl WeatherConfig {
    /// Load weather configuration from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed or if validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json_str).map_err(|e| format!("JSON parse error: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        for climate in [Climate::Warm, Climate::Temperate, Climate::Cold] {
            let Some(segments) = self.weights.get(&climate) else {
                return Err(format!("Missing weights for climate: {climate:?}"));
            };
            for segment in [SeasonSegment::Early, SeasonSegment::Mid, SeasonSegment::Late] {
                let total: u32 = segments
                    .get(&segment)
                    .map(|weights| weights.values().sum())
                    .unwrap_or(0);
                if total == 0 {
                    return Err(format!("No weather weight for {climate:?} {segment:?}"));
                }
            }
        }
        Ok(())
    }

    /// Get embedded default configuration
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!("../assets/data/weather.json")).unwrap_or_else(|e| {
            log::error!("embedded weather config failed to load: {e}");
            Self {
                effects: HashMap::new(),
                weights: HashMap::new(),
            }
        })
    }

    #[must_use]
    pub fn effect(&self, weather: Weather) -> WeatherEffect {
        self.effects
            .get(&weather)
            .copied()
            .unwrap_or_else(WeatherEffect::none)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// Per-stadium streak tracking so one venue does not get buried in bad weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeatherStreak {
    pub extreme_streak: u8,
}

impl WeatherStreak {
    pub fn record(&mut self, weather: Weather) {
        if weather.is_adverse() {
            self.extreme_streak = self.extreme_streak.saturating_add(1);
        } else {
            self.extreme_streak = 0;
        }
    }
}

/// Select game-day weather for a home climate and week.
pub fn select_weather<R: Rng + ?Sized>(
    cfg: &WeatherConfig,
    climate: Climate,
    week: u8,
    streak: WeatherStreak,
    rng: &mut R,
) -> Weather {
    if climate == Climate::Dome {
        return Weather::Dome;
    }
    let Some(weights) = cfg
        .weights
        .get(&climate)
        .and_then(|segments| segments.get(&SeasonSegment::for_week(week)))
    else {
        return Weather::Clear;
    };

    let capped = streak.extreme_streak >= MAX_EXTREME_STREAK;
    let candidates: Vec<(Weather, u32)> = OUTDOOR_ORDER
        .iter()
        .filter(|weather| !(capped && weather.is_adverse()))
        .map(|weather| (*weather, weights.get(weather).copied().unwrap_or(0)))
        .filter(|(_, weight)| *weight > 0)
        .collect();
    let total: u32 = candidates.iter().map(|(_, weight)| weight).sum();
    if total == 0 {
        return Weather::Clear;
    }

    let mut roll = rng.gen_range(0..total);
    for (weather, weight) in candidates {
        if roll < weight {
            return weather;
        }
        roll -= weight;
    }
    Weather::Clear
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn default_config_is_valid() {
        let cfg = WeatherConfig::default_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.effect(Weather::Snow).passing < 1.0);
        assert!((cfg.effect(Weather::Dome).passing - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn domes_always_play_indoors() {
        let cfg = WeatherConfig::default_config();
        let mut rng = SmallRng::seed_from_u64(1);
        for week in 1..=18 {
            let weather = select_weather(&cfg, Climate::Dome, week, WeatherStreak::default(), &mut rng);
            assert_eq!(weather, Weather::Dome);
        }
    }

    #[test]
    fn streak_cap_forces_fair_weather() {
        let cfg = WeatherConfig::default_config();
        let mut rng = SmallRng::seed_from_u64(99);
        let streak = WeatherStreak { extreme_streak: 2 };
        for _ in 0..200 {
            let weather = select_weather(&cfg, Climate::Cold, 17, streak, &mut rng);
            assert!(!weather.is_adverse(), "capped streak produced {weather:?}");
        }
    }

    #[test]
    fn warm_climates_never_snow() {
        let cfg = WeatherConfig::default_config();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..300 {
            let weather = select_weather(&cfg, Climate::Warm, 16, WeatherStreak::default(), &mut rng);
            assert_ne!(weather, Weather::Snow);
        }
    }

    #[test]
    fn streak_resets_on_clear_day() {
        let mut streak = WeatherStreak::default();
        streak.record(Weather::Snow);
        streak.record(Weather::Wind);
        assert_eq!(streak.extreme_streak, 2);
        streak.record(Weather::Clear);
        assert_eq!(streak.extreme_streak, 0);
    }
}
