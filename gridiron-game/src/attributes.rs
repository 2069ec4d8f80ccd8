//! Player attributes and the rating scale.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ratings live on a 0-99 scale.
pub const RATING_MAX: u8 = 99;
/// Rating assumed for an attribute a record does not carry.
pub const DEFAULT_RATING: u8 = 40;

/// Broad grouping of attributes by on-field relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeGroup {
    Physical,
    Passing,
    Rushing,
    Receiving,
    Blocking,
    Defense,
    Kicking,
}

/// Named player attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Speed,
    Acceleration,
    Strength,
    Agility,
    Awareness,
    Stamina,
    ThrowPower,
    ShortAccuracy,
    DeepAccuracy,
    ThrowOnRun,
    Poise,
    Carrying,
    Vision,
    Elusiveness,
    BreakTackle,
    Catching,
    RouteRunning,
    Release,
    PassBlock,
    RunBlock,
    Tackling,
    PassRush,
    BlockShedding,
    ManCoverage,
    ZoneCoverage,
    PlayRecognition,
    KickPower,
    KickAccuracy,
}

impl Attribute {
    pub const ALL: [Self; 28] = [
        Self::Speed,
        Self::Acceleration,
        Self::Strength,
        Self::Agility,
        Self::Awareness,
        Self::Stamina,
        Self::ThrowPower,
        Self::ShortAccuracy,
        Self::DeepAccuracy,
        Self::ThrowOnRun,
        Self::Poise,
        Self::Carrying,
        Self::Vision,
        Self::Elusiveness,
        Self::BreakTackle,
        Self::Catching,
        Self::RouteRunning,
        Self::Release,
        Self::PassBlock,
        Self::RunBlock,
        Self::Tackling,
        Self::PassRush,
        Self::BlockShedding,
        Self::ManCoverage,
        Self::ZoneCoverage,
        Self::PlayRecognition,
        Self::KickPower,
        Self::KickAccuracy,
    ];

    #[must_use]
    pub const fn group(self) -> AttributeGroup {
        match self {
            Self::Speed
            | Self::Acceleration
            | Self::Strength
            | Self::Agility
            | Self::Awareness
            | Self::Stamina => AttributeGroup::Physical,
            Self::ThrowPower
            | Self::ShortAccuracy
            | Self::DeepAccuracy
            | Self::ThrowOnRun
            | Self::Poise => AttributeGroup::Passing,
            Self::Carrying | Self::Vision | Self::Elusiveness | Self::BreakTackle => {
                AttributeGroup::Rushing
            }
            Self::Catching | Self::RouteRunning | Self::Release => AttributeGroup::Receiving,
            Self::PassBlock | Self::RunBlock => AttributeGroup::Blocking,
            Self::Tackling
            | Self::PassRush
            | Self::BlockShedding
            | Self::ManCoverage
            | Self::ZoneCoverage
            | Self::PlayRecognition => AttributeGroup::Defense,
            Self::KickPower | Self::KickAccuracy => AttributeGroup::Kicking,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Acceleration => "acceleration",
            Self::Strength => "strength",
            Self::Agility => "agility",
            Self::Awareness => "awareness",
            Self::Stamina => "stamina",
            Self::ThrowPower => "throw_power",
            Self::ShortAccuracy => "short_accuracy",
            Self::DeepAccuracy => "deep_accuracy",
            Self::ThrowOnRun => "throw_on_run",
            Self::Poise => "poise",
            Self::Carrying => "carrying",
            Self::Vision => "vision",
            Self::Elusiveness => "elusiveness",
            Self::BreakTackle => "break_tackle",
            Self::Catching => "catching",
            Self::RouteRunning => "route_running",
            Self::Release => "release",
            Self::PassBlock => "pass_block",
            Self::RunBlock => "run_block",
            Self::Tackling => "tackling",
            Self::PassRush => "pass_rush",
            Self::BlockShedding => "block_shedding",
            Self::ManCoverage => "man_coverage",
            Self::ZoneCoverage => "zone_coverage",
            Self::PlayRecognition => "play_recognition",
            Self::KickPower => "kick_power",
            Self::KickAccuracy => "kick_accuracy",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sparse attribute ratings as persisted; missing attributes read as [`DEFAULT_RATING`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratings(pub BTreeMap<Attribute, u8>);

impl Ratings {
    /// Every attribute set to the same value.
    #[must_use]
    pub fn uniform(value: u8) -> Self {
        let value = value.min(RATING_MAX);
        Self(Attribute::ALL.iter().map(|attr| (*attr, value)).collect())
    }

    #[must_use]
    pub fn get(&self, attr: Attribute) -> u8 {
        self.0
            .get(&attr)
            .copied()
            .unwrap_or(DEFAULT_RATING)
            .min(RATING_MAX)
    }

    pub fn set(&mut self, attr: Attribute, value: u8) {
        self.0.insert(attr, value.min(RATING_MAX));
    }

    #[must_use]
    pub fn with(mut self, attr: Attribute, value: u8) -> Self {
        self.set(attr, value);
        self
    }

    /// Dense copy indexed by attribute order, as used by the simulator.
    #[must_use]
    pub fn to_dense(&self) -> AttributeVector {
        let mut dense = AttributeVector::default();
        for attr in Attribute::ALL {
            dense.set(attr, f32::from(self.get(attr)));
        }
        dense
    }
}

/// Dense float vector over all attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeVector([f32; 28]);

impl Default for AttributeVector {
    fn default() -> Self {
        Self([0.0; 28])
    }
}

impl AttributeVector {
    #[must_use]
    pub const fn get(&self, attr: Attribute) -> f32 {
        self.0[attr as usize]
    }

    pub const fn set(&mut self, attr: Attribute, value: f32) {
        self.0[attr as usize] = value;
    }

    pub fn add(&mut self, attr: Attribute, delta: f32) {
        let slot = &mut self.0[attr as usize];
        *slot = (*slot + delta).clamp(0.0, f32::from(RATING_MAX));
    }

    pub fn scale(&mut self, attr: Attribute, pct: f32) {
        let slot = &mut self.0[attr as usize];
        *slot = (*slot * (1.0 + pct / 100.0)).clamp(0.0, f32::from(RATING_MAX));
    }
}
