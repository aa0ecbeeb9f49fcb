//! Domain enums shared by every layer of the engine.

use std::fmt;

// ── Dir ───────────────────────────────────────────────────────────────────────

/// Direction a route traverses a road, relative to the road's own
/// `src → dst` orientation.  Roads themselves are undirected.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dir {
    Forwards,
    Backwards,
}

impl Dir {
    #[inline]
    pub fn reverse(self) -> Dir {
        match self {
            Dir::Forwards => Dir::Backwards,
            Dir::Backwards => Dir::Forwards,
        }
    }
}

// ── InfraType ─────────────────────────────────────────────────────────────────

/// Cycle infrastructure type applied to (or recommended for) a road.
///
/// The `WithSpeedVolume` variants are combined with measures that reduce
/// motor traffic speed and volume.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InfraType {
    Segregated,
    SegregatedWithSpeedVolume,
    OffRoad,
    SharedFootway,
    CycleLane,
    CycleLaneWithSpeedVolume,
    MixedTraffic,
    MixedTrafficWithSpeedVolume,
}

impl InfraType {
    pub const ALL: [InfraType; 8] = [
        InfraType::Segregated,
        InfraType::SegregatedWithSpeedVolume,
        InfraType::OffRoad,
        InfraType::SharedFootway,
        InfraType::CycleLane,
        InfraType::CycleLaneWithSpeedVolume,
        InfraType::MixedTraffic,
        InfraType::MixedTrafficWithSpeedVolume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InfraType::Segregated => "Segregated",
            InfraType::SegregatedWithSpeedVolume => "SegregatedWithSpeedVolume",
            InfraType::OffRoad => "OffRoad",
            InfraType::SharedFootway => "SharedFootway",
            InfraType::CycleLane => "CycleLane",
            InfraType::CycleLaneWithSpeedVolume => "CycleLaneWithSpeedVolume",
            InfraType::MixedTraffic => "MixedTraffic",
            InfraType::MixedTrafficWithSpeedVolume => "MixedTrafficWithSpeedVolume",
        }
    }

    pub fn from_name(name: &str) -> Option<InfraType> {
        InfraType::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for InfraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Tier ──────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tier {
    Primary,
    Secondary,
    LocalAccess,
    LongDistance,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Primary, Tier::Secondary, Tier::LocalAccess, Tier::LongDistance];

    pub fn name(self) -> &'static str {
        match self {
            Tier::Primary => "Primary",
            Tier::Secondary => "Secondary",
            Tier::LocalAccess => "LocalAccess",
            Tier::LongDistance => "LongDistance",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── LevelOfService ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LevelOfService {
    High,
    Medium,
    Low,
    ShouldNotBeUsed,
}

impl LevelOfService {
    pub const ALL: [LevelOfService; 4] = [
        LevelOfService::High,
        LevelOfService::Medium,
        LevelOfService::Low,
        LevelOfService::ShouldNotBeUsed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LevelOfService::High => "High",
            LevelOfService::Medium => "Medium",
            LevelOfService::Low => "Low",
            LevelOfService::ShouldNotBeUsed => "ShouldNotBeUsed",
        }
    }
}

impl fmt::Display for LevelOfService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── TrafficVolume ─────────────────────────────────────────────────────────────

/// Modelled daily motor traffic, banded.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrafficVolume {
    UpTo1000,
    UpTo2000,
    UpTo4000,
    Over4000,
}

impl TrafficVolume {
    pub const ALL: [TrafficVolume; 4] = [
        TrafficVolume::UpTo1000,
        TrafficVolume::UpTo2000,
        TrafficVolume::UpTo4000,
        TrafficVolume::Over4000,
    ];

    /// Band a raw vehicles-per-day count.
    pub fn from_count(vehicles_per_day: u32) -> TrafficVolume {
        match vehicles_per_day {
            0..1000 => TrafficVolume::UpTo1000,
            1000..2000 => TrafficVolume::UpTo2000,
            2000..4000 => TrafficVolume::UpTo4000,
            _ => TrafficVolume::Over4000,
        }
    }

    /// Column position in a speed-band row of the LoS table.
    #[inline]
    pub fn column(self) -> usize {
        self as usize
    }
}

// ── StreetSpace ───────────────────────────────────────────────────────────────

/// Widest infrastructure class that fits in the available street width.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StreetSpace {
    Segregated,
    CycleLane,
    #[cfg_attr(feature = "serde", serde(rename = "nothing"))]
    Nothing,
}

// ── GradientGroup ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GradientGroup {
    #[cfg_attr(feature = "serde", serde(rename = "<= 3%"))]
    UpTo3,
    #[cfg_attr(feature = "serde", serde(rename = "3 - 5%"))]
    UpTo5,
    #[cfg_attr(feature = "serde", serde(rename = "5 - 7%"))]
    UpTo7,
    #[cfg_attr(feature = "serde", serde(rename = "7 - 10%"))]
    UpTo10,
    #[cfg_attr(feature = "serde", serde(rename = "> 10%"))]
    Over10,
}

impl GradientGroup {
    /// Bucket a gradient in percent.  Sign (uphill/downhill) is ignored.
    pub fn from_gradient(gradient_pct: f64) -> GradientGroup {
        let g = gradient_pct.abs();
        if g <= 3.0 {
            GradientGroup::UpTo3
        } else if g <= 5.0 {
            GradientGroup::UpTo5
        } else if g <= 7.0 {
            GradientGroup::UpTo7
        } else if g <= 10.0 {
            GradientGroup::UpTo10
        } else {
            GradientGroup::Over10
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GradientGroup::UpTo3 => "<= 3%",
            GradientGroup::UpTo5 => "3 - 5%",
            GradientGroup::UpTo7 => "5 - 7%",
            GradientGroup::UpTo10 => "7 - 10%",
            GradientGroup::Over10 => "> 10%",
        }
    }
}

// ── Rating ────────────────────────────────────────────────────────────────────

/// Five-point qualitative scale every scored metric is banded into.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rating {
    #[cfg_attr(feature = "serde", serde(rename = "very poor"))]
    VeryPoor,
    #[cfg_attr(feature = "serde", serde(rename = "poor"))]
    Poor,
    #[cfg_attr(feature = "serde", serde(rename = "medium"))]
    Medium,
    #[cfg_attr(feature = "serde", serde(rename = "good"))]
    Good,
    #[cfg_attr(feature = "serde", serde(rename = "very good"))]
    VeryGood,
}

impl Rating {
    /// Ratings in ascending order; index `i` corresponds to band `i`.
    pub const ASCENDING: [Rating; 5] =
        [Rating::VeryPoor, Rating::Poor, Rating::Medium, Rating::Good, Rating::VeryGood];

    /// Linear 0–100 score used when a rating is combined with percentages.
    pub fn score(self) -> f64 {
        match self {
            Rating::VeryPoor => 0.0,
            Rating::Poor => 25.0,
            Rating::Medium => 50.0,
            Rating::Good => 75.0,
            Rating::VeryGood => 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::VeryPoor => "very poor",
            Rating::Poor => "poor",
            Rating::Medium => "medium",
            Rating::Good => "good",
            Rating::VeryGood => "very good",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
