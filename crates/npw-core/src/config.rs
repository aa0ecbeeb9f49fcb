//! Engine tuning knobs.
//!
//! Defaults reproduce the documented behaviour; a TOML document can override
//! any subset of fields:
//!
//! ```toml
//! major_junction_min_degree = 4
//! od_seed = 7
//!
//! [los_penalties]
//! low = 4.0
//! ```

use crate::{LevelOfService, PlanError, PlanResult};

/// Multipliers applied to road length by the quiet cycling router.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LosPenalties {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub should_not_be_used: f64,
}

impl LosPenalties {
    #[inline]
    pub fn get(&self, los: LevelOfService) -> f64 {
        match los {
            LevelOfService::High => self.high,
            LevelOfService::Medium => self.medium,
            LevelOfService::Low => self.low,
            LevelOfService::ShouldNotBeUsed => self.should_not_be_used,
        }
    }
}

impl Default for LosPenalties {
    fn default() -> Self {
        Self { high: 1.0, medium: 1.5, low: 3.0, should_not_be_used: 5.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// An intersection is a major junction when at least this many roads meet
    /// there and one of them is arterial.
    pub major_junction_min_degree: usize,
    /// Maximum connecting length (metres) walked from the network over
    /// off-network roads when classifying reachability.  `None` = unbounded.
    pub reachable_tolerance_m: Option<f64>,
    /// Seed for OD sampling.
    pub od_seed: u64,
    /// Town centre pairs further apart than this are not used for directness.
    pub town_centre_max_distance_m: f64,
    /// How many of the least direct town centre routes to report.
    pub worst_directness_routes: usize,
    pub los_penalties: LosPenalties,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            major_junction_min_degree: 3,
            reachable_tolerance_m: None,
            od_seed: 42,
            town_centre_max_distance_m: 5_000.0,
            worst_directness_routes: 10,
            los_penalties: LosPenalties::default(),
        }
    }
}

impl EngineConfig {
    #[cfg(feature = "serde")]
    pub fn from_toml_str(input: &str) -> PlanResult<Self> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| PlanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.major_junction_min_degree == 0 {
            return Err(PlanError::Config("major_junction_min_degree must be at least 1".into()));
        }
        if let Some(t) = self.reachable_tolerance_m {
            if !t.is_finite() || t < 0.0 {
                return Err(PlanError::Config(format!("reachable_tolerance_m must be >= 0, got {t}")));
            }
        }
        let d = self.town_centre_max_distance_m;
        if !d.is_finite() || d < 0.0 {
            return Err(PlanError::Config(format!("town_centre_max_distance_m must be >= 0, got {d}")));
        }
        for los in LevelOfService::ALL {
            let p = self.los_penalties.get(los);
            if !p.is_finite() || p <= 0.0 {
                return Err(PlanError::Config(format!("penalty for {los} must be positive, got {p}")));
            }
        }
        Ok(())
    }
}
