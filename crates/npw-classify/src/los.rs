//! The Level of Service lookup table.
//!
//! LoS is policy data, so the table is loaded rather than hard-coded into the
//! classifier.  [`LosTable::default`] is the published table; the same table
//! ships as `los_table.toml` next to this crate's manifest as a starting point
//! for overrides.

use serde::{Deserialize, Serialize};

use npw_core::{InfraType, LevelOfService, TrafficVolume};
use npw_graph::RoadAttrs;

use crate::{ClassifyError, ClassifyResult};

use LevelOfService::{High, Low, Medium, ShouldNotBeUsed as Snbu};

/// One row of a speed/traffic rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedBand {
    /// Inclusive upper speed limit for this row.
    pub max_speed_mph: u16,
    /// Indexed by [`TrafficVolume::column`].
    pub levels: [LevelOfService; 4],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LosRule {
    Fixed { level: LevelOfService },
    Settlement { inside: LevelOfService, outside: LevelOfService },
    SpeedTraffic { bands: Vec<SpeedBand>, otherwise: LevelOfService },
}

impl LosRule {
    fn lookup(&self, speed_mph: u16, traffic: TrafficVolume, within_settlement: bool) -> LevelOfService {
        match self {
            LosRule::Fixed { level } => *level,
            LosRule::Settlement { inside, outside } => {
                if within_settlement {
                    *inside
                } else {
                    *outside
                }
            }
            LosRule::SpeedTraffic { bands, otherwise } => bands
                .iter()
                .find(|b| speed_mph <= b.max_speed_mph)
                .map_or(*otherwise, |b| b.levels[traffic.column()]),
        }
    }
}

#[derive(Deserialize)]
struct RuleRecord {
    infra_type: InfraType,
    #[serde(flatten)]
    rule: LosRule,
}

#[derive(Deserialize)]
struct TableFile {
    rule: Vec<RuleRecord>,
}

/// Exactly one [`LosRule`] per [`InfraType`].
#[derive(Clone, Debug, PartialEq)]
pub struct LosTable {
    /// Indexed in [`InfraType::ALL`] order.
    rules: Vec<LosRule>,
}

impl LosTable {
    /// Parse and validate a TOML table in the `los_table.toml` format.
    pub fn from_toml_str(input: &str) -> ClassifyResult<Self> {
        let file: TableFile = toml::from_str(input)?;
        let mut slots: Vec<Option<LosRule>> = vec![None; InfraType::ALL.len()];
        for record in file.rule {
            let slot = &mut slots[infra_index(record.infra_type)];
            if slot.is_some() {
                return Err(ClassifyError::DuplicateRule(record.infra_type));
            }
            *slot = Some(record.rule);
        }
        let rules = InfraType::ALL
            .into_iter()
            .zip(slots)
            .map(|(infra, rule)| rule.ok_or(ClassifyError::MissingRule(infra)))
            .collect::<ClassifyResult<Vec<_>>>()?;
        let table = Self { rules };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> ClassifyResult<()> {
        for infra in InfraType::ALL {
            if let LosRule::SpeedTraffic { bands, .. } = self.rule(infra) {
                if bands.is_empty() {
                    return Err(ClassifyError::NoBands(infra));
                }
                if bands.windows(2).any(|w| w[0].max_speed_mph >= w[1].max_speed_mph) {
                    return Err(ClassifyError::UnorderedBands(infra));
                }
            }
        }
        Ok(())
    }

    pub fn rule(&self, infra: InfraType) -> &LosRule {
        &self.rules[infra_index(infra)]
    }

    pub fn los(
        &self,
        infra: InfraType,
        speed_mph: u16,
        traffic: TrafficVolume,
        within_settlement: bool,
    ) -> LevelOfService {
        self.rule(infra).lookup(speed_mph, traffic, within_settlement)
    }

    /// LoS of `infra` applied to a road with these attributes.
    #[inline]
    pub fn los_for(&self, infra: InfraType, attrs: &RoadAttrs) -> LevelOfService {
        self.los(infra, attrs.speed_mph, attrs.traffic, attrs.within_settlement)
    }
}

/// `InfraType::ALL` lists the variants in declaration order.
#[inline]
fn infra_index(infra: InfraType) -> usize {
    infra as usize
}

fn band(max_speed_mph: u16, levels: [LevelOfService; 4]) -> SpeedBand {
    SpeedBand { max_speed_mph, levels }
}

impl Default for LosTable {
    fn default() -> Self {
        let rule = |infra: InfraType| match infra {
            InfraType::MixedTraffic => LosRule::SpeedTraffic {
                bands: vec![
                    band(20, [High, High, Medium, Low]),
                    band(30, [High, Medium, Low, Low]),
                    band(40, [Medium, Low, Snbu, Snbu]),
                    band(50, [Low, Snbu, Snbu, Snbu]),
                    band(60, [Low, Snbu, Snbu, Snbu]),
                ],
                otherwise: Snbu,
            },
            InfraType::CycleLane => LosRule::SpeedTraffic {
                bands: vec![
                    band(20, [High, High, High, Medium]),
                    band(30, [High, Medium, Medium, Low]),
                    band(40, [Medium, Low, Low, Low]),
                    band(50, [Low, Low, Low, Low]),
                    band(60, [Low, Snbu, Snbu, Snbu]),
                ],
                otherwise: Snbu,
            },
            InfraType::SharedFootway => LosRule::Settlement { inside: Low, outside: High },
            InfraType::Segregated
            | InfraType::OffRoad
            | InfraType::SegregatedWithSpeedVolume
            | InfraType::CycleLaneWithSpeedVolume
            | InfraType::MixedTrafficWithSpeedVolume => LosRule::Fixed { level: High },
        };
        Self { rules: InfraType::ALL.into_iter().map(rule).collect() }
    }
}
