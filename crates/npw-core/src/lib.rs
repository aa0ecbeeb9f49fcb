//! `npw-core` — foundational types for the network planning engine.
//!
//! Every other `npw-*` crate depends on this one.  It has no `npw-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module     | Contents                                                        |
//! |------------|-----------------------------------------------------------------|
//! | [`ids`]    | `RoadId`, `IntersectionId`, `RouteId`                           |
//! | [`mercator`] | `Mercator` projection between WGS84 and local metres, bbox helpers |
//! | [`types`]  | `InfraType`, `Tier`, `LevelOfService`, `TrafficVolume`, `Dir`, … |
//! | [`rng`]    | `SampleRng`, the seeded RNG used by demand sampling             |
//! | [`config`] | `EngineConfig`                                                  |
//! | [`error`]  | `PlanError`, `PlanResult`                                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                          |
//! |---------|-----------------------------------------------------------------|
//! | `serde` | (default) `Serialize`/`Deserialize` on public types and TOML config loading. |

pub mod config;
pub mod error;
pub mod ids;
pub mod mercator;
pub mod rng;
pub mod types;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EngineConfig, LosPenalties};
pub use error::{PlanError, PlanResult};
pub use mercator::Mercator;
pub use ids::{IntersectionId, RoadId, RouteId};
pub use rng::SampleRng;
pub use types::{
    Dir, GradientGroup, InfraType, LevelOfService, Rating, StreetSpace, Tier, TrafficVolume,
};
