//! `npw-analysis` — everything computed from `(StudyArea, RouteStore)`.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                       |
//! |------------------|----------------------------------------------------------------|
//! | [`overlay`]      | `Overlay`, `DynamicRoad`, `NetworkView`                        |
//! | [`reachability`] | `ReachabilityMap`, place features, debug paths, POI fixes      |
//! | [`components`]   | Connected components of the network                            |
//! | [`mesh`]         | Mesh density in settlements and on a grid                      |
//! | [`stats`]        | `Stats`, `Scorecard`, `Banding`                                |
//! | [`od`]           | `QuietCost`, Go Dutch uptake, OD sampling, directness          |
//! | [`evaluate`]     | Single-route evaluation with breakdowns and directions         |
//! | [`lengths`]      | Network length by tier and infra type                          |
//! | [`error`]        | `AnalysisError`, `AnalysisResult<T>`                           |
//!
//! Every function here is pure: it reads the study area and a snapshot of
//! the route store and never mutates either.

pub mod components;
pub mod error;
pub mod evaluate;
pub mod lengths;
pub mod mesh;
pub mod od;
pub mod overlay;
pub mod reachability;
pub mod stats;

#[cfg(test)]
mod tests;

pub use components::{components_to_geojson, connected_components, Component};
pub use error::{AnalysisError, AnalysisResult};
pub use evaluate::{evaluate_route, Breakdown, Direction, RouteEvaluation};
pub use lengths::{network_lengths, NetworkLengths};
pub use mesh::{grid_mesh_density, mesh_density};
pub use od::{od_counts, pct_godutch_2020, slow_stats, OdCounts, OdPercents, QuietCost, SlowStats};
pub use overlay::{dynamic_roads, DynamicRoad, NetworkView, Overlay};
pub use reachability::{
    debug_reachable_path, fix_unreachable_poi, place_features, FixProposal, Reachability, ReachabilityMap,
};
pub use stats::{compute_stats, Banding, Metric, Scorecard, Stats};
