//! `npw-engine` — the request/response boundary of the planning engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`engine`]   | `Engine`, loading, study area queries, snapping, places         |
//! | `routes`     | Route queries, autosplit, mutations, imports, savefiles         |
//! | `metrics`    | Dynamic roads, stats, components, reachability fixes, OD        |
//! | [`response`] | Response shapes: `StaticRoad`, `StatsResponse`, …               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use npw_engine::Engine;
//!
//! let mut engine = Engine::default();
//! engine.load_graph(&bytes)?;
//! let sections = engine.autosplit_route(None, &waypoints, None, Tier::Primary, Some(30.0))?;
//! let stats = engine.recalculate_stats()?;
//! ```
//!
//! All errors are [`PlanError`][npw_core::PlanError]s.  A failed call never
//! leaves the route store half-changed.

pub mod engine;
mod metrics;
pub mod response;
mod routes;


pub use engine::Engine;
pub use response::{OdStatsResponse, SetRouteResponse, SlowStatsResponse, StaticRoad, StatsResponse};

pub use npw_analysis::Breakdown;
pub use npw_core::{EngineConfig, InfraType, PlanError, PlanResult, RouteId, Tier};
pub use npw_graph::{PoiKind, Waypoint};
pub use npw_routes::{ImportKind, RouteNode, SetRouteInput};
