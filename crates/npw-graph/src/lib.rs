//! `npw-graph` — the immutable road graph and everything attached to it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`network`]    | `RoadGraph` (CSR + R-trees), `RoadGraphBuilder`            |
//! | [`road`]       | `Road`, `Intersection`, `RoadAttrs`                        |
//! | [`router`]     | `EdgeCost`, `ByLength`, `Path`, Dijkstra searches          |
//! | [`snap`]       | `Waypoint`, snapping, extra nodes, minimal waypoints       |
//! | [`payload`]    | `GraphPayload`, the bincode wire format                    |
//! | [`places`]     | POIs, greenspaces, settlements, data zones, OD zones       |
//! | [`quintiles`]  | `Quintiles` for demand bucketing                           |
//! | [`study_area`] | `StudyArea`: loaded graph + places + projection            |
//! | [`synthetic`]  | `PayloadBuilder`, `grid` for synthetic study areas         |
//! | [`error`]      | `GraphError`, `GraphResult<T>`                             |

pub mod error;
pub mod network;
pub mod payload;
pub mod places;
pub mod quintiles;
pub mod road;
pub mod router;
pub mod snap;
pub mod study_area;
pub mod synthetic;


pub use error::{GraphError, GraphResult};
pub use network::{RoadGraph, RoadGraphBuilder};
pub use payload::GraphPayload;
pub use places::PoiKind;
pub use road::{Intersection, Road, RoadAttrs};
pub use router::{ByLength, EdgeCost, Path};
pub use snap::Waypoint;
pub use study_area::StudyArea;
