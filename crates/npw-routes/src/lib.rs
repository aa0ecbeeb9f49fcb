//! `npw-routes` — the user's network: routes, splitting and persistence.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`route`]     | `Route`, `RouteNode`, `SetRouteInput`, path resolution       |
//! | [`store`]     | `RouteStore` and its mutations, `SetRouteOutcome`            |
//! | [`autosplit`] | `Section`, `SplitRequest`, `autosplit`, GeoJSON rendering    |
//! | [`join`]      | `collapse_degree_2` for grouping imported roads              |
//! | [`import`]    | `ImportKind`, existing-infrastructure and arterial imports   |
//! | [`savefile`]  | Versioned GeoJSON save format and the v1 upgrade             |
//! | [`error`]     | `RouteError`, `RouteResult<T>`                               |
//!
//! # Design notes
//!
//! The store never holds derived state.  Sections, the per-road overlay and
//! every statistic are recomputed from `(StudyArea, RouteStore)` on demand,
//! so there is nothing to keep in sync after a mutation.

pub mod autosplit;
pub mod error;
pub mod import;
pub mod join;
pub mod route;
pub mod savefile;
pub mod store;


pub use autosplit::{autosplit, sections_to_geojson, Section, SplitRequest};
pub use error::{RouteError, RouteResult};
pub use import::ImportKind;
pub use route::{ensure_simple, resolve_full_path, Route, RouteNode, SetRouteInput};
pub use savefile::{route_feature, SAVEFILE_VERSION};
pub use store::{RouteStore, SetRouteOutcome};
