use thiserror::Error;

use npw_core::{IntersectionId, PlanError, RoadId, RouteId};
use npw_graph::GraphError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route {0} doesn't exist")]
    UnknownRoute(RouteId),

    #[error("no road joins {from} and {to}")]
    NotAdjacent { from: IntersectionId, to: IntersectionId },

    #[error("a route needs at least one road")]
    EmptyPath,

    /// Out-and-back paths would leave one road in two sections.
    #[error("the path uses {0} more than once")]
    RepeatedRoad(RoadId),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Structurally valid JSON that doesn't describe a valid route store.
    #[error("invalid savefile: {0}")]
    Savefile(String),

    #[error("couldn't parse savefile: {0}")]
    Json(#[from] serde_json::Error),

    #[error("couldn't parse savefile GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type RouteResult<T> = Result<T, RouteError>;

impl From<RouteError> for PlanError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::UnknownRoute(id) => PlanError::InvalidReference(id.to_string()),
            RouteError::NotAdjacent { from, to } => PlanError::NoPath { from, to },
            RouteError::EmptyPath => PlanError::EmptyInput,
            RouteError::RepeatedRoad(r) => PlanError::MalformedInput(format!("the path uses {r} more than once")),
            RouteError::Graph(e) => e.into(),
            RouteError::Savefile(msg) => PlanError::MalformedInput(msg),
            RouteError::Json(e) => PlanError::MalformedInput(e.to_string()),
            RouteError::GeoJson(e) => PlanError::MalformedInput(e.to_string()),
        }
    }
}
