//! Graph-subsystem error type.

use thiserror::Error;

use npw_core::{IntersectionId, PlanError, RoadId};

use crate::places::PoiKind;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("couldn't decode graph payload: {0}")]
    Decode(#[from] bincode::Error),

    /// Structural inconsistency in otherwise decodable input.
    #[error("{0}")]
    Malformed(String),

    #[error("no path from {from} to {to}")]
    NoPath { from: IntersectionId, to: IntersectionId },

    #[error("road {0} not found in graph")]
    RoadNotFound(RoadId),

    #[error("intersection {0} not found in graph")]
    IntersectionNotFound(IntersectionId),

    #[error("no {kind:?} with index {idx}")]
    PlaceNotFound { kind: PoiKind, idx: usize },

    #[error("at least two waypoints are required")]
    TooFewWaypoints,
}

pub type GraphResult<T> = Result<T, GraphError>;

impl From<GraphError> for PlanError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::Decode(e) => PlanError::MalformedInput(e.to_string()),
            GraphError::Malformed(msg) => PlanError::MalformedInput(msg),
            GraphError::NoPath { from, to } => PlanError::NoPath { from, to },
            GraphError::RoadNotFound(r) => PlanError::InvalidReference(r.to_string()),
            GraphError::IntersectionNotFound(i) => PlanError::InvalidReference(i.to_string()),
            GraphError::PlaceNotFound { kind, idx } => {
                PlanError::InvalidReference(format!("{kind:?} #{idx}"))
            }
            GraphError::TooFewWaypoints => PlanError::EmptyInput,
        }
    }
}
