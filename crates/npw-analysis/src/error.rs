//! Analysis error type.

use thiserror::Error;

use npw_core::{IntersectionId, PlanError};
use npw_graph::{GraphError, PoiKind};
use npw_routes::RouteError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Route(#[from] RouteError),

    /// No path from the place to the network avoiding severances.
    #[error("{kind:?} #{idx} can't reach the network")]
    Unreachable { kind: PoiKind, idx: usize },

    #[error("{kind:?} #{idx} is already reachable")]
    AlreadyReachable { kind: PoiKind, idx: usize },

    #[error("the network has no routes")]
    EmptyNetwork,

    #[error("grid resolution must be positive, got {0}")]
    BadResolution(f64),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl From<AnalysisError> for PlanError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Graph(e) => e.into(),
            AnalysisError::Route(e) => e.into(),
            AnalysisError::Unreachable { .. } | AnalysisError::EmptyNetwork => {
                PlanError::NoPath { from: IntersectionId::INVALID, to: IntersectionId::INVALID }
            }
            AnalysisError::AlreadyReachable { kind, idx } => {
                PlanError::InvalidReference(format!("{kind:?} #{idx} is already reachable"))
            }
            AnalysisError::BadResolution(r) => {
                PlanError::MalformedInput(format!("grid resolution must be positive, got {r}"))
            }
        }
    }
}
