//! Engine-wide error taxonomy.
//!
//! Lower crates keep their own error enums and convert into `PlanError` via
//! `From` impls, so the request boundary only ever sees these variants.

use thiserror::Error;

use crate::IntersectionId;

#[derive(Debug, Error)]
pub enum PlanError {
    /// Bad graph bytes or savefile.  Never corrupts previously loaded state.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// An operation was invoked before a graph was loaded.
    #[error("no study area is loaded")]
    NotReady,

    #[error("couldn't connect {from} to {to}")]
    NoPath { from: IntersectionId, to: IntersectionId },

    /// A route, road, POI or zone id that doesn't exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("at least two waypoints are required")]
    EmptyInput,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type PlanResult<T> = Result<T, PlanError>;
