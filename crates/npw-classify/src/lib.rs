//! `npw-classify` — infrastructure and Level of Service policy.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`los`]      | `LosTable` (TOML-loadable), `LosRule`, `SpeedBand`          |
//! | [`classify`] | `recommend`, `fits`, `tier_band`, `classify`, `gradient_group` |
//! | [`error`]    | `ClassifyError`, `ClassifyResult<T>`                         |
//!
//! Nothing here looks at routes: every function is a pure function of one
//! road's static attributes and the table.

pub mod classify;
pub mod error;
pub mod los;

#[cfg(test)]
mod tests;

pub use classify::{classify, fits, gradient_group, recommend, tier_band, Classification};
pub use error::{ClassifyError, ClassifyResult};
pub use los::{LosRule, LosTable, SpeedBand};

/// The default table in its TOML form.
pub const DEFAULT_LOS_TABLE_TOML: &str = include_str!("../los_table.toml");
