//! `npw-cli` — the `npw` binary.
//!
//! # Crate layout
//!
//! | Module     | Contents                                         |
//! |------------|--------------------------------------------------|
//! | [`cli`]    | `Cli`, `Command`, `Inputs` and running commands  |
//! | [`export`] | CSV export of per-road OD counts                 |
//!
//! ```text
//! npw synth --out area.bin --cols 20 --rows 20
//! npw stats --graph area.bin --savefile routes.geojson --slow
//! npw od --graph area.bin --full --csv counts.csv
//! npw components --graph area.bin
//! ```
//!
//! Logging goes through `env_logger`; set `RUST_LOG=info` to see load and
//! sampling summaries.

pub mod cli;
pub mod export;


pub use cli::{Cli, Command, Inputs};
