//! Argument parsing and the subcommands.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use npw_classify::LosTable;
use npw_core::EngineConfig;
use npw_engine::Engine;
use npw_graph::synthetic::grid;
use npw_graph::RoadAttrs;

use crate::export::write_od_csv;

/// Cycling network planning: load a study area, optionally with saved
/// routes, and print metrics as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Files every analysis command starts from.
#[derive(Debug, Clone, Args)]
pub struct Inputs {
    /// binary graph payload of the study area
    #[arg(short, long)]
    pub graph: PathBuf,
    /// routes saved from an earlier session
    #[arg(short, long)]
    pub savefile: Option<PathBuf>,
    /// engine config overrides (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Level of Service table replacing the built-in one (TOML)
    #[arg(long)]
    pub los_table: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// network stats and scorecard
    Stats {
        #[command(flatten)]
        inputs: Inputs,
        /// report the network with no routes instead
        #[arg(long)]
        baseline: bool,
        /// also compute directness between town centres
        #[arg(long)]
        slow: bool,
    },
    /// sample trips over the desire lines
    Od {
        #[command(flatten)]
        inputs: Inputs,
        /// draw every trip instead of one weighted trip per desire line
        #[arg(long)]
        full: bool,
        /// write per-road counts to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// connected components of the network
    Components {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// write a synthetic grid study area, handy for trying things out
    Synth {
        /// output payload path
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 10)]
        cols: u32,
        #[arg(long, default_value_t = 10)]
        rows: u32,
        /// grid spacing in degrees
        #[arg(long, default_value_t = 0.001)]
        spacing: f64,
    },
}

impl Command {
    pub fn run(&self, out: &mut impl Write) -> Result<()> {
        match self {
            Command::Stats { inputs, baseline, slow } => {
                let engine = inputs.engine()?;
                let stats = if *baseline { engine.get_baseline_stats()? } else { engine.recalculate_stats()? };
                let mut report = serde_json::to_value(&stats)?;
                if *slow {
                    report["slow_stats"] = serde_json::to_value(engine.recalculate_slow_stats()?)?;
                }
                print_json(out, &report)
            }
            Command::Od { inputs, full, csv } => {
                let engine = inputs.engine()?;
                let od = engine.evaluate_od(!*full)?;
                if let Some(path) = csv {
                    let rows = write_od_csv(path, &od)?;
                    log::info!("Wrote {rows} road(s) to {}", path.display());
                }
                let summary = od.foreign_members.unwrap_or_default();
                print_json(out, &serde_json::Value::Object(summary))
            }
            Command::Components { inputs } => {
                let fc = inputs.engine()?.get_connected_components()?;
                print_json(out, &serde_json::to_value(&fc)?)
            }
            Command::Synth { out: path, cols, rows, spacing } => {
                anyhow::ensure!(*cols >= 2 && *rows >= 1, "a grid needs at least 2 columns and 1 row");
                let payload = grid("Synthetic", *cols, *rows, *spacing, |_| RoadAttrs::default()).build();
                let roads = payload.roads.len();
                fs::write(path, payload.encode()?).with_context(|| format!("writing {}", path.display()))?;
                print_json(out, &json!({ "path": path, "roads": roads }))
            }
        }
    }
}

impl Inputs {
    /// An engine with the graph (and savefile, if any) loaded.
    pub fn engine(&self) -> Result<Engine> {
        let config = match &self.config {
            Some(path) => EngineConfig::from_toml_str(&read(path)?)?,
            None => EngineConfig::default(),
        };
        let table = match &self.los_table {
            Some(path) => LosTable::from_toml_str(&read(path)?)?,
            None => LosTable::default(),
        };
        let mut engine = Engine::new(config, table)?;

        let bytes = fs::read(&self.graph).with_context(|| format!("reading {}", self.graph.display()))?;
        engine
            .load_graph(&bytes)
            .with_context(|| format!("loading graph {}", self.graph.display()))?;
        if let Some(path) = &self.savefile {
            engine
                .load_savefile(&read(path)?)
                .with_context(|| format!("loading savefile {}", path.display()))?;
        }
        Ok(engine)
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json(out: &mut impl Write, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
