//! CSV export of per-road OD counts.

use std::path::Path;

use anyhow::Result;
use csv::Writer;
use geojson::FeatureCollection;

/// One row per road with a non-zero count: `road_id, count, infra_type,
/// los`.  Roads off the network have an empty `infra_type`.  Returns the
/// number of rows written.
pub fn write_od_csv(path: &Path, od: &FeatureCollection) -> Result<usize> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["road_id", "count", "infra_type", "los"])?;

    let field = |f: &geojson::Feature, key: &str| -> String {
        match f.property(key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    };
    for f in &od.features {
        writer.write_record([field(f, "id"), field(f, "count"), field(f, "infra_type"), field(f, "los")])?;
    }
    writer.flush()?;
    Ok(od.features.len())
}
