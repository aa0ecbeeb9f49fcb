//! Mesh density: how closely spaced the network is inside settlements.

use std::collections::BTreeMap;

use geo::{Area, Coord, LineInterpolatePoint, Rect};
use geojson::{Feature, FeatureCollection, Geometry, Value};

use npw_graph::StudyArea;

use crate::overlay::Overlay;
use crate::{AnalysisError, AnalysisResult};

/// Average spacing in metres between parallel routes inside settlements:
/// for a square grid of spacing `s`, network length per unit area is
/// `2 / s`.  `None` when no network road is inside a settlement.
pub fn mesh_density(area: &StudyArea, overlay: &Overlay) -> Option<f64> {
    let settlement_area: f64 = area.settlements.iter().map(|s| s.polygon.unsigned_area()).sum();
    let network_length: f64 = overlay
        .network_roads()
        .map(|r| &area.graph.roads[r.index()])
        .filter(|road| road.attrs.within_settlement)
        .map(|road| road.length_m)
        .sum();
    (network_length > 0.0).then(|| 2.0 * settlement_area / network_length)
}

/// Road length per square cell of `resolution` metres, with the grid
/// shifted by the offsets.  Each road counts towards the cell holding its
/// midpoint.  Only cells with roads are returned; each has `routes`
/// (network length), `total` and `ratio`.
pub fn grid_mesh_density(
    area: &StudyArea,
    overlay: &Overlay,
    resolution: f64,
    x_offset: f64,
    y_offset: f64,
) -> AnalysisResult<FeatureCollection> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(AnalysisError::BadResolution(resolution));
    }
    // Grid origin at or below zero so every cell index is non-negative.
    let origin = Coord {
        x: x_offset.rem_euclid(resolution) - resolution,
        y: y_offset.rem_euclid(resolution) - resolution,
    };

    let mut cells: BTreeMap<(u64, u64), (f64, f64)> = BTreeMap::new();
    for road in &area.graph.roads {
        let Some(mid) = road.linestring.line_interpolate_point(0.5) else {
            continue;
        };
        let col = ((mid.x() - origin.x) / resolution).floor().max(0.0) as u64;
        let row = ((mid.y() - origin.y) / resolution).floor().max(0.0) as u64;
        let cell = cells.entry((col, row)).or_default();
        cell.1 += road.length_m;
        if overlay.is_network(road.id) {
            cell.0 += road.length_m;
        }
    }

    let features = cells
        .into_iter()
        .map(|((col, row), (routes, total))| {
            let min = Coord {
                x: origin.x + col as f64 * resolution,
                y: origin.y + row as f64 * resolution,
            };
            let rect = Rect::new(min, Coord { x: min.x + resolution, y: min.y + resolution });
            let mut f = Feature {
                geometry: Some(Geometry::new(Value::from(&area.mercator.to_wgs84(&rect.to_polygon())))),
                ..Default::default()
            };
            f.set_property("routes", routes);
            f.set_property("total", total);
            f.set_property("ratio", if total > 0.0 { routes / total } else { 0.0 });
            f
        })
        .collect();
    Ok(FeatureCollection { bbox: None, features, foreign_members: None })
}
