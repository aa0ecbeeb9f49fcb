//! Projection between WGS84 and a local metric plane.
//!
//! All geometry inside the engine is in metres relative to the south-west
//! corner of the study area's bounding box.  An equirectangular projection
//! scaled at the box's mid latitude keeps distance error well under 1 % for
//! an area the size of a single council.  Responses are converted back to
//! WGS84 before they leave the engine.

use geo::{Coord, MapCoords, MapCoordsInPlace, Rect};

/// Equatorial radius of the WGS84 ellipsoid, metres.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mercator {
    pub wgs84_bounds: Rect,
    /// Metres per degree of longitude at the reference latitude.
    x_scale: f64,
    /// Metres per degree of latitude.
    y_scale: f64,
}

impl Mercator {
    /// Build a projection anchored at the south-west corner of `wgs84_bounds`.
    pub fn from_bounds(wgs84_bounds: Rect) -> Self {
        let mid_lat = (wgs84_bounds.min().y + wgs84_bounds.max().y) / 2.0;
        let y_scale = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        Self {
            wgs84_bounds,
            x_scale: y_scale * mid_lat.to_radians().cos(),
            y_scale,
        }
    }

    #[inline]
    pub fn pt_to_mercator(&self, pt: Coord) -> Coord {
        Coord {
            x: (pt.x - self.wgs84_bounds.min().x) * self.x_scale,
            y: (pt.y - self.wgs84_bounds.min().y) * self.y_scale,
        }
    }

    #[inline]
    pub fn pt_to_wgs84(&self, pt: Coord) -> Coord {
        Coord {
            x: self.wgs84_bounds.min().x + pt.x / self.x_scale,
            y: self.wgs84_bounds.min().y + pt.y / self.y_scale,
        }
    }

    pub fn to_mercator<G>(&self, geom: &G) -> G
    where
        G: MapCoords<f64, f64, Output = G>,
    {
        geom.map_coords(|c| self.pt_to_mercator(c))
    }

    pub fn to_wgs84<G>(&self, geom: &G) -> G
    where
        G: MapCoords<f64, f64, Output = G>,
    {
        geom.map_coords(|c| self.pt_to_wgs84(c))
    }

    pub fn to_wgs84_in_place<G: MapCoordsInPlace<f64>>(&self, geom: &mut G) {
        geom.map_coords_in_place(|c| self.pt_to_wgs84(c));
    }

    /// `[min_x, min_y, max_x, max_y]` in WGS84.
    pub fn bounds_array(&self) -> [f64; 4] {
        rect_to_array(&self.wgs84_bounds)
    }
}

/// Flatten a rectangle into GeoJSON bbox order.
pub fn rect_to_array(rect: &Rect) -> [f64; 4] {
    [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
}

/// Round a WGS84 ordinate to 6 decimal places (about 10 cm).
#[inline]
pub fn trim_lon_lat(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}
