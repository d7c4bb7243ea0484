//! Elevation lookup for single points.
//!
//! Every source resolves a coordinate to meters above sea level, or
//! `None` when no value can be had for that point. Per-point failures
//! (missing tiles, timeouts, malformed responses, voids) never surface
//! as errors; only configuration problems do, and those are reported
//! when the source is constructed.

mod hgt;
mod http;
mod query;
mod terrarium;

pub use self::{
    hgt::{HgtSource, TileMode},
    http::{FetchError, HttpClient, ReqwestClient},
    query::{parse_elevation, PointQuerySource, PointQuerySourceBuilder},
    terrarium::{decode_terrarium, tile_index, TerrariumSource, TerrariumSourceBuilder, TileIndex},
};
use geo::geometry::Coord;

#[cfg(test)]
pub(crate) use self::{
    hgt::tests::write_flat_tile,
    http::tests::{MockHttpClient, TimeoutHttpClient},
};

/// Resolves points to elevations.
///
/// Implementations must be safe to share between threads: a profile
/// may resolve its points in parallel.
pub trait ElevationSource: Send + Sync {
    /// Returns the elevation at `coord` (x = longitude, y = latitude)
    /// in meters, or `None` if there is no data for it.
    fn resolve(&self, coord: Coord<f64>) -> Option<f64>;

    /// Short human readable name for logs.
    fn name(&self) -> &str;
}

impl<S: ElevationSource + ?Sized> ElevationSource for Box<S> {
    fn resolve(&self, coord: Coord<f64>) -> Option<f64> {
        (**self).resolve(coord)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
