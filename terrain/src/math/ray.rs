//! Destination points along a great-circle ray.
//!
//! Solves the direct geodesic problem on a sphere of radius
//! [`MEAN_EARTH_RADIUS`]: given an origin, an initial bearing, and a
//! distance, find the point reached.
//!
//! Longitudes are not wrapped, so rays crossing the antimeridian
//! produce values outside `[-180, 180]`.

use crate::constants::MEAN_EARTH_RADIUS;
use geo::geometry::Coord;

/// Iterator over the points reached by travelling from an origin, at
/// a fixed initial bearing, for each of a sequence of distances.
pub struct RayIter<I> {
    params: RayParams,
    distances: I,
}

impl<I> RayIter<I>
where
    I: Iterator<Item = f64>,
{
    /// `bearing_deg` is measured clockwise from north; distances are
    /// in meters.
    pub fn new<D>(origin: Coord<f64>, bearing_deg: f64, distances: D) -> Self
    where
        D: IntoIterator<IntoIter = I>,
    {
        Self {
            params: get_params(origin, bearing_deg),
            distances: distances.into_iter(),
        }
    }
}

impl<I> Iterator for RayIter<I>
where
    I: Iterator<Item = f64>,
{
    type Item = Coord<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.distances
            .next()
            .map(|distance_m| get_point(&self.params, distance_m))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.distances.size_hint()
    }
}

impl<I> ExactSizeIterator for RayIter<I> where I: ExactSizeIterator<Item = f64> {}

/// Returns one point per entry in `distances_m`, in the same order.
pub fn sample_points(origin: Coord<f64>, bearing_deg: f64, distances_m: &[f64]) -> Vec<Coord<f64>> {
    RayIter::new(origin, bearing_deg, distances_m.iter().copied()).collect()
}

struct RayParams {
    lat1_sin: f64,
    lat1_cos: f64,
    lon1: f64,
    bearing_sin: f64,
    bearing_cos: f64,
}

fn get_params(origin: Coord<f64>, bearing_deg: f64) -> RayParams {
    let (lat1_sin, lat1_cos) = origin.y.to_radians().sin_cos();
    let (bearing_sin, bearing_cos) = bearing_deg.to_radians().sin_cos();
    RayParams {
        lat1_sin,
        lat1_cos,
        lon1: origin.x.to_radians(),
        bearing_sin,
        bearing_cos,
    }
}

fn get_point(params: &RayParams, distance_m: f64) -> Coord<f64> {
    let RayParams {
        lat1_sin,
        lat1_cos,
        lon1,
        bearing_sin,
        bearing_cos,
    } = *params;

    let (delta_sin, delta_cos) = (distance_m / MEAN_EARTH_RADIUS).sin_cos();

    // Rounding can push the argument a hair past ±1.
    let lat2 = (lat1_sin * delta_cos + lat1_cos * delta_sin * bearing_cos)
        .clamp(-1.0, 1.0)
        .asin();
    let lon2 = lon1
        + (bearing_sin * delta_sin * lat1_cos).atan2(delta_cos - lat1_sin * lat2.sin());

    Coord {
        x: lon2.to_degrees(),
        y: lat2.to_degrees(),
    }
}
