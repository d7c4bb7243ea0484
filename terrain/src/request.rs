use crate::{
    constants::MAX_SAMPLES,
    math::{sample_count, sample_points, step_distances},
    TerrainError,
};
use geo::geometry::Coord;

/// A validated ray: where it starts, which way it points, and which
/// stretch of it to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayRequest {
    origin: Coord<f64>,
    bearing_deg: f64,
    start_distance_m: f64,
    end_distance_m: f64,
    step_m: f64,
}

impl RayRequest {
    pub fn builder() -> RayRequestBuilder {
        RayRequestBuilder {
            origin: None,
            bearing_deg: None,
            start_distance_m: 0.0,
            end_distance_m: None,
            step_m: None,
        }
    }

    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    /// Bearing in degrees clockwise from north, normalized to
    /// `[0, 360)`.
    pub fn bearing_deg(&self) -> f64 {
        self.bearing_deg
    }

    pub fn start_distance_m(&self) -> f64 {
        self.start_distance_m
    }

    pub fn end_distance_m(&self) -> f64 {
        self.end_distance_m
    }

    pub fn step_m(&self) -> f64 {
        self.step_m
    }

    /// Distances from the origin, in meters, at which to sample.
    pub fn distances(&self) -> Vec<f64> {
        step_distances(self.start_distance_m, self.end_distance_m, self.step_m).collect()
    }

    /// Returns `(distance_m, point)` for every sample along the ray.
    pub fn points(&self) -> Vec<(f64, Coord<f64>)> {
        let distances = self.distances();
        let points = sample_points(self.origin, self.bearing_deg, &distances);
        distances.into_iter().zip(points).collect()
    }
}

pub struct RayRequestBuilder {
    origin: Option<Coord<f64>>,

    /// Degrees clockwise from north; any range.
    bearing_deg: Option<f64>,

    /// Distance of the first sample from `origin` (meters).
    start_distance_m: f64,

    /// Distance of the last sample from `origin` (meters).
    end_distance_m: Option<f64>,

    /// Distance between samples (meters).
    step_m: Option<f64>,
}

impl RayRequestBuilder {
    pub fn origin(mut self, coord: Coord<f64>) -> Self {
        self.origin = Some(coord);
        self
    }

    pub fn bearing(mut self, degrees: f64) -> Self {
        self.bearing_deg = Some(degrees);
        self
    }

    pub fn start_distance(mut self, meters: f64) -> Self {
        self.start_distance_m = meters;
        self
    }

    pub fn end_distance(mut self, meters: f64) -> Self {
        self.end_distance_m = Some(meters);
        self
    }

    pub fn step(mut self, meters: f64) -> Self {
        self.step_m = Some(meters);
        self
    }

    pub fn build(&self) -> Result<RayRequest, TerrainError> {
        let (Some(origin), Some(bearing_deg), Some(end_distance_m), Some(step_m)) =
            (self.origin, self.bearing_deg, self.end_distance_m, self.step_m)
        else {
            return Err(TerrainError::Builder);
        };
        let start_distance_m = self.start_distance_m;

        let invalid = |msg: String| Err(TerrainError::Validation(msg));

        if !(origin.x.is_finite() && origin.y.is_finite()) {
            return invalid(format!("origin {origin:?} is not finite"));
        }
        if !(-90.0..=90.0).contains(&origin.y) {
            return invalid(format!("latitude {} outside [-90, 90]", origin.y));
        }
        if !(-180.0..=180.0).contains(&origin.x) {
            return invalid(format!("longitude {} outside [-180, 180]", origin.x));
        }
        if !bearing_deg.is_finite() {
            return invalid(format!("bearing {bearing_deg} is not finite"));
        }
        if !(start_distance_m.is_finite() && start_distance_m >= 0.0) {
            return invalid(format!("start distance {start_distance_m} m must be >= 0"));
        }
        if !(end_distance_m.is_finite() && end_distance_m > start_distance_m) {
            return invalid(format!(
                "end distance {end_distance_m} m must be greater than start distance {start_distance_m} m"
            ));
        }
        if !(step_m.is_finite() && step_m > 0.0) {
            return invalid(format!("step {step_m} m must be > 0"));
        }
        if !sample_count(start_distance_m, end_distance_m, step_m)
            .is_some_and(|count| count <= MAX_SAMPLES)
        {
            return invalid(format!(
                "{start_distance_m} m to {end_distance_m} m in steps of {step_m} m \
                 exceeds {MAX_SAMPLES} samples"
            ));
        }

        Ok(RayRequest {
            origin,
            bearing_deg: bearing_deg.rem_euclid(360.0),
            start_distance_m,
            end_distance_m,
            step_m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, RayRequest, TerrainError, MAX_SAMPLES};

    const ORIGIN: Coord = Coord { x: -80.0, y: 8.5 };

    fn valid() -> super::RayRequestBuilder {
        RayRequest::builder()
            .origin(ORIGIN)
            .bearing(90.0)
            .start_distance(10_000.0)
            .end_distance(50_000.0)
            .step(500.0)
    }

    #[test]
    fn test_build() {
        let request = valid().build().unwrap();
        assert_eq!(request.origin(), ORIGIN);
        assert_eq!(request.distances().len(), 81);
        let points = request.points();
        assert_eq!(points.len(), 81);
        assert_eq!(points[0].0, 10_000.0);
        assert_eq!(points[80].0, 50_000.0);
    }

    #[test]
    fn test_bearing_normalized() {
        assert_eq!(valid().bearing(-90.0).build().unwrap().bearing_deg(), 270.0);
        assert_eq!(valid().bearing(450.0).build().unwrap().bearing_deg(), 90.0);
        assert_eq!(valid().bearing(360.0).build().unwrap().bearing_deg(), 0.0);
    }

    #[test]
    fn test_sample_cap() {
        let at_cap = valid()
            .start_distance(0.0)
            .end_distance((MAX_SAMPLES - 1) as f64)
            .step(1.0)
            .build()
            .unwrap();
        assert_eq!(at_cap.distances().len(), MAX_SAMPLES);

        let over_cap = valid()
            .start_distance(0.0)
            .end_distance(MAX_SAMPLES as f64)
            .step(1.0)
            .build();
        assert!(matches!(over_cap, Err(TerrainError::Validation(_))));
    }

    #[test]
    fn test_missing_parameters() {
        assert!(matches!(
            RayRequest::builder().origin(ORIGIN).build(),
            Err(TerrainError::Builder)
        ));
    }

    #[test]
    fn test_validation_errors() {
        let rejected = [
            valid().end_distance(10_000.0),
            valid().end_distance(5_000.0),
            valid().step(0.0),
            valid().step(-1.0),
            valid().start_distance(-1.0),
            valid().origin(Coord { x: 0.0, y: 91.0 }),
            valid().origin(Coord { x: 181.0, y: 0.0 }),
            valid().origin(Coord {
                x: f64::NAN,
                y: 0.0,
            }),
            valid().bearing(f64::INFINITY),
            valid().start_distance(0.0).end_distance(1e20).step(1.0),
            valid().start_distance(0.0).end_distance(1e300).step(1e-300),
            valid().start_distance(0.0).end_distance(2_000_000.0).step(1.0),
        ];
        for builder in rejected {
            assert!(matches!(builder.build(), Err(TerrainError::Validation(_))));
        }
    }
}
