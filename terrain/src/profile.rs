use crate::{
    range::{compute_range, RangeOutcome},
    ElevationSource, RayRequest, TerrainError,
};
use geo::geometry::Coord;
use log::debug;
use rayon::prelude::*;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Elevation at one point along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    /// Distance from the ray's origin in meters.
    pub distance_m: f64,

    /// Location of this sample (x = longitude, y = latitude).
    pub point: Coord<f64>,

    /// Elevation in meters, or `None` if the source had no data.
    pub elevation_m: Option<f64>,
}

/// Elevations sampled along a ray.
///
/// Read-only once built, so [`Profile::range`] always describes
/// [`Profile::samples`].
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    request: RayRequest,
    samples: Box<[ElevationSample]>,
}

impl Profile {
    pub fn builder() -> ProfileBuilder {
        ProfileBuilder {
            request: None,
            jobs: 1,
            cancel: None,
        }
    }

    /// The ray this profile was sampled along.
    pub fn request(&self) -> &RayRequest {
        &self.request
    }

    /// Samples in order of increasing distance.
    pub fn samples(&self) -> &[ElevationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples with an elevation.
    pub fn valid_count(&self) -> usize {
        self.samples
            .iter()
            .filter(|sample| sample.elevation_m.is_some())
            .count()
    }

    /// Trimmed elevation range (ΔH) over this profile.
    pub fn range(&self) -> RangeOutcome {
        compute_range(&self.samples)
    }
}

/// Shared flag used to abandon a profile between points.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ProfileBuilder {
    request: Option<RayRequest>,

    /// Number of points resolved concurrently.
    jobs: usize,

    /// Checked before each point is resolved.
    cancel: Option<CancelFlag>,
}

impl ProfileBuilder {
    pub fn request(mut self, request: RayRequest) -> Self {
        self.request = Some(request);
        self
    }

    /// Resolve up to `jobs` points at once. `0` and `1` both mean
    /// sequential.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build<S>(&self, source: &S) -> Result<Profile, TerrainError>
    where
        S: ElevationSource + ?Sized,
    {
        let request = self.request.ok_or(TerrainError::Builder)?;

        let (points, path_runtime) = {
            let now = std::time::Instant::now();
            let points = request.points();
            (points, now.elapsed())
        };

        let (samples, terrain_runtime) = {
            let now = std::time::Instant::now();
            let resolve = |&(distance_m, point): &(f64, Coord<f64>)| {
                self.resolve_one(source, distance_m, point)
            };
            let samples = if self.jobs > 1 {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(self.jobs)
                    .build()
                    .map_err(|e| TerrainError::Config(format!("thread pool: {e}")))?;
                // Indexed collect keeps input order regardless of
                // completion order.
                pool.install(|| {
                    points
                        .par_iter()
                        .map(resolve)
                        .collect::<Result<Vec<_>, _>>()
                })?
            } else {
                points.iter().map(resolve).collect::<Result<Vec<_>, _>>()?
            };
            (samples, now.elapsed())
        };

        debug!(
            "profile; source: {}, len: {}, jobs: {}, path_exec: {:?}, terrain_exec: {:?}",
            source.name(),
            samples.len(),
            self.jobs.max(1),
            path_runtime,
            terrain_runtime
        );

        Ok(Profile {
            request,
            samples: samples.into_boxed_slice(),
        })
    }

    fn resolve_one<S>(
        &self,
        source: &S,
        distance_m: f64,
        point: Coord<f64>,
    ) -> Result<ElevationSample, TerrainError>
    where
        S: ElevationSource + ?Sized,
    {
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return Err(TerrainError::Cancelled);
        }
        let elevation_m = source.resolve(point).filter(|elev| elev.is_finite());
        Ok(ElevationSample {
            distance_m,
            point,
            elevation_m,
        })
    }
}
