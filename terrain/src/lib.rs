//! Elevation profiles along great-circle rays.
//!
//! A [`RayRequest`] describes a ray (origin, bearing) and the stretch
//! of it to sample. [`Profile::builder`] walks the ray, resolving each
//! point through an [`ElevationSource`], and [`Profile::range`]
//! summarizes the result as a trimmed elevation range.

pub mod constants;
pub mod elevation;
mod error;
pub mod math;
mod profile;
mod range;
mod request;

pub use crate::{
    elevation::ElevationSource,
    error::TerrainError,
    profile::{CancelFlag, ElevationSample, Profile, ProfileBuilder},
    range::{compute_range, trimmed_range, RangeOutcome, RangeStat},
    request::{RayRequest, RayRequestBuilder},
};
pub use geo;
