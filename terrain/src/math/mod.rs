mod ray;
mod steps;

pub use {
    ray::{sample_points, RayIter},
    steps::{sample_count, step_distances},
};
