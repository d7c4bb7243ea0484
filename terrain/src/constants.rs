/// Mean Earth radius, in meters, of the spherical model used for ray
/// sampling.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_000.0;

/// Web-Mercator zoom level used for Terrarium tiles by default.
///
/// Zoom 12 gives roughly 30-40 m per pixel.
pub const TERRARIUM_ZOOM: u8 = 12;

/// Pixels along each edge of a Terrarium tile.
pub const TILE_SIZE: u32 = 256;

/// Fewest valid samples a range statistic is computed from.
pub const MIN_VALID_SAMPLES: usize = 10;

/// Most samples a single ray request may ask for.
pub const MAX_SAMPLES: usize = 1_000_000;
