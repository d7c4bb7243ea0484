//! Terrarium elevation tiles.
//!
//! Terrarium tiles are 256×256 PNGs on the Web-Mercator tile grid
//! whose pixels pack elevation into the RGB channels:
//!
//! ```text
//! elevation = R·256 + G + B/256 − 32768
//! ```
//!
//! # References
//!
//! 1. [Mapzen terrain tiles](https://github.com/tilezen/joerd/blob/master/docs/formats.md#terrarium)
//! 1. [Slippy map tilenames](https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames)

use super::{ElevationSource, HttpClient, ReqwestClient};
use crate::{
    constants::{TERRARIUM_ZOOM, TILE_SIZE},
    TerrainError,
};
use dashmap::DashMap;
use geo::geometry::Coord;
use image::RgbImage;
use log::{debug, warn};
use std::{f64::consts::PI, sync::Arc, time::Duration};

/// Public AWS mirror of the Terrarium tile set.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://s3.amazonaws.com/elevation-tiles-prod/terrarium/{z}/{x}/{y}.png";

/// Highest zoom level the public tile set is published at.
const MAX_ZOOM: u8 = 15;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Location of a point on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub zoom: u8,
    pub tile_x: u32,
    pub tile_y: u32,
    /// Column within the tile, `0..256`.
    pub pixel_x: u32,
    /// Row within the tile, `0..256`.
    pub pixel_y: u32,
}

/// Returns the tile and pixel containing `coord` at `zoom`.
///
/// Returns `None` for points off the tile grid: latitudes beyond the
/// Web-Mercator limit (about ±85.05°) and longitudes outside
/// `[-180, 180)`.
pub fn tile_index(coord: Coord<f64>, zoom: u8) -> Option<TileIndex> {
    let n = 2_f64.powi(i32::from(zoom));
    let lat_rad = coord.y.to_radians();

    let x = (coord.x + 180.0) / 360.0 * n;
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    let (tile_x, pixel_x) = split(x, n)?;
    let (tile_y, pixel_y) = split(y, n)?;

    Some(TileIndex {
        zoom,
        tile_x,
        tile_y,
        pixel_x,
        pixel_y,
    })
}

/// Splits a continuous tile coordinate into tile and pixel indices.
fn split(continuous: f64, n: f64) -> Option<(u32, u32)> {
    let tile = continuous.floor();
    if !(0.0..n).contains(&tile) {
        return None;
    }
    let max_pixel = f64::from(TILE_SIZE - 1);
    let pixel = ((continuous - tile) * f64::from(TILE_SIZE))
        .floor()
        .clamp(0.0, max_pixel);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let indices = (tile as u32, pixel as u32);
    Some(indices)
}

/// Decodes a Terrarium pixel into meters.
pub fn decode_terrarium([r, g, b]: [u8; 3]) -> f64 {
    f64::from(r) * 256.0 + f64::from(g) + f64::from(b) / 256.0 - 32768.0
}

/// Elevation from Terrarium tiles fetched over HTTP.
///
/// Tiles are fetched on first use and kept for the lifetime of this
/// source, so walking a ray fetches each tile it crosses once. Failed
/// fetches are not kept; the next point in that tile fetches it again.
pub struct TerrariumSource<H = ReqwestClient> {
    client: H,

    /// Tile URL with `{z}`, `{x}` and `{y}` placeholders.
    url_template: String,

    zoom: u8,

    /// Decoded tiles by `(x, y)`.
    tiles: DashMap<(u32, u32), Arc<RgbImage>>,
}

impl TerrariumSource {
    pub fn builder() -> TerrariumSourceBuilder {
        TerrariumSourceBuilder {
            url_template: DEFAULT_URL_TEMPLATE.to_owned(),
            zoom: TERRARIUM_ZOOM,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl<H: HttpClient> TerrariumSource<H> {
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Returns the URL of tile `(x, y)` at this source's zoom.
    pub fn tile_url(&self, tile_x: u32, tile_y: u32) -> String {
        self.url_template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &tile_x.to_string())
            .replace("{y}", &tile_y.to_string())
    }

    fn tile(&self, key: (u32, u32)) -> Option<Arc<RgbImage>> {
        if let Some(tile) = self.tiles.get(&key) {
            return Some(tile.value().clone());
        }
        // Fetch without holding the map's lock; a concurrent fetch of
        // the same tile may race, and the first insert wins.
        let fetched = self.fetch_tile(key)?;
        Some(self.tiles.entry(key).or_insert(fetched).value().clone())
    }

    fn fetch_tile(&self, (tile_x, tile_y): (u32, u32)) -> Option<Arc<RgbImage>> {
        let url = self.tile_url(tile_x, tile_y);
        let now = std::time::Instant::now();
        let bytes = match self.client.get(&url) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("terrarium: {e}");
                return None;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(img) => {
                debug!("fetched {url} in {:?}", now.elapsed());
                Some(Arc::new(img.to_rgb8()))
            }
            Err(e) => {
                warn!("terrarium: decoding {url}: {e}");
                None
            }
        }
    }
}

impl<H: HttpClient> ElevationSource for TerrariumSource<H> {
    fn resolve(&self, coord: Coord<f64>) -> Option<f64> {
        let TileIndex {
            tile_x,
            tile_y,
            pixel_x,
            pixel_y,
            ..
        } = tile_index(coord, self.zoom)?;
        let tile = self.tile((tile_x, tile_y))?;
        let pixel = tile.get_pixel_checked(pixel_x, pixel_y)?;
        Some(decode_terrarium(pixel.0))
    }

    fn name(&self) -> &str {
        "terrarium"
    }
}

pub struct TerrariumSourceBuilder {
    url_template: String,
    zoom: u8,
    timeout: Duration,
}

impl TerrariumSourceBuilder {
    pub fn url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    /// Per-tile fetch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<TerrariumSource, TerrainError> {
        let client = ReqwestClient::with_timeout(self.timeout)?;
        self.build_with_client(client)
    }

    pub fn build_with_client<H: HttpClient>(self, client: H) -> Result<TerrariumSource<H>, TerrainError> {
        if self.zoom > MAX_ZOOM {
            return Err(TerrainError::Config(format!(
                "zoom {} exceeds maximum of {MAX_ZOOM}",
                self.zoom
            )));
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return Err(TerrainError::Config(format!(
                    "tile URL template {:?} lacks {placeholder}",
                    self.url_template
                )));
            }
        }
        Ok(TerrariumSource {
            client,
            url_template: self.url_template,
            zoom: self.zoom,
            tiles: DashMap::new(),
        })
    }
}
