//! NASADEM/SRTM `.hgt` raster source.

use super::ElevationSource;
use crate::TerrainError;
use dashmap::DashMap;
use geo::geometry::Coord;
use log::{debug, warn};
use nasadem::{file_name, parse_sw_corner, sw_corner, NasademError, Tile};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Elevation sampled from HGT tiles on disk.
///
/// The source is either a single `.hgt` file or a directory of them.
/// Tiles are opened on first use and shared by every later lookup.
pub struct HgtSource {
    layout: Layout,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,

    /// Tiles which have been loaded on demand.
    ///
    /// `None` marks a tile that does not exist on disk, so it is not
    /// looked for again.
    tiles: DashMap<Coord<i16>, Option<Arc<Tile>>>,
}

enum Layout {
    /// One tile, covering the cell at `corner`.
    File { corner: Coord<i16> },

    /// Directory containing HGT tile files.
    Dir(PathBuf),
}

impl HgtSource {
    /// Opens the raster at `path`.
    ///
    /// Fails if `path` is neither a readable HGT file nor a directory
    /// containing at least one.
    pub fn new<P: AsRef<Path>>(path: P, tile_mode: TileMode) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        let tiles = DashMap::new();

        let layout = if path.is_file() {
            let corner = parse_sw_corner(path).map_err(unavailable)?;
            let tile = load(path, tile_mode).map_err(unavailable)?;
            tiles.insert(corner, Some(Arc::new(tile)));
            Layout::File { corner }
        } else if path.is_dir() {
            if !has_height_files(path)? {
                return Err(TerrainError::SourceUnavailable(format!(
                    "no height files in {}",
                    path.display()
                )));
            }
            Layout::Dir(path.to_owned())
        } else {
            return Err(TerrainError::SourceUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        };

        Ok(Self {
            layout,
            tile_mode,
            tiles,
        })
    }

    /// Returns the tile containiong `coord`, if any.
    ///
    /// This source will attempt to load the tile from disk if it
    /// doesn't already have it in memory.
    pub fn get(&self, coord: Coord<f64>) -> Option<Arc<Tile>> {
        let sw_corner = sw_corner(coord);
        if let Some(tile) = self.tiles.get(&sw_corner) {
            return tile.value().clone();
        }
        self.tiles
            .entry(sw_corner)
            .or_insert_with(|| self.load_tile(sw_corner))
            .value()
            .clone()
    }
}

/// Private API.
impl HgtSource {
    fn load_tile(&self, sw_corner: Coord<i16>) -> Option<Arc<Tile>> {
        let Layout::Dir(tile_dir) = &self.layout else {
            // A single-file source only ever covers its own cell,
            // which was loaded up front.
            return None;
        };
        let tile_path = {
            let file_name = file_name(sw_corner);
            let mut tile_path = tile_dir.join(&file_name);
            if !tile_path.exists() {
                tile_path = tile_dir.join(file_name.to_lowercase());
            }
            tile_path
        };
        debug!("loading {tile_path:?}");
        match load(&tile_path, self.tile_mode) {
            Ok(tile) => Some(Arc::new(tile)),
            Err(NasademError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("no tile for {sw_corner:?}");
                None
            }
            Err(e) => {
                warn!("skipping {tile_path:?}: {e}");
                None
            }
        }
    }
}

impl ElevationSource for HgtSource {
    fn resolve(&self, coord: Coord<f64>) -> Option<f64> {
        if !(coord.x.is_finite() && coord.y.is_finite()) {
            return None;
        }
        if let Layout::File { corner } = self.layout {
            if sw_corner(coord) != corner {
                return None;
            }
        }
        self.get(coord)?.get(coord).map(f64::from)
    }

    fn name(&self) -> &str {
        "hgt"
    }
}

/// How to handle tile.
///
/// The trade off between loading tile data into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMode {
    /// Parse tile and load into memory.
    InMem,

    /// Memory map file contents.
    #[default]
    MemMap,
}

fn load(path: &Path, tile_mode: TileMode) -> Result<Tile, NasademError> {
    match tile_mode {
        TileMode::InMem => Tile::load(path),
        TileMode::MemMap => Tile::memmap(path),
    }
}

fn has_height_files(dir: &Path) -> Result<bool, TerrainError> {
    let read_err =
        |e: std::io::Error| TerrainError::SourceUnavailable(format!("{}: {e}", dir.display()));
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("hgt"))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn unavailable(e: NasademError) -> TerrainError {
    TerrainError::SourceUnavailable(e.to_string())
}
