//! NASADEM evelation (`.hgt`) file format.
//!
//! # References
//!
//! 1. [30-Meter SRTM Tile Downloader](https://dwtkns.com/srtm30m)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;
mod name;

pub use crate::{
    error::NasademError,
    name::{file_name, parse_sw_corner, sw_corner},
};
use byteorder::{BigEndian as BE, ByteOrder, ReadBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

/// Value SRTM uses to mark cells without a valid measurement.
pub const VOID: i16 = i16::MIN;

const ARCSEC_PER_DEG: C = 3600.0;

pub struct Tile {
    /// Southwest corner of the tile.
    ///
    /// Specificlly, the _center_ of the SW most sample of the tile.
    sw_corner_center: Coord<C>,

    /// Arcseconds per sample.
    resolution: u8,

    /// Number of (columns, rows) in this tile.
    dimensions: (usize, usize),

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[i16]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get(&self, index: usize) -> Option<i16> {
        match self {
            Self::InMem(samples) => samples.get(index).copied(),
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                raw.get(start..start + size_of::<i16>()).map(BE::read_i16)
            }
        }
    }
}

impl Tile {
    /// Returns a Tile read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimensions @ (cols, rows)) = extract_resolution(&path)?;
        let sw_corner_center = corner_center(&path)?;

        let mut file = BufReader::new(File::open(path)?);

        let samples = {
            let mut sample_store = Vec::with_capacity(cols * rows);
            for _ in 0..(cols * rows) {
                sample_store.push(file.read_i16::<BE>()?);
            }
            SampleStore::InMem(sample_store.into_boxed_slice())
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimensions,
            samples,
        })
    }

    /// Returns a Tile using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimensions) = extract_resolution(&path)?;
        let sw_corner_center = corner_center(&path)?;

        let samples = {
            let file = File::open(path)?;
            // The mapping is read-only and the file length was checked
            // above.
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimensions,
            samples,
        })
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (x, y) = self.dimensions;
        x * y
    }

    /// Rreturns this tile's resolution in arcseconds per sample.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Returns the center of this tile's southwest-most sample.
    pub fn sw_corner(&self) -> Coord<C> {
        self.sw_corner_center
    }

    /// Returns the elevation of the sample nearest to `coord`.
    ///
    /// Returns `None` when `coord` lies outside this tile or the
    /// nearest sample is a void.
    pub fn get(&self, coord: Coord<C>) -> Option<i16> {
        let xy = self.coord_to_xy(coord)?;
        match self.get_xy(xy)? {
            VOID => None,
            elevation => Some(elevation),
        }
    }
}

/// Private API
impl Tile {
    fn get_xy(&self, xy: (usize, usize)) -> Option<i16> {
        self.samples.get(self.xy_to_linear_index(xy))
    }

    /// Returns the (x, y) index of the sample nearest to `coord`,
    /// where (0, 0) is the SW-most sample.
    fn coord_to_xy(&self, coord: Coord<C>) -> Option<(usize, usize)> {
        let c = ARCSEC_PER_DEG / C::from(self.resolution);
        // Samples are centered on their coordinate, so shift by half a
        // cell before flooring.
        let cc = 1. / (c * 2.);
        let x = ((coord.x - self.sw_corner_center.x + cc) * c).floor();
        let y = ((coord.y - self.sw_corner_center.y + cc) * c).floor();
        #[allow(clippy::cast_precision_loss)]
        let in_bounds = (0.0..self.dimensions.0 as C).contains(&x)
            && (0.0..self.dimensions.1 as C).contains(&y);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let xy = (x as usize, y as usize);
        in_bounds.then_some(xy)
    }

    /// HGT rows are stored north to south.
    fn xy_to_linear_index(&self, (x, y): (usize, usize)) -> usize {
        self.dimensions.0 * (self.dimensions.1 - y - 1) + x
    }
}

fn corner_center<P: AsRef<Path>>(path: P) -> Result<Coord<C>, NasademError> {
    let Coord { x, y } = parse_sw_corner(path)?;
    Ok(Coord {
        x: C::from(x),
        y: C::from(y),
    })
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, (usize, usize)), NasademError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<u16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<u16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, (3601, 3601))),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, (1201, 1201))),
        invalid_len => Err(NasademError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_resolution, Coord, NasademError, Tile, VOID};
    use std::{
        fs::File,
        io::{BufWriter, Write},
        path::{Path, PathBuf},
    };

    const DIM: usize = 1201;

    /// Value stored at (x, y), where (0, 0) is the SW-most sample.
    fn synthetic(x: usize, y: usize) -> i16 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let elev = ((x * 3 + y * 5) % 4000) as i16;
        elev
    }

    /// Writes a 3-arcsecond tile, north row first, with a void at
    /// (7, 7).
    fn write_tile(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut out = BufWriter::new(File::create(&path).unwrap());
        for y in (0..DIM).rev() {
            for x in 0..DIM {
                let sample = if (x, y) == (7, 7) { VOID } else { synthetic(x, y) };
                out.write_all(&sample.to_be_bytes()).unwrap();
            }
        }
        out.flush().unwrap();
        path
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample_coord(x: usize, y: usize) -> Coord {
        Coord {
            x: -72.0 + (x as f64 * 3.0) / 3600.0,
            y: 44.0 + (y as f64 * 3.0) / 3600.0,
        }
    }

    #[test]
    fn test_extract_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tile(dir.path(), "N44W072.hgt");
        assert_eq!(extract_resolution(&path).unwrap(), (3, (1201, 1201)));

        let short = dir.path().join("N45W072.hgt");
        std::fs::write(&short, [0_u8; 10]).unwrap();
        assert!(matches!(
            extract_resolution(&short),
            Err(NasademError::HgtLen(10, _))
        ));
    }

    #[test]
    fn test_load_and_memmap_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tile(dir.path(), "N44W072.hgt");
        let parsed = Tile::load(&path).unwrap();
        let mapped = Tile::memmap(&path).unwrap();
        assert_eq!(parsed.len(), DIM * DIM);
        assert_eq!(parsed.resolution(), 3);
        for (x, y) in [(0, 0), (1200, 0), (0, 1200), (1200, 1200), (600, 17)] {
            assert_eq!(parsed.get_xy((x, y)), Some(synthetic(x, y)));
            assert_eq!(mapped.get_xy((x, y)), Some(synthetic(x, y)));
        }
    }

    #[test]
    fn test_geo_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tile(dir.path(), "N44W072.hgt");
        let tile = Tile::memmap(path).unwrap();
        assert_eq!(tile.sw_corner(), Coord { x: -72.0, y: 44.0 });
        assert_eq!(tile.get(sample_coord(100, 200)), Some(synthetic(100, 200)));

        // Just under half a cell away still snaps to the same sample.
        let nudged = Coord {
            x: sample_coord(100, 200).x + 1.4 / 3600.0,
            y: sample_coord(100, 200).y - 1.4 / 3600.0,
        };
        assert_eq!(tile.get(nudged), Some(synthetic(100, 200)));
    }

    #[test]
    fn test_void_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tile(dir.path(), "N44W072.hgt");
        let tile = Tile::load(path).unwrap();
        assert_eq!(tile.get(sample_coord(7, 7)), None);
        assert_eq!(tile.get(sample_coord(7, 8)), Some(synthetic(7, 8)));
    }

    #[test]
    fn test_out_of_bounds_get_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tile(dir.path(), "N44W072.hgt");
        let tile = Tile::load(path).unwrap();
        // Assert coordinate a smidge north of tile returns None.
        assert_eq!(tile.get(Coord { x: -71.5, y: 45.1 }), None);
        // Assert coordinate a smidge east of tile returns None.
        assert_eq!(tile.get(Coord { x: -70.9, y: 44.5 }), None);
        // Assert coordinate a smidge south of tile returns None.
        assert_eq!(tile.get(Coord { x: -71.5, y: 43.9 }), None);
        // Assert coordinate a smidge west of tile returns None.
        assert_eq!(tile.get(Coord { x: -72.1, y: 44.5 }), None);
    }
}
