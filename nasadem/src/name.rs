//! HGT file naming.
//!
//! Tiles are named after the integer coordinate of their southwest
//! corner, e.g. `N44W072.hgt` covers latitudes `[44, 45)` and
//! longitudes `[-72, -71)`.

use crate::{NasademError, C};
use geo::geometry::Coord;
use std::path::Path;

/// Returns the southwest corner, as integer degrees, of the tile
/// covering `coord`.
#[allow(clippy::cast_possible_truncation)]
pub fn sw_corner(Coord { x, y }: Coord<C>) -> Coord<i16> {
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

/// Returns the expected file name for the tile with the given
/// southwest corner.
pub fn file_name(Coord { x, y }: Coord<i16>) -> String {
    let (n_s, lat) = {
        let lat = y.abs();
        let n_s = if y.is_negative() { 'S' } else { 'N' };
        (n_s, lat)
    };
    let (e_w, lon) = {
        let lon = x.abs();
        let e_w = if x.is_negative() { 'W' } else { 'E' };
        (e_w, lon)
    };
    format!("{n_s}{lat:02}{e_w}{lon:03}.hgt")
}

/// Parses the southwest corner out of an HGT file's name.
pub fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, NasademError> {
    let mk_err = || NasademError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}
