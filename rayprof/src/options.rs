use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, str::FromStr};
use terrain::geo::geometry::Coord;

/// Sample terrain elevation along a bearing and report its range.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Ray origin "lat,lon".
    #[arg(long, default_value = "8.5,-80.0", allow_hyphen_values = true)]
    pub origin: LatLon,

    /// Bearing in degrees (0 = north, 90 = east).
    #[arg(short, long, default_value_t = 90.0, allow_negative_numbers = true)]
    pub bearing: f64,

    /// Distance of the first sample from the origin, in meters.
    #[arg(long, default_value_t = 10_000.0)]
    pub start: f64,

    /// Distance of the last sample from the origin, in meters.
    #[arg(long, default_value_t = 50_000.0)]
    pub end: f64,

    /// Distance between samples, in meters.
    #[arg(long, default_value_t = 500.0)]
    pub step: f64,

    /// Where elevations come from.
    #[arg(long, value_enum, default_value_t = SourceKind::Terrarium)]
    pub source: SourceKind,

    /// HGT file or directory of HGT files (`--source hgt`).
    #[arg(long, required_if_eq("source", "hgt"))]
    pub hgt_path: Option<PathBuf>,

    /// Load HGT tiles into memory instead of memory-mapping them.
    #[arg(long, default_value_t = false)]
    pub in_mem: bool,

    /// Tile URL template with {z}, {x} and {y} (`--source terrarium`).
    #[arg(long)]
    pub tile_url: Option<String>,

    /// Tile zoom level (`--source terrarium`).
    #[arg(long, default_value_t = terrain::constants::TERRARIUM_ZOOM)]
    pub zoom: u8,

    /// Point-query service URL (`--source query`).
    #[arg(long)]
    pub query_url: Option<String>,

    /// JSON pointer to the elevation in query responses.
    #[arg(long)]
    pub query_pointer: Option<String>,

    /// Per-request timeout in seconds; defaults to 10 for tiles and 5
    /// for point queries.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Number of points to resolve concurrently.
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Terrarium PNG tiles over HTTP.
    Terrarium,
    /// NASADEM/SRTM .hgt files on disk.
    Hgt,
    /// Remote point-elevation service.
    Query,
}

#[derive(Clone, Copy, Debug)]
pub struct LatLon(pub Coord<f64>);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon pair"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        Ok(Self(Coord { y: lat, x: lon }))
    }
}

#[derive(Debug, Subcommand, Clone, Copy)]
pub enum Command {
    /// Print samples as CSV.
    Csv,

    /// Print samples as JSON.
    Json,

    /// Plot to terminal.
    Plot,

    /// Print the trimmed elevation range and the elevations it covers.
    Stats,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, LatLon, SourceKind};
    use clap::Parser;
    use std::str::FromStr;

    #[test]
    fn test_lat_lon() {
        let LatLon(coord) = LatLon::from_str("8.5, -80.0").unwrap();
        assert_eq!((coord.y, coord.x), (8.5, -80.0));
        assert!(LatLon::from_str("8.5").is_err());
        assert!(LatLon::from_str("north,-80").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rayprof", "stats"]).unwrap();
        assert_eq!(cli.source, SourceKind::Terrarium);
        assert_eq!((cli.start, cli.end, cli.step), (10_000.0, 50_000.0, 500.0));
        assert_eq!(cli.zoom, 12);
        assert!(matches!(cli.cmd, Command::Stats));
    }

    #[test]
    fn test_hgt_requires_path() {
        assert!(Cli::try_parse_from(["rayprof", "--source", "hgt", "csv"]).is_err());
        let cli = Cli::try_parse_from([
            "rayprof",
            "--source",
            "hgt",
            "--hgt-path",
            "data/nasadem",
            "--bearing",
            "-45",
            "csv",
        ])
        .unwrap();
        assert_eq!(cli.bearing, -45.0);
    }
}
