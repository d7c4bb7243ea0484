mod options;

use anyhow::Error as AnyError;
use clap::Parser;
use log::info;
use options::{Cli, Command as CliCmd, SourceKind};
use serde::Serialize;
use std::{io::Write, time::Duration};
use terrain::{
    elevation::{HgtSource, PointQuerySource, TerrariumSource, TileMode},
    ElevationSource, Profile, RangeOutcome, RayRequest,
};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    env_logger::init();

    let cli = Cli::parse();

    let request = RayRequest::builder()
        .origin(cli.origin.0)
        .bearing(cli.bearing)
        .start_distance(cli.start)
        .end_distance(cli.end)
        .step(cli.step)
        .build()?;

    let source = elevation_source(&cli)?;
    info!(
        "sampling {} points using {}",
        request.distances().len(),
        source.name()
    );

    let profile = Profile::builder()
        .request(request)
        .jobs(cli.jobs)
        .build(&source)?;
    let range = profile.range();

    match cli.cmd {
        CliCmd::Csv => print_csv(&profile)?,
        CliCmd::Json => print_json(&profile)?,
        CliCmd::Plot => plot_ascii(&profile),
        CliCmd::Stats => print_stats(&range)?,
    };

    summarize(&profile, &range);
    Ok(())
}

fn elevation_source(cli: &Cli) -> Result<Box<dyn ElevationSource>, AnyError> {
    let timeout = cli.timeout_secs.map(Duration::from_secs);
    let source: Box<dyn ElevationSource> = match cli.source {
        SourceKind::Terrarium => {
            let mut builder = TerrariumSource::builder().zoom(cli.zoom);
            if let Some(template) = &cli.tile_url {
                builder = builder.url_template(template);
            }
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            Box::new(builder.build()?)
        }
        SourceKind::Hgt => {
            let path = cli
                .hgt_path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--hgt-path is required with --source hgt"))?;
            let tile_mode = if cli.in_mem {
                TileMode::InMem
            } else {
                TileMode::MemMap
            };
            Box::new(HgtSource::new(path, tile_mode)?)
        }
        SourceKind::Query => {
            let mut builder = PointQuerySource::builder();
            if let Some(url) = &cli.query_url {
                builder = builder.base_url(url);
            }
            if let Some(pointer) = &cli.query_pointer {
                builder = builder.pointer(pointer);
            }
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            Box::new(builder.build()?)
        }
    };
    Ok(source)
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run -- --source=hgt --hgt-path=data/nasadem/3arcsecond/ --origin=44.28,-71.31 --bearing=160 --start=0 --end=20000 --step=90 csv | tr ',' ' ' > /tmp/plot && gnuplot -p -e "plot '/tmp/plot' using 1:4 with lines"
/// ```
fn print_csv(profile: &Profile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "distance_m,longitude,latitude,elevation_m")?;
    for sample in profile.samples() {
        let distance = sample.distance_m;
        let longitude = sample.point.x;
        let latitude = sample.point.y;
        let elevation = sample
            .elevation_m
            .map(|elev| elev.to_string())
            .unwrap_or_default();
        writeln!(stdout, "{distance},{longitude},{latitude},{elevation}")?;
    }
    Ok(())
}

fn print_json(profile: &Profile) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        distance_m: f64,
        location: [f64; 2],
        elevation_m: Option<f64>,
    }

    let reshaped: Vec<JsonEntry> = profile
        .samples()
        .iter()
        .map(|sample| JsonEntry {
            distance_m: sample.distance_m,
            location: [sample.point.x, sample.point.y],
            elevation_m: sample.elevation_m,
        })
        .collect();
    let json = serde_json::to_string(&reshaped)?;
    println!("{json}");
    Ok(())
}

fn plot_ascii(profile: &Profile) {
    #[allow(clippy::cast_possible_truncation)]
    let plot_data: Vec<(f32, f32)> = profile
        .samples()
        .iter()
        .filter_map(|sample| {
            let elev = sample.elevation_m?;
            Some(((sample.distance_m / 1000.0) as f32, elev as f32))
        })
        .collect();
    #[allow(clippy::cast_possible_truncation)]
    let (xmin, xmax) = (
        (profile.request().start_distance_m() / 1000.0) as f32,
        (profile.samples().last().map_or(0.0, |s| s.distance_m) / 1000.0) as f32,
    );
    Chart::new(300, 150, xmin, xmax)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}

fn print_stats(range: &RangeOutcome) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    match range {
        RangeOutcome::Computed(stat) => {
            writeln!(stdout, "valid: {}", stat.valid_count)?;
            writeln!(stdout, "filtered (central 80%): {}", stat.filtered_count)?;
            writeln!(stdout, "min: {:.2} m", stat.min_m)?;
            writeln!(stdout, "max: {:.2} m", stat.max_m)?;
            writeln!(stdout, "delta_h: {:.2} m", stat.delta_h_m)?;
            for elevation in stat.filtered.iter() {
                writeln!(stdout, "{elevation:.2}")?;
            }
        }
        RangeOutcome::InsufficientData { valid_count } => {
            writeln!(
                stdout,
                "too few valid samples ({valid_count}) to compute delta_h"
            )?;
        }
    }
    Ok(())
}

fn summarize(profile: &Profile, range: &RangeOutcome) {
    let gaps = profile.len() - profile.valid_count();
    match range.delta_h_m() {
        Some(delta_h) => eprintln!(
            "{} samples ({gaps} without data), ΔH = {delta_h:.2} m",
            profile.len()
        ),
        None => eprintln!(
            "{} samples ({gaps} without data), too few valid samples for ΔH",
            profile.len()
        ),
    }
}
