// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde_json::json;
use waymark::elevation::{resample, DEFAULT_SAMPLE_COUNT};
use waymark::osm::FileFormat;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] waymark::osm::Error);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Guess from the file content
    Auto,
    Xml,
    XmlGz,
    XmlBz2,
    Overpass,
}

impl From<Format> for FileFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Auto => FileFormat::Unknown,
            Format::Xml => FileFormat::Xml,
            Format::XmlGz => FileFormat::XmlGz,
            Format::XmlBz2 => FileFormat::XmlBz2,
            Format::Overpass => FileFormat::OverpassJson,
        }
    }
}

/// Plans a hiking route through the given points and prints it as GeoJSON.
#[derive(Parser)]
struct Cli {
    /// The path to the OSM file
    osm_file: PathBuf,

    /// Clicked positions, as "lat,lon"
    #[arg(required = true, allow_hyphen_values = true, value_parser = parse_position)]
    points: Vec<(f64, f64)>,

    /// Format of the OSM file
    #[arg(long, value_enum, default_value_t = Format::Auto)]
    format: Format,

    /// Only load nodes within "min_lon,min_lat,max_lon,max_lat"
    #[arg(long, allow_hyphen_values = true, value_parser = parse_bbox)]
    bbox: Option<[f64; 4]>,

    /// Maximum distance (in meters) for snapping points to trail nodes
    #[arg(long, default_value_t = waymark::DEFAULT_SNAP_RADIUS)]
    snap_radius: f64,

    /// Number of elevation profile samples to output
    #[arg(long, default_value_t = DEFAULT_SAMPLE_COUNT)]
    samples: usize,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let g = load_graph(&cli.osm_file, cli.format.into(), cli.bbox.unwrap_or([0.0; 4]))?;

    let editor = waymark::Editor::with_options(
        &g,
        waymark::EditOptions {
            snap_radius: cli.snap_radius,
        },
    );
    let route = cli
        .points
        .iter()
        .fold(waymark::Route::new(), |route, &(lat, lon)| {
            editor.click(&route, lat, lon)
        });

    log::info!(
        "route through {} waypoints: {:.0} m",
        route.len(),
        route.total_distance()
    );

    let line = route
        .coordinates()
        .iter()
        .map(|c| [c.lon, c.lat])
        .collect::<Vec<_>>();

    let mut features = vec![json!({
        "type": "Feature",
        "properties": {"distance": route.total_distance()},
        "geometry": {"type": "LineString", "coordinates": line},
    })];

    features.extend(route.waypoints().iter().map(|w| {
        let c = w.coordinate();
        json!({
            "type": "Feature",
            "properties": {
                "kind": if w.node_id().is_some() { "node" } else { "custom" },
                "node_id": w.node_id(),
            },
            "geometry": {"type": "Point", "coordinates": [c.lon, c.lat]},
        })
    }));

    features.extend(resample(&route.coordinates(), cli.samples).iter().map(|s| {
        json!({
            "type": "Feature",
            "properties": {"kind": "sample", "distance": s.distance},
            "geometry": {
                "type": "Point",
                "coordinates": [s.coordinate.lon, s.coordinate.lat],
            },
        })
    }));

    let collection = json!({"type": "FeatureCollection", "features": features});
    println!("{}", serde_json::to_string_pretty(&collection)?);

    Ok(())
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    file_format: FileFormat,
    bbox: [f64; 4],
) -> Result<waymark::Graph, GraphLoadError> {
    let options = waymark::osm::Options {
        profile: &waymark::osm::HIKING_PROFILE,
        file_format,
        bbox,
    };
    waymark::osm::load_from_file(&options, path.as_ref())
        .map_err(|e| GraphLoadError(PathBuf::from(path.as_ref()), e))
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let numbers = s
        .split(',')
        .map(|x| x.trim().parse::<f64>().map_err(|e| format!("{x:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    numbers
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_position(s: &str) -> Result<(f64, f64), String> {
    let [lat, lon] = parse_numbers::<2>(s)?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("position out of range: {lat},{lon}"));
    }
    Ok((lat, lon))
}

fn parse_bbox(s: &str) -> Result<[f64; 4], String> {
    parse_numbers::<4>(s)
}
