// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Hiking route planning over [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! OSM paths, tracks and footways are converted into an undirected graph weighted
//! by great-circle distance. A [Route] is a sequence of [waypoints](Waypoint), each
//! either snapped to a graph node or placed freely, joined by [segments](Segment)
//! which follow the trails (A*) or run in a straight line when no trail connects them.
//! Routes are edited through an [Editor], which only recomputes the segments
//! adjacent to the changed waypoint. [Elevation profiles](elevation) are computed
//! over evenly spaced samples of a route.
//!
//! # Example
//!
//! ```no_run
//! let osm_options = waymark::osm::Options {
//!     profile: &waymark::osm::HIKING_PROFILE,
//!     file_format: waymark::osm::FileFormat::Unknown,
//!     bbox: [0.0; 4],
//! };
//! let g = waymark::osm::load_from_file(&osm_options, "path/to/tatras.osm")
//!     .expect("failed to load tatras.osm");
//!
//! let editor = waymark::Editor::new(&g);
//! let route = waymark::Route::new();
//! let route = editor.click(&route, 49.2320, 19.9817);
//! let route = editor.click(&route, 49.2297, 19.9632);
//! let route = editor.drag_waypoint(&route, 1, 49.2290, 19.9640);
//!
//! println!("Route: {:.0} m", route.total_distance());
//! ```

mod distance;
pub mod edit;
pub mod elevation;
mod graph;
pub mod history;
pub mod osm;
mod path;
mod route;

pub use distance::{earth_distance, interpolate, polyline_length, Coordinate, COORDINATE_EPSILON};
pub use edit::{EditOptions, Editor, ReloadPolicy, DEFAULT_SNAP_RADIUS};
pub use graph::{Edge, Generation, Graph, NearestNode, Node};
pub use history::History;
pub use path::{create_straight_segment, find_path, segment_between, Network, PathError};
pub use route::{Route, Segment, Waypoint};
