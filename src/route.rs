// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::{Coordinate, Generation, Node};

/// A user-placed control point of a [Route].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waypoint {
    /// Waypoint anchored to a [Node] of the [Graph](crate::Graph).
    Node { lat: f64, lon: f64, node_id: i64 },

    /// Free-floating waypoint, used when no node is near enough.
    Custom { lat: f64, lon: f64 },
}

impl Waypoint {
    /// Creates a waypoint anchored at the provided node.
    pub fn node(node: Node) -> Self {
        Self::Node {
            lat: node.lat,
            lon: node.lon,
            node_id: node.id,
        }
    }

    pub fn custom(lat: f64, lon: f64) -> Self {
        Self::Custom { lat, lon }
    }

    pub fn coordinate(&self) -> Coordinate {
        match *self {
            Self::Node { lat, lon, .. } | Self::Custom { lat, lon } => Coordinate::new(lat, lon),
        }
    }

    /// Returns the id of the anchor [Node], if any.
    pub fn node_id(&self) -> Option<i64> {
        match *self {
            Self::Node { node_id, .. } => Some(node_id),
            Self::Custom { .. } => None,
        }
    }

    /// Converts the waypoint into a [Waypoint::Custom] at the same position.
    pub fn detached(&self) -> Self {
        let c = self.coordinate();
        Self::custom(c.lat, c.lon)
    }
}

/// Geometry and length of the connection between two consecutive [Waypoints](Waypoint).
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Traversed polyline - the full path if routed over the graph,
    /// or just the two endpoints for a straight line.
    pub coordinates: Vec<Coordinate>,

    /// Length of the segment, in meters.
    pub distance: f64,
}

impl Segment {
    pub fn new(coordinates: Vec<Coordinate>, distance: f64) -> Self {
        Self {
            coordinates,
            distance,
        }
    }

    /// Creates the degenerate first segment of a [Route],
    /// holding only the first waypoint.
    pub fn marker(at: Coordinate) -> Self {
        Self::new(vec![at], 0.0)
    }

    /// Checks whether any vertex of the segment is the provided point
    /// (as per [Coordinate::almost_eq]).
    pub fn passes_through(&self, point: &Coordinate) -> bool {
        self.coordinates.iter().any(|c| c.almost_eq(point))
    }
}

/// Ordered [Waypoints](Waypoint) and the [Segments](Segment) leading to each of them.
///
/// Routes are values - every edit creates a new Route. Segments are reference-counted,
/// so that Routes derived from one another share all segments which didn't change.
///
/// The following invariants always hold:
/// - there are as many segments as waypoints,
/// - the first segment is a [marker](Segment::marker) of the first waypoint,
/// - `segments[i]` connects `waypoints[i - 1]` with `waypoints[i]` for `i > 0`,
/// - the total distance is the sum of all segment distances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    segments: Vec<Arc<Segment>>,
    waypoints: Vec<Waypoint>,
    total_distance: f64,
    generation: Option<Generation>,
}

impl Route {
    /// Creates an empty route.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a route from its parts, recomputing the total distance.
    pub(crate) fn from_parts(
        waypoints: Vec<Waypoint>,
        segments: Vec<Arc<Segment>>,
        generation: Option<Generation>,
    ) -> Self {
        debug_assert_eq!(waypoints.len(), segments.len());
        debug_assert!(segments.first().map_or(true, |s| s.distance == 0.0));

        let total_distance = segments.iter().map(|s| s.distance).sum();
        let generation = if waypoints.is_empty() { None } else { generation };
        Self {
            segments,
            waypoints,
            total_distance,
            generation,
        }
    }

    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Total length of the route, in meters.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// [Generation] of the graph this route was last built against,
    /// or `None` for an empty route.
    pub fn generation(&self) -> Option<Generation> {
        self.generation
    }

    /// Returns the number of waypoints.
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Checks whether the route contains any [Waypoint::Node].
    pub fn has_node_waypoints(&self) -> bool {
        self.waypoints.iter().any(|w| w.node_id().is_some())
    }

    /// Flattens all segments into a single polyline.
    ///
    /// The first vertex of a segment is skipped if it's the same
    /// (as per [Coordinate::almost_eq]) as the last vertex of the previous segment.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut result: Vec<Coordinate> = Vec::new();
        for segment in &self.segments {
            let mut vertices = segment.coordinates.iter().peekable();
            if let (Some(last), Some(first)) = (result.last(), vertices.peek()) {
                if last.almost_eq(first) {
                    vertices.next();
                }
            }
            result.extend(vertices);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_waypoint_route() -> Route {
        let a = Waypoint::custom(0.0, 0.0);
        let b = Waypoint::custom(0.0, 0.001);
        Route::from_parts(
            vec![a, b],
            vec![
                Arc::new(Segment::marker(a.coordinate())),
                Arc::new(Segment::new(
                    vec![a.coordinate(), Coordinate::new(0.0005, 0.0005), b.coordinate()],
                    150.0,
                )),
            ],
            None,
        )
    }

    #[test]
    fn from_parts_sums_distance() {
        let r = two_waypoint_route();
        assert_eq!(r.len(), 2);
        assert_eq!(r.total_distance(), 150.0);
        assert_eq!(r.segments()[0].coordinates.len(), 1);
    }

    #[test]
    fn coordinates_deduplicate_joins() {
        let r = two_waypoint_route();
        assert_eq!(
            r.coordinates(),
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0005, 0.0005),
                Coordinate::new(0.0, 0.001),
            ]
        );
    }

    #[test]
    fn waypoint_accessors() {
        let n = Waypoint::node(Node {
            id: 5,
            lat: 1.0,
            lon: 2.0,
        });
        assert_eq!(n.node_id(), Some(5));
        assert_eq!(n.coordinate(), Coordinate::new(1.0, 2.0));
        assert_eq!(n.detached(), Waypoint::custom(1.0, 2.0));
        assert_eq!(Waypoint::custom(1.0, 2.0).node_id(), None);
    }

    #[test]
    fn empty_route() {
        let r = Route::new();
        assert!(r.is_empty());
        assert!(r.segments().is_empty());
        assert_eq!(r.total_distance(), 0.0);
        assert_eq!(r.generation(), None);
        assert!(r.coordinates().is_empty());
    }
}
