// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Incremental edits of [Routes](Route).
//!
//! Every edit takes the current [Route] and returns a new one, recomputing only
//! the [Segments](Segment) which actually changed. Editing a single waypoint never
//! recomputes more than two segments, regardless of the route length.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{segment_between, Network, Route, Segment, Waypoint};

/// Default maximum distance (in meters) between a clicked point and a graph node
/// for the point to be anchored to that node.
pub const DEFAULT_SNAP_RADIUS: f64 = 30.0;

/// Tunables of an [Editor].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditOptions {
    /// Snap threshold, in meters. Used when placing new waypoints,
    /// when dragging existing ones and when re-validating routes after a graph reload.
    pub snap_radius: f64,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            snap_radius: DEFAULT_SNAP_RADIUS,
        }
    }
}

/// What to do with [node waypoints](Waypoint::Node) which can't be re-anchored
/// after the underlying graph was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPolicy {
    /// Keep such waypoints, converting them into [Waypoint::Custom].
    #[default]
    Degrade,

    /// Remove such waypoints from the route.
    Discard,
}

/// Applies edits to [Routes](Route) over a specific routing [Network].
///
/// The editor only borrows the network; it holds no route state. Routes produced by an editor
/// are stamped with the network's [Generation](crate::Generation). Routes stamped with
/// a different generation are [re-validated](Editor::revalidate) with [ReloadPolicy::Degrade]
/// before any edit is applied to them.
///
/// Waypoint indices are `usize`, and any index past the last waypoint
/// turns an edit into a no-op, returning an unchanged copy of the route.
pub struct Editor<'a, N: Network + ?Sized> {
    network: &'a N,
    options: EditOptions,
}

impl<'a, N: Network + ?Sized> Editor<'a, N> {
    /// Creates an editor with [default options](EditOptions::default).
    pub fn new(network: &'a N) -> Self {
        Self::with_options(network, EditOptions::default())
    }

    pub fn with_options(network: &'a N, options: EditOptions) -> Self {
        Self { network, options }
    }

    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Turns a clicked position into a [Waypoint]: anchored to the nearest node within
    /// the snap radius (and moved onto that node), or a custom waypoint at the position otherwise.
    pub fn classify(&self, lat: f64, lon: f64) -> Waypoint {
        match self
            .network
            .find_nearest_node(lat, lon, self.options.snap_radius)
        {
            Some(nearest) => Waypoint::node(nearest.node),
            None => Waypoint::custom(lat, lon),
        }
    }

    /// [Classifies](Editor::classify) a clicked position and [adds](Editor::add_waypoint)
    /// it to the route.
    pub fn click(&self, route: &Route, lat: f64, lon: f64) -> Route {
        self.add_waypoint(route, self.classify(lat, lon))
    }

    /// Adds a waypoint to the route.
    ///
    /// If the waypoint lies on one of the existing segments (on any of its vertices),
    /// it is inserted between the two waypoints connected by that segment.
    /// Otherwise, the waypoint is appended to the end of the route.
    pub fn add_waypoint(&self, route: &Route, waypoint: Waypoint) -> Route {
        let route = self.ensure_current(route);
        if route.is_empty() {
            return self.first_waypoint(waypoint);
        }

        let point = waypoint.coordinate();
        let on_segment = route
            .segments()
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, segment)| segment.passes_through(&point))
            .map(|(idx, _)| idx);

        match on_segment {
            Some(idx) => self.insert_waypoint(&route, idx, waypoint),
            None => self.insert_waypoint(&route, route.len(), waypoint),
        }
    }

    /// Inserts a waypoint so that it ends up at `index`. `index == route.len()` appends
    /// the waypoint, while `index == 0` prepends it.
    pub fn insert_waypoint(&self, route: &Route, index: usize, waypoint: Waypoint) -> Route {
        let route = self.ensure_current(route);
        if index > route.len() {
            return route.into_owned();
        } else if route.is_empty() {
            return self.first_waypoint(waypoint);
        }

        let mut waypoints = route.waypoints().to_vec();
        let mut segments = route.segments().to_vec();
        waypoints.insert(index, waypoint);

        if index == 0 {
            segments[0] = Arc::new(Segment::marker(waypoint.coordinate()));
            segments.insert(1, self.segment(&waypoints[0], &waypoints[1]));
        } else if index == waypoints.len() - 1 {
            segments.push(self.segment(&waypoints[index - 1], &waypoints[index]));
        } else {
            // Split the segment which used to connect the two neighbors
            segments[index] = self.segment(&waypoints[index - 1], &waypoints[index]);
            segments.insert(index + 1, self.segment(&waypoints[index], &waypoints[index + 1]));
        }

        self.assemble(waypoints, segments)
    }

    /// Moves the waypoint at `index` to a clicked position, [classifying](Editor::classify)
    /// it anew, and recomputes the adjacent segments.
    pub fn drag_waypoint(&self, route: &Route, index: usize, lat: f64, lon: f64) -> Route {
        self.move_waypoint(route, index, self.classify(lat, lon))
    }

    /// Replaces the waypoint at `index` and recomputes the adjacent segments.
    pub fn move_waypoint(&self, route: &Route, index: usize, waypoint: Waypoint) -> Route {
        let route = self.ensure_current(route);
        if index >= route.len() {
            return route.into_owned();
        }

        let mut waypoints = route.waypoints().to_vec();
        waypoints[index] = waypoint;
        self.recalculate(waypoints, route.segments().to_vec(), index)
    }

    /// Recomputes the segments leading to and from the waypoint at `index`.
    /// All other segments are shared with the provided route.
    pub fn recalculate_affected_segments(&self, route: &Route, index: usize) -> Route {
        let route = self.ensure_current(route);
        if index >= route.len() {
            return route.into_owned();
        }

        self.recalculate(route.waypoints().to_vec(), route.segments().to_vec(), index)
    }

    /// Removes the waypoint at `index`.
    ///
    /// Removing an intermediate waypoint replaces its two adjacent segments with
    /// a single one connecting its neighbors. Removing the first or the last waypoint
    /// doesn't require any segment to be recomputed.
    pub fn delete_waypoint(&self, route: &Route, index: usize) -> Route {
        let route = self.ensure_current(route);
        if index >= route.len() {
            return route.into_owned();
        } else if route.len() == 1 {
            return Route::new();
        }

        let mut waypoints = route.waypoints().to_vec();
        let mut segments = route.segments().to_vec();
        waypoints.remove(index);

        if index == 0 {
            // The segment leading to the new first waypoint becomes its marker
            segments.remove(0);
            segments[0] = Arc::new(Segment::marker(waypoints[0].coordinate()));
        } else if index == waypoints.len() {
            segments.pop();
        } else {
            segments.remove(index);
            segments[index] = self.segment(&waypoints[index - 1], &waypoints[index]);
        }

        self.assemble(waypoints, segments)
    }

    /// Re-anchors all [node waypoints](Waypoint::Node) of a route to the nearest nodes
    /// of the current network, and recomputes all segments.
    ///
    /// This must be done whenever the network was replaced, as node ids of the old
    /// network are meaningless in the new one. Waypoints without any node within
    /// the snap radius are handled according to the [ReloadPolicy].
    /// Custom waypoints are kept as-is.
    pub fn revalidate(&self, route: &Route, policy: ReloadPolicy) -> Route {
        let mut waypoints = Vec::with_capacity(route.len());

        for waypoint in route.waypoints() {
            match *waypoint {
                Waypoint::Node { lat, lon, node_id } => {
                    match self
                        .network
                        .find_nearest_node(lat, lon, self.options.snap_radius)
                    {
                        Some(nearest) => waypoints.push(Waypoint::node(nearest.node)),
                        None if policy == ReloadPolicy::Degrade => {
                            log::debug!("waypoint at node {node_id} degraded to a custom one");
                            waypoints.push(waypoint.detached());
                        }
                        None => {
                            log::debug!("waypoint at node {node_id} discarded");
                        }
                    }
                }
                Waypoint::Custom { .. } => waypoints.push(*waypoint),
            }
        }

        self.build_route(waypoints)
    }

    /// Creates a route from scratch, computing every segment between the provided waypoints.
    pub fn build_route(&self, waypoints: Vec<Waypoint>) -> Route {
        let Some(first) = waypoints.first() else {
            return Route::new();
        };

        let mut segments = Vec::with_capacity(waypoints.len());
        segments.push(Arc::new(Segment::marker(first.coordinate())));
        segments.extend(waypoints.windows(2).map(|w| self.segment(&w[0], &w[1])));

        self.assemble(waypoints, segments)
    }

    fn first_waypoint(&self, waypoint: Waypoint) -> Route {
        let marker = Arc::new(Segment::marker(waypoint.coordinate()));
        self.assemble(vec![waypoint], vec![marker])
    }

    fn recalculate(
        &self,
        waypoints: Vec<Waypoint>,
        mut segments: Vec<Arc<Segment>>,
        index: usize,
    ) -> Route {
        if index == 0 {
            segments[0] = Arc::new(Segment::marker(waypoints[0].coordinate()));
        } else {
            segments[index] = self.segment(&waypoints[index - 1], &waypoints[index]);
        }

        if index + 1 < waypoints.len() {
            segments[index + 1] = self.segment(&waypoints[index], &waypoints[index + 1]);
        }

        self.assemble(waypoints, segments)
    }

    fn segment(&self, a: &Waypoint, b: &Waypoint) -> Arc<Segment> {
        Arc::new(segment_between(self.network, a, b))
    }

    fn assemble(&self, waypoints: Vec<Waypoint>, segments: Vec<Arc<Segment>>) -> Route {
        Route::from_parts(waypoints, segments, Some(self.network.generation()))
    }

    /// Returns the route itself if it was built against the current network,
    /// or its re-validated copy otherwise.
    fn ensure_current<'r>(&self, route: &'r Route) -> Cow<'r, Route> {
        let current = self.network.generation();
        match route.generation() {
            Some(generation) if generation != current => {
                if route.has_node_waypoints() {
                    log::warn!(
                        "route built against graph {generation:?} edited over graph {current:?} - re-validating waypoints"
                    );
                    Cow::Owned(self.revalidate(route, ReloadPolicy::Degrade))
                } else {
                    Cow::Owned(self.assemble(route.waypoints().to_vec(), route.segments().to_vec()))
                }
            }
            _ => Cow::Borrowed(route),
        }
    }
}
