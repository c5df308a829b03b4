// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::hash_map::{Entry, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{earth_distance, Coordinate};

/// Represents a walkable vertex of the [Graph] - an intersection
/// or a shape point of an OpenStreetMap way.
///
/// Nodes with `id == 0` are disallowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Represents a connection from a specific [Node].
///
/// The graph is undirected, so every Edge has a twin going the other way,
/// with the same `cost` - the great-circle distance between the two nodes, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub cost: f64,
}

/// Process-unique stamp of a [Graph].
///
/// Every graph gets a fresh generation when created, which allows
/// [Routes](crate::Route) to detect that they were built against a graph
/// which has since been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

impl Generation {
    fn next() -> Self {
        Self(NEXT_GENERATION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Result of [Graph::find_nearest_node].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestNode {
    pub node: Node,

    /// Distance from the queried position to the node, in meters.
    pub distance: f64,
}

/// Represents a walkable OpenStreetMap network as a set of [Nodes](Node)
/// and undirected, distance-weighted [Edges](Edge) between them.
///
/// A Graph covers a single loaded area. Loading a different area creates a new Graph
/// (with a new [Generation]) instead of mutating the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: HashMap<i64, (Node, Vec<Edge>)>,
    generation: Generation,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates a new, empty graph with a fresh [Generation].
    pub fn new() -> Self {
        Self {
            nodes: HashMap::default(),
            generation: Generation::next(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of undirected edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|(_, edges)| edges.len()).sum::<usize>() / 2
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|(node, _)| node)
    }

    /// Retrieves a [Node] with the provided id, in constant time.
    pub fn get_node(&self, id: i64) -> Option<Node> {
        self.nodes.get(&id).map(|&(node, _)| node)
    }

    /// Finds the closest [Node] to the given position, no further than `radius` meters away.
    ///
    /// If multiple nodes are exactly equally close, the one with the lowest id is returned.
    ///
    /// This function scans all nodes in the graph (skipping those which can't possibly be
    /// within the radius based on their latitude), which is fine for a single loaded area.
    pub fn find_nearest_node(&self, lat: f64, lon: f64, radius: f64) -> Option<NearestNode> {
        if !radius.is_finite() || radius < 0.0 {
            return None;
        }

        // One degree of latitude is never shorter than ~110.5 km
        let max_dlat = radius / 110_000.0;

        self.nodes
            .values()
            .filter(|(nd, _)| (nd.lat - lat).abs() <= max_dlat)
            .map(|&(nd, _)| NearestNode {
                node: nd,
                distance: earth_distance(lat, lon, nd.lat, nd.lon),
            })
            .filter(|candidate| candidate.distance <= radius)
            .min_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.node.id.cmp(&b.node.id))
            })
    }

    /// Gets all [Edges](Edge) from a node with a given id.
    pub fn get_edges(&self, from_id: i64) -> &[Edge] {
        self.nodes
            .get(&from_id)
            .map(|(_, e)| e.as_slice())
            .unwrap_or_default()
    }

    /// Gets the cost of an [Edge] from one node to another.
    /// If such an edge doesn't exist, returns [f64::INFINITY].
    pub fn get_edge(&self, from_id: i64, to_id: i64) -> f64 {
        self.get_edges(from_id)
            .iter()
            .find(|edge| edge.to == to_id)
            .map(|edge| edge.cost)
            .unwrap_or(f64::INFINITY)
    }

    /// Creates or updates a [Node] with `node.id`.
    ///
    /// All edges are preserved, thus updating the position
    /// of an already-connected node is disallowed.
    pub(crate) fn set_node(&mut self, node: Node) {
        debug_assert_ne!(node.id, 0);

        match self.nodes.entry(node.id) {
            Entry::Vacant(e) => {
                e.insert((node, Vec::default()));
            }
            Entry::Occupied(mut e) => {
                debug_assert!(e.get().1.is_empty());
                e.get_mut().0 = node;
            }
        }
    }

    /// Deletes a [Node] with a given `id`, together with all of its edges.
    pub(crate) fn delete_node(&mut self, id: i64) {
        if let Some((_, edges)) = self.nodes.remove(&id) {
            for edge in edges {
                if let Some((_, back)) = self.nodes.get_mut(&edge.to) {
                    back.retain(|e| e.to != id);
                }
            }
        }
    }

    /// Connects two existing nodes with an undirected edge weighted by their
    /// great-circle distance. Returns false if either node doesn't exist,
    /// or if `a == b`.
    ///
    /// Connecting already-connected nodes is a no-op.
    pub(crate) fn connect(&mut self, a: i64, b: i64) -> bool {
        if a == b {
            return false;
        }

        let (left, right) = match (self.get_node(a), self.get_node(b)) {
            (Some(left), Some(right)) => (left, right),
            _ => return false,
        };

        let cost = earth_distance(left.lat, left.lon, right.lat, right.lon);
        self.push_edge(a, Edge { to: b, cost });
        self.push_edge(b, Edge { to: a, cost });
        true
    }

    fn push_edge(&mut self, from_id: i64, edge: Edge) {
        if let Some((_, edges)) = self.nodes.get_mut(&from_id) {
            if !edges.iter().any(|e| e.to == edge.to) {
                edges.push(edge);
            }
        }
    }
}
