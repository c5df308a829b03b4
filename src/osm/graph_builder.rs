// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use super::{Profile, RawData, Way};
use crate::{Graph, Node};

/// Converts [RawData] into a walkable [Graph].
///
/// Only ways accepted by the [Profile] are used. Every pair of consecutive nodes of such a way
/// becomes an undirected edge; pairs with a node without a known position are skipped.
/// Nodes without any edges are not included in the graph.
pub fn build_graph(data: &RawData, profile: &Profile<'_>) -> Graph {
    let mut b = GraphBuilder::new(profile);
    for (&id, &position) in &data.nodes {
        b.add_node(Node {
            id,
            lat: position.lat,
            lon: position.lon,
        });
    }
    for way in &data.ways {
        b.add_way(way);
    }
    b.finish()
}

/// Helper object used for storing state related to converting
/// raw OSM data into a [Graph].
struct GraphBuilder<'a> {
    g: Graph,
    profile: &'a Profile<'a>,
    unused_nodes: HashSet<i64>,
    discarded_ways: usize,
    dropped_edges: usize,
}

impl<'a> GraphBuilder<'a> {
    fn new(profile: &'a Profile<'a>) -> Self {
        Self {
            g: Graph::new(),
            profile,
            unused_nodes: HashSet::default(),
            discarded_ways: 0,
            dropped_edges: 0,
        }
    }

    fn add_node(&mut self, n: Node) {
        if n.id != 0 && n.lat.is_finite() && n.lon.is_finite() {
            self.g.set_node(n);
            self.unused_nodes.insert(n.id);
        }
    }

    fn add_way(&mut self, w: &Way) {
        if !self.profile.is_walkable(&w.tags) {
            self.discarded_ways += 1;
            return;
        }

        for pair in w.nodes.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            if left == right {
                continue;
            }

            if self.g.connect(left, right) {
                self.unused_nodes.remove(&left);
                self.unused_nodes.remove(&right);
            } else {
                log::debug!("way {}: no position for node {left} or {right}", w.id);
                self.dropped_edges += 1;
            }
        }
    }

    fn finish(mut self) -> Graph {
        self.unused_nodes
            .iter()
            .for_each(|&id| self.g.delete_node(id));

        log::debug!(
            "discarded {} non-walkable ways, {} edges with unknown nodes and {} unused nodes",
            self.discarded_ways,
            self.dropped_edges,
            self.unused_nodes.len(),
        );
        log::info!(
            "built graph with {} nodes and {} edges",
            self.g.len(),
            self.g.edge_count()
        );

        self.g
    }
}
