// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{earth_distance, Edge, Generation, Graph, NearestNode, Node, Segment, Waypoint};

/// Error conditions which may occur during [find_path].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The start or end nodes don't exist in a graph.
    #[error("invalid node: {0}")]
    InvalidReference(i64),
}

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score.eq(&other.score)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.total_cmp(&self.score)
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// Edge costs are great-circle distances, which makes the crow-flies distance
/// an admissible and consistent heuristic - the returned path is exactly as short
/// as one found by Dijkstra's algorithm.
///
/// Returns an empty vector if there is no route between the two nodes,
/// and a single-element vector if `from_id == to_id`.
pub fn find_path(g: &Graph, from_id: i64, to_id: i64) -> Result<Vec<i64>, PathError> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();

    let to_node = g
        .get_node(to_id)
        .ok_or(PathError::InvalidReference(to_id))?;

    {
        let from_node = g
            .get_node(from_id)
            .ok_or(PathError::InvalidReference(from_id))?;

        let initial_distance =
            earth_distance(from_node.lat, from_node.lon, to_node.lat, to_node.lon);

        queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
            score: initial_distance,
        });
        known_costs.insert(from_id, 0.0);
    }

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        for &Edge {
            to: neighbor_id,
            cost: edge_cost,
        } in g.get_edges(item.at)
        {
            let Some(neighbor) = g.get_node(neighbor_id) else {
                continue;
            };

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            // Push the new item into the queue
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                score: neighbor_cost
                    + earth_distance(neighbor.lat, neighbor.lon, to_node.lat, to_node.lon),
            });
        }
    }

    Ok(vec![])
}

impl Graph {
    /// Finds the shortest walkable [Segment] between two nodes.
    ///
    /// Returns `None` if either node doesn't exist, or if the nodes are
    /// in disconnected parts of the graph.
    pub fn route(&self, from_id: i64, to_id: i64) -> Option<Segment> {
        let ids = find_path(self, from_id, to_id).ok()?;
        if ids.is_empty() {
            return None;
        }

        let mut distance = 0.0;
        let mut coordinates = Vec::with_capacity(ids.len());
        for (idx, &id) in ids.iter().enumerate() {
            let node = self.get_node(id)?;
            if idx > 0 {
                distance += self.get_edge(ids[idx - 1], id);
            }
            coordinates.push(node.coordinate());
        }

        Some(Segment::new(coordinates, distance))
    }
}

/// Creates a two-point [Segment] going in a straight line between two [Waypoints](Waypoint).
pub fn create_straight_segment(a: &Waypoint, b: &Waypoint) -> Segment {
    let (a, b) = (a.coordinate(), b.coordinate());
    Segment::new(vec![a, b], a.distance_to(&b))
}

/// Everything the [Editor](crate::Editor) needs from a routing network:
/// nearest-node lookups and shortest paths.
///
/// [Graph] is the canonical implementation.
pub trait Network {
    /// Stamp of the network, see [Generation].
    fn generation(&self) -> Generation;

    /// See [Graph::find_nearest_node].
    fn find_nearest_node(&self, lat: f64, lon: f64, radius: f64) -> Option<NearestNode>;

    /// See [Graph::get_node].
    fn get_node(&self, id: i64) -> Option<Node>;

    /// See [Graph::route].
    fn route(&self, from_id: i64, to_id: i64) -> Option<Segment>;

    /// See [create_straight_segment].
    fn create_straight_segment(&self, a: &Waypoint, b: &Waypoint) -> Segment {
        create_straight_segment(a, b)
    }
}

impl Network for Graph {
    fn generation(&self) -> Generation {
        Graph::generation(self)
    }

    fn find_nearest_node(&self, lat: f64, lon: f64, radius: f64) -> Option<NearestNode> {
        Graph::find_nearest_node(self, lat, lon, radius)
    }

    fn get_node(&self, id: i64) -> Option<Node> {
        Graph::get_node(self, id)
    }

    fn route(&self, from_id: i64, to_id: i64) -> Option<Segment> {
        Graph::route(self, from_id, to_id)
    }
}

/// Creates the [Segment] connecting two consecutive [Waypoints](Waypoint).
///
/// Two node waypoints are connected by the shortest walkable path. If there's no such
/// path, or if either waypoint is custom, a straight line is used instead.
/// Thus, a segment between two waypoints always exists.
pub fn segment_between<N: Network + ?Sized>(network: &N, a: &Waypoint, b: &Waypoint) -> Segment {
    match (a, b) {
        (Waypoint::Node { node_id: from, .. }, Waypoint::Node { node_id: to, .. }) => network
            .route(*from, *to)
            .unwrap_or_else(|| network.create_straight_segment(a, b)),
        (Waypoint::Node { .. }, Waypoint::Custom { .. })
        | (Waypoint::Custom { .. }, Waypoint::Node { .. })
        | (Waypoint::Custom { .. }, Waypoint::Custom { .. }) => {
            network.create_straight_segment(a, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use approx::assert_abs_diff_eq;

    //  1 ── 2 ── 3        7 ── 8
    //  │         │
    //  4 ─────── 5 ── 6
    //
    // 1-2-3 is a detour, 1-4-5 goes almost straight
    fn test_graph() -> Graph {
        let mut g = Graph::new();
        for &(id, lat, lon) in &[
            (1, 0.0010, 0.0000),
            (2, 0.0030, 0.0010),
            (3, 0.0010, 0.0020),
            (4, 0.0000, 0.0000),
            (5, 0.0000, 0.0020),
            (6, 0.0000, 0.0030),
            (7, 0.0100, 0.0100),
            (8, 0.0100, 0.0110),
        ] {
            g.set_node(Node { id, lat, lon });
        }
        for &(a, b) in &[(1, 2), (2, 3), (3, 5), (1, 4), (4, 5), (5, 6), (7, 8)] {
            g.connect(a, b);
        }
        g
    }

    #[test]
    fn find_path_prefers_shorter_distance_over_fewer_hops() {
        let g = test_graph();
        assert_eq!(find_path(&g, 1, 5), Ok(vec![1, 4, 5]));
        assert_eq!(find_path(&g, 2, 6), Ok(vec![2, 3, 5, 6]));
    }

    #[test]
    fn find_path_disconnected() {
        let g = test_graph();
        assert_eq!(find_path(&g, 1, 8), Ok(vec![]));
    }

    #[test]
    fn find_path_invalid_reference() {
        let g = test_graph();
        assert_eq!(find_path(&g, 1, 42), Err(PathError::InvalidReference(42)));
        assert_eq!(find_path(&g, 42, 1), Err(PathError::InvalidReference(42)));
    }

    #[test]
    fn route_distance_is_sum_of_edges() {
        let g = test_graph();
        let s = g.route(1, 6).unwrap();
        assert_eq!(s.coordinates.len(), 4);
        assert_eq!(s.coordinates[0], Coordinate::new(0.0010, 0.0));
        assert_eq!(s.coordinates[3], Coordinate::new(0.0, 0.0030));
        let expected = g.get_edge(1, 4) + g.get_edge(4, 5) + g.get_edge(5, 6);
        assert_abs_diff_eq!(s.distance, expected, epsilon = 1e-9);
    }

    #[test]
    fn route_is_symmetric() {
        let g = test_graph();
        for &(a, b) in &[(1, 6), (2, 4), (3, 1), (7, 8)] {
            let there = g.route(a, b).unwrap();
            let back = g.route(b, a).unwrap();
            assert_abs_diff_eq!(there.distance, back.distance, epsilon = 1e-9);
        }
    }

    #[test]
    fn route_not_found() {
        let g = test_graph();
        assert_eq!(g.route(1, 7), None);
        assert_eq!(g.route(1, 100), None);
    }

    #[test]
    fn route_to_itself() {
        let g = test_graph();
        let s = g.route(3, 3).unwrap();
        assert_eq!(s.coordinates.len(), 1);
        assert_eq!(s.distance, 0.0);
    }

    #[test]
    fn straight_segment_distance() {
        let a = Waypoint::custom(46.5, 8.0);
        let b = Waypoint::custom(46.51, 8.02);
        let s = create_straight_segment(&a, &b);
        assert_eq!(s.coordinates.len(), 2);
        assert_abs_diff_eq!(s.distance, earth_distance(46.5, 8.0, 46.51, 8.02), epsilon = 1e-9);
    }

    #[test]
    fn segment_between_follows_policy() {
        let g = test_graph();
        let n1 = Waypoint::node(g.get_node(1).unwrap());
        let n6 = Waypoint::node(g.get_node(6).unwrap());
        let n8 = Waypoint::node(g.get_node(8).unwrap());
        let c = Waypoint::custom(0.0005, 0.0005);

        // Both anchored and connected - routed
        assert_eq!(segment_between(&g, &n1, &n6).coordinates.len(), 4);

        // Both anchored, but disconnected - straight line
        let s = segment_between(&g, &n1, &n8);
        assert_eq!(s.coordinates, vec![n1.coordinate(), n8.coordinate()]);

        // Any custom endpoint - straight line
        assert_eq!(segment_between(&g, &n1, &c).coordinates.len(), 2);
        assert_eq!(segment_between(&g, &c, &n6).coordinates.len(), 2);
        assert_eq!(segment_between(&g, &c, &c).distance, 0.0);
    }
}
