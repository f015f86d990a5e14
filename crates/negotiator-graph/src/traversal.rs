use crate::InfluenceGraph;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Walk towards the stakeholders who shape the start node
    #[default]
    Incoming,
    /// Walk towards the stakeholders the start node shapes
    Outgoing,
}

/// Configuration for traversal algorithms
#[derive(Debug, Clone, Default)]
pub struct TraversalConfig {
    /// Maximum hops from the start (None for unlimited)
    pub max_depth: Option<usize>,
    /// Maximum number of nodes to emit
    pub max_nodes: Option<usize>,
    pub direction: Direction,
}

impl TraversalConfig {
    /// Influencer walk bounded to `depth` hops
    pub fn influencers(depth: usize) -> Self {
        Self {
            max_depth: Some(depth),
            max_nodes: None,
            direction: Direction::Incoming,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }
}

/// A node reached by breadth-first traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachedNode {
    pub name: String,
    /// Hops from the start node, at least 1
    pub depth: usize,
    /// First hop on the discovery path; `None` for direct neighbors
    pub via: Option<String>,
}

/// Iterator for breadth-first search over an [`InfluenceGraph`].
///
/// Nodes are marked visited when enqueued, so each one is emitted once at
/// its shortest depth. The start node is never emitted.
pub struct BfsIterator<'a> {
    graph: &'a InfluenceGraph,
    // (node, depth, first hop)
    queue: VecDeque<(usize, usize, Option<usize>)>,
    visited: Vec<bool>,
    config: TraversalConfig,
    nodes_emitted: usize,
}

impl<'a> BfsIterator<'a> {
    pub fn new(graph: &'a InfluenceGraph, start: &str, config: TraversalConfig) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = vec![false; graph.node_count()];

        if let Some(start) = graph.node_index(start) {
            visited[start] = true;
            queue.push_back((start, 0, None));
        }

        Self {
            graph,
            queue,
            visited,
            config,
            nodes_emitted: 0,
        }
    }

    fn neighbors(&self, node: usize) -> &'a [usize] {
        match self.config.direction {
            Direction::Incoming => self.graph.influencer_indices(node),
            Direction::Outgoing => self.graph.influenced_indices(node),
        }
    }

    fn expand(&mut self, node: usize, depth: usize, first_hop: Option<usize>) {
        if self.config.max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        for &next in self.neighbors(node) {
            if self.visited[next] {
                continue;
            }
            self.visited[next] = true;
            // Direct neighbors become the first hop for everything found through them
            let hop = if depth == 0 { Some(next) } else { first_hop };
            self.queue.push_back((next, depth + 1, hop));
        }
    }
}

impl Iterator for BfsIterator<'_> {
    type Item = ReachedNode;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(max_nodes) = self.config.max_nodes {
            if self.nodes_emitted >= max_nodes {
                return None;
            }
        }

        while let Some((current, depth, first_hop)) = self.queue.pop_front() {
            self.expand(current, depth, first_hop);
            if depth == 0 {
                continue;
            }

            self.nodes_emitted += 1;
            let via = first_hop
                .filter(|&hop| hop != current)
                .map(|hop| self.graph.node_name(hop).to_string());
            return Some(ReachedNode {
                name: self.graph.node_name(current).to_string(),
                depth,
                via,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiator_core::Stakeholder;

    // D -> C -> B -> A, plus E -> A
    fn chain() -> InfluenceGraph {
        InfluenceGraph::build(&[
            Stakeholder::new("A", 0.5, 0.5, 0.5, 0.0).influenced_by(["B", "E"]),
            Stakeholder::new("B", 0.5, 0.5, 0.5, 0.0).influenced_by(["C"]),
            Stakeholder::new("C", 0.5, 0.5, 0.5, 0.0).influenced_by(["D"]),
            Stakeholder::new("D", 0.5, 0.5, 0.5, 0.0),
            Stakeholder::new("E", 0.5, 0.5, 0.5, 0.0),
        ])
    }

    #[test]
    fn test_depth_and_via() {
        let reached = chain().reachable_within("A", 2);
        assert_eq!(
            reached,
            vec![
                ReachedNode { name: "B".into(), depth: 1, via: None },
                ReachedNode { name: "E".into(), depth: 1, via: None },
                ReachedNode { name: "C".into(), depth: 2, via: Some("B".into()) },
            ]
        );
    }

    #[test]
    fn test_unbounded_walk() {
        let graph = chain();
        let names: Vec<_> = graph
            .bfs("A", TraversalConfig::default())
            .map(|r| (r.name, r.depth))
            .collect();
        assert_eq!(
            names,
            vec![
                ("B".to_string(), 1),
                ("E".to_string(), 1),
                ("C".to_string(), 2),
                ("D".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_outgoing_direction() {
        let graph = chain();
        let config = TraversalConfig::influencers(5).with_direction(Direction::Outgoing);
        let names: Vec<_> = graph.bfs("D", config).map(|r| r.name).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_max_nodes_limit() {
        let graph = chain();
        let config = TraversalConfig::influencers(5).with_max_nodes(2);
        assert_eq!(graph.bfs("A", config).count(), 2);
    }

    #[test]
    fn test_unknown_start_is_empty() {
        assert_eq!(chain().reachable_within("Z", 3), Vec::new());
    }

    #[test]
    fn test_depth_zero_is_empty() {
        assert!(chain().reachable_within("A", 0).is_empty());
    }
}
