use crate::traversal::{BfsIterator, ReachedNode, TraversalConfig};
use crate::{DanglingReference, InfluenceEdge};
use negotiator_core::Stakeholder;
use std::collections::HashMap;
use tracing::debug;

/// Directed "who influences whom" graph for one analysis.
///
/// Nodes are stakeholder names in input order. For every stakeholder `S` and
/// every name `N` in `S.influenced_by`, an edge `N -> S` is stored once in both
/// directions. Unknown names are kept aside as dangling references and never
/// take part in traversal. The graph is rebuilt from scratch per analysis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InfluenceGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// influencers[v] = nodes whose stance shapes v, in declaration order
    influencers: Vec<Vec<usize>>,
    /// influenced[u] = nodes whose stance u shapes, in build order
    influenced: Vec<Vec<usize>>,
    dangling: Vec<DanglingReference>,
    edge_count: usize,
}

impl InfluenceGraph {
    pub fn build(stakeholders: &[Stakeholder]) -> Self {
        let nodes: Vec<String> = stakeholders.iter().map(|s| s.name.clone()).collect();
        let index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let mut graph = Self {
            influencers: vec![Vec::new(); nodes.len()],
            influenced: vec![Vec::new(); nodes.len()],
            nodes,
            index,
            dangling: Vec::new(),
            edge_count: 0,
        };

        for (target, stakeholder) in stakeholders.iter().enumerate() {
            for reference in &stakeholder.influenced_by {
                match graph.index.get(reference).copied() {
                    Some(source) if source == target => {
                        debug!(stakeholder = %stakeholder.name, "Ignoring self-influence reference");
                    }
                    Some(source) => graph.add_edge(source, target),
                    None => {
                        debug!(
                            stakeholder = %stakeholder.name,
                            reference = %reference,
                            "Dropping dangling influence reference"
                        );
                        let dangling = DanglingReference {
                            stakeholder: stakeholder.name.clone(),
                            reference: reference.clone(),
                        };
                        if !graph.dangling.contains(&dangling) {
                            graph.dangling.push(dangling);
                        }
                    }
                }
            }
        }

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edge_count,
            dangling = graph.dangling.len(),
            "Influence graph built"
        );
        graph
    }

    fn add_edge(&mut self, source: usize, target: usize) {
        // influenced_by is a set; repeated names collapse into one edge
        if self.influencers[target].contains(&source) {
            return;
        }
        self.influencers[target].push(source);
        self.influenced[source].push(target);
        self.edge_count += 1;
    }

    pub(crate) fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn node_name(&self, index: usize) -> &str {
        &self.nodes[index]
    }

    pub(crate) fn influencer_indices(&self, index: usize) -> &[usize] {
        &self.influencers[index]
    }

    pub(crate) fn influenced_indices(&self, index: usize) -> &[usize] {
        &self.influenced[index]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Names with an edge directly into `name`. Empty for unknown names.
    pub fn direct_influencers(&self, name: &str) -> Vec<&str> {
        self.node_index(name)
            .map(|i| self.influencers[i].iter().map(|&j| self.node_name(j)).collect())
            .unwrap_or_default()
    }

    /// Names whose stance `name` shapes. Empty for unknown names.
    pub fn influenced(&self, name: &str) -> Vec<&str> {
        self.node_index(name)
            .map(|i| self.influenced[i].iter().map(|&j| self.node_name(j)).collect())
            .unwrap_or_default()
    }

    pub fn in_degree(&self, name: &str) -> usize {
        self.node_index(name).map_or(0, |i| self.influencers[i].len())
    }

    pub fn out_degree(&self, name: &str) -> usize {
        self.node_index(name).map_or(0, |i| self.influenced[i].len())
    }

    /// Breadth-first walk over incoming edges, at most `depth` hops from `name`.
    ///
    /// The start node is never emitted and every other node at most once, so
    /// mutual influence cycles terminate.
    pub fn reachable_within(&self, name: &str, depth: usize) -> Vec<ReachedNode> {
        self.bfs(name, TraversalConfig::influencers(depth)).collect()
    }

    pub fn bfs(&self, start: &str, config: TraversalConfig) -> BfsIterator<'_> {
        BfsIterator::new(self, start, config)
    }

    /// All resolved edges, grouped by influenced stakeholder in input order
    pub fn edges(&self) -> Vec<InfluenceEdge> {
        self.influencers
            .iter()
            .enumerate()
            .flat_map(|(target, sources)| {
                sources
                    .iter()
                    .map(move |&source| InfluenceEdge::new(self.node_name(source), self.node_name(target)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Vec<Stakeholder> {
        vec![
            Stakeholder::new("Gov", 0.9, 0.8, 0.95, 0.6),
            Stakeholder::new("NGO", 0.5, 0.8, 0.7, 0.7),
            Stakeholder::new("Armed Group", 0.7, 0.9, 0.3, -0.8).influenced_by(["NGO"]),
        ]
    }

    #[test]
    fn test_direct_influencers() {
        let graph = InfluenceGraph::build(&scenario());
        assert_eq!(graph.direct_influencers("Armed Group"), vec!["NGO"]);
        assert_eq!(graph.influenced("NGO"), vec!["Armed Group"]);
        assert!(graph.direct_influencers("Gov").is_empty());
        assert!(graph.direct_influencers("Nobody").is_empty());
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges(), vec![InfluenceEdge::new("NGO", "Armed Group")]);
    }

    #[test]
    fn test_dangling_references_are_dropped() {
        let stakeholders = vec![
            Stakeholder::new("Gov", 0.9, 0.8, 0.95, 0.6).influenced_by(["Donor", "Donor"]),
            Stakeholder::new("NGO", 0.5, 0.8, 0.7, 0.7).influenced_by(["Gov"]),
        ];
        let graph = InfluenceGraph::build(&stakeholders);

        assert_eq!(
            graph.dangling(),
            &[DanglingReference {
                stakeholder: "Gov".to_string(),
                reference: "Donor".to_string(),
            }]
        );
        assert!(!graph.contains("Donor"));
        assert!(graph.direct_influencers("Gov").is_empty());
        assert_eq!(graph.reachable_within("NGO", 5).len(), 1);
    }

    #[test]
    fn test_duplicate_and_self_references_collapse() {
        let stakeholders = vec![
            Stakeholder::new("A", 0.5, 0.5, 0.5, 0.0).influenced_by(["B", "B", "A"]),
            Stakeholder::new("B", 0.5, 0.5, 0.5, 0.0),
        ];
        let graph = InfluenceGraph::build(&stakeholders);
        assert_eq!(graph.direct_influencers("A"), vec!["B"]);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.dangling().is_empty());
    }

    #[test]
    fn test_mutual_influence_cycle_terminates() {
        let stakeholders = vec![
            Stakeholder::new("A", 0.5, 0.5, 0.5, 0.0).influenced_by(["B"]),
            Stakeholder::new("B", 0.5, 0.5, 0.5, 0.0).influenced_by(["A"]),
        ];
        let graph = InfluenceGraph::build(&stakeholders);

        for depth in 0..6 {
            let reached = graph.reachable_within("A", depth);
            let names: Vec<_> = reached.iter().map(|r| r.name.as_str()).collect();
            if depth == 0 {
                assert!(names.is_empty());
            } else {
                assert_eq!(names, vec!["B"]);
            }
        }
    }

    #[test]
    fn test_degrees() {
        let stakeholders = vec![
            Stakeholder::new("A", 0.5, 0.5, 0.5, 0.0).influenced_by(["C"]),
            Stakeholder::new("B", 0.5, 0.5, 0.5, 0.0).influenced_by(["C", "A"]),
            Stakeholder::new("C", 0.5, 0.5, 0.5, 0.0),
        ];
        let graph = InfluenceGraph::build(&stakeholders);
        assert_eq!(graph.out_degree("C"), 2);
        assert_eq!(graph.in_degree("B"), 2);
        assert_eq!(graph.in_degree("C"), 0);
        assert_eq!(graph.out_degree("missing"), 0);
    }
}
