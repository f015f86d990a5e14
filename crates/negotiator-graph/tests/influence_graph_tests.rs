use negotiator_core::{NegotiationError, Stakeholder};
use negotiator_graph::{DanglingReference, InfluenceGraph, ReachedNode};
use std::collections::HashSet;

fn ring(size: usize) -> Vec<Stakeholder> {
    (0..size)
        .map(|i| {
            Stakeholder::new(format!("S{}", i), 0.5, 0.5, 0.5, 0.0)
                .influenced_by([format!("S{}", (i + 1) % size)])
        })
        .collect()
}

#[test]
fn test_ring_walk_visits_each_node_once() {
    let graph = InfluenceGraph::build(&ring(6));
    let reached = graph.reachable_within("S0", 100);

    assert_eq!(reached.len(), 5);
    let unique: HashSet<_> = reached.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(unique.len(), 5);
    assert!(!unique.contains("S0"));
    assert!(reached.iter().skip(1).all(|r| r.via.as_deref() == Some("S1")));
}

#[test]
fn test_walk_respects_depth_bound() {
    let graph = InfluenceGraph::build(&ring(6));
    for depth in 0..6 {
        let reached = graph.reachable_within("S0", depth);
        assert_eq!(reached.len(), depth);
        assert!(reached.iter().all(|r| r.depth >= 1 && r.depth <= depth));
    }
}

#[test]
fn test_graph_is_deterministic() {
    let stakeholders = vec![
        Stakeholder::new("Gov", 0.9, 0.8, 0.95, 0.6).influenced_by(["Donor"]),
        Stakeholder::new("NGO", 0.5, 0.8, 0.7, 0.7).influenced_by(["Gov", "UN"]),
        Stakeholder::new("UN", 0.8, 0.6, 0.9, 0.4),
        Stakeholder::new("Armed Group", 0.7, 0.9, 0.3, -0.8).influenced_by(["NGO"]),
    ];
    let first = InfluenceGraph::build(&stakeholders);
    let second = InfluenceGraph::build(&stakeholders);
    assert_eq!(first, second);

    assert_eq!(
        first.reachable_within("Armed Group", 2),
        vec![
            ReachedNode { name: "NGO".into(), depth: 1, via: None },
            ReachedNode { name: "Gov".into(), depth: 2, via: Some("NGO".into()) },
            ReachedNode { name: "UN".into(), depth: 2, via: Some("NGO".into()) },
        ]
    );
}

#[test]
fn test_dangling_reference_converts_to_warning_error() {
    let graph = InfluenceGraph::build(&[Stakeholder::new("Gov", 0.9, 0.8, 0.95, 0.6).influenced_by(["Donor"])]);
    let dangling: Vec<DanglingReference> = graph.dangling().to_vec();
    assert_eq!(dangling.len(), 1);

    let err: NegotiationError = dangling[0].clone().into();
    assert!(err.is_warning());
    assert!(err.to_string().contains("Donor"));

    let json = serde_json::to_value(&dangling[0]).unwrap();
    assert_eq!(json["stakeholder"], "Gov");
    assert_eq!(json["reference"], "Donor");
}
