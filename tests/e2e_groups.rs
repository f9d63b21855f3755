//! Group lifecycle through the public API: creation, single-parent moves,
//! pruning, and the group boxes the layout engine reports back.

use pretty_assertions::assert_eq;
use weave_graph::{Boundary, GraphModel, GraphOptions, GroupChildren, Node};

fn graph_with(nodes: &[&str]) -> GraphModel {
    let mut graph = GraphModel::open_memory(GraphOptions::default());
    let batch: Vec<Node> = nodes.iter().map(|h| Node::new(*h)).collect();
    graph.add_node(batch, true).unwrap();
    graph
}

// ============================================================================
// 1. Ungrouping down to nothing prunes the group
// ============================================================================

#[tokio::test]
async fn test_ungroup_until_pruned() {
    let mut graph = graph_with(&["a", "b"]);

    assert!(graph.add_to_group("g", GroupChildren::nodes(["a", "b"]), false).unwrap());
    assert!(graph.un_group(GroupChildren::nodes(["a"]), false).unwrap());
    assert_eq!(graph.get_group("g").unwrap().leaves, vec!["b".to_string()]);

    assert!(graph.un_group(GroupChildren::nodes(["b"]), false).unwrap());
    assert!(graph.get_group("g").is_none());

    // ungrouping again is a logged no-op
    assert!(!graph.un_group(GroupChildren::nodes(["b"]), false).unwrap());
}

// ============================================================================
// 2. Every node and group has at most one parent
// ============================================================================

#[tokio::test]
async fn test_single_parent_invariant() {
    let mut graph = graph_with(&["a", "b", "c", "d", "e"]);
    graph.add_to_group("g1", GroupChildren::nodes(["a", "b"]), true).unwrap();
    graph.add_to_group("g2", GroupChildren::nodes(["c", "d"]), true).unwrap();
    graph.add_to_group("g2", GroupChildren::nodes(["b"]), true).unwrap();
    graph.add_to_group("g3", GroupChildren::nodes(["e"]), true).unwrap();
    graph.add_to_group("top", GroupChildren::groups(["g1", "g2"]), true).unwrap();
    graph.add_to_group("g3", GroupChildren::groups(["g2"]), true).unwrap();

    for node in graph.nodes() {
        let owners: Vec<&str> = graph
            .groups()
            .iter()
            .filter(|g| g.leaves.contains(&node.hash))
            .map(|g| g.id.as_str())
            .collect();
        assert!(owners.len() <= 1, "{} in {owners:?}", node.hash);
        assert_eq!(owners.first().copied(), node.parent.as_deref());
    }
    for group in graph.groups() {
        let owners: Vec<&str> = graph
            .groups()
            .iter()
            .filter(|g| g.groups.contains(&group.id))
            .map(|g| g.id.as_str())
            .collect();
        assert!(owners.len() <= 1, "{} in {owners:?}", group.id);
        assert_eq!(owners.first().copied(), group.parent.as_deref());
    }

    // top lost g2 and kept only g1: pruned, g1 lifted to the top level
    assert!(graph.get_group("top").is_none());
    assert_eq!(graph.get_group("g1").unwrap().parent, None);
    assert_eq!(graph.get_group("g2").unwrap().parent.as_deref(), Some("g3"));
}

// ============================================================================
// 3. Group boxes come from the engine and drive selection
// ============================================================================

#[tokio::test]
async fn test_group_bounds_after_layout() {
    let mut graph = GraphModel::open_memory(GraphOptions::default());
    graph
        .add_node(
            [
                Node::new("a").at(0.0, 0.0).with_size(20.0, 20.0),
                Node::new("b").at(100.0, 0.0).with_size(20.0, 20.0),
            ],
            true,
        )
        .unwrap();
    graph.add_to_group("g", GroupChildren::nodes(["a", "b"]), false).unwrap();
    while graph.tick().unwrap().is_running() {}

    let g = graph.get_group("g").unwrap();
    // leaves span -10..110, plus the default group padding of 20
    assert_eq!((g.bounds.x, g.bounds.max_x), (-30.0, 130.0));
    assert_eq!(g.padding, 20.0);

    let sel = graph.select_by_coords(Boundary::new(-40.0, -40.0, 140.0, 40.0));
    assert_eq!(sel.groups, vec!["g".to_string()]);
    let sel = graph.select_by_coords(Boundary::new(-40.0, -40.0, 50.0, 40.0));
    assert!(sel.groups.is_empty());
    assert_eq!(sel.nodes, vec!["a".to_string()]);
}

// ============================================================================
// 4. Removing a grouped node detaches it
// ============================================================================

#[tokio::test]
async fn test_remove_grouped_node() {
    let mut graph = graph_with(&["a", "b"]);
    graph.add_to_group("g", GroupChildren::nodes(["a", "b"]), true).unwrap();
    graph.remove_node("a").await.unwrap();
    assert_eq!(graph.get_group("g").unwrap().leaves, vec!["b".to_string()]);
}
