//! Restart protocol driven from the outside: the host ticks the simulation,
//! the renderer sees binds, position updates and routed edges, and every
//! mutation re-enters the cycle.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{recorded_graph, RecordedGraph};
use pretty_assertions::assert_eq;
use weave_graph::layout::EngineScene;
use weave_graph::{Axis, Error, GraphOptions, LinkLengthStrategy, Node, RestartState, TickOutcome, Triplet};

/// Drive ticks until the cycle leaves `Ticking`. Returns the tick count.
fn run(graph: &mut RecordedGraph) -> usize {
    let mut ticks = 0;
    while graph.tick().unwrap().is_running() {
        ticks += 1;
        assert!(ticks < 1_000, "simulation never converged");
    }
    ticks + 1
}

// ============================================================================
// 1. A full cycle ends with routed edges
// ============================================================================

#[tokio::test]
async fn test_cycle_routes_edges_on_convergence() {
    let mut graph = recorded_graph(GraphOptions::default(), 4);
    graph.add_triplet(Triplet::link("a", "rel", "b"), false).await.unwrap();

    assert_eq!(graph.state(), RestartState::Ticking { paused: false });
    assert_eq!(graph.renderer().binds, 1);
    assert_eq!(graph.renderer().bound_nodes, 2);
    assert_eq!(graph.renderer().route_draws, 0);

    assert_eq!(run(&mut graph), 4);
    assert_eq!(graph.state(), RestartState::Idle);
    assert_eq!(graph.renderer().position_updates, 4);
    assert_eq!(graph.renderer().route_draws, 1);
    assert_eq!(graph.renderer().routes.len(), 1);
    assert_eq!(graph.renderer().routes[0].points.len(), 2);

    // once idle, ticks are no-ops
    assert_eq!(graph.tick().unwrap(), TickOutcome::Stopped);
}

#[tokio::test]
async fn test_routing_disabled_draws_straight_edges() {
    let options = GraphOptions { enable_edge_routing: false, ..GraphOptions::default() };
    let mut graph = recorded_graph(options, 2);
    graph.add_triplet(Triplet::link("a", "rel", "b"), false).await.unwrap();
    run(&mut graph);

    assert_eq!(graph.state(), RestartState::Idle);
    assert_eq!(graph.renderer().route_draws, 0);
    graph.restart().redraw_edges().unwrap();
    assert_eq!(graph.renderer().route_draws, 0);
}

// ============================================================================
// 2. Redraws route only when idle
// ============================================================================

#[tokio::test]
async fn test_redraw_edges_depends_on_state() {
    let mut graph = recorded_graph(GraphOptions::default(), 3);
    graph.add_triplet(Triplet::link("a", "rel", "b"), false).await.unwrap();

    let updates = graph.renderer().position_updates;
    graph.restart().redraw_edges().unwrap();
    assert_eq!(graph.renderer().route_draws, 0);
    assert_eq!(graph.renderer().position_updates, updates + 1);

    run(&mut graph);
    graph.restart().redraw_edges().unwrap();
    assert_eq!(graph.renderer().route_draws, 2);
    assert_eq!(graph.state(), RestartState::Idle);
}

// ============================================================================
// 3. Focus pauses the simulation
// ============================================================================

#[tokio::test]
async fn test_focus_pause_and_resume() {
    let mut graph = recorded_graph(GraphOptions::default(), 3);
    graph.add_triplet(Triplet::link("a", "rel", "b"), false).await.unwrap();
    graph.tick().unwrap();

    graph.focus_lost().unwrap();
    assert_eq!(graph.state(), RestartState::Ticking { paused: true });
    assert!(!graph.layout().is_running());
    assert_eq!(graph.tick().unwrap(), TickOutcome::Paused);

    graph.focus_gained().unwrap();
    assert_eq!(graph.state(), RestartState::Ticking { paused: false });
    run(&mut graph);
    assert_eq!(graph.state(), RestartState::Idle);

    // focus events outside a simulation change nothing
    graph.focus_lost().unwrap();
    assert_eq!(graph.state(), RestartState::Idle);
}

// ============================================================================
// 4. Callbacks wait for the last cycle
// ============================================================================

#[tokio::test]
async fn test_callback_survives_interrupting_mutation() {
    let mut graph = recorded_graph(GraphOptions::default(), 3);
    graph.add_node([Node::new("a"), Node::new("b")], true).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    graph
        .restart()
        .layout(Some(Box::new(move || { seen.fetch_add(1, Ordering::SeqCst); })), false)
        .unwrap();
    graph.tick().unwrap();

    // a mutation mid-simulation re-enters the cycle without firing it
    graph.add_triplet(Triplet::link("a", "rel", "c"), false).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(graph.renderer().bound_nodes, 3);

    run(&mut graph);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// 5. Arrays are never swapped under a running simulation
// ============================================================================

#[tokio::test]
async fn test_rebind_while_running_is_rejected() {
    let mut graph = recorded_graph(GraphOptions::default(), 10);
    graph.add_triplet(Triplet::link("a", "rel", "b"), false).await.unwrap();
    assert!(graph.layout().is_running());

    let err = graph.layout_mut().load(EngineScene::default()).unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
    assert_eq!(graph.layout().loaded_nodes(), 2);
}

// ============================================================================
// 6. Disconnected components and engine switches
// ============================================================================

#[tokio::test]
async fn test_handle_disconnects_reconfigures_engine() {
    let mut graph = recorded_graph(GraphOptions::default(), 3);
    graph.add_node([Node::new("a"), Node::new("b")], true).unwrap();
    assert!(graph.layout().settings().handle_disconnected);

    graph.options_mut().handle_disconnected = false;
    graph.restart().handle_disconnects().unwrap();
    assert!(!graph.layout().settings().handle_disconnected);
    assert_eq!(graph.state(), RestartState::Ticking { paused: false });
    run(&mut graph);
    assert_eq!(graph.state(), RestartState::Idle);
}

#[tokio::test]
async fn test_flow_layout_from_json() {
    let options = GraphOptions::from_json(
        r#"{"layoutType": {"type": "flowLayout", "axis": "y", "separation": 40}, "enableEdgeRouting": false}"#,
    )
    .unwrap();
    assert_eq!(options.layout, LinkLengthStrategy::FlowLayout { axis: Axis::Y, separation: 40.0 });

    let mut graph = recorded_graph(options, 5);
    graph.add_triplet(Triplet::link("up", "feeds", "down"), false).await.unwrap();
    run(&mut graph);

    let up = graph.get_node("up").unwrap().y;
    let down = graph.get_node("down").unwrap().y;
    assert!(down - up >= 40.0 - 1e-9, "up {up} down {down}");
}
