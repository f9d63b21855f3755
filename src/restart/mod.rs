//! # Restart Protocol
//!
//! The simulation is a shared mutable resource. Its bound arrays may only be
//! swapped while it is stopped, so every topology change walks the same
//! cycle:
//!
//! ```text
//!            ┌──────────── any mutation ────────────┐
//!            ▼                                      │
//! Idle ──► Rebinding ──► Measuring ──► Ticking ──► RoutingEdges ──► Idle
//!                            │          ▲    │                       ▲
//!                            │   focus  │    │ routing disabled      │
//!                            │   lost / │    └───────────────────────┤
//!                            │   gained ▼                            │
//!                            │     Ticking{paused}                   │
//!                            └── prevent_layout ─────────────────────┘
//! ```
//!
//! | State | Engine | Renderer |
//! |-------|--------|----------|
//! | `Idle` | stopped | static |
//! | `Rebinding` | stopped, arrays replaced | diffed against the new data |
//! | `Measuring` | sizes and padding pushed | text boxes measured |
//! | `Ticking` | running (or paused) | positions follow each tick |
//! | `RoutingEdges` | converged | edges drawn as routed polylines |
//!
//! The host drives [`GraphModel::tick`] from its animation scheduler.

use std::fmt;

use crate::graph::GraphModel;
use crate::layout::LayoutEngine;
use crate::model::Size;
use crate::render::Renderer;
use crate::storage::TripletStore;
use crate::{Error, Result};

/// Runs once the current cycle comes back to `Idle`.
pub type LayoutCallback = Box<dyn FnOnce() + Send>;

// ============================================================================
// States
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartState {
    #[default]
    Idle,
    Rebinding,
    Measuring,
    Ticking { paused: bool },
    RoutingEdges,
}

impl RestartState {
    /// Whether `self → to` is a legal step.
    pub fn can_transition(self, to: RestartState) -> bool {
        use RestartState::*;
        match (self, to) {
            (_, Rebinding) => true,
            (Rebinding, Measuring) => true,
            (Measuring, Ticking { paused: false } | RoutingEdges | Idle) => true,
            (Ticking { .. }, Ticking { .. }) => true,
            (Ticking { .. }, RoutingEdges | Idle) => true,
            (Idle, RoutingEdges) => true,
            (RoutingEdges, Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RestartState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartState::Idle => write!(f, "idle"),
            RestartState::Rebinding => write!(f, "rebinding"),
            RestartState::Measuring => write!(f, "measuring"),
            RestartState::Ticking { paused: false } => write!(f, "ticking"),
            RestartState::Ticking { paused: true } => write!(f, "ticking (paused)"),
            RestartState::RoutingEdges => write!(f, "routing edges"),
        }
    }
}

/// What one call to [`GraphModel::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No simulation cycle is in progress.
    Stopped,
    /// The view lost focus; the simulation waits for `focus_gained`.
    Paused,
    Running,
    /// Converged on this tick; edges were routed and the cycle is idle.
    Settled,
}

impl TickOutcome {
    pub fn is_running(self) -> bool {
        matches!(self, TickOutcome::Running)
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Current state plus the callbacks waiting for the cycle to finish.
#[derive(Default)]
pub struct RestartProtocol {
    state: RestartState,
    pending: Vec<LayoutCallback>,
}

impl fmt::Debug for RestartProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestartProtocol")
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl RestartProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RestartState {
        self.state
    }

    /// Move to `to`, running pending callbacks when it is `Idle`.
    pub fn transition(&mut self, to: RestartState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(Error::Protocol(format!("illegal restart transition {} -> {}", self.state, to)));
        }
        tracing::debug!(from = %self.state, to = %to, "restart transition");
        self.state = to;
        if to == RestartState::Idle {
            for callback in self.pending.drain(..) {
                callback();
            }
        }
        Ok(())
    }

    /// Re-enter at `Rebinding`. Always legal.
    pub fn interrupt(&mut self) {
        if self.state != RestartState::Rebinding {
            tracing::debug!(from = %self.state, "restart interrupted");
        }
        self.state = RestartState::Rebinding;
    }

    pub fn defer(&mut self, callback: LayoutCallback) {
        self.pending.push(callback);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================================
// Restart handle
// ============================================================================

/// Borrowed handle for the `restart.*` operations.
pub struct Restart<'g, S, E, R> {
    graph: &'g mut GraphModel<S, E, R>,
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    pub fn restart(&mut self) -> Restart<'_, S, E, R> {
        Restart { graph: self }
    }

    pub fn state(&self) -> RestartState {
        self.protocol.state()
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        match self.protocol.state() {
            RestartState::Ticking { paused: false } => {}
            RestartState::Ticking { paused: true } => return Ok(TickOutcome::Paused),
            _ => return Ok(TickOutcome::Stopped),
        }
        let converged = self.layout.tick();
        self.sync_geometry();
        self.update_renderer();
        if converged || !self.layout.is_running() {
            self.settle()?;
            return Ok(TickOutcome::Settled);
        }
        Ok(TickOutcome::Running)
    }

    /// Pause the simulation while the view is hidden.
    pub fn focus_lost(&mut self) -> Result<()> {
        if self.protocol.state() == (RestartState::Ticking { paused: false }) {
            self.layout.stop();
            self.protocol.transition(RestartState::Ticking { paused: true })?;
        }
        Ok(())
    }

    pub fn focus_gained(&mut self) -> Result<()> {
        if self.protocol.state() == (RestartState::Ticking { paused: true }) {
            self.layout.resume();
            self.protocol.transition(RestartState::Ticking { paused: false })?;
        }
        Ok(())
    }

    /// Copy engine geometry back onto nodes and groups.
    pub(crate) fn sync_geometry(&mut self) {
        for (node, b) in self.nodes.iter_mut().zip(self.layout.node_bounds()) {
            let center = b.center();
            node.x = center.x;
            node.y = center.y;
            node.width = b.width();
            node.height = b.height();
            node.bounds = b;
        }
        for (group, b) in self.groups.iter_mut().zip(self.layout.group_bounds()) {
            group.bounds = b;
        }
    }

    fn settle(&mut self) -> Result<()> {
        if self.options.enable_edge_routing {
            self.protocol.transition(RestartState::RoutingEdges)?;
            let routes = self.layout.route_edges();
            self.renderer.draw_routes(&routes);
        }
        self.protocol.transition(RestartState::Idle)
    }

    /// Text boxes plus padding for nodes without an explicit size.
    fn measure(&mut self) {
        let pad = self.options.pad;
        for node in self.nodes.iter_mut().filter(|n| !n.sized) {
            let text = self.renderer.measure_text(node);
            node.width = text.width + 2.0 * pad;
            node.height = text.height + 2.0 * pad;
            node.refresh_bounds();
        }
        let sizes: Vec<Size> = self.nodes.iter().map(|n| n.size()).collect();
        self.layout.set_node_sizes(&sizes);
        self.layout.set_group_padding(self.options.group_pad);
        for group in &mut self.groups {
            group.padding = self.options.group_pad;
        }
    }
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> Restart<'_, S, E, R> {
    /// Rebind, measure and restart the simulation.
    ///
    /// With `prevent_layout` the engine is rebound but not started; nodes keep
    /// their current positions and the cycle ends immediately.
    pub fn layout(self, callback: Option<LayoutCallback>, prevent_layout: bool) -> Result<()> {
        let g = self.graph;
        g.layout.stop();
        g.protocol.transition(RestartState::Rebinding)?;
        let scene = g.scene();
        g.layout.load(scene)?;
        g.bind_renderer();

        g.protocol.transition(RestartState::Measuring)?;
        g.measure();
        if let Some(callback) = callback {
            g.protocol.defer(callback);
        }

        if prevent_layout {
            g.sync_geometry();
            g.update_renderer();
            return g.settle();
        }
        g.layout.start();
        g.protocol.transition(RestartState::Ticking { paused: false })
    }

    /// Re-apply node, group and edge attributes without touching the layout.
    pub fn styles(self) {
        let g = self.graph;
        g.bind_renderer();
        g.update_renderer();
    }

    /// Redraw edges. Routed when idle and routing is enabled, straight while
    /// the simulation is still moving nodes.
    pub fn redraw_edges(self) -> Result<()> {
        let g = self.graph;
        if g.options.enable_edge_routing && g.protocol.state() == RestartState::Idle {
            g.protocol.transition(RestartState::RoutingEdges)?;
            let routes = g.layout.route_edges();
            g.renderer.draw_routes(&routes);
            return g.protocol.transition(RestartState::Idle);
        }
        g.update_renderer();
        Ok(())
    }

    /// Push the disconnected-component option to the engine and relayout.
    pub fn handle_disconnects(self) -> Result<()> {
        let g = self.graph;
        g.layout.stop();
        g.layout.reconfigure(&g.options);
        Restart { graph: g }.layout(None, false)
    }
}
